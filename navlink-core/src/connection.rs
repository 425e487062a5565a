//! Connection state machine for the C3 link.
//!
//! Pure state tracking, no I/O: the discovery and sender loops drive the
//! transitions, and the owner decides how to notify observers. Setting the
//! state to its current value is a no-op so observers never see duplicate
//! notifications.

use serde::{Deserialize, Serialize};

/// Link state toward the C3 display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No endpoint known, listening for broadcasts
    Searching,
    /// Endpoint known (discovered or manually configured)
    Connected,
    /// A send failed; endpoint still known, discovery still listening
    Disconnected,
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Searching
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Searching => write!(f, "Searching"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// State holder with transition dedup.
///
/// DISCONNECTED heals only through a fresh discovery event or an explicit
/// endpoint set; a succeeding send does not flip the state back.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    state: ConnectionState,
}

impl ConnectionTracker {
    /// Create a tracker in the initial [`Searching`](ConnectionState::Searching)
    /// state.
    pub fn new() -> Self {
        ConnectionTracker::default()
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Move to `next`. Returns `true` when this was an actual transition and
    /// observers must be notified, `false` when the state was unchanged.
    pub fn transition(&mut self, next: ConnectionState) -> bool {
        if self.state == next {
            return false;
        }
        self.state = next;
        true
    }
}

//! Bridge runtime error type.

use thiserror::Error;

/// Errors surfaced by the bridge runtime.
///
/// Transport failures inside the loops are handled locally (logged, state
/// flipped to Disconnected) and never bubble up through these variants; what
/// remains is genuine setup failure and configuration rejection.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("I/O operation failed")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Protocol(#[from] navlink_core::ProtocolError),
}

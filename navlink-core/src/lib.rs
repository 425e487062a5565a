//! # Navlink Core
//!
//! Platform-independent telemetry schema and normalization for the navlink
//! bridge.
//!
//! This crate contains the wire data model and pure protocol logic with
//! **zero I/O dependencies**. All sockets, timers and tasks live in the
//! `navlink-bridge` crate; everything here can be exercised synchronously
//! from any thread.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  navlink-core (platform-independent, no tokio/async deps)   │
//! │  ├── telemetry/   (wire snapshot, exact C3 field names)     │
//! │  ├── normalize/   (upstream SDK callback -> snapshot)       │
//! │  ├── speed/       (displayed speed-limit override table)    │
//! │  ├── alert/       (camera taxonomy mapping)                 │
//! │  └── connection/  (link state machine)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                           ▲
//!              ┌────────────┴────────────┐
//!              │  navlink-bridge         │
//!              │  (UDP discovery/sender) │
//!              └─────────────────────────┘
//! ```
//!
//! ## Example: normalizing an upstream callback
//!
//! ```rust
//! use navlink_core::{apply_fix, AttachedFix, SpeedMapper, TelemetryRecord};
//!
//! let speeds = SpeedMapper::new();
//! speeds.set_mapping(120, 110);
//!
//! let fix = AttachedFix {
//!     speed_limit: 120,
//!     road_name: "Main St".to_string(),
//!     ..Default::default()
//! };
//! let record = apply_fix(
//!     &TelemetryRecord::default(),
//!     &fix,
//!     &speeds,
//!     chrono::Utc::now(),
//! );
//! assert_eq!(record.road_limit_speed, 110);
//! ```

pub mod alert;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod eta;
pub mod normalize;
pub mod speed;
pub mod telemetry;

// Re-export commonly used types
pub use alert::{normalize_camera, CameraType, SdiKind};
pub use connection::{ConnectionState, ConnectionTracker};
pub use endpoint::parse_endpoint;
pub use error::ProtocolError;
pub use eta::format_eta;
pub use normalize::{
    apply_fix, AttachedFix, Congestion, RouteProgress, ServiceArea, TrafficLight, TurnPreview,
};
pub use speed::SpeedMapper;
pub use telemetry::TelemetryRecord;

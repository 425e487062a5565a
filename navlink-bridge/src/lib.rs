//! # Navlink Bridge
//!
//! UDP bridge relaying live navigation telemetry to a "C3" in-car display.
//!
//! The bridge has three concurrent activities:
//! - a **discovery listener** adopting the source address of broadcast
//!   announcements from the display,
//! - a **telemetry sender** unicasting the current snapshot as flat JSON at
//!   5 Hz,
//! - the **normalization path**, invoked synchronously from the navigation
//!   SDK's callback thread via [`BridgeState::apply_fix`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    navlink-bridge                       │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────┐  │
//! │  │ Discovery    │  │ Telemetry    │  │ Demo feed     │  │
//! │  │ (UDP :7705)  │  │ (UDP :7706)  │  │ (optional)    │  │
//! │  └──────┬───────┘  └──────┬───────┘  └───────┬───────┘  │
//! │         ▼                 ▼                  ▼          │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │          BridgeState (Arc, shared)                │  │
//! │  │  - current TelemetryRecord (wholesale swap)       │  │
//! │  │  - known endpoint, connection state               │  │
//! │  │  - speed override table, packet counter           │  │
//! │  └───────────────────────────────────────────────────┘  │
//! │                          │                              │
//! │                          ▼                              │
//! │               navlink-core (no I/O)                     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example: starting the bridge
//!
//! ```rust,no_run
//! use clap::Parser;
//! use navlink_bridge::{BridgeConfig, BridgeController, Cli};
//! use std::time::Duration;
//! use tokio_graceful_shutdown::Toplevel;
//!
//! #[tokio::main]
//! async fn main() {
//!     let args = Cli::parse_from(["navlink-bridge"]);
//!     Toplevel::new(move |s| async move {
//!         let controller = BridgeController::new(BridgeConfig::from_cli(&args));
//!         controller.start(&s);
//!     })
//!     .catch_signals()
//!     .handle_shutdown_requests(Duration::from_secs(5))
//!     .await
//!     .unwrap();
//! }
//! ```

use clap::Parser;
use std::time::Duration;

pub mod bridge;
pub mod demo;
pub mod discovery;
pub mod error;
pub mod network;
pub mod sender;

pub use bridge::{BridgeController, BridgeEvent, BridgeState};
pub use demo::DemoFeed;
pub use discovery::DiscoveryListener;
pub use error::BridgeError;
pub use sender::TelemetrySender;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Port on which the display broadcasts its announcements.
pub const DISCOVERY_PORT: u16 = 7705;
/// Port on the display that receives telemetry datagrams.
pub const DATA_PORT: u16 = 7706;
/// Telemetry send period.
pub const SEND_INTERVAL_MS: u64 = 200;
/// Delay before the first telemetry tick.
pub const SEND_INITIAL_DELAY_MS: u64 = 1000;
/// Bound on a single discovery receive before re-asserting the search state.
pub const RECEIVE_TIMEOUT_MS: u64 = 5000;

#[derive(Parser, Clone, Debug)]
#[command(name = "navlink-bridge", version)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// UDP port on which the C3 display broadcasts announcements
    #[arg(long, default_value_t = DISCOVERY_PORT)]
    pub discovery_port: u16,

    /// UDP port on the display receiving telemetry
    #[arg(long, default_value_t = DATA_PORT)]
    pub data_port: u16,

    /// Telemetry send period in milliseconds
    #[arg(long, default_value_t = SEND_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Skip discovery and send to this IPv4 address
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Display ORIG km/h limits as SHOWN km/h, e.g. 120=110 (repeatable)
    #[arg(long, value_name = "ORIG=SHOWN", value_parser = parse_speed_map)]
    pub speed_map: Vec<(i32, i32)>,

    /// Feed a synthetic drive through the bridge instead of SDK callbacks
    #[arg(long, default_value_t = false)]
    pub demo: bool,
}

fn parse_speed_map(s: &str) -> Result<(i32, i32), String> {
    let (orig, shown) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ORIG=SHOWN, got '{}'", s))?;
    let orig: i32 = orig
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a speed in km/h", orig))?;
    let shown: i32 = shown
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a speed in km/h", shown))?;
    if orig <= 0 || shown <= 0 {
        return Err("speeds must be positive".to_string());
    }
    Ok((orig, shown))
}

/// Runtime parameters of the bridge loops.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub discovery_port: u16,
    pub data_port: u16,
    pub send_interval: Duration,
    pub initial_delay: Duration,
    pub receive_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            discovery_port: DISCOVERY_PORT,
            data_port: DATA_PORT,
            send_interval: Duration::from_millis(SEND_INTERVAL_MS),
            initial_delay: Duration::from_millis(SEND_INITIAL_DELAY_MS),
            receive_timeout: Duration::from_millis(RECEIVE_TIMEOUT_MS),
        }
    }
}

impl BridgeConfig {
    pub fn from_cli(args: &Cli) -> Self {
        BridgeConfig {
            discovery_port: args.discovery_port,
            data_port: args.data_port,
            send_interval: Duration::from_millis(args.interval_ms),
            ..Default::default()
        }
    }
}

//! Bridge lifecycle and shared state.
//!
//! [`BridgeState`] is the single shared-state object: the current telemetry
//! snapshot, the known C3 endpoint, the connection tracker, the packet
//! counter and the observer slot. The discovery and sender loops and the
//! upstream normalization path all hold an `Arc` to it; there is no ambient
//! global anywhere.
//!
//! [`BridgeController`] owns the lifecycle of the two loops as a unit and is
//! the public control surface for the host application.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use navlink_core::{
    apply_fix, parse_endpoint, AttachedFix, ConnectionState, ConnectionTracker, ProtocolError,
    SpeedMapper, TelemetryRecord,
};
use tokio::sync::mpsc;
use tokio_graceful_shutdown::{NestedSubsystem, SubsystemBuilder, SubsystemHandle};

use crate::discovery::DiscoveryListener;
use crate::sender::TelemetrySender;
use crate::BridgeConfig;

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Notification sent to the registered observer.
///
/// Events are sent synchronously from whichever task detected them; the
/// receiving side redispatches onto its own execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The connection state changed. `endpoint` is the currently known
    /// device address, `None` only while searching.
    StateChanged {
        state: ConnectionState,
        endpoint: Option<Ipv4Addr>,
    },
    /// One more telemetry datagram went out; `count` is the running total.
    PacketSent { count: u64 },
}

/// Shared bridge state.
///
/// The telemetry snapshot is replaced wholesale under the write lock, never
/// mutated field-by-field, so readers always see a complete record. Endpoint
/// and connection state are last-writer-wins scalars.
#[derive(Debug, Default)]
pub struct BridgeState {
    record: RwLock<TelemetryRecord>,
    endpoint: RwLock<Option<Ipv4Addr>>,
    connection: Mutex<ConnectionTracker>,
    packets_sent: AtomicU64,
    speeds: SpeedMapper,
    observer: RwLock<Option<mpsc::UnboundedSender<BridgeEvent>>>,
}

impl BridgeState {
    pub fn new() -> Self {
        BridgeState::default()
    }

    // -------------------------------------------------------------------------
    // Telemetry snapshot
    // -------------------------------------------------------------------------

    /// Clone of the current snapshot.
    pub fn current_record(&self) -> TelemetryRecord {
        self.record.read().unwrap().clone()
    }

    /// Replace the current snapshot wholesale.
    pub fn push_record(&self, record: TelemetryRecord) {
        *self.record.write().unwrap() = record;
    }

    /// Reset to an all-default snapshot, as on navigation stop.
    pub fn reset_record(&self) {
        self.push_record(TelemetryRecord::default());
    }

    /// Fold an upstream attached-location callback into the snapshot.
    ///
    /// This is the normalization path: speed mapping and camera taxonomy are
    /// applied here, before the record ever reaches the sender.
    pub fn apply_fix(&self, fix: &AttachedFix) {
        let next = {
            let prev = self.record.read().unwrap();
            apply_fix(&prev, fix, &self.speeds, chrono::Local::now())
        };
        self.push_record(next);
    }

    /// Zero the destination fields, as on arrival.
    pub fn mark_arrived(&self) {
        self.record.write().unwrap().mark_arrived();
    }

    /// The speed-limit override table consulted by the normalization path.
    pub fn speeds(&self) -> &SpeedMapper {
        &self.speeds
    }

    // -------------------------------------------------------------------------
    // Endpoint and connection state
    // -------------------------------------------------------------------------

    /// Currently known device address, if any.
    pub fn endpoint(&self) -> Option<Ipv4Addr> {
        *self.endpoint.read().unwrap()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.connection.lock().unwrap().state()
    }

    /// Number of telemetry datagrams sent since startup.
    pub fn packet_count(&self) -> u64 {
        self.packets_sent.load(Ordering::Relaxed)
    }

    /// Adopt `addr` as the device endpoint and mark the link connected.
    ///
    /// Used by both discovery and the manual configuration path; the last
    /// writer wins. Observers fire only on an actual state transition, so a
    /// silent endpoint change while connected stays silent.
    pub fn adopt_endpoint(&self, addr: Ipv4Addr) {
        *self.endpoint.write().unwrap() = Some(addr);
        self.transition(ConnectionState::Connected);
    }

    /// Validate and adopt a manually configured endpoint string.
    ///
    /// Rejected input causes no state change at all.
    pub fn set_endpoint(&self, addr: &str) -> Result<Ipv4Addr, ProtocolError> {
        let ip = parse_endpoint(addr)?;
        self.adopt_endpoint(ip);
        Ok(ip)
    }

    /// A telemetry send failed: flip to Disconnected.
    ///
    /// Only discovery (or a manual set) re-establishes Connected.
    pub fn mark_disconnected(&self) {
        self.transition(ConnectionState::Disconnected);
    }

    /// Re-assert Searching after a receive timeout with no known endpoint.
    /// Idempotent: no notification when already searching.
    pub fn reassert_searching(&self) {
        self.transition(ConnectionState::Searching);
    }

    /// Count one successfully sent datagram and notify the observer.
    pub fn record_packet_sent(&self) -> u64 {
        let count = self.packets_sent.fetch_add(1, Ordering::Relaxed) + 1;
        self.notify(BridgeEvent::PacketSent { count });
        count
    }

    // -------------------------------------------------------------------------
    // Observer
    // -------------------------------------------------------------------------

    /// Register the observer, replacing any previous one, and return its
    /// receiving end.
    pub fn register_observer(&self) -> mpsc::UnboundedReceiver<BridgeEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.observer.write().unwrap() = Some(tx);
        rx
    }

    fn transition(&self, next: ConnectionState) {
        let changed = self.connection.lock().unwrap().transition(next);
        if changed {
            let endpoint = self.endpoint();
            log::info!(
                "Connection state: {} (endpoint {})",
                next,
                endpoint.map_or_else(|| "unknown".to_string(), |ip| ip.to_string())
            );
            self.notify(BridgeEvent::StateChanged {
                state: next,
                endpoint,
            });
        }
    }

    fn notify(&self, event: BridgeEvent) {
        if let Some(tx) = self.observer.read().unwrap().as_ref() {
            // A dropped receiver is not an error, the observer just left.
            let _ = tx.send(event);
        }
    }
}

struct BridgeTasks {
    discovery: NestedSubsystem<BoxedError>,
    sender: NestedSubsystem<BoxedError>,
}

/// Owns the discovery listener and telemetry sender as one unit.
pub struct BridgeController {
    config: BridgeConfig,
    state: Arc<BridgeState>,
    tasks: Mutex<Option<BridgeTasks>>,
}

impl BridgeController {
    pub fn new(config: BridgeConfig) -> Self {
        BridgeController {
            config,
            state: Arc::new(BridgeState::new()),
            tasks: Mutex::new(None),
        }
    }

    /// The shared state object, for normalization feeds and tests.
    pub fn shared_state(&self) -> Arc<BridgeState> {
        self.state.clone()
    }

    /// Start the discovery and sender loops under `subsys`.
    ///
    /// A no-op when the bridge is already running.
    pub fn start(&self, subsys: &SubsystemHandle) {
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.is_some() {
            log::debug!("Bridge already running, start ignored");
            return;
        }

        log::info!(
            "Starting bridge: discovery on port {}, telemetry to port {} every {:?}",
            self.config.discovery_port,
            self.config.data_port,
            self.config.send_interval
        );

        let listener = DiscoveryListener::new(
            self.state.clone(),
            self.config.discovery_port,
            self.config.receive_timeout,
        );
        let discovery = subsys.start(SubsystemBuilder::new("Discovery", move |s| listener.run(s)));

        let sender = TelemetrySender::new(
            self.state.clone(),
            self.config.data_port,
            self.config.send_interval,
            self.config.initial_delay,
        );
        let sender = subsys.start(SubsystemBuilder::new("Sender", move |s| sender.run(s)));

        *tasks = Some(BridgeTasks { discovery, sender });
    }

    /// Stop both loops and wait until their sockets are released.
    ///
    /// Idempotent; stopping also unblocks a discovery receive in progress.
    pub async fn stop(&self) {
        let tasks = self.tasks.lock().unwrap().take();
        let Some(tasks) = tasks else {
            log::debug!("Bridge not running, stop ignored");
            return;
        };

        log::info!("Stopping bridge");
        tasks.discovery.initiate_shutdown();
        tasks.sender.initiate_shutdown();
        if let Err(e) = tasks.discovery.join().await {
            log::warn!("Discovery loop ended with error: {:?}", e);
        }
        if let Err(e) = tasks.sender.join().await {
            log::warn!("Sender loop ended with error: {:?}", e);
        }
    }

    /// Whether the loops are currently running.
    pub fn is_running(&self) -> bool {
        self.tasks.lock().unwrap().is_some()
    }

    // Control surface passthroughs for the host application.

    pub fn set_endpoint(&self, addr: &str) -> Result<Ipv4Addr, ProtocolError> {
        self.state.set_endpoint(addr)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.state()
    }

    pub fn endpoint(&self) -> Option<Ipv4Addr> {
        self.state.endpoint()
    }

    pub fn packet_count(&self) -> u64 {
        self.state.packet_count()
    }

    pub fn register_observer(&self) -> mpsc::UnboundedReceiver<BridgeEvent> {
        self.state.register_observer()
    }

    pub fn push_record(&self, record: TelemetryRecord) {
        self.state.push_record(record);
    }

    pub fn current_record(&self) -> TelemetryRecord {
        self.state.current_record()
    }

    pub fn apply_fix(&self, fix: &AttachedFix) {
        self.state.apply_fix(fix);
    }

    pub fn reset_record(&self) {
        self.state.reset_record();
    }

    pub fn mark_arrived(&self) {
        self.state.mark_arrived();
    }

    pub fn speeds(&self) -> &SpeedMapper {
        self.state.speeds()
    }
}

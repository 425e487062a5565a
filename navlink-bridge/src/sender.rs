//! Periodic telemetry sender.
//!
//! Once started the loop fires on a fixed period after an initial delay,
//! independent of discovery. A tick with no known endpoint does nothing;
//! otherwise the current snapshot is serialized and sent as one datagram to
//! the device's data port.
//!
//! A failed send flips the connection state to Disconnected and drops the
//! socket so the next tick starts fresh. It deliberately does not flip back
//! on the next success - only discovery (or a manual endpoint set)
//! re-establishes Connected.

use std::net::{SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::bridge::BridgeState;
use crate::error::BridgeError;
use crate::network;

/// Fixed-interval telemetry send loop.
pub struct TelemetrySender {
    state: Arc<BridgeState>,
    data_port: u16,
    interval: Duration,
    initial_delay: Duration,
}

impl TelemetrySender {
    pub fn new(
        state: Arc<BridgeState>,
        data_port: u16,
        interval: Duration,
        initial_delay: Duration,
    ) -> Self {
        TelemetrySender {
            state,
            data_port,
            interval,
            initial_delay,
        }
    }

    /// Run until shutdown is requested.
    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), BridgeError> {
        let mut ticker = interval_at(Instant::now() + self.initial_delay, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Created lazily on the first tick that has somewhere to send, and
        // recreated after a failure drops it.
        let mut socket: Option<UdpSocket> = None;

        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    log::debug!("Sender shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick(&mut socket).await;
                }
            }
        }

        Ok(())
    }

    async fn tick(&self, socket: &mut Option<UdpSocket>) {
        let Some(ip) = self.state.endpoint() else {
            // Nothing discovered or configured yet; not an error.
            return;
        };

        let payload = match self.state.current_record().encode() {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Telemetry record failed to encode: {}", e);
                return;
            }
        };

        if socket.is_none() {
            match network::create_send_socket() {
                Ok(created) => *socket = Some(created),
                Err(e) => {
                    log::warn!("Cannot create send socket: {}", e);
                    self.state.mark_disconnected();
                    return;
                }
            }
        }
        let Some(sock) = socket.as_ref() else {
            return;
        };

        let target = SocketAddr::V4(SocketAddrV4::new(ip, self.data_port));
        match sock.send_to(&payload, target).await {
            Ok(_) => {
                let count = self.state.record_packet_sent();
                log::trace!("Sent {} bytes to {} (packet {})", payload.len(), target, count);
            }
            Err(e) => {
                log::warn!("Telemetry send to {} failed: {}", target, e);
                *socket = None;
                self.state.mark_disconnected();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeEvent;
    use navlink_core::{AttachedFix, TelemetryRecord};
    use serde_json::Value;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};

    const TEST_DATA_PORT: u16 = 47806;

    fn fast_sender(state: Arc<BridgeState>, port: u16) -> TelemetrySender {
        TelemetrySender::new(
            state,
            port,
            Duration::from_millis(20),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn test_tick_without_endpoint_sends_nothing() {
        let state = Arc::new(BridgeState::new());

        let sender_state = state.clone();
        let result = Toplevel::new(move |s| async move {
            let receiver = tokio::net::UdpSocket::bind(("127.0.0.1", TEST_DATA_PORT))
                .await
                .unwrap();
            let sender = fast_sender(sender_state, TEST_DATA_PORT);
            s.start(SubsystemBuilder::new("Sender", move |h| sender.run(h)));

            // Several periods elapse; no endpoint, so nothing may arrive.
            let mut buf = [0u8; 2048];
            let received =
                tokio::time::timeout(Duration::from_millis(200), receiver.recv_from(&mut buf))
                    .await;
            assert!(received.is_err(), "datagram sent despite missing endpoint");

            s.request_shutdown();
        })
        .handle_shutdown_requests(Duration::from_secs(2))
        .await;
        assert!(result.is_ok());
        assert_eq!(state.packet_count(), 0);
    }

    #[tokio::test]
    async fn test_mapped_speed_reaches_the_wire() {
        let state = Arc::new(BridgeState::new());
        let mut events = state.register_observer();

        // Mapping 120 -> 110, then a fix reporting 120.
        state.speeds().set_mapping(120, 110);
        state.apply_fix(&AttachedFix {
            speed_limit: 120,
            road_name: "Main St".to_string(),
            ..Default::default()
        });
        // Normalization already put the displayed value on the record.
        assert_eq!(state.current_record().road_limit_speed, 110);

        let port = TEST_DATA_PORT + 1;
        state.adopt_endpoint(std::net::Ipv4Addr::LOCALHOST);
        // Drain the Connected transition so only send events remain.
        events.try_recv().unwrap();

        let sender_state = state.clone();
        let result = Toplevel::new(move |s| async move {
            let receiver = tokio::net::UdpSocket::bind(("127.0.0.1", port)).await.unwrap();
            let sender = fast_sender(sender_state.clone(), port);
            s.start(SubsystemBuilder::new("Sender", move |h| sender.run(h)));

            let mut buf = [0u8; 4096];
            let (len, _) =
                tokio::time::timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
                    .await
                    .expect("no datagram within deadline")
                    .unwrap();

            let value: Value = serde_json::from_slice(&buf[..len]).unwrap();
            assert_eq!(value["nRoadLimitSpeed"], 110);
            assert_eq!(value["szPosRoadName"], "Main St");

            // Full round-trip: the payload reproduces the pushed record.
            let decoded: TelemetryRecord = serde_json::from_slice(&buf[..len]).unwrap();
            assert_eq!(decoded, sender_state.current_record());

            s.request_shutdown();
        })
        .handle_shutdown_requests(Duration::from_secs(2))
        .await;
        assert!(result.is_ok());

        assert!(state.packet_count() >= 1);
        assert_eq!(
            events.try_recv().unwrap(),
            BridgeEvent::PacketSent { count: 1 }
        );
    }

    #[tokio::test]
    async fn test_state_survives_successful_sends_after_disconnect() {
        // DISCONNECTED heals only via discovery/manual set, not send success.
        let state = Arc::new(BridgeState::new());
        state.adopt_endpoint(std::net::Ipv4Addr::LOCALHOST);
        state.mark_disconnected();

        let port = TEST_DATA_PORT + 2;
        let sender_state = state.clone();
        let result = Toplevel::new(move |s| async move {
            let receiver = tokio::net::UdpSocket::bind(("127.0.0.1", port)).await.unwrap();
            let sender = fast_sender(sender_state, port);
            s.start(SubsystemBuilder::new("Sender", move |h| sender.run(h)));

            let mut buf = [0u8; 4096];
            tokio::time::timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
                .await
                .expect("no datagram within deadline")
                .unwrap();

            s.request_shutdown();
        })
        .handle_shutdown_requests(Duration::from_secs(2))
        .await;
        assert!(result.is_ok());

        assert!(state.packet_count() >= 1);
        assert_eq!(state.state(), navlink_core::ConnectionState::Disconnected);

        let mut events = state.register_observer();
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }
}

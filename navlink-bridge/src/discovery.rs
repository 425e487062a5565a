//! C3 display discovery.
//!
//! The display announces itself by broadcasting UDP datagrams on the
//! discovery port. Payload content does not matter - presence of any
//! datagram from a new source is enough, only the sender's address is used.
//!
//! The listener keeps running after a device is found so the endpoint
//! follows the display across DHCP renews or network moves.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_graceful_shutdown::SubsystemHandle;

use crate::bridge::BridgeState;
use crate::error::BridgeError;
use crate::network;

/// Background loop adopting the source address of inbound broadcasts.
pub struct DiscoveryListener {
    state: Arc<BridgeState>,
    port: u16,
    receive_timeout: Duration,
}

impl DiscoveryListener {
    pub fn new(state: Arc<BridgeState>, port: u16, receive_timeout: Duration) -> Self {
        DiscoveryListener {
            state,
            port,
            receive_timeout,
        }
    }

    /// Run until shutdown is requested.
    ///
    /// A bind failure is logged and ends the loop without taking the rest of
    /// the bridge down; the worst outcome is that only manual endpoint
    /// configuration works.
    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), BridgeError> {
        let socket = match network::bind_discovery(self.port) {
            Ok(socket) => socket,
            Err(e) => {
                log::error!("Cannot bind discovery port {}: {}", self.port, e);
                return Ok(());
            }
        };
        log::info!("Listening for C3 announcements on port {}", self.port);

        let mut buf = [0u8; 1024];
        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    log::debug!("Discovery shutdown requested");
                    break;
                }
                result = tokio::time::timeout(self.receive_timeout, socket.recv_from(&mut buf)) => {
                    match result {
                        Ok(Ok((len, peer))) => {
                            log::trace!("Announcement from {} ({} bytes)", peer, len);
                            if let IpAddr::V4(ip) = peer.ip() {
                                if self.state.endpoint() != Some(ip) {
                                    log::info!("C3 display discovered at {}", ip);
                                    self.state.adopt_endpoint(ip);
                                }
                            }
                        }
                        Ok(Err(e)) => {
                            log::warn!("Discovery receive error: {}", e);
                        }
                        Err(_) => {
                            // Timeout with a known endpoint is not an error;
                            // with none we are (still) searching.
                            if self.state.endpoint().is_none() {
                                self.state.reassert_searching();
                            }
                        }
                    }
                }
            }
        }

        // Socket drops here, releasing the port before the subsystem reports
        // itself finished.
        Ok(())
    }
}

//! UDP socket construction.
//!
//! Sockets are built with socket2 so the options are set before binding and
//! then handed to tokio. Nothing here is C3-specific; the ports come from
//! the caller.

use socket2::{Domain, Protocol, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

// this will be common for all our sockets
fn new_socket() -> io::Result<socket2::Socket> {
    let socket = socket2::Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    // tokio requires non-blocking; reuse lets the bridge restart while the
    // old socket is still in TIME_WAIT and share the port with diagnostics
    socket.set_nonblocking(true)?;
    socket.set_reuse_address(true)?;

    Ok(socket)
}

/// Bind the discovery receive socket on the wildcard address.
///
/// The C3 announces itself by broadcasting on this port; SO_BROADCAST is set
/// so the same socket could answer on the broadcast address if ever needed.
pub fn bind_discovery(port: u16) -> io::Result<UdpSocket> {
    let socket = new_socket()?;
    socket.set_broadcast(true)?;

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    socket.bind(&socket2::SockAddr::from(addr))?;
    log::trace!("Binding discovery socket to {}", addr);

    UdpSocket::from_std(socket.into())
}

/// Create an unbound (ephemeral-port) socket for sending telemetry.
pub fn create_send_socket() -> io::Result<UdpSocket> {
    let socket = new_socket()?;

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
    socket.bind(&socket2::SockAddr::from(addr))?;

    UdpSocket::from_std(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discovery_port_rebinds_immediately() {
        let first = bind_discovery(47901).unwrap();
        drop(first);
        // Reuse-address lets a restarted bridge claim the port right away.
        let second = bind_discovery(47901);
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_send_socket_has_ephemeral_port() {
        let socket = create_send_socket().unwrap();
        assert_ne!(socket.local_addr().unwrap().port(), 0);
    }
}

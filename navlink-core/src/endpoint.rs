//! Manual endpoint validation.

use std::net::Ipv4Addr;

use crate::error::ProtocolError;

/// Parse a manually configured endpoint string into an IPv4 address.
///
/// Empty and malformed input is rejected at this boundary with no state
/// change anywhere; the telemetry data port is configured separately, so only
/// a bare address is accepted here.
pub fn parse_endpoint(addr: &str) -> Result<Ipv4Addr, ProtocolError> {
    let trimmed = addr.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::InvalidEndpoint(addr.to_string()));
    }
    trimmed
        .parse::<Ipv4Addr>()
        .map_err(|_| ProtocolError::InvalidEndpoint(addr.to_string()))
}

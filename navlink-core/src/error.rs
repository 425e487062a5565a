//! Error types for the protocol layer

use thiserror::Error;

/// Errors raised at the protocol/configuration boundary.
///
/// Normalization itself never fails: missing or out-of-range upstream fields
/// are defaulted to sentinel values. These variants cover the two places a
/// caller can actually hand us something unusable.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A manually configured endpoint string was empty or not an IPv4 address.
    #[error("Invalid endpoint address: '{0}'")]
    InvalidEndpoint(String),

    /// Serializing a telemetry record to the wire payload failed.
    #[error("Wire encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

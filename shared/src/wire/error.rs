use cavesync_serde::SerdeErr;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a datagram
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// The datagram could not be decoded
    #[error("Malformed datagram: {0}")]
    Serde(#[from] SerdeErr),

    /// The payload does not fit in one datagram
    #[error("Payload of {length} bytes exceeds the maximum of {max} bytes per datagram")]
    PayloadTooLarge { length: usize, max: usize },

    /// The declared payload length disagrees with the datagram size
    #[error("Datagram declares a {declared} byte payload but carries {actual} bytes")]
    LengthMismatch { declared: usize, actual: usize },
}

use thiserror::Error;

/// Errors that can occur while reading a value back out of a byte buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The buffer ended before the value was complete
    #[error("Unexpected end of buffer: needed {needed} more bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A boolean was encoded as something other than 0 or 1
    #[error("Invalid boolean byte {byte:#04x}, expected 0x00 or 0x01")]
    InvalidBool { byte: u8 },

    /// Bytes were left over after the value was complete
    #[error("{remaining} unexpected trailing bytes after value")]
    TrailingBytes { remaining: usize },

    /// A tagged value carried an unknown tag
    #[error("Invalid tag {tag} for {type_name}")]
    InvalidTag { tag: u8, type_name: &'static str },
}

//! Codec error types

use thiserror::Error;

/// Errors that can occur during encoding
///
/// Encoding is infallible for valid inputs except for destination capacity:
/// the encoder aborts a partial fill rather than truncating silently. The
/// input buffers are never modified on any path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Destination buffer cannot hold the encoded stream; retry with a
    /// buffer sized by the matching `*_bound` function
    #[error("destination buffer too small for encoded stream")]
    DestinationTooSmall,
}

/// Errors that can occur during decoding
///
/// Decoding never partially succeeds: on any error the destination contents
/// are unspecified but no byte outside the caller-declared destination has
/// been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Stream tag byte does not name a format this decoder understands
    #[error("unrecognized stream format tag 0x{0:02X}")]
    InvalidFormatVersion(u8),
    /// Truncated stream, reserved operation code, or a reconstructed index
    /// outside the declared vertex range
    #[error("corrupt or truncated stream")]
    CorruptStream,
    /// Caller-declared counts disagree with the stream header
    #[error("stream header does not match declared buffer shape")]
    ShapeMismatch,
}

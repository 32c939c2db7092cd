//! Error types for frame encoding/decoding.

use std::fmt;

use bitbuf::BitError;

/// Result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors that can occur while decoding a per-entity frame.
///
/// Every variant is fatal to the frame only: the caller discards the frame,
/// logs, and the session continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The frame ran out of bits mid-decode.
    Bit(BitError),

    /// The dirty mask flags a field this state layout does not know.
    ProtocolMismatch {
        /// Raw mask read off the wire.
        flags: u32,
        /// Number of fields this side knows.
        field_count: u32,
    },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(err) => write!(f, "frame bit error: {err}"),
            Self::ProtocolMismatch { flags, field_count } => {
                write!(
                    f,
                    "dirty mask 0x{flags:08X} flags fields beyond the known {field_count}"
                )
            }
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(err) => Some(err),
            Self::ProtocolMismatch { .. } => None,
        }
    }
}

impl From<BitError> for FrameError {
    fn from(err: BitError) -> Self {
        Self::Bit(err)
    }
}

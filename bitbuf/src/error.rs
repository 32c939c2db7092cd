//! Error types for bit buffer operations.

use std::fmt;

/// Result type for bit buffer operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur while reading from a [`BitBuffer`](crate::BitBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitError {
    /// A pop or peek asked for more bits than the buffer holds.
    Underrun {
        /// Bits requested by the caller (after width clamping).
        requested: u32,
        /// Bits currently stored.
        available: usize,
    },

    /// An imported byte slab did not end with the padding marker bit.
    BadPadding,
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underrun {
                requested,
                available,
            } => {
                write!(
                    f,
                    "bit underrun: requested {requested} bits, {available} available"
                )
            }
            Self::BadPadding => write!(f, "imported bytes carry no padding marker"),
        }
    }
}

impl std::error::Error for BitError {}

//! Error types for encoder construction.

use std::fmt;

/// Result type for encoder construction.
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Errors that can occur while constructing an encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncoderError {
    /// Integer range with `min` above `max`.
    InvalidIntRange { min: i32, max: i32 },

    /// Float range with `min` above `max` or a non-finite bound.
    InvalidFloatRange { min: f32, max: f32 },

    /// Float step that is zero, negative, or non-finite.
    InvalidFloatStep { step: f32 },

    /// Float range requiring more than 32 bits at the given step.
    FloatRangeTooWide { min: f32, max: f32, step: f32 },

    /// Flag mask wider than 32 bits.
    TooManyFlags { count: u32 },
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIntRange { min, max } => {
                write!(f, "invalid integer range: min {min} > max {max}")
            }
            Self::InvalidFloatRange { min, max } => {
                write!(f, "invalid float range: [{min}, {max}]")
            }
            Self::InvalidFloatStep { step } => {
                write!(f, "invalid float step: {step}")
            }
            Self::FloatRangeTooWide { min, max, step } => {
                write!(
                    f,
                    "float range [{min}, {max}] at step {step} exceeds 32 bits"
                )
            }
            Self::TooManyFlags { count } => {
                write!(f, "flag mask of {count} bits exceeds 32")
            }
        }
    }
}

impl std::error::Error for EncoderError {}

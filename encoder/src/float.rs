//! Quantized float encoder.

use bitbuf::Encoder;
use tracing::warn;

use crate::bits_for;
use crate::error::{EncoderError, EncoderResult};

/// Quantized float encoder over `[min, max]` with a fixed step.
///
/// Values pack as a rounded step count from `min`. Equality is "packs to
/// the same bits": two floats within half a step of each other compare
/// equal, which is what dirty-flag comparison wants for coordinates and
/// angles. Out-of-range input clamps to the nearest bound with a warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatEncoder {
    min: f32,
    max: f32,
    step: f32,
    max_steps: u32,
    bits: u32,
}

impl FloatEncoder {
    /// Creates an encoder for `[min, max]` quantized to `step`.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::InvalidFloatRange`] for inverted or
    /// non-finite bounds, [`EncoderError::InvalidFloatStep`] for a
    /// non-positive or non-finite step, and
    /// [`EncoderError::FloatRangeTooWide`] when the quantized range does not
    /// fit in 32 bits.
    pub fn new(min: f32, max: f32, step: f32) -> EncoderResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(EncoderError::InvalidFloatRange { min, max });
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(EncoderError::InvalidFloatStep { step });
        }
        let steps = ((f64::from(max) - f64::from(min)) / f64::from(step)).round();
        if steps > f64::from(u32::MAX) {
            return Err(EncoderError::FloatRangeTooWide { min, max, step });
        }
        let max_steps = steps as u32;
        Ok(Self {
            min,
            max,
            step,
            max_steps,
            bits: bits_for(max_steps),
        })
    }

    /// Lower bound of the encodable range.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound of the encodable range.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Quantization step.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }
}

impl Encoder for FloatEncoder {
    type Value = f32;

    fn required_bits(&self) -> u32 {
        self.bits
    }

    fn pack(&self, value: &f32) -> u32 {
        let clamped = value.clamp(self.min, self.max);
        if clamped != *value {
            warn!(
                value,
                min = self.min,
                max = self.max,
                "float outside encoder range, clamping"
            );
        }
        let steps = ((f64::from(clamped) - f64::from(self.min)) / f64::from(self.step)).round();
        (steps as u32).min(self.max_steps)
    }

    fn unpack(&self, bits: u32) -> f32 {
        (f64::from(self.min) + f64::from(bits) * f64::from(self.step)) as f32
    }

    fn equal(&self, a: &f32, b: &f32) -> bool {
        self.pack(a) == self.pack(b)
    }
}

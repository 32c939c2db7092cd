//! Encoder families for the statesync codec.
//!
//! Implementations of the [`bitbuf::Encoder`] contract: booleans, bounded
//! integers, quantized floats, enumerated tags, and dirty-flag masks. A
//! state's fields each declare one of these; dirty comparison, delta
//! encoding, and decoding all go through the declared encoder.
//!
//! # Design Principles
//!
//! - **Validated construction** - Invalid ranges are rejected up front, not
//!   discovered on the wire.
//! - **Total packing** - `pack` never fails; out-of-range input clamps and
//!   warns.
//! - **Declared equivalence** - Quantized encoders compare values by their
//!   packed bits, so sub-quantum jitter never dirties a field.

mod error;
mod flags;
mod float;
mod int;

pub use error::{EncoderError, EncoderResult};
pub use flags::FlagsEncoder;
pub use float::FloatEncoder;
pub use int::{BoolEncoder, IntEncoder, TagEncoder};

/// Number of bits needed to represent values in `0..=range`.
#[must_use]
pub const fn bits_for(range: u32) -> u32 {
    32 - range.leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitbuf::Encoder;

    #[test]
    fn bits_for_boundaries() {
        assert_eq!(bits_for(0), 0);
        assert_eq!(bits_for(1), 1);
        assert_eq!(bits_for(2), 2);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(4), 3);
        assert_eq!(bits_for(255), 8);
        assert_eq!(bits_for(256), 9);
        assert_eq!(bits_for(u32::MAX), 32);
    }

    #[test]
    fn public_api_exports() {
        let _ = BoolEncoder;
        let _ = IntEncoder::new(0, 10).unwrap();
        let _ = FloatEncoder::new(0.0, 1.0, 0.1).unwrap();
        let _ = TagEncoder::new(3);
        let _ = FlagsEncoder::new(8).unwrap();
        let _: EncoderResult<()> = Ok(());
    }

    #[test]
    fn packed_values_respect_required_bits() {
        let enc = IntEncoder::new(-7, 8).unwrap();
        let packed = enc.pack(&8);
        assert_eq!(packed >> enc.required_bits(), 0);
    }
}

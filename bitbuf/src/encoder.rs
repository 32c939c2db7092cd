//! Encoder contract and typed buffer operations.

use crate::buffer::BitBuffer;
use crate::error::BitResult;

/// Maps a typed value to and from a fixed-width bit pattern.
///
/// `pack` is deterministic and only the low [`required_bits`](Self::required_bits)
/// of its result may be nonzero. `unpack` inverts `pack` modulo the encoder's
/// declared equivalence, and [`equal`](Self::equal) is that equivalence:
/// exact for integral encoders, "packs to the same bits" for quantized ones.
/// Dirty-flag computation compares fields through `equal`, never through raw
/// value equality.
pub trait Encoder {
    /// The value type carried by this encoder.
    type Value;

    /// Number of bits a packed value occupies. Constant per encoder instance.
    fn required_bits(&self) -> u32;

    /// Packs a value into its bit pattern.
    fn pack(&self, value: &Self::Value) -> u32;

    /// Unpacks a bit pattern into a value.
    fn unpack(&self, bits: u32) -> Self::Value;

    /// Semantic equality under this encoder.
    fn equal(&self, a: &Self::Value, b: &Self::Value) -> bool;
}

impl BitBuffer {
    /// Pushes a value through an encoder.
    pub fn push_with<E: Encoder>(&mut self, encoder: &E, value: &E::Value) {
        self.push(encoder.pack(value), encoder.required_bits());
    }

    /// Pops a value through an encoder.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underrun`](crate::BitError::Underrun) when fewer
    /// than `encoder.required_bits()` bits remain.
    pub fn pop_with<E: Encoder>(&mut self, encoder: &E) -> BitResult<E::Value> {
        Ok(encoder.unpack(self.pop(encoder.required_bits())?))
    }

    /// Peeks a value through an encoder without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underrun`](crate::BitError::Underrun) when fewer
    /// than `encoder.required_bits()` bits remain.
    pub fn peek_with<E: Encoder>(&self, encoder: &E) -> BitResult<E::Value> {
        Ok(encoder.unpack(self.peek(encoder.required_bits())?))
    }

    /// Pushes a value only when `flags` contains every bit of `flag`.
    pub fn push_if<E: Encoder>(&mut self, flags: u32, flag: u32, encoder: &E, value: &E::Value) {
        if flags & flag == flag {
            self.push_with(encoder, value);
        }
    }

    /// Pops a value when `flags` contains every bit of `flag`, otherwise
    /// returns a clone of `basis`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Underrun`](crate::BitError::Underrun) when the
    /// flag is set but too few bits remain.
    pub fn pop_if<E: Encoder>(
        &mut self,
        flags: u32,
        flag: u32,
        encoder: &E,
        basis: &E::Value,
    ) -> BitResult<E::Value>
    where
        E::Value: Clone,
    {
        if flags & flag == flag {
            self.pop_with(encoder)
        } else {
            Ok(basis.clone())
        }
    }
}

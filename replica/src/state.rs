//! The replicated state contract.

use bitbuf::BitBuffer;
use encoder::FlagsEncoder;

use crate::error::{FrameError, FrameResult};
use crate::flags::DirtyFlags;

/// A per-entity mutable value object that can be delta-compressed.
///
/// A state is a fixed set of fields, each with a declared encoder, in a
/// fixed canonical order. All comparison runs through the encoders'
/// equivalence: quantized fields are equal when they pack to the same bits.
///
/// Encoding is LIFO: `encode` pushes flagged field values in reverse
/// canonical order and the dirty mask last, so `decode` pops the mask first
/// and then the flagged fields in canonical order. Implementations use
/// [`write_mask`]/[`read_mask`] and the conditional buffer operations; the
/// invariant `decode(encode(s, flags), basis)` must reproduce `s` on flagged
/// fields and `basis` elsewhere.
pub trait State: Clone + Default + std::fmt::Debug {
    /// Number of fields in the dirty mask.
    const FIELD_COUNT: u32;

    /// Fields sent only to the controlling peer. Empty by default.
    const PRIVATE_FLAGS: DirtyFlags = DirtyFlags::EMPTY;

    /// Sets every field to its zero value.
    fn reset(&mut self);

    /// Field-wise assignment from another state.
    fn copy_from(&mut self, other: &Self);

    /// Mask of fields that differ from `basis` under encoder equivalence.
    fn dirty_flags(&self, basis: &Self) -> DirtyFlags;

    /// Pushes the flagged fields (reverse canonical order) and the mask.
    fn encode(&self, buf: &mut BitBuffer, flags: DirtyFlags);

    /// Pops the mask and the flagged fields; unset fields take the basis
    /// value.
    ///
    /// # Errors
    ///
    /// [`FrameError::Bit`] on underrun; [`FrameError::ProtocolMismatch`]
    /// when the mask flags unknown fields.
    fn decode(buf: &mut BitBuffer, basis: &Self) -> FrameResult<(Self, DirtyFlags)>;

    /// Merges the flagged fields of `partial` into this state.
    fn apply_delta(&mut self, partial: &Self, flags: DirtyFlags);

    /// Overwrites this state with a blend of `a` and `b` at parameter `t`.
    ///
    /// Numeric fields blend linearly; discrete fields snap to `a` when
    /// `t < 0.5`, else `b`. `t` is not clamped: values outside `[0, 1]`
    /// extrapolate.
    fn apply_smoothed(&mut self, a: &Self, b: &Self, t: f32);

    /// Mask covering every field of this layout.
    #[must_use]
    fn all_flags() -> DirtyFlags {
        DirtyFlags::all(Self::FIELD_COUNT)
    }

    /// Encodes every field (a full snapshot is a delta with all flags set).
    fn encode_full(&self, buf: &mut BitBuffer) {
        self.encode(buf, Self::all_flags());
    }

    /// Decodes a full snapshot against the zero state.
    ///
    /// # Errors
    ///
    /// As [`decode`](Self::decode).
    fn decode_full(buf: &mut BitBuffer) -> FrameResult<Self> {
        let (state, _) = Self::decode(buf, &Self::default())?;
        Ok(state)
    }
}

/// Pushes a dirty mask through the given mask encoder.
pub fn write_mask(buf: &mut BitBuffer, encoder: &FlagsEncoder, flags: DirtyFlags) {
    buf.push_with(encoder, &flags.bits());
}

/// Pops a dirty mask and rejects bits beyond `field_count`.
///
/// The mask encoder may be wider than `field_count` when the protocol sizes
/// masks to its widest state layout; any flagged field this side does not
/// know is a protocol mismatch.
///
/// # Errors
///
/// [`FrameError::Bit`] on underrun; [`FrameError::ProtocolMismatch`] on
/// unknown flag bits.
pub fn read_mask(
    buf: &mut BitBuffer,
    encoder: &FlagsEncoder,
    field_count: u32,
) -> FrameResult<DirtyFlags> {
    let raw = buf.pop_with(encoder)?;
    let known = DirtyFlags::all(field_count);
    if raw & !known.bits() != 0 {
        return Err(FrameError::ProtocolMismatch {
            flags: raw,
            field_count,
        });
    }
    Ok(DirtyFlags::from_bits(raw))
}

/// Linear blend of two floats at parameter `t` (unclamped).
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Discrete blend: `a` below the midpoint, `b` from it on.
#[must_use]
pub fn snap<T: Clone>(a: &T, b: &T, t: f32) -> T {
    if t < 0.5 {
        a.clone()
    } else {
        b.clone()
    }
}

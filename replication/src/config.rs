//! Replication configuration.

use std::num::{NonZeroU32, NonZeroUsize};

const fn nonzero_usize(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(value) => value,
        None => panic!("value must be nonzero"),
    }
}

const fn nonzero_u32(value: u32) -> NonZeroU32 {
    match NonZeroU32::new(value) {
        Some(value) => value,
        None => panic!("value must be nonzero"),
    }
}

/// Tuning knobs shared by the server and client sides of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncConfig {
    /// Slots in the client incoming buffer and the server outgoing queue.
    pub dejitter_buffer_length: NonZeroUsize,
    /// Tick stride between sent snapshots; the dejitter buffer's divisor.
    pub network_send_rate: NonZeroU32,
    /// Update gap (in ticks) before a remote entity freezes; 0 disables.
    pub ticks_before_freeze: u32,
    /// Emit frames even when the dirty mask is empty.
    pub force_updates: bool,
    /// Tick duration used for smoothing and prediction parameters.
    pub seconds_per_tick: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dejitter_buffer_length: nonzero_usize(60),
            network_send_rate: nonzero_u32(3),
            ticks_before_freeze: 60,
            force_updates: true,
            seconds_per_tick: 1.0 / 60.0,
        }
    }
}

impl SyncConfig {
    /// Creates a configuration with small values suitable for tests.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            dejitter_buffer_length: nonzero_usize(4),
            network_send_rate: nonzero_u32(3),
            ticks_before_freeze: 10,
            force_updates: true,
            seconds_per_tick: 1.0 / 10.0,
        }
    }
}

//! Tick-synchronized replication and reconstruction for statesync.
//!
//! The server side of an entity keeps an outgoing history of
//! [`replica::StateRecord`]s and produces [`replica::StateDelta`] frames
//! against any acknowledged basis. The client side absorbs frames through a
//! [`DejitterBuffer`], rebuilds a smooth view of remote entities with a
//! [`SmoothingBuffer`], re-predicts owned entities with a
//! [`PredictionBuffer`], and freezes entities whose updates stall.
//!
//! # Design Principles
//!
//! - **Single-threaded ticks** - One world tick drives each entity to
//!   completion; there is no locking and no async in the core.
//! - **Frames never propagate failure** - Stale, malformed, or premature
//!   frames are dropped at the boundary; the session continues.
//! - **Collaborators stay outside** - The world loop, transport, input, and
//!   entity registry plug in through the [`Logic`], [`Controller`], and
//!   [`Factory`] traits.

mod client;
mod config;
mod dejitter;
mod lifecycle;
mod prediction;
mod queue;
mod server;
mod smoothing;
mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::ClientEntity;
pub use config::SyncConfig;
pub use dejitter::{DejitterBuffer, LatestFrom};
pub use prediction::PredictionBuffer;
pub use queue::RecordQueue;
pub use server::{Scope, ServerEntity};
pub use smoothing::SmoothingBuffer;
pub use traits::{Controller, Factory, FactoryKind, Logic};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let config = SyncConfig::default();
        let _ = DejitterBuffer::<replica::StateDelta<test_support::TestState>>::new(
            config.dejitter_buffer_length,
            config.network_send_rate,
        );
        let _ = Scope::Owner;
        let _ = FactoryKind::new(0);
    }
}

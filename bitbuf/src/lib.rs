//! LIFO bit packing primitives for the statesync codec.
//!
//! This crate provides [`BitBuffer`], a random-access bit store used as a
//! stack, and the [`Encoder`] contract that maps typed values onto fixed
//! bit widths. Callers push at the tail and pop from the tail, so frame
//! headers written last are read first.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - Every read is bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about entities,
//!   states, or ticks.
//! - **Explicit errors** - Failed reads return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitbuf::BitBuffer;
//!
//! let mut buf = BitBuffer::new();
//! buf.push(42, 7);
//! buf.push(1, 1);
//!
//! assert_eq!(buf.pop(1).unwrap(), 1);
//! assert_eq!(buf.pop(7).unwrap(), 42);
//! ```

mod buffer;
mod encoder;
mod error;

pub use buffer::{BitBuffer, MAX_WIDTH};
pub use encoder::Encoder;
pub use error::{BitError, BitResult};

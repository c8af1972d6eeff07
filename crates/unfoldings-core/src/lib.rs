//! Unfoldings Core - buffers and numeric primitives for the render pipeline
//!
//! This crate holds the leaf building blocks shared by every unfolding engine.
//! Nothing here knows about modes or parameters; it only provides the
//! storage, math and deterministic state machines the engines are built from.
//!
//! # Core Abstractions
//!
//! - [`SampleBuffer`] - Fixed channel-count (mono or stereo), fixed-length sample storage
//! - [`SeedRandom`] - 48-bit linear congruential generator; the single source of
//!   randomness for every engine, reproducible per seed
//! - [`Lfsr32`] / [`Xorshift32`] - Bit-level state machines for gating and symbol picking
//! - [`TapDelay`] - Integer-tap feedback history for the delay networks
//! - [`OnePole`] - One-pole smoothing lowpass
//!
//! ## Utilities
//!
//! - Math functions: [`soft_clip`], [`sanitize_soft_clip`], [`lerp`], [`raised_cosine`],
//!   [`equal_power_pan`], [`princ_arg`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! unfoldings-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use unfoldings_core::{SampleBuffer, SeedRandom, soft_clip};
//!
//! let mut rng = SeedRandom::new(1101);
//! let mut buffer = SampleBuffer::stereo(64);
//! for i in 0..buffer.len() {
//!     let s = soft_clip(rng.next_float() * 2.0 - 1.0);
//!     buffer.set_sample(0, i, s);
//!     buffer.set_sample(1, i, -s);
//! }
//! assert!(buffer.peak() < 1.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod bits;
pub mod buffer;
pub mod delay;
pub mod math;
pub mod one_pole;
pub mod rng;

pub use bits::{Lfsr32, Xorshift32, popcount};
pub use buffer::{MAX_CHANNELS, SampleBuffer};
pub use delay::TapDelay;
pub use math::{
    TWO_PI, equal_power_pan, flush_denormal, lerp, limit, princ_arg, raised_cosine,
    sanitize_soft_clip, soft_clip,
};
pub use one_pole::OnePole;
pub use rng::SeedRandom;

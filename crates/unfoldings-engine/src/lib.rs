//! Unfoldings Engine - offline microsound rendering
//!
//! Expands a short, high-rate stochastic micro-burst into several seconds of
//! stereo audio through one of eight unfolding algorithms, then applies the
//! shared post stage.
//!
//! # Pipeline
//!
//! ```text
//! RenderParameters ─► micro_burst ─► modes::unfold ─► sanitize ─► bloom ─► sanitize ─► normalize
//!                                                                                         │
//!                                               Playback ◄── RenderSlot ◄── publish ◄─────┘
//! ```
//!
//! - [`micro_burst`] - stochastic transient events at 192-1536 kHz
//! - [`modes`] - Granular, Spectral, Hybrid, Xeno, Morphogen, Fennesz, Noto, Ikeda
//! - [`post`] - Bloom feedback network, sanitizer, peak normalizer
//! - [`render`] - [`Renderer`] and [`CancelToken`]
//! - [`publish`] - [`RenderSlot`] hand-off and the [`Playback`] reader
//! - [`worker`] - [`RenderWorker`], a background render thread
//!
//! Every render is deterministic: the same [`RenderParameters`] at the same
//! host rate produce the same samples.
//!
//! # Example
//!
//! ```rust,no_run
//! use unfoldings_engine::{Mode, RenderParameters, Renderer};
//!
//! let renderer = Renderer::new(48_000.0);
//! let params = RenderParameters {
//!     mode: Mode::Spectral,
//!     seed: 1101,
//!     ..RenderParameters::default()
//! };
//! let out = renderer.render(&params);
//! assert_eq!(out.num_channels(), 2);
//! ```

pub mod error;
pub mod fft;
pub mod micro_burst;
pub mod modes;
pub mod params;
pub mod post;
pub mod publish;
pub mod render;
pub mod worker;

pub use error::{RenderError, Result};
pub use micro_burst::render_micro_burst;
pub use modes::{UnfoldContext, unfold};
pub use params::{BeautyScene, MicroRate, Mode, RenderParameters, nominal_len, ranges};
pub use post::{DEFAULT_PEAK_TARGET, apply_bloom, bloom_amount, normalize, sanitize};
pub use publish::{Playback, RenderSlot};
pub use render::{CancelToken, Renderer};
pub use worker::{RenderEvent, RenderJob, RenderWorker};

pub use unfoldings_core::SampleBuffer;

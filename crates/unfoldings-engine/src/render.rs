//! The render orchestrator.
//!
//! ```text
//! micro-burst -> unfold(mode) -> sanitize -> bloom -> sanitize -> normalize -> publish
//! ```
//!
//! A render is bulk, single-threaded and deterministic for a given parameter
//! set. [`Renderer::render_cancellable`] checks a [`CancelToken`] between
//! stages; the stages themselves run to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use unfoldings_core::SampleBuffer;

use crate::error::{RenderError, Result};
use crate::micro_burst::render_micro_burst;
use crate::modes::{UnfoldContext, offset_seed, unfold};
use crate::params::RenderParameters;
use crate::post::{
    BLOOM_SEED_OFFSET, DEFAULT_PEAK_TARGET, apply_bloom, bloom_amount, normalize, sanitize,
};
use crate::publish::RenderSlot;

/// Shared cancellation flag for one render.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect at the next stage boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(RenderError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Runs the pipeline at a fixed host sample rate and publishes results.
#[derive(Debug, Clone)]
pub struct Renderer {
    host_rate: f64,
    slot: RenderSlot,
}

impl Renderer {
    /// Renderer with its own empty [`RenderSlot`].
    pub fn new(host_rate: f64) -> Self {
        Self::with_slot(host_rate, RenderSlot::new())
    }

    /// Renderer publishing into an existing slot.
    pub fn with_slot(host_rate: f64, slot: RenderSlot) -> Self {
        Self { host_rate, slot }
    }

    /// Output sample rate in Hz.
    pub fn host_rate(&self) -> f64 {
        self.host_rate
    }

    /// Slot results are published to.
    pub fn slot(&self) -> &RenderSlot {
        &self.slot
    }

    /// Renders `params` to a normalized stereo buffer.
    pub fn render(&self, params: &RenderParameters) -> SampleBuffer {
        // a fresh token is never cancelled, so the error arm is dead
        self.render_cancellable(params, &CancelToken::new())
            .unwrap_or_else(|_| SampleBuffer::stereo(params.out_samples(self.host_rate)))
    }

    /// Renders and publishes, returning the new generation.
    pub fn render_and_publish(&self, params: &RenderParameters) -> u64 {
        let buffer = self.render(params);
        self.slot.publish(buffer)
    }

    /// Renders, checking `cancel` before each stage.
    pub fn render_cancellable(
        &self,
        params: &RenderParameters,
        cancel: &CancelToken,
    ) -> Result<SampleBuffer> {
        let p = params.clamped();
        let span = tracing::info_span!("render", mode = %p.mode, seed = p.seed);
        let _enter = span.enter();
        let started = Instant::now();

        cancel.check()?;
        let stage = Instant::now();
        let micro_rate = p.micro_rate.hz();
        let micro = render_micro_burst(micro_rate, f64::from(p.burst_ms), p.density);
        tracing::debug!(
            samples = micro.len(),
            elapsed = ?stage.elapsed(),
            "micro-burst"
        );

        cancel.check()?;
        let stage = Instant::now();
        let ctx = UnfoldContext {
            micro: &micro,
            micro_rate,
            out_rate: self.host_rate,
            params: &p,
        };
        let mut out = unfold(&ctx);
        drop(micro);
        tracing::debug!(samples = out.len(), elapsed = ?stage.elapsed(), "unfold");

        cancel.check()?;
        let stage = Instant::now();
        sanitize(&mut out);
        let amount = bloom_amount(p.mode, p.spectral_chaos);
        apply_bloom(
            &mut out,
            self.host_rate,
            offset_seed(p.seed, BLOOM_SEED_OFFSET),
            amount,
        );
        sanitize(&mut out);
        tracing::debug!(amount, elapsed = ?stage.elapsed(), "bloom");

        cancel.check()?;
        let gain = normalize(&mut out, DEFAULT_PEAK_TARGET);
        if gain.is_none() {
            tracing::warn!("render is silent, normalization skipped");
        }

        tracing::info!(
            samples = out.len(),
            elapsed = ?started.elapsed(),
            "render finished"
        );
        Ok(out)
    }

    /// Cancellable render that publishes on success.
    pub fn render_and_publish_cancellable(
        &self,
        params: &RenderParameters,
        cancel: &CancelToken,
    ) -> Result<u64> {
        let buffer = self.render_cancellable(params, cancel)?;
        Ok(self.slot.publish(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MicroRate, Mode};

    fn quick(mode: Mode) -> RenderParameters {
        RenderParameters {
            mode,
            micro_rate: MicroRate::Hz192k,
            burst_ms: 6.0,
            density: 500,
            out_seconds: 1.0,
            ..RenderParameters::default()
        }
    }

    #[test]
    fn cancelled_before_start() {
        let renderer = Renderer::new(8_000.0);
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            renderer.render_cancellable(&quick(Mode::Granular), &token),
            Err(RenderError::Cancelled)
        );
        assert!(renderer.slot().latest().is_none());
    }

    #[test]
    fn token_clones_share_state() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn publish_resets_generation_counter() {
        let renderer = Renderer::new(8_000.0);
        assert_eq!(renderer.render_and_publish(&quick(Mode::Noto)), 1);
        assert_eq!(renderer.render_and_publish(&quick(Mode::Ikeda)), 2);
        assert_eq!(renderer.slot().latest().unwrap().len(), 8_000);
    }

    #[test]
    fn output_is_normalized() {
        let out = Renderer::new(8_000.0).render(&quick(Mode::Granular));
        assert!((out.peak() - DEFAULT_PEAK_TARGET).abs() < 1e-4);
    }
}

//! The eight unfolding engines and their dispatch.
//!
//! Every engine is a free function from a micro-burst to a stereo buffer at
//! the output rate. [`unfold`] selects one by [`Mode`]. The composing modes
//! (Hybrid, Xeno, Fennesz) call [`granular`] and [`spectral`] with derived
//! parameters and seeds, each holding its own copy of the results.
//!
//! | Mode | Engine | Seeds used |
//! |------|--------|-----------|
//! | Granular | [`granular::unfold_granular`] | `seed` |
//! | Spectral | [`spectral::unfold_spectral`] | `seed` |
//! | Hybrid | [`hybrid::unfold_hybrid`] | `seed`, `seed + 9176` |
//! | Xeno | [`xeno::unfold_xeno`] | `seed + 404`, `seed + 9091`, `seed + 31337` |
//! | Morphogen | [`morphogen::unfold_morphogen`] | `seed + 2026` |
//! | Fennesz | [`fennesz::unfold_fennesz`] | `seed + 1001`, `seed + 2002`, `seed + 3003` |
//! | Noto | [`noto::unfold_noto`] | `seed + 4004` |
//! | Ikeda | [`ikeda::unfold_ikeda`] | none (LFSR only) |

pub mod fennesz;
pub mod granular;
pub mod hybrid;
pub mod ikeda;
pub mod morphogen;
pub mod noto;
pub mod spectral;
pub mod xeno;

use unfoldings_core::SampleBuffer;

use crate::params::{Mode, RenderParameters};
use granular::GranularParams;
use morphogen::MorphogenParams;
use spectral::SpectralParams;

/// Everything an engine reads: the burst, both rates and the parameters.
#[derive(Debug, Clone, Copy)]
pub struct UnfoldContext<'a> {
    /// Micro-burst at `micro_rate`.
    pub micro: &'a SampleBuffer,
    /// Micro-burst sample rate in Hz.
    pub micro_rate: f64,
    /// Output (host) sample rate in Hz.
    pub out_rate: f64,
    /// Clamped parameter snapshot.
    pub params: &'a RenderParameters,
}

impl UnfoldContext<'_> {
    /// Output length in seconds.
    pub fn out_seconds(&self) -> f64 {
        f64::from(self.params.out_seconds)
    }

    /// Spectral inputs straight from the parameters.
    pub fn spectral_params(&self) -> SpectralParams {
        SpectralParams {
            micro_rate: self.micro_rate,
            out_rate: self.out_rate,
            out_seconds: self.out_seconds(),
            stretch: self.params.stretch,
            warp: self.params.warp,
            chaos: self.params.spectral_chaos,
            seed: self.params.seed,
        }
    }

    /// Granular inputs straight from the parameters.
    pub fn granular_params(&self) -> GranularParams {
        GranularParams {
            micro_rate: self.micro_rate,
            out_rate: self.out_rate,
            out_seconds: self.out_seconds(),
            grain_ms: self.params.grain_ms,
            overlap: self.params.overlap,
            seed: self.params.seed,
        }
    }

    /// Morphogen inputs straight from the parameters.
    pub fn morphogen_params(&self) -> MorphogenParams {
        MorphogenParams {
            out_rate: self.out_rate,
            out_seconds: self.out_seconds(),
            stretch: self.params.stretch,
            warp: self.params.warp,
            chaos: self.params.spectral_chaos,
            mix: self.params.hybrid_mix,
            seed: self.params.seed,
        }
    }
}

/// Runs the engine selected by `ctx.params.mode`.
pub fn unfold(ctx: &UnfoldContext<'_>) -> SampleBuffer {
    match ctx.params.mode {
        Mode::Granular => granular::unfold_granular(ctx.micro, &ctx.granular_params()),
        Mode::Spectral => spectral::unfold_spectral(ctx.micro, &ctx.spectral_params()),
        Mode::Hybrid => hybrid::unfold_hybrid(ctx),
        Mode::Xeno => xeno::unfold_xeno(ctx),
        Mode::Morphogen => morphogen::unfold_morphogen(ctx.micro, &ctx.morphogen_params()),
        Mode::Fennesz => fennesz::unfold_fennesz(ctx),
        Mode::Noto => noto::unfold_noto(ctx),
        Mode::Ikeda => ikeda::unfold_ikeda(ctx),
    }
}

/// Sample `i` of channel `ch`, or silence past the end.
#[inline]
pub(crate) fn sample_or_zero(buffer: &SampleBuffer, ch: usize, i: usize) -> f32 {
    buffer.channel_or_last(ch).get(i).copied().unwrap_or(0.0)
}

/// `seed + offset` with two's-complement wrap.
#[inline]
pub(crate) fn offset_seed(seed: i32, offset: i32) -> i32 {
    seed.wrapping_add(offset)
}

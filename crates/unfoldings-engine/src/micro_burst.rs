//! Micro-burst synthesis: the short stochastic seed every engine unfolds.
//!
//! A burst is `round(rate * ms / 1000)` stereo samples (minimum 16) at a
//! high internal rate holding `density` overlapping transient events. Each
//! event is one of four types:
//!
//! | Type | Signal |
//! |------|--------|
//! | Glide | sine with a linear frequency glide `f0 -> f1` |
//! | Fm | glide carrier, frequency-modulated by a fixed-rate sine |
//! | Partials | 2-6 harmonic partials, each detuned by a fresh draw per sample |
//! | NoiseBlend | glide sine crossfaded toward white noise |
//!
//! Every event is Hann-windowed, driven through `tanh(1.8 s)`, scaled by its
//! amplitude and mixed into the buffer with an equal-power pan. Events that
//! run past the end are truncated.
//!
//! The generator is seeded from `density` and the buffer length only, so the
//! burst is independent of the user seed.

use unfoldings_core::{SampleBuffer, SeedRandom, TWO_PI, equal_power_pan, lerp, raised_cosine};

/// Shortest burst, in samples.
pub const MIN_BURST_SAMPLES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Glide,
    Fm,
    Partials,
    NoiseBlend,
}

impl EventKind {
    fn from_draw(v: i32) -> Self {
        match v {
            0 => EventKind::Glide,
            1 => EventKind::Fm,
            2 => EventKind::Partials,
            _ => EventKind::NoiseBlend,
        }
    }
}

/// One transient, fully drawn before it is rendered.
#[derive(Debug, Clone)]
struct BurstEvent {
    start: usize,
    len: usize,
    amp: f32,
    pan: f32,
    kind: EventKind,
    f0: f32,
    f1: f32,
    fm_rate: f32,
    fm_depth: f32,
    noise_blend: f32,
    partials: u32,
}

/// Rate-derived limits shared by every event of one burst.
struct BurstLimits {
    num_samples: i32,
    max_len: i32,
    len_spread: i32,
    top_freq: f32,
    glide_span: f32,
    rate: f32,
}

impl BurstLimits {
    fn new(micro_rate: f64, num_samples: usize) -> Self {
        Self {
            num_samples: num_samples as i32,
            max_len: ((0.0012 * micro_rate) as i32).max(8),
            len_spread: (0.0038 * micro_rate) as i32 + 1,
            top_freq: (0.49 * micro_rate) as f32,
            glide_span: (0.47 * micro_rate) as f32,
            rate: micro_rate as f32,
        }
    }
}

impl BurstEvent {
    /// Draws all event properties in their fixed order.
    fn draw(rng: &mut SeedRandom, limits: &BurstLimits) -> Self {
        let start = rng.next_int_below(limits.num_samples);
        let len = (6 + rng.next_int_below(limits.len_spread)).clamp(6, limits.max_len);
        let amp = rng.next_float().powf(2.1) * 0.14;
        let pan = rng.next_float();
        let kind = EventKind::from_draw(rng.next_int_below(4));

        let f0 = 40.0 + rng.next_float().powf(2.0) * limits.glide_span;
        let f1 = (f0 * (0.35 + 3.7 * rng.next_float())).clamp(20.0, limits.top_freq);
        let fm_rate = 8.0 + 4200.0 * rng.next_float().powf(2.5);
        let fm_depth = 0.04 + 0.75 * rng.next_float();
        let noise_blend = rng.next_float().powf(1.4);
        let partials = 2 + rng.next_int_below(5) as u32;

        Self {
            start: start as usize,
            len: len as usize,
            amp,
            pan,
            kind,
            f0,
            f1,
            fm_rate,
            fm_depth,
            noise_blend,
            partials,
        }
    }

    /// Mixes the event into both channels. Partials and noise events keep
    /// drawing from `rng` per sample.
    fn render(&self, rng: &mut SeedRandom, limits: &BurstLimits, left: &mut [f32], right: &mut [f32]) {
        let (gain_l, gain_r) = equal_power_pan(self.pan);
        let rate = limits.rate;
        let denom = self.len.saturating_sub(1).max(1) as f32;

        for n in 0..self.len {
            let idx = self.start + n;
            if idx >= left.len() {
                break;
            }

            let t = n as f32 / denom;
            let win = raised_cosine(t);
            let freq = lerp(self.f0, self.f1, t);
            let at = idx as f32;

            let s = match self.kind {
                EventKind::Glide => (TWO_PI * freq * at / rate).sin(),
                EventKind::Fm => {
                    let modulator = (TWO_PI * self.fm_rate * at / rate).sin();
                    (TWO_PI * (freq * (1.0 + self.fm_depth * modulator)) * at / rate).sin()
                }
                EventKind::Partials => {
                    let mut sum = 0.0;
                    for p in 1..=self.partials {
                        let detune = 1.0 + rng.next_bipolar() * 0.04;
                        let pf = (freq * p as f32 * detune).clamp(30.0, limits.top_freq);
                        sum += (TWO_PI * pf * at / rate).sin() / p as f32;
                    }
                    sum * 0.8
                }
                EventKind::NoiseBlend => {
                    let base = (TWO_PI * freq * at / rate).sin();
                    let noise = rng.next_bipolar();
                    lerp(base, noise, self.noise_blend)
                }
            };

            let shaped = self.amp * win * (1.8 * s).tanh();
            left[idx] += shaped * gain_l;
            right[idx] += shaped * gain_r;
        }
    }
}

/// Burst length in samples for a rate and duration.
pub fn burst_len(micro_rate: f64, burst_ms: f64) -> usize {
    let n = (micro_rate * burst_ms * 0.001).round() as i64;
    (n.max(MIN_BURST_SAMPLES as i64)) as usize
}

/// Renders a stereo micro-burst.
///
/// # Arguments
/// * `micro_rate` - Internal sample rate in Hz
/// * `burst_ms` - Burst length in milliseconds
/// * `density` - Number of events; zero or negative yields silence
pub fn render_micro_burst(micro_rate: f64, burst_ms: f64, density: i32) -> SampleBuffer {
    let num_samples = burst_len(micro_rate, burst_ms);
    let mut buffer = SampleBuffer::stereo(num_samples);
    let mut rng = SeedRandom::new(i64::from(density) * 1_103_515_245 + num_samples as i64);
    let limits = BurstLimits::new(micro_rate, num_samples);

    if let Some((left, right)) = buffer.stereo_mut() {
        for _ in 0..density.max(0) {
            let event = BurstEvent::draw(&mut rng, &limits);
            event.render(&mut rng, &limits, left, right);
        }
    }

    tracing::trace!(samples = num_samples, density, "micro-burst rendered");
    buffer
}

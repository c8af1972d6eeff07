//! Seeded pseudo-random generator.
//!
//! [`SeedRandom`] is a 48-bit linear congruential generator:
//!
//! ```text
//! state = (state * 0x5DEECE66D + 11) mod 2^48
//! next_int() = (state >> 16) as i32
//! ```
//!
//! Every random draw in the render pipeline comes from an instance of this
//! generator seeded from the user seed plus a fixed per-stage offset, so a
//! parameter set always renders the same audio. The sequence of calls an
//! engine makes is part of its output: reordering two draws changes the sound.

const MULTIPLIER: u64 = 0x5_DEEC_E66D;
const INCREMENT: u64 = 11;
const MASK: u64 = (1 << 48) - 1;

/// Deterministic 48-bit LCG.
///
/// # Example
///
/// ```rust
/// use unfoldings_core::SeedRandom;
///
/// let mut a = SeedRandom::new(42);
/// let mut b = SeedRandom::new(42);
/// assert_eq!(a.next_int(), b.next_int());
///
/// let x = a.next_float();
/// assert!((0.0..1.0).contains(&x));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRandom {
    seed: i64,
}

impl SeedRandom {
    /// Creates a generator with the given seed.
    pub fn new(seed: i64) -> Self {
        Self { seed }
    }

    /// Replaces the current state.
    pub fn set_seed(&mut self, seed: i64) {
        self.seed = seed;
    }

    /// Current internal state.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Next raw 32-bit value.
    #[inline]
    pub fn next_int(&mut self) -> i32 {
        let next = (self.seed as u64)
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        self.seed = next as i64;
        (next >> 16) as u32 as i32
    }

    /// Next integer in `[0, max)`.
    ///
    /// Consumes exactly one raw draw. Returns 0 for `max <= 0` (the draw is
    /// still consumed so call sequences stay aligned).
    #[inline]
    pub fn next_int_below(&mut self, max: i32) -> i32 {
        let raw = self.next_int() as u32 as u64;
        if max <= 0 {
            return 0;
        }
        ((raw * max as u64) >> 32) as i32
    }

    /// Next float in `[0, 1)`.
    #[inline]
    pub fn next_float(&mut self) -> f32 {
        let raw = self.next_int() as u32 as f32;
        (raw / (u32::MAX as f32 + 1.0)).min(1.0 - f32::EPSILON)
    }

    /// Next float in `[-1, 1)`.
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        self.next_float() * 2.0 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sequence() {
        let mut rng = SeedRandom::new(12345);
        assert_eq!(rng.next_int(), 454757875);
        assert_eq!(rng.next_int(), -866467965);
        assert_eq!(rng.next_int(), 68972694);
    }

    #[test]
    fn zero_seed_starts_at_zero() {
        let mut rng = SeedRandom::new(0);
        assert_eq!(rng.next_int(), 0);
        assert_eq!(rng.next_int(), 4232237);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = SeedRandom::new(1101);
        let mut b = SeedRandom::new(1101);
        for _ in 0..1000 {
            assert_eq!(a.next_float().to_bits(), b.next_float().to_bits());
        }
    }

    #[test]
    fn next_int_below_in_range() {
        let mut rng = SeedRandom::new(7);
        for _ in 0..10_000 {
            let v = rng.next_int_below(17);
            assert!((0..17).contains(&v));
        }
    }

    #[test]
    fn next_int_below_non_positive_consumes_draw() {
        let mut a = SeedRandom::new(99);
        let mut b = SeedRandom::new(99);
        assert_eq!(a.next_int_below(0), 0);
        b.next_int();
        assert_eq!(a, b);
    }

    #[test]
    fn next_float_below_one() {
        let mut rng = SeedRandom::new(3);
        for _ in 0..10_000 {
            let f = rng.next_float();
            assert!((0.0..1.0).contains(&f), "got {f}");
        }
    }

    #[test]
    fn negative_seed_is_valid() {
        let mut rng = SeedRandom::new(-5);
        let f = rng.next_float();
        assert!((0.0..1.0).contains(&f));
    }
}

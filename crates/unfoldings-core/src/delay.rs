//! Integer-tap feedback history for the delay networks.
//!
//! The Bloom post-processor and the Fennesz engine both build feedback
//! networks that read their own past output at fixed integer delays. A
//! [`TapDelay`] stores the last `max_delay` written samples in a circular
//! buffer and answers "what was written `d` samples ago", returning silence
//! for positions before the first write.
//!
//! # Usage
//!
//! Read taps first, then write the new value:
//!
//! ```rust
//! use unfoldings_core::TapDelay;
//!
//! let mut line = TapDelay::new(4);
//! assert_eq!(line.tap(1), 0.0);
//! line.write(0.5);
//! line.write(0.25);
//! assert_eq!(line.tap(1), 0.25);
//! assert_eq!(line.tap(2), 0.5);
//! assert_eq!(line.tap(3), 0.0);
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Circular history with integer taps.
///
/// # Invariants
///
/// - Buffer capacity is `max_delay + 1` and never reallocates
/// - `tap(d)` for `d` in `1..=max_delay` returns the sample written `d` writes ago,
///   or 0.0 if fewer than `d` samples have been written
#[derive(Debug, Clone)]
pub struct TapDelay {
    buffer: Vec<f32>,
    write_pos: usize,
    written: usize,
}

impl TapDelay {
    /// Creates a history able to serve taps up to `max_delay` samples.
    pub fn new(max_delay: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay.max(1) + 1],
            write_pos: 0,
            written: 0,
        }
    }

    /// Longest tap this line can serve.
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Value written `delay` samples ago.
    ///
    /// `delay` is clamped into `1..=max_delay`.
    #[inline]
    pub fn tap(&self, delay: usize) -> f32 {
        let delay = delay.clamp(1, self.max_delay());
        if delay > self.written {
            return 0.0;
        }
        let len = self.buffer.len();
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Appends one sample.
    #[inline]
    pub fn write(&mut self, value: f32) {
        self.buffer[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        self.written = self.written.saturating_add(1);
    }

    /// Clears the history.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.written = 0;
    }
}

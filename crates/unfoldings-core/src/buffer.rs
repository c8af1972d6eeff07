//! Channel-major sample storage passed between pipeline stages.
//!
//! A [`SampleBuffer`] owns one `Vec<f32>` per channel, all of equal length.
//! Buffers move between stages by value; a stage that must read a buffer
//! another stage also reads takes a [`Clone`].

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Highest channel count a buffer may carry (stereo).
pub const MAX_CHANNELS: usize = 2;

/// Mono or stereo block of samples with a fixed length.
///
/// # Invariants
///
/// - Channel count is 1 or 2 and never changes after construction
/// - Every channel has exactly [`len`](Self::len) samples
///
/// # Example
///
/// ```rust
/// use unfoldings_core::SampleBuffer;
///
/// let mut b = SampleBuffer::stereo(4);
/// b.set_sample(0, 1, 0.5);
/// b.add_sample(0, 1, 0.25);
/// assert_eq!(b.sample(0, 1), 0.75);
/// assert_eq!(b.num_channels(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    len: usize,
}

impl SampleBuffer {
    /// Creates a zeroed buffer. `num_channels` is clamped into `1..=2`.
    pub fn new(num_channels: usize, len: usize) -> Self {
        debug_assert!(
            (1..=MAX_CHANNELS).contains(&num_channels),
            "SampleBuffer supports mono or stereo, got {num_channels} channels"
        );
        let count = num_channels.clamp(1, MAX_CHANNELS);
        Self {
            channels: (0..count).map(|_| vec![0.0; len]).collect(),
            len,
        }
    }

    /// Creates a zeroed stereo buffer.
    pub fn stereo(len: usize) -> Self {
        Self::new(2, len)
    }

    /// Creates a zeroed mono buffer.
    pub fn mono(len: usize) -> Self {
        Self::new(1, len)
    }

    /// Builds a stereo buffer from two channels.
    ///
    /// The shorter channel is zero-padded to the longer one's length.
    pub fn from_stereo(mut left: Vec<f32>, mut right: Vec<f32>) -> Self {
        let len = left.len().max(right.len());
        #[cfg(feature = "tracing")]
        tracing::trace!(left = left.len(), right = right.len(), "from_stereo");
        left.resize(len, 0.0);
        right.resize(len, 0.0);
        Self {
            channels: vec![left, right],
            len,
        }
    }

    /// Builds a mono buffer from one channel.
    pub fn from_mono(samples: Vec<f32>) -> Self {
        let len = samples.len();
        Self {
            channels: vec![samples],
            len,
        }
    }

    /// Number of channels (1 or 2).
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read-only view of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `ch >= num_channels()`.
    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.channels[ch]
    }

    /// Channel `ch`, or the last channel when `ch` is out of range.
    ///
    /// Lets stereo readers consume a mono buffer by duplication.
    #[inline]
    pub fn channel_or_last(&self, ch: usize) -> &[f32] {
        &self.channels[ch.min(self.channels.len() - 1)]
    }

    /// Mutable view of one channel.
    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.channels[ch]
    }

    /// Both channels mutably at once; `None` for a mono buffer.
    pub fn stereo_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        match self.channels.as_mut_slice() {
            [left, right] => Some((left.as_mut_slice(), right.as_mut_slice())),
            _ => None,
        }
    }

    /// Reads one sample.
    #[inline]
    pub fn sample(&self, ch: usize, index: usize) -> f32 {
        self.channels[ch][index]
    }

    /// Overwrites one sample.
    #[inline]
    pub fn set_sample(&mut self, ch: usize, index: usize, value: f32) {
        self.channels[ch][index] = value;
    }

    /// Adds into one sample (mix, never overwrite).
    #[inline]
    pub fn add_sample(&mut self, ch: usize, index: usize, value: f32) {
        self.channels[ch][index] += value;
    }

    /// Iterates over all channels.
    pub fn iter_channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Iterates mutably over all channels.
    pub fn iter_channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// Sets every sample to zero.
    pub fn clear(&mut self) {
        for ch in &mut self.channels {
            ch.fill(0.0);
        }
    }

    /// Multiplies every sample by `gain`.
    pub fn apply_gain(&mut self, gain: f32) {
        for ch in &mut self.channels {
            for s in ch.iter_mut() {
                *s *= gain;
            }
        }
    }

    /// Adds `other * gain` channel by channel over the overlapping length.
    ///
    /// Channels missing from `other` reuse its last channel.
    pub fn add_from(&mut self, other: &SampleBuffer, gain: f32) {
        let n = self.len.min(other.len);
        for (ch, dst) in self.channels.iter_mut().enumerate() {
            let src = other.channel_or_last(ch);
            for (d, s) in dst[..n].iter_mut().zip(&src[..n]) {
                *d += *s * gain;
            }
        }
    }

    /// Largest absolute sample across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|ch| ch.iter())
            .fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Equal-weight mixdown to a new mono buffer.
    pub fn to_mono(&self) -> SampleBuffer {
        match self.channels.as_slice() {
            [left, right] => SampleBuffer::from_mono(
                left.iter()
                    .zip(right.iter())
                    .map(|(l, r)| 0.5 * l + 0.5 * r)
                    .collect(),
            ),
            _ => self.clone(),
        }
    }

    /// Consumes the buffer and returns its channel vectors.
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

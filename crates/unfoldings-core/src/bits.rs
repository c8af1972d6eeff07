//! Bit-level state machines used for gating and symbol selection.
//!
//! - [`Lfsr32`] - 32-bit Fibonacci shift register with configurable taps
//! - [`Xorshift32`] - Marsaglia xorshift (13, 17, 5)
//! - [`popcount`] - set-bit count of a masked word

/// 32-bit Fibonacci linear-feedback shift register.
///
/// Each [`step`](Self::step) XORs the tapped bits into a feedback bit, shifts
/// the register right by one and inserts the feedback bit at bit 31.
///
/// # Example
///
/// ```rust
/// use unfoldings_core::Lfsr32;
///
/// let mut lfsr = Lfsr32::new(0xA536_6B4D, [0, 2, 3, 5]);
/// let before = lfsr.state();
/// lfsr.step();
/// assert_eq!(lfsr.state() & 0x7FFF_FFFF, before >> 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lfsr32 {
    state: u32,
    taps: [u32; 4],
}

impl Lfsr32 {
    /// Creates a register with a starting state and four tap positions (0..=31).
    pub const fn new(state: u32, taps: [u32; 4]) -> Self {
        Self { state, taps }
    }

    /// Current register contents.
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advances by one shift and returns the feedback bit.
    #[inline]
    pub fn step(&mut self) -> u32 {
        let s = self.state;
        let bit = ((s >> self.taps[0]) ^ (s >> self.taps[1]) ^ (s >> self.taps[2]) ^ (s >> self.taps[3]))
            & 1;
        self.state = (s >> 1) | (bit << 31);
        bit
    }

    /// Returns true if bit `n` of the current state is set.
    #[inline]
    pub fn bit(&self, n: u32) -> bool {
        (self.state >> n) & 1 != 0
    }
}

/// Xorshift generator with the (13, 17, 5) shift triple.
///
/// A zero state stays zero forever; callers seed with a non-zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// Creates a generator with the given state.
    pub const fn new(state: u32) -> Self {
        Self { state }
    }

    /// Advances and returns the new state.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        s
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Number of set bits in `word & mask`.
#[inline]
pub fn popcount(word: u32, mask: u32) -> u32 {
    (word & mask).count_ones()
}

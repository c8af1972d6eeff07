//! Hand-off of finished renders to the playback side.
//!
//! A [`RenderSlot`] holds the latest result as an `Arc<SampleBuffer>` behind
//! a short-lived lock: publishing swaps the pointer, readers clone it. The
//! lock is only ever held for that swap or clone, never while rendering or
//! while copying samples out.
//!
//! [`Playback`] is owned by the real-time side. It keeps its own cursor and
//! notices new results through the slot's generation counter.

use std::sync::Arc;

use parking_lot::Mutex;
use unfoldings_core::SampleBuffer;

use crate::error::{RenderError, Result};

#[derive(Debug, Default)]
struct SlotInner {
    buffer: Option<Arc<SampleBuffer>>,
    generation: u64,
}

/// Shared holder of the most recent render.
///
/// Cloning gives another handle to the same slot.
#[derive(Debug, Clone, Default)]
pub struct RenderSlot {
    inner: Arc<Mutex<SlotInner>>,
}

impl RenderSlot {
    /// Empty slot: nothing rendered, generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the published result and returns its generation (starting at 1).
    pub fn publish(&self, buffer: SampleBuffer) -> u64 {
        let buffer = Arc::new(buffer);
        let mut inner = self.inner.lock();
        inner.buffer = Some(buffer);
        inner.generation += 1;
        inner.generation
    }

    /// Latest result, if any.
    pub fn latest(&self) -> Option<Arc<SampleBuffer>> {
        self.inner.lock().buffer.clone()
    }

    /// Latest result with its generation.
    pub fn latest_with_generation(&self) -> (Option<Arc<SampleBuffer>>, u64) {
        let inner = self.inner.lock();
        (inner.buffer.clone(), inner.generation)
    }

    /// Latest result, or [`RenderError::NothingRendered`].
    pub fn require_latest(&self) -> Result<Arc<SampleBuffer>> {
        self.latest().ok_or(RenderError::NothingRendered)
    }

    /// Generation of the latest result (0 before the first publish).
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }
}

/// Sequential reader over the published result.
#[derive(Debug)]
pub struct Playback {
    slot: RenderSlot,
    current: Option<Arc<SampleBuffer>>,
    generation: u64,
    cursor: usize,
    looping: bool,
}

impl Playback {
    /// Reader over `slot`, looping by default.
    pub fn new(slot: RenderSlot) -> Self {
        Self {
            slot,
            current: None,
            generation: 0,
            cursor: 0,
            looping: true,
        }
    }

    /// Enables or disables wrap-around at the end of the buffer.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Whether playback wraps at the end of the buffer.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Next frame index to be read.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rewinds to the start of the current buffer.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Fills a stereo block. See [`Playback::fill_channels`].
    pub fn fill(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.fill_channels(&mut [left, right]);
    }

    /// Fills every output channel with the next frames of the latest result.
    ///
    /// Output channel `ch` reads rendered channel `min(ch, channels - 1)`.
    /// A newly published result restarts from frame 0. Past the end the
    /// cursor wraps when looping, otherwise the remainder is silence. With
    /// nothing published the outputs are silent.
    pub fn fill_channels(&mut self, outputs: &mut [&mut [f32]]) {
        self.sync();
        let frames = outputs.iter().map(|o| o.len()).min().unwrap_or(0);

        for out in outputs.iter_mut() {
            out.fill(0.0);
        }

        let Some(buffer) = self.current.as_ref() else {
            return;
        };
        let len = buffer.len();
        if len == 0 || buffer.num_channels() == 0 {
            return;
        }

        for frame in 0..frames {
            if self.cursor >= len {
                if self.looping {
                    self.cursor = 0;
                } else {
                    break;
                }
            }
            for (ch, out) in outputs.iter_mut().enumerate() {
                out[frame] = buffer.channel_or_last(ch)[self.cursor];
            }
            self.cursor += 1;
        }
    }

    fn sync(&mut self) {
        let (latest, generation) = self.slot.latest_with_generation();
        if generation != self.generation {
            self.current = latest;
            self.generation = generation;
            self.cursor = 0;
        }
    }
}

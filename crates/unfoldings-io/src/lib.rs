//! WAV I/O for unfoldings renders.
//!
//! - [`export_render`] writes a rendered buffer as 24-bit PCM, the format
//!   the render surface exports
//! - [`write_buffer`] writes 16/24-bit PCM or 32-bit float
//! - [`read_buffer`] and [`read_wav_info`] read files back
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use unfoldings_engine::{Renderer, RenderParameters};
//! use unfoldings_io::{export_render, read_buffer};
//!
//! let renderer = Renderer::new(48_000.0);
//! let out = renderer.render(&RenderParameters::default());
//! export_render("unfolding.wav", &out, 48_000)?;
//!
//! let (back, spec) = read_buffer("unfolding.wav")?;
//! assert_eq!(back.len(), out.len());
//! ```

mod wav;

pub use wav::{
    BitDepth, WavFormat, WavInfo, WavSpec, export_render, read_buffer, read_wav_info,
    write_buffer,
};

/// Error types for WAV I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bit depth other than 16, 24 or 32.
    #[error("Unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// File channel count a [`unfoldings_core::SampleBuffer`] cannot hold.
    #[error("Channel mismatch: file has {found} channels, expected 1 or 2")]
    ChannelMismatch {
        /// Channels in the file.
        found: u16,
    },
}

/// Convenience result type for WAV I/O.
pub type Result<T> = std::result::Result<T, Error>;

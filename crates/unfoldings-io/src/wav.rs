//! WAV file reading and writing of [`SampleBuffer`]s.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};
use unfoldings_core::SampleBuffer;

use crate::{Error, Result};

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// Sample encodings [`write_buffer`] can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// 16-bit PCM.
    Int16,
    /// 24-bit PCM.
    #[default]
    Int24,
    /// 32-bit float.
    Float32,
}

impl BitDepth {
    /// Bits per sample.
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }

    /// Depth for a bit count; only 16, 24 and 32 are accepted.
    pub fn from_bits(bits: u16) -> Result<Self> {
        match bits {
            16 => Ok(BitDepth::Int16),
            24 => Ok(BitDepth::Int24),
            32 => Ok(BitDepth::Float32),
            other => Err(Error::UnsupportedBitDepth(other)),
        }
    }

    fn hound_spec(self, channels: u16, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: self.bits(),
            sample_format: match self {
                BitDepth::Float32 => SampleFormat::Float,
                BitDepth::Int16 | BitDepth::Int24 => SampleFormat::Int,
            },
        }
    }
}

/// Header of a WAV file that was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Audio encoding format.
    pub format: WavFormat,
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            format: match spec.sample_format {
                SampleFormat::Float => WavFormat::IeeeFloat,
                SampleFormat::Int => WavFormat::Pcm,
            },
        }
    }
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Header fields.
    pub spec: WavSpec,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

/// Reads WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let num_frames = u64::from(reader.duration());
    let duration_secs = if spec.sample_rate == 0 {
        0.0
    } else {
        num_frames as f64 / f64::from(spec.sample_rate)
    };
    Ok(WavInfo {
        spec,
        num_frames,
        duration_secs,
    })
}

/// Writes every channel of `buffer`, interleaved, at `sample_rate`.
///
/// Integer depths clamp to full scale. An existing file at `path` is
/// replaced.
pub fn write_buffer<P: AsRef<Path>>(
    path: P,
    buffer: &SampleBuffer,
    sample_rate: u32,
    depth: BitDepth,
) -> Result<()> {
    let path = path.as_ref();
    let channels = buffer.num_channels();
    let spec = depth.hound_spec(channels as u16, sample_rate);
    let mut writer = WavWriter::create(path, spec)?;
    let views: Vec<&[f32]> = buffer.iter_channels().collect();

    match depth {
        BitDepth::Float32 => {
            for i in 0..buffer.len() {
                for ch in &views {
                    writer.write_sample(ch[i])?;
                }
            }
        }
        BitDepth::Int16 | BitDepth::Int24 => {
            let max_val = (1i32 << (depth.bits() - 1)) as f32;
            for i in 0..buffer.len() {
                for ch in &views {
                    let int_sample = (ch[i] * max_val).round().clamp(-max_val, max_val - 1.0);
                    writer.write_sample(int_sample as i32)?;
                }
            }
        }
    }

    writer.finalize()?;
    tracing::debug!(
        path = %path.display(),
        frames = buffer.len(),
        channels,
        bits = depth.bits(),
        "wav written"
    );
    Ok(())
}

/// Writes a render as 24-bit PCM at `sample_rate`.
pub fn export_render<P: AsRef<Path>>(
    path: P,
    buffer: &SampleBuffer,
    sample_rate: u32,
) -> Result<()> {
    write_buffer(path, buffer, sample_rate, BitDepth::Int24)
}

/// Reads a mono or stereo WAV file into a [`SampleBuffer`].
pub fn read_buffer<P: AsRef<Path>>(path: P) -> Result<(SampleBuffer, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels);
    if !(1..=2).contains(&channels) {
        return Err(Error::ChannelMismatch {
            found: spec.channels,
        });
    }

    let interleaved: Vec<f32> = match spec.format {
        WavFormat::IeeeFloat => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        WavFormat::Pcm => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let buffer = if channels == 1 {
        SampleBuffer::from_mono(interleaved)
    } else {
        let frames = interleaved.len() / 2;
        let mut left = Vec::with_capacity(frames);
        let mut right = Vec::with_capacity(frames);
        for frame in interleaved.chunks_exact(2) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
        SampleBuffer::from_stereo(left, right)
    };
    Ok((buffer, spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn ramp(len: usize) -> SampleBuffer {
        let left = (0..len).map(|i| i as f32 / len as f32 - 0.5).collect();
        let right = (0..len).map(|i| 0.5 - i as f32 / len as f32).collect();
        SampleBuffer::from_stereo(left, right)
    }

    #[test]
    fn test_bit_depths() {
        assert_eq!(BitDepth::from_bits(24).unwrap(), BitDepth::Int24);
        assert_eq!(BitDepth::Float32.bits(), 32);
        assert!(matches!(
            BitDepth::from_bits(8),
            Err(Error::UnsupportedBitDepth(8))
        ));
    }

    #[test]
    fn test_roundtrip_f32() {
        let buf = ramp(256);
        let file = NamedTempFile::new().unwrap();
        write_buffer(file.path(), &buf, 44_100, BitDepth::Float32).unwrap();
        let (back, spec) = read_buffer(file.path()).unwrap();
        assert_eq!(spec.format, WavFormat::IeeeFloat);
        assert_eq!(back, buf);
    }

    #[test]
    fn test_roundtrip_i16() {
        let buf = ramp(256);
        let file = NamedTempFile::new().unwrap();
        write_buffer(file.path(), &buf, 22_050, BitDepth::Int16).unwrap();
        let (back, spec) = read_buffer(file.path()).unwrap();
        assert_eq!(spec.bits_per_sample, 16);
        for (a, b) in buf.channel(1).iter().zip(back.channel(1)) {
            assert!((a - b).abs() < 1.0 / 16_000.0);
        }
    }

    #[test]
    fn test_full_scale_clamps() {
        let buf = SampleBuffer::from_mono(vec![1.0, -1.0, 2.0]);
        let file = NamedTempFile::new().unwrap();
        write_buffer(file.path(), &buf, 8_000, BitDepth::Int16).unwrap();
        let (back, _) = read_buffer(file.path()).unwrap();
        assert_eq!(back.num_channels(), 1);
        assert!((back.sample(0, 0) - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(back.sample(0, 1), -1.0);
        assert!((back.sample(0, 2) - 32767.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn test_info_without_samples() {
        let file = NamedTempFile::new().unwrap();
        export_render(file.path(), &ramp(4_800), 48_000).unwrap();
        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.spec.channels, 2);
        assert_eq!(info.spec.bits_per_sample, 24);
        assert_eq!(info.num_frames, 4_800);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
    }
}

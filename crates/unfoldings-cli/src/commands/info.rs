//! Display WAV file metadata.

use clap::Args;
use unfoldings_io::{WavFormat, read_buffer, read_wav_info};

use super::common::linear_to_db;

/// Display WAV file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: std::path::PathBuf,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)?;

    let format_str = match info.spec.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };

    println!("File:        {}", args.file.display());
    println!("Format:      {} {}-bit", format_str, info.spec.bits_per_sample);
    println!("Channels:    {}", info.spec.channels);
    println!("Sample Rate: {} Hz", info.spec.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs, info.num_frames
    );

    match read_buffer(&args.file) {
        Ok((buffer, _)) => {
            let peak = buffer.peak();
            println!("Peak:        {:.4} ({:.1} dBFS)", peak, linear_to_db(peak));
        }
        Err(e) => tracing::warn!(error = %e, "peak not available"),
    }

    Ok(())
}

//! Render an unfolding to a WAV file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use unfoldings_config::{
    ParamId, ParameterStore, Session, paths, resolve_preset, resolve_scene,
};
use unfoldings_engine::{RenderEvent, RenderWorker};
use unfoldings_io::{BitDepth, write_buffer};

use super::common::{linear_to_db, parse_sample_rate};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Session file or saved session name, applied first
    #[arg(long)]
    session: Option<String>,

    /// Factory preset name or index
    #[arg(short, long)]
    preset: Option<String>,

    /// Beauty scene to apply (name or 0-3)
    #[arg(long)]
    scene: Option<String>,

    /// Unfolding mode (name or 0-7)
    #[arg(short, long)]
    mode: Option<String>,

    /// Render seed
    #[arg(long)]
    seed: Option<i32>,

    /// Micro-burst event count
    #[arg(long)]
    density: Option<i32>,

    /// Micro-burst length in milliseconds
    #[arg(long)]
    burst_ms: Option<f32>,

    /// Micro-burst rate (192000, 384000, 768000, 1536000 or 0-3)
    #[arg(long)]
    micro_rate: Option<String>,

    /// Output length in seconds
    #[arg(long)]
    out_seconds: Option<f32>,

    /// Granular grain length in milliseconds
    #[arg(long)]
    grain_ms: Option<f32>,

    /// Granular overlap
    #[arg(long)]
    overlap: Option<f32>,

    /// Spectral stretch
    #[arg(long)]
    stretch: Option<f32>,

    /// Spectral warp
    #[arg(long)]
    warp: Option<f32>,

    /// Spectral chaos (0-1)
    #[arg(long)]
    chaos: Option<f32>,

    /// Hybrid diffusion mix (0-1)
    #[arg(long)]
    mix: Option<f32>,

    /// Host sample rate in Hz (1000-768000)
    #[arg(long, default_value = "48000", value_parser = parse_sample_rate)]
    sample_rate: u32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "24")]
    bit_depth: u16,

    /// Save the final parameter state as a session
    #[arg(long)]
    save_session: Option<String>,
}

/// Writes a choice by option name, falling back to a numeric index.
fn set_choice_arg(store: &mut ParameterStore, id: ParamId, value: &str) -> anyhow::Result<()> {
    if store.set_choice(id, value).is_ok() {
        return Ok(());
    }
    match value.trim().parse::<i32>() {
        Ok(index) => {
            set_checked(store, id, index as f32);
            Ok(())
        }
        Err(_) => Err(unfoldings_config::ConfigError::invalid_choice(id.id(), value).into()),
    }
}

/// Writes a value and warns when the store had to clamp it.
fn set_checked(store: &mut ParameterStore, id: ParamId, value: f32) {
    let stored = store.set(id, value);
    if stored != value {
        tracing::warn!(param = id.id(), requested = value, stored, "value clamped");
    }
}

/// Builds the parameter store from session, preset, scene, then flags.
fn build_store(args: &RenderArgs) -> anyhow::Result<ParameterStore> {
    let mut store = ParameterStore::new();

    if let Some(name) = &args.session {
        let path = paths::session_path(name);
        let session = Session::load(&path)
            .with_context(|| format!("loading session {}", path.display()))?;
        session.apply_to(&mut store)?;
        println!("Session: {}", path.display());
    }

    if let Some(key) = &args.preset {
        let (index, preset) = resolve_preset(key)?;
        preset.apply_to(&mut store);
        println!("Preset:  {index:>2} {}", preset.name);
    }

    if let Some(key) = &args.scene {
        let scene = resolve_scene(key)?;
        store.set_beauty_scene(scene);
        store.apply_beauty_scene();
        println!("Scene:   {scene}");
    }

    if let Some(mode) = &args.mode {
        set_choice_arg(&mut store, ParamId::Mode, mode)?;
    }
    if let Some(rate) = &args.micro_rate {
        set_choice_arg(&mut store, ParamId::MicroRate, rate)?;
    }

    let numeric = [
        (ParamId::Seed, args.seed.map(|v| v as f32)),
        (ParamId::Density, args.density.map(|v| v as f32)),
        (ParamId::BurstMs, args.burst_ms),
        (ParamId::OutSeconds, args.out_seconds),
        (ParamId::GrainMs, args.grain_ms),
        (ParamId::Overlap, args.overlap),
        (ParamId::Stretch, args.stretch),
        (ParamId::Warp, args.warp),
        (ParamId::SpectralChaos, args.chaos),
        (ParamId::HybridMix, args.mix),
    ];
    for (id, value) in numeric {
        if let Some(value) = value {
            set_checked(&mut store, id, value);
        }
    }

    Ok(store)
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let depth = BitDepth::from_bits(args.bit_depth)?;
    let store = build_store(&args)?;
    let host_rate = f64::from(args.sample_rate);

    if let Some(name) = &args.save_session {
        let path = paths::session_path(name);
        Session::from_store(&store, Some(host_rate))
            .save(&path)
            .with_context(|| format!("saving session {}", path.display()))?;
        println!("Saved session to {}", path.display());
    }

    let params = store.snapshot();
    println!(
        "Rendering {} (seed {}, {} events at {} Hz, {:.2}s out)...",
        params.mode,
        params.seed,
        params.density,
        params.micro_rate.hz(),
        params.out_seconds
    );

    let worker = RenderWorker::spawn(host_rate).context("starting render thread")?;
    let token = worker.submit(params)?;
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        println!("\nCancelling...");
        handler_token.cancel();
    })?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message("unfolding");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let event = worker.recv()?;
    let (frames, elapsed) = match event {
        RenderEvent::Finished {
            frames, elapsed, ..
        } => {
            spinner.finish_with_message("done");
            (frames, elapsed)
        }
        RenderEvent::Cancelled => {
            spinner.abandon_with_message("cancelled");
            anyhow::bail!("render cancelled");
        }
    };

    let buffer = worker.slot().require_latest()?;
    write_buffer(&args.output, &buffer, args.sample_rate, depth)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("\nWrote {}", args.output.display());
    println!(
        "  {} frames, {:.2}s, {}-bit, peak {:.1} dBFS, rendered in {:.2}s",
        frames,
        frames as f64 / host_rate,
        depth.bits(),
        linear_to_db(buffer.peak()),
        elapsed.as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use unfoldings_engine::{BeautyScene, Mode};

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(argv: &[&str]) -> RenderArgs {
        let mut full = vec!["render"];
        full.extend_from_slice(argv);
        Wrapper::parse_from(full).args
    }

    #[test]
    fn defaults_without_flags() {
        let store = build_store(&parse(&["out.wav"])).unwrap();
        assert_eq!(store, ParameterStore::new());
    }

    #[test]
    fn flags_override_preset_and_scene() {
        let args = parse(&[
            "out.wav",
            "--preset",
            "Porcelain Air",
            "--scene",
            "lush",
            "--seed",
            "99",
            "--mode",
            "noto",
        ]);
        let store = build_store(&args).unwrap();
        assert_eq!(store.seed(), 99);
        assert_eq!(store.mode(), Mode::Noto);
        assert_eq!(store.beauty_scene(), BeautyScene::Lush);
        // scene overwrote the preset's burst length
        assert_eq!(store.get(ParamId::BurstMs), 38.0);
    }

    #[test]
    fn micro_rate_by_hz_or_index() {
        let store = build_store(&parse(&["o.wav", "--micro-rate", "192000"])).unwrap();
        assert_eq!(store.get(ParamId::MicroRate), 0.0);
        let store = build_store(&parse(&["o.wav", "--micro-rate", "3"])).unwrap();
        assert_eq!(store.get(ParamId::MicroRate), 3.0);
    }

    #[test]
    fn sample_rate_floor_is_enforced_by_the_parser() {
        assert_eq!(parse(&["o.wav", "--sample-rate", "8000"]).sample_rate, 8000);
        for rate in ["30", "20", "0"] {
            let argv = ["render", "o.wav", "--sample-rate", rate];
            assert!(Wrapper::try_parse_from(argv).is_err(), "{rate} Hz accepted");
        }
    }

    #[test]
    fn bad_mode_is_an_error() {
        assert!(build_store(&parse(&["o.wav", "--mode", "reverb"])).is_err());
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(build_store(&parse(&["o.wav", "--preset", "Nope"])).is_err());
    }
}

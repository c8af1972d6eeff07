//! Factory preset listing.

use clap::Args;
use unfoldings_config::{PRESETS, PresetSpec, mode_colour, preset_colour, resolve_preset};

use super::common::colour_hex;

#[derive(Args)]
pub struct PresetsArgs {
    /// Show one preset in full (name or index)
    name: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn preset_json(index: usize, p: &PresetSpec) -> serde_json::Value {
    serde_json::json!({
        "index": index,
        "name": p.name,
        "mode": p.mode.name(),
        "colour": colour_hex(mode_colour(p.mode.index() as i32)),
        "micro_rate": p.micro_rate.hz(),
        "burst_ms": p.burst_ms,
        "density": p.density,
        "out_seconds": p.out_seconds,
        "grain_ms": p.grain_ms,
        "overlap": p.overlap,
        "stretch": p.stretch,
        "warp": p.warp,
        "spectral_chaos": p.spectral_chaos,
        "hybrid_mix": p.hybrid_mix,
        "seed": p.seed,
        "beauty_scene": p.beauty_scene.name(),
    })
}

fn print_preset(index: usize, p: &PresetSpec) {
    println!("Preset {index}: {}", p.name);
    println!("  Mode:          {}", p.mode);
    println!("  Micro rate:    {} Hz", p.micro_rate.hz());
    println!("  Burst:         {} ms", p.burst_ms);
    println!("  Density:       {}", p.density);
    println!("  Output:        {} s", p.out_seconds);
    println!("  Grain:         {} ms", p.grain_ms);
    println!("  Overlap:       {}", p.overlap);
    println!("  Stretch:       {}", p.stretch);
    println!("  Warp:          {}", p.warp);
    println!("  Chaos:         {}", p.spectral_chaos);
    println!("  Hybrid mix:    {}", p.hybrid_mix);
    println!("  Seed:          {}", p.seed);
    println!("  Beauty scene:  {}", p.beauty_scene);
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    if let Some(key) = &args.name {
        let (index, p) = resolve_preset(key)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&preset_json(index, p))?);
        } else {
            print_preset(index, p);
        }
        return Ok(());
    }

    if args.json {
        let all: Vec<_> = PRESETS
            .iter()
            .enumerate()
            .map(|(i, p)| preset_json(i, p))
            .collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("Factory presets:\n");
    println!("  {:>3}  {:<28} {:<10} {}", "#", "Name", "Mode", "Colour");
    for (i, p) in PRESETS.iter().enumerate() {
        println!(
            "  {:>3}  {:<28} {:<10} {}",
            i,
            p.name,
            p.mode.name(),
            colour_hex(preset_colour(i as i32))
        );
    }
    println!("\nUse 'unfoldings presets <NAME>' for details.");
    Ok(())
}

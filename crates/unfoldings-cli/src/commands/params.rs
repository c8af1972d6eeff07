//! Parameter surface listing.

use clap::Args;
use unfoldings_config::{ParamId, ParamKind};

use super::common::range_text;

#[derive(Args)]
pub struct ParamsArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn kind_name(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Float => "float",
        ParamKind::Int => "int",
        ParamKind::Choice(_) => "choice",
        ParamKind::Bool => "bool",
    }
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    if args.json {
        let all: Vec<_> = ParamId::ALL
            .into_iter()
            .map(|id| {
                let spec = id.spec();
                serde_json::json!({
                    "id": spec.id,
                    "name": spec.name,
                    "kind": kind_name(spec.kind),
                    "min": spec.min,
                    "max": spec.max,
                    "default": spec.default,
                    "step": spec.step,
                    "skew": spec.skew,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("Parameters:\n");
    println!(
        "  {:<14} {:<22} {:<7} {:<10} {}",
        "Id", "Name", "Kind", "Default", "Range"
    );
    for id in ParamId::ALL {
        let spec = id.spec();
        println!(
            "  {:<14} {:<22} {:<7} {:<10} {}",
            spec.id,
            spec.name,
            kind_name(spec.kind),
            spec.format(spec.default),
            range_text(id)
        );
    }
    Ok(())
}

//! Beauty scene listing.

use clap::Args;
use unfoldings_config::scenes::SCENE_PARAMS;
use unfoldings_config::{ParamId, scene_settings};
use unfoldings_engine::BeautyScene;

#[derive(Args)]
pub struct ScenesArgs {}

pub fn run(_args: ScenesArgs) -> anyhow::Result<()> {
    println!("Beauty scenes:\n");
    for scene in BeautyScene::ALL {
        let Some(settings) = scene_settings(scene) else {
            println!("  {} {}: no overwrite", scene.index(), scene);
            continue;
        };
        println!("  {} {}:", scene.index(), scene);
        for (id, value) in settings.values() {
            println!("      {:<14} {}", id.id(), id.spec().format(value));
        }
    }
    let kept: Vec<&str> = ParamId::ALL
        .into_iter()
        .filter(|id| !SCENE_PARAMS.contains(id))
        .map(ParamId::id)
        .collect();
    println!("\nScenes leave {} unchanged.", kept.join(", "));
    Ok(())
}

//! Saved session listing.

use clap::Args;
use unfoldings_config::{Session, paths};

#[derive(Args)]
pub struct SessionsArgs {}

pub fn run(_args: SessionsArgs) -> anyhow::Result<()> {
    let dir = paths::sessions_dir();
    let sessions = paths::list_sessions();
    println!("Sessions in {}:\n", dir.display());
    if sessions.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for path in sessions {
        let name = paths::session_name_from_path(&path).unwrap_or_default();
        match Session::load(&path).and_then(|s| s.to_store()) {
            Ok(store) => {
                let p = store.snapshot();
                println!("  {name:<24} {:<10} seed {}", p.mode.name(), p.seed);
            }
            Err(e) => println!("  {name:<24} unreadable: {e}"),
        }
    }
    Ok(())
}

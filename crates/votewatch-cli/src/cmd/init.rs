use anyhow::Context;
use std::path::Path;
use votewatch_core::{config::Config, io, paths};

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing votewatch in: {}", root.display());

    for dir in [
        paths::VOTEWATCH_DIR,
        paths::CHAMBERS_DIR,
        paths::RESOLUTIONS_DIR,
    ] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    println!("\nNext: schedule `votewatch tick` to run hourly.");
    Ok(())
}

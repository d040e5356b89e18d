use std::path::Path;

use anyhow::Context;
use provisor_core::config::Config;
use provisor_core::{io, paths, LifecycleDb};

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("Already initialized: {}", config_path.display());
        return Ok(());
    }

    io::ensure_dir(&paths::provisor_dir(root)).context("failed to create data directory")?;
    Config::default()
        .save(root)
        .context("failed to write config")?;
    // Create the database up front so later commands find a valid file.
    LifecycleDb::open(&paths::db_path(root)).context("failed to create lifecycle db")?;

    println!("Initialized provisor in {}", root.display());
    println!("Next: provisor broker add <name> --url <url> --username <u> --password <p>");
    Ok(())
}

//! `ponder config`: Print the effective configuration.

use ponder_config::AppConfig;
use std::path::Path;

pub fn run(path: Option<&Path>, default: bool) -> anyhow::Result<()> {
    if default {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = super::load_config(path)?;
    let location = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    println!("# {}", location.display());
    print!("{}", config.to_redacted_toml());
    Ok(())
}

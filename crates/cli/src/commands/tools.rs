//! `ponder tools`: Show the tool catalogue.

use ponder_agent::prompt::render_catalogue;
use ponder_config::AppConfig;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let registry = super::build_registry(config)?;
    println!("{}", render_catalogue(&registry.descriptors()));
    Ok(())
}

pub mod config;
pub mod enrich;
pub mod lookup;
pub mod status;

use anyhow::Context;
use readlog_core::config::Config;
use std::path::Path;

/// Load `readlog.yaml` from `root` and apply environment overrides.
pub(crate) fn load_config(root: &Path) -> anyhow::Result<Config> {
    let config = Config::load(root).context("failed to load readlog.yaml")?;
    Ok(config.with_env_overrides())
}

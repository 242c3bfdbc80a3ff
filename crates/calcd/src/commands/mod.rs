pub mod config;
pub mod invoke;
pub mod serve;

use std::path::Path;

use anyhow::Context;
use calc_core::CalcConfig;

/// Load the config file if one was given, otherwise fall back to defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CalcConfig> {
    match path {
        Some(path) => CalcConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(CalcConfig::default()),
    }
}

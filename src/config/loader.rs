//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::env::{apply_env_overrides, dedupe_diagnostics};
use super::init::config_root_dir;
use super::sources::read_config_text_with_sources;
use super::{Config, ConfigDiagnostics, LoadedConfig};

/// Load configuration from disk and environment, with loader diagnostics.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config_with_diagnostics(
    path_override: Option<&str>,
) -> Result<LoadedConfig, ConfigError> {
    load_config_with_diagnostics_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_with_diagnostics_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut diagnostics = ConfigDiagnostics::default();
    let mut config: Config = toml::from_str(&config_text)?;
    apply_env_overrides(&mut config, &env_lookup, &mut diagnostics)?;
    validate(&mut config)?;
    dedupe_diagnostics(&mut diagnostics);

    Ok(LoadedConfig {
        config,
        diagnostics,
        source: source.path(),
    })
}

fn validate(config: &mut Config) -> Result<(), ConfigError> {
    if config.seed.load_order.iter().any(|f| f.trim().is_empty()) {
        return Err(ConfigError::Invalid(
            "seed.load_order entries must be non-empty file names".to_string(),
        ));
    }
    // Clamp to at least one pooled connection.
    config.database.max_connections = config.database.max_connections.max(1);
    if config.theme.prefix.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "theme.prefix must not be empty".to_string(),
        ));
    }
    Ok(())
}

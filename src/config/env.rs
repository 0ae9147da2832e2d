//! Environment overrides.
//!
//! `STOCKROOM_*` variables take precedence over file values. The generic
//! `DATABASE_URL` is accepted when `STOCKROOM_DATABASE_URL` is absent and the
//! file sets no URL.

use std::path::PathBuf;

use crate::error::ConfigError;

use super::{Config, ConfigDiagnostics};

pub(super) fn apply_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
    diagnostics: &mut ConfigDiagnostics,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_empty(env_lookup, "STOCKROOM_DATABASE_URL") {
        config.database.url = Some(url);
    } else if config.database.url.is_none() {
        if let Some(url) = non_empty(env_lookup, "DATABASE_URL") {
            config.database.url = Some(url);
            diagnostics.notices.push(
                "Using database url from `DATABASE_URL`; set STOCKROOM_DATABASE_URL to pin it."
                    .to_string(),
            );
        }
    }
    if let Some(dir) = non_empty(env_lookup, "STOCKROOM_DATA_DIR") {
        config.seed.data_dir = PathBuf::from(dir);
    }
    if let Some(backend) = non_empty(env_lookup, "STOCKROOM_BACKEND") {
        config.database.backend = backend
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("invalid STOCKROOM_BACKEND: {e}")))?;
    }
    Ok(())
}

/// Env value with surrounding whitespace removed; blank counts as unset.
fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Sort and deduplicate diagnostic strings for stable output.
pub(super) fn dedupe_diagnostics(diagnostics: &mut ConfigDiagnostics) {
    diagnostics.notices.sort();
    diagnostics.notices.dedup();
}

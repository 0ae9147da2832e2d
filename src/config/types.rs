//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Loading and precedence live
//! in the sibling modules.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_DATABASE_SCHEMA, DEFAULT_DATA_DIR, DEFAULT_MAX_CONNECTIONS, DEFAULT_THEME_NAME,
    DEFAULT_THEME_PREFIX,
};
use crate::collection::DEFAULT_LOAD_ORDER;
use crate::seed::DeleteOrder;
use crate::theme::ThemeFormat;

/// Which record store a seeding run writes to.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Postgres,
    /// In-process store; nothing persists past the run.
    Memory,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown backend `{other}` (expected postgres or memory)"
            )),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub seed: SeedConfig,
    pub database: DatabaseConfig,
    pub theme: ThemeConfig,
}

/// `[seed]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    pub data_dir: PathBuf,
    /// Fixture files in load order; each stem names its collection.
    pub load_order: Vec<String>,
    pub delete_order: DeleteOrder,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            load_order: DEFAULT_LOAD_ORDER.iter().map(|f| f.to_string()).collect(),
            delete_order: DeleteOrder::Forward,
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub url: Option<String>,
    pub schema: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Postgres,
            url: None,
            schema: DEFAULT_DATABASE_SCHEMA.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// `[theme]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub prefix: String,
    pub default_theme: String,
    pub format: ThemeFormat,
    /// Replaces the built-in color table when set. Values must be `#rrggbb`
    /// or `#rgb`; `rgb(...)` and named colors are rejected when rendering CSS.
    pub colors_file: Option<PathBuf>,
    /// theme name -> token key -> `#rrggbb` or `#rgb`.
    pub overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_THEME_PREFIX.to_string(),
            default_theme: DEFAULT_THEME_NAME.to_string(),
            format: ThemeFormat::Css,
            colors_file: None,
            overrides: BTreeMap::new(),
        }
    }
}

/// Notes collected while loading, shown once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    pub notices: Vec<String>,
}

/// Parsed config plus loader diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub diagnostics: ConfigDiagnostics,
    /// File the config came from; `None` when built-in defaults were used.
    pub source: Option<PathBuf>,
}

/// Result of `stockroom init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigInitResult {
    Created { path: PathBuf },
    AlreadyInitialized { path: PathBuf },
    Overwritten { path: PathBuf, backup_path: PathBuf },
}

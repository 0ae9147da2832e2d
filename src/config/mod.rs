//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`STOCKROOM_DATABASE_URL`, `STOCKROOM_DATA_DIR`,
//!    `STOCKROOM_BACKEND`), with `DATABASE_URL` as a fallback for the URL.
//! 2. TOML file specified via --config CLI flag
//! 3. ./stockroom.toml in the current directory
//! 4. $XDG_CONFIG_HOME/stockroom/stockroom.toml (or ~/.config/stockroom/stockroom.toml)
//! 5. Built-in defaults

mod defaults;
mod env;
mod init;
mod loader;
mod sources;
mod types;

pub use init::{config_root_dir, default_global_config_path, initialize_config};
pub use loader::load_config_with_diagnostics;
pub use types::{
    Backend, Config, ConfigDiagnostics, ConfigInitResult, DatabaseConfig, LoadedConfig,
    SeedConfig, ThemeConfig,
};

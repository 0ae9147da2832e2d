//! Built-in defaults and the embedded config template.

/// Template written by `stockroom init`.
pub(super) const DEFAULT_STOCKROOM_CONFIG_TEMPLATE: &str =
    include_str!("../templates/stockroom.toml");

/// Config file name, both local and under the config root.
pub(super) const CONFIG_FILE_NAME: &str = "stockroom.toml";

pub(super) const DEFAULT_DATA_DIR: &str = "seedData";

pub(super) const DEFAULT_DATABASE_SCHEMA: &str = "public";

pub(super) const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub(super) const DEFAULT_THEME_PREFIX: &str = "twc";

pub(super) const DEFAULT_THEME_NAME: &str = "light";

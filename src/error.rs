//! Unified error types for seeding and theme generation.

use std::fmt;
use std::path::PathBuf;

use crate::collection::Collection;

// ---------------------------------------------------------------------------
// ResolveError
// ---------------------------------------------------------------------------

/// A fixture name could not be mapped to a usable collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No collection carries this name (case-insensitive).
    Unknown(String),
    /// The collection exists but the store exposes no handle for it.
    Unsupported(Collection),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "collection '{name}' not found in record store"),
            Self::Unsupported(collection) => write!(
                f,
                "collection {} is not available in the record store",
                collection.name()
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

// ---------------------------------------------------------------------------
// FixtureError
// ---------------------------------------------------------------------------

/// Errors reading or decoding one fixture file.
#[derive(Debug)]
pub enum FixtureError {
    NotFound(PathBuf),
    Io(std::io::Error),
    InvalidJson(serde_json::Error),
    /// Top-level value was valid JSON but not an array.
    NotArray,
    /// One record did not match the collection's row shape.
    Schema { index: usize, message: String },
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::InvalidJson(e) => write!(f, "invalid json: {e}"),
            Self::NotArray => write!(f, "top-level value is not an array"),
            Self::Schema { index, message } => write!(f, "record {index}: {message}"),
        }
    }
}

impl std::error::Error for FixtureError {}

impl From<std::io::Error> for FixtureError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for FixtureError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidJson(e)
    }
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors raised by a record store.
#[derive(Debug)]
pub enum StoreError {
    /// Could not open or keep the connection.
    Connect(String),
    /// The store rejected or failed a statement.
    Query(String),
    /// A reference or uniqueness rule was violated.
    Constraint(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "connect: {msg}"),
            Self::Query(msg) => write!(f, "query: {msg}"),
            Self::Constraint(msg) => write!(f, "constraint violation: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db)
                if db.is_foreign_key_violation() || db.is_unique_violation() =>
            {
                Self::Constraint(db.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::Connect(e.to_string()),
            _ => Self::Query(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ThemeError
// ---------------------------------------------------------------------------

/// Errors building or rendering theme palettes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// Override or table value is not a `#rrggbb` or `#rgb` color.
    InvalidColor(String),
    /// Override key is not `<color>-<shade>`, `white`, or `black`.
    UnknownToken(String),
    /// A registered theme has no value for a token it must render.
    MissingToken { theme: String, token: String },
    InvalidTable(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor(value) => write!(f, "invalid color `{value}` (expected #RRGGBB)"),
            Self::UnknownToken(key) => write!(f, "unknown theme token `{key}`"),
            Self::MissingToken { theme, token } => {
                write!(f, "theme `{theme}` has no value for `{token}`")
            }
            Self::InvalidTable(msg) => write!(f, "invalid color table: {msg}"),
        }
    }
}

impl std::error::Error for ThemeError {}

// ---------------------------------------------------------------------------
// SeedError
// ---------------------------------------------------------------------------

/// Failures that prevent a seeding run from starting.
#[derive(Debug)]
pub enum SeedError {
    Config(ConfigError),
    Store(StoreError),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
        }
    }
}

impl std::error::Error for SeedError {}

impl From<ConfigError> for SeedError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StoreError> for SeedError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_display() {
        assert_eq!(
            ResolveError::Unknown("widgets".into()).to_string(),
            "collection 'widgets' not found in record store"
        );
        assert_eq!(
            ResolveError::Unsupported(Collection::SalesSummary).to_string(),
            "collection salesSummary is not available in the record store"
        );
    }

    #[test]
    fn fixture_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        let e = FixtureError::from(json_err);
        assert!(e.to_string().starts_with("invalid json:"), "got: {e}");
    }

    #[test]
    fn fixture_error_schema_names_index() {
        let e = FixtureError::Schema {
            index: 3,
            message: "missing field `name`".into(),
        };
        assert_eq!(e.to_string(), "record 3: missing field `name`");
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e = ConfigError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn seed_error_wraps_store_error() {
        let e = SeedError::from(StoreError::Connect("refused".into()));
        assert_eq!(e.to_string(), "store: connect: refused");
    }

    #[test]
    fn theme_error_display() {
        assert_eq!(
            ThemeError::InvalidColor("#12".into()).to_string(),
            "invalid color `#12` (expected #RRGGBB)"
        );
    }
}

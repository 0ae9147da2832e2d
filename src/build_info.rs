//! Compile-time build metadata for `--version` and startup logs.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("STOCKROOM_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("STOCKROOM_BUILD_TIMESTAMP");

/// Cargo profile (`debug`/`release`).
pub const BUILD_PROFILE: &str = env!("STOCKROOM_BUILD_PROFILE");

/// Version block printed by `stockroom --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("STOCKROOM_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("STOCKROOM_BUILD_TIMESTAMP"),
    " (",
    env!("STOCKROOM_BUILD_PROFILE"),
    ")"
);

/// Help trailer that surfaces build metadata in `stockroom --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("STOCKROOM_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("STOCKROOM_BUILD_TIMESTAMP")
);

/// Record-store backends compiled into this binary.
pub fn compiled_backends() -> Vec<&'static str> {
    let mut backends = vec!["memory"];
    if cfg!(feature = "postgres") {
        backends.push("postgres");
    }
    backends
}

/// One-line summary logged at startup.
pub fn startup_metadata_line() -> String {
    format!(
        "stockroom v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP}, backends: {})",
        compiled_backends().join(", ")
    )
}

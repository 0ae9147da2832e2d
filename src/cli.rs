//! CLI argument parsing via clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stockroom::build_info;
use stockroom::config::Backend;
use stockroom::seed::DeleteOrder;
use stockroom::theme::ThemeFormat;

/// Seed an inventory database from JSON fixtures and generate light/dark
/// color themes.
#[derive(Debug, Parser)]
#[command(
    name = "stockroom",
    version = build_info::VERSION,
    long_version = build_info::LONG_VERSION,
    after_help = build_info::HELP_BUILD_METADATA
)]
pub struct Args {
    /// Path to config file (default: ./stockroom.toml or ~/.config/stockroom/stockroom.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Log at debug level unless STOCKROOM_LOG or RUST_LOG is set.
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clear every collection, then load it from its fixture file.
    Seed(SeedArgs),
    /// Render the light/dark theme stylesheet or color map.
    Theme(ThemeArgs),
    /// Write the default config file.
    Init(InitArgs),
}

#[derive(Debug, clap::Args)]
pub struct SeedArgs {
    /// Directory holding the fixture files.
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Record store to write to.
    #[arg(long = "backend")]
    pub backend: Option<Backend>,

    /// Postgres connection URL.
    #[arg(long = "database-url")]
    pub database_url: Option<String>,

    /// Order of the delete phase relative to the load order.
    #[arg(long = "delete-order")]
    pub delete_order: Option<DeleteOrder>,

    /// Fixture files to load, in order (default: the configured load order).
    pub files: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub struct ThemeArgs {
    /// Output format.
    #[arg(long = "format")]
    pub format: Option<ThemeFormat>,

    /// Write to a file instead of stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct InitArgs {
    /// Replace an existing file after backing it up.
    #[arg(long = "force")]
    pub force: bool,

    /// Where to write (default: ~/.config/stockroom/stockroom.toml).
    #[arg(long = "path")]
    pub path: Option<PathBuf>,
}

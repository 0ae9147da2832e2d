//! CLI entry point for stockroom.

mod cli;

use std::path::Path;

use clap::Parser;
use stockroom::build_info;
use stockroom::config::{
    initialize_config, load_config_with_diagnostics, Config, ConfigInitResult,
};
use stockroom::error::{ConfigError, SeedError, ThemeError};
use stockroom::seed::{SeedPlan, Seeder};
use stockroom::store::open_store;
use stockroom::theme::{ColorTable, ThemePlugin};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Command, InitArgs, SeedArgs, ThemeArgs};

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing(args.verbose);
    debug!("{}", build_info::startup_metadata_line());

    let code = match args.command {
        Command::Init(init) => run_init(&init),
        Command::Seed(seed) => match load(args.config.as_deref()) {
            Some(config) => run_seed(config, seed).await,
            None => 1,
        },
        Command::Theme(theme) => match load(args.config.as_deref()) {
            Some(config) => run_theme(&config, &theme),
            None => 1,
        },
    };
    std::process::exit(code);
}

/// Filter from `STOCKROOM_LOG`, else `RUST_LOG`, else `info` (`debug` for
/// this crate with `-v`). Lines go to stderr without targets or timestamps.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info,stockroom=debug" } else { "info" };
    let filter = std::env::var("STOCKROOM_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load(path_override: Option<&str>) -> Option<Config> {
    match load_config_with_diagnostics(path_override) {
        Ok(loaded) => {
            for notice in &loaded.diagnostics.notices {
                warn!("{notice}");
            }
            match &loaded.source {
                Some(path) => debug!(path = %path.display(), "loaded config"),
                None => debug!("no config file found; using built-in defaults"),
            }
            Some(loaded.config)
        }
        Err(e) => {
            error!("{e}");
            None
        }
    }
}

async fn run_seed(mut config: Config, args: SeedArgs) -> i32 {
    if let Some(dir) = args.data_dir {
        config.seed.data_dir = dir;
    }
    if let Some(backend) = args.backend {
        config.database.backend = backend;
    }
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }
    if let Some(order) = args.delete_order {
        config.seed.delete_order = order;
    }
    let files = if args.files.is_empty() {
        config.seed.load_order.clone()
    } else {
        args.files
    };
    let plan = SeedPlan::new(&config.seed.data_dir)
        .with_files(files)
        .with_delete_order(config.seed.delete_order);

    match open_store(&config.database).await {
        Ok(store) => {
            let report = Seeder::new(store).run_and_close(&plan).await;
            info!("{}", report.summary());
            0
        }
        Err(e) => {
            report_seed_error(&config, &e);
            1
        }
    }
}

fn report_seed_error(config: &Config, e: &SeedError) {
    match e {
        SeedError::Store(inner) => error!(
            backend = config.database.backend.as_str(),
            "Could not open record store: {inner}"
        ),
        SeedError::Config(inner) => error!("{inner}"),
    }
}

fn run_theme(config: &Config, args: &ThemeArgs) -> i32 {
    let format = args.format.unwrap_or(config.theme.format);
    let rendered = color_table(config.theme.colors_file.as_deref())
        .and_then(|table| ThemePlugin::from_config(&config.theme, &table))
        .and_then(|plugin| plugin.render(format));
    let text = match rendered {
        Ok(text) => text,
        Err(e) => {
            error!("Could not build themes: {e}");
            return 1;
        }
    };

    match &args.output {
        Some(path) => match std::fs::write(path, &text) {
            Ok(()) => {
                info!("Wrote {} themes to {}", format.as_str(), path.display());
                0
            }
            Err(e) => {
                error!("Could not write {}: {e}", path.display());
                1
            }
        },
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            0
        }
    }
}

fn color_table(colors_file: Option<&Path>) -> Result<ColorTable, ThemeError> {
    let Some(path) = colors_file else {
        return Ok(ColorTable::tailwind());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        ThemeError::InvalidTable(format!("failed to read {}: {e}", path.display()))
    })?;
    ColorTable::from_json(&text)
}

fn run_init(args: &InitArgs) -> i32 {
    match initialize_config(args.path.as_deref(), args.force) {
        Ok(ConfigInitResult::Created { path }) => {
            info!("Created {}", path.display());
            0
        }
        Ok(ConfigInitResult::AlreadyInitialized { path }) => {
            warn!(
                "{} already exists; rerun with --force to back it up and replace it",
                path.display()
            );
            0
        }
        Ok(ConfigInitResult::Overwritten { path, backup_path }) => {
            info!(
                "Replaced {} (previous file saved as {})",
                path.display(),
                backup_path.display()
            );
            0
        }
        Err(e) => {
            error!("{}", init_error_message(&e));
            1
        }
    }
}

fn init_error_message(e: &ConfigError) -> String {
    match e {
        ConfigError::Io(err) => format!("failed to write config: {err}"),
        other => other.to_string(),
    }
}

//! atmdash - ATM location dashboard
//!
//! A CLI tool that loads an ATM location dataset, filters it by city and
//! bank, and reports the dashboard aggregates as JSON, Markdown or GeoJSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing dataset, bad config, write failure, etc.)
//!   2 - The selection matched no ATMs and --fail-on-empty was given

mod analysis;
mod cli;
mod config;
mod dashboard;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use dashboard::Dashboard;
use loader::{DatasetLoader, LoadConfig};
use report::{ConsoleSummary, Destination, ReportWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so the config can raise verbosity
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level_with(config.general.verbose));

    info!("atmdash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run(&args, &config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .atmdash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to set the dataset path, delimiter and report format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so reports written to stdout stay parseable.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load the dataset, apply the selection and write the report.
/// Returns the exit code (0 or 2).
fn run(args: &Args, config: &Config) -> Result<i32> {
    let loader = DatasetLoader::new(LoadConfig::from(&config.data));
    let dataset = loader
        .load(&config.data.path)
        .with_context(|| format!("Failed to load dataset {}", config.data.path.display()))?;

    let filter = args.filter();
    let mut dashboard = Dashboard::new(dataset)
        .with_features(config.needs_features())
        .with_city(filter.city.clone());

    if args.list_cities {
        for city in dashboard.city_options() {
            println!("{}", city);
        }
        return Ok(0);
    }

    if args.list_banks {
        for bank in dashboard.bank_options() {
            println!("{}", bank);
        }
        return Ok(0);
    }

    let destination = Destination::from_path(config.general.output.clone());
    let writes_file = matches!(destination, Destination::File(_));

    dashboard.add_renderer(Box::new(ReportWriter::new(
        config.report.format,
        destination,
        config.report.pretty,
    )));
    if writes_file && !args.quiet {
        dashboard.add_renderer(Box::new(ConsoleSummary));
    }

    // One dispatch: the city is already set, so a bank is picked within it.
    let snapshot = if filter.bank.is_all() {
        dashboard.select_city(filter.city)?
    } else {
        dashboard.select_bank(filter.bank)?
    };

    if snapshot.kpis.total == 0 {
        warn!("No ATMs match {}", dashboard.filter());

        if args.fail_on_empty {
            eprintln!("\n⛔ Selection matched no ATMs. Failing (exit code 2).");
            return Ok(2);
        }
    }

    Ok(0)
}

/// Where the configuration came from, reported once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Builtin,
    Fallback(String),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => info!("Loaded default config from {}", DEFAULT_CONFIG_FILE),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Fallback(reason) => warn!("Failed to load config: {}", reason),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Builtin)),
        Err(e) => Ok((Config::default(), ConfigSource::Fallback(format!("{:#}", e)))),
    }
}

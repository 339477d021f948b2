//! Gatework - constraint-gated periodic job scheduler.
//!
//! Demo binary: runs the periodic token refresh job against a
//! file-backed store, with the constraint gate tied to the presence
//! of a marker file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gatework_driver::{
    ConstraintProbe, DriverConfig, IntervalSignalDriver, PathProbe, StaticProbe,
};
use gatework_protocols::TokenStore;
use gatework_scheduler::{
    INITIAL_TOKEN, JobSpec, PeriodicJobScheduler, RefreshTokenAction, TOKEN_KEY,
};
use gatework_store::FileTokenStore;

/// Gatework CLI.
#[derive(Parser)]
#[command(name = "gatework")]
#[command(about = "Constraint-gated periodic job scheduler")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the token refresh job in foreground (default)
    Run {
        /// Refresh period in seconds
        #[arg(long)]
        period_secs: Option<u64>,

        /// Delay before the first window, in seconds
        #[arg(long)]
        initial_delay_secs: Option<u64>,

        /// File whose presence satisfies the constraint gate
        #[arg(long)]
        gate_file: Option<PathBuf>,

        /// Token store path
        #[arg(long)]
        store: Option<PathBuf>,

        /// Constraint poll cadence in seconds
        #[arg(long)]
        probe_secs: Option<u64>,
    },

    /// Print the stored token
    Show {
        /// Token store path
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

/// Settings for the refresh job, loadable from a TOML file.
///
/// Command-line flags override whatever the file says.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunConfig {
    /// Refresh period in seconds.
    #[serde(default = "default_period_secs")]
    period_secs: u64,

    /// Delay before the first window, in seconds.
    #[serde(default)]
    initial_delay_secs: u64,

    /// File whose presence satisfies the constraint gate. When unset
    /// the job runs unconstrained.
    #[serde(default)]
    gate_file: Option<PathBuf>,

    /// Token store path.
    #[serde(default = "default_store_path")]
    store: PathBuf,

    /// Constraint poll cadence in seconds.
    #[serde(default = "default_probe_secs")]
    probe_secs: u64,
}

fn default_period_secs() -> u64 {
    4 * 60 * 60
}

fn default_store_path() -> PathBuf {
    PathBuf::from("gatework-store.json")
}

fn default_probe_secs() -> u64 {
    5
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
            initial_delay_secs: 0,
            gate_file: None,
            store: default_store_path(),
            probe_secs: default_probe_secs(),
        }
    }
}

impl RunConfig {
    /// Load from `path`, or fall back to the defaults.
    fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = RunConfig::load(cli.config.as_deref())?;

    match cli.command {
        None => run(config).await,
        Some(Commands::Run {
            period_secs,
            initial_delay_secs,
            gate_file,
            store,
            probe_secs,
        }) => {
            if let Some(period_secs) = period_secs {
                config.period_secs = period_secs;
            }
            if let Some(initial_delay_secs) = initial_delay_secs {
                config.initial_delay_secs = initial_delay_secs;
            }
            if gate_file.is_some() {
                config.gate_file = gate_file;
            }
            if let Some(store) = store {
                config.store = store;
            }
            if let Some(probe_secs) = probe_secs {
                config.probe_secs = probe_secs;
            }
            run(config).await
        }
        Some(Commands::Show { store }) => show(store.unwrap_or(config.store)).await,
    }
}

/// Run the refresh job until interrupted.
async fn run(config: RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(FileTokenStore::open(&config.store).await?);

    // First run: give the refresh something to replace.
    if store.get_string(TOKEN_KEY, "").await?.is_empty() {
        store.set_string(TOKEN_KEY, INITIAL_TOKEN).await?;
        info!("seeded {} with the initial token", config.store.display());
    }

    let mut spec = JobSpec::new(Duration::from_secs(config.period_secs))
        .with_name("refresh_token")
        .with_initial_delay(Duration::from_secs(config.initial_delay_secs));

    let probe: Arc<dyn ConstraintProbe> = match &config.gate_file {
        Some(path) => {
            spec = spec.with_required_constraint();
            info!("constraint gate: fires only while {} exists", path.display());
            Arc::new(PathProbe::new(path))
        }
        None => Arc::new(StaticProbe::satisfied()),
    };

    let driver_config = DriverConfig {
        constraint_poll_ms: config.probe_secs.saturating_mul(1_000),
        ..DriverConfig::default()
    };
    let driver = Arc::new(IntervalSignalDriver::with_config(driver_config, probe));

    let action = Arc::new(RefreshTokenAction::new(store.clone()));
    let scheduler = PeriodicJobScheduler::register(spec, driver.clone(), action).await?;

    info!(
        "refreshing every {}s (initial delay {}s), press Ctrl+C to stop",
        config.period_secs, config.initial_delay_secs
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    let metrics = scheduler.metrics();
    scheduler.shutdown().await;
    driver.shutdown();

    info!(
        "done: {} fires succeeded, {} failed, {} signals seen",
        metrics.fires_succeeded, metrics.fires_failed, metrics.signals_received
    );
    Ok(())
}

/// Print the stored token.
async fn show(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileTokenStore::open(&path).await?;
    let token = store.get_string(TOKEN_KEY, "<unset>").await?;
    println!("{token}");
    Ok(())
}

//! spacewatchd - space weather monitor daemon

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use spacewatch_store::LoadOutcome;
use spacewatchd::{app, CycleOutcome, MonitorConfig, Scheduler, DEFAULT_CONFIG_PATH};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVES: &str = concat!(
    "spacewatchd=info,spacewatch_alerts=info,spacewatch_sources=info,",
    "spacewatch_store=info,spacewatch_dashboard=info",
);

#[derive(Parser)]
#[command(name = "spacewatchd")]
#[command(about = "Space weather monitor and alerting daemon")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(
        short,
        long,
        global = true,
        env = "SPACEWATCH_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor loop and dashboard until interrupted
    Run {
        /// Do not serve the dashboard
        #[arg(long)]
        no_dashboard: bool,
    },

    /// Run a single cycle and print its report
    Once,

    /// Print the stored alert record
    Status,

    /// Generate a sample config file
    InitConfig {
        /// Path to write config
        #[arg(short, long, default_value = "spacewatch.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVES))?;
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Run { no_dashboard } => run(&cli.config, no_dashboard).await?,
        Commands::Once => once(&cli.config).await?,
        Commands::Status => status(&cli.config)?,
        Commands::InitConfig { output, force } => init_config(&output, force)?,
    }

    Ok(())
}

async fn run(config_path: &Path, no_dashboard: bool) -> anyhow::Result<()> {
    info!(config = %config_path.display(), "starting spacewatchd");

    let config = MonitorConfig::load(config_path)?;
    let store = app::open_store(&config);
    let monitor = Arc::new(app::build_monitor(&config, store.clone())?);
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Forward process signals to every component
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        app::shutdown_signal().await;
        let _ = signal_tx.send(());
    });

    let dashboard = if config.dashboard.enabled && !no_dashboard {
        let server = app::build_dashboard(&config, store);
        let mut rx = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server
                .serve_with_shutdown(async move {
                    let _ = rx.recv().await;
                })
                .await
            {
                error!(error = %e, "dashboard stopped");
            }
        }))
    } else {
        info!("dashboard disabled");
        None
    };

    let scheduler = Scheduler::new(monitor, config.poll_interval());
    let cycles = scheduler.run(shutdown_tx.subscribe()).await;

    if let Some(handle) = dashboard {
        let _ = shutdown_tx.send(());
        if let Err(e) = handle.await {
            error!(error = %e, "dashboard task failed");
        }
    }

    info!(cycles, "spacewatchd stopped");
    Ok(())
}

async fn once(config_path: &Path) -> anyhow::Result<()> {
    let config = MonitorConfig::load(config_path)?;
    let monitor = app::build_monitor(&config, app::open_store(&config))?;

    match monitor.run_cycle().await {
        CycleOutcome::Completed(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        CycleOutcome::Skipped => anyhow::bail!("another cycle is already running"),
        CycleOutcome::Panicked(message) => anyhow::bail!("cycle aborted: {message}"),
    }
}

fn status(config_path: &Path) -> anyhow::Result<()> {
    let config = MonitorConfig::read(config_path)?;

    match app::open_store(&config).load() {
        LoadOutcome::Empty => println!("no data yet ({})", config.state_path.display()),
        LoadOutcome::Corrupt(reason) => {
            anyhow::bail!("record at {} is unreadable: {reason}", config.state_path.display())
        }
        LoadOutcome::Loaded(state) => println!("{}", serde_json::to_string_pretty(&state)?),
    }

    Ok(())
}

fn init_config(output: &Path, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let config = MonitorConfig::default();
    std::fs::write(output, config.to_toml()?)?;

    println!("Config written to {}", output.display());
    println!(
        "Set TWILIO_SID, TWILIO_AUTH, TWILIO_WHATSAPP_FROM and TWILIO_TO, \
         or switch [gateway] kind to \"log\"."
    );
    Ok(())
}

// src/main.rs
use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use farmshift_core::calendar::YearMonth;
use farmshift_core::clock::{Clock, SystemClock};
use farmshift_core::report::write_roster_csv;
use farmshift_core::scheduling::GenerationRun;
use farmshift_core::store::{ItemStore, MemoryTable};
use farmshift_core::{router, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "farmshift", version, about = "Farm staff, task and shift management")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Generate a month of shifts
    Generate {
        #[arg(long)]
        month: String,
        /// Compute without writing anything
        #[arg(long)]
        preview: bool,
        /// Keep existing shifts instead of purging the month first
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Print a month's shifts as JSON
    ListMonth {
        #[arg(long)]
        month: String,
        /// Delete duplicate same-day shifts while listing
        #[arg(long)]
        repair: bool,
    },
    /// Write a month's shifts to a CSV file
    ExportMonth {
        #[arg(long)]
        month: String,
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded: {:?}", config);

    let store: Arc<dyn ItemStore> = match &config.data_file {
        Some(path) => Arc::new(
            MemoryTable::open(path)
                .with_context(|| format!("Failed to open data file {}", path.display()))?,
        ),
        None => {
            warn!("FARMSHIFT_DATA_FILE not set, data lives in memory only");
            Arc::new(MemoryTable::new())
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::new(store, clock, config.exclusive_day_lock);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, state).await,
        Command::Generate {
            month,
            preview,
            no_overwrite,
        } => {
            let run = GenerationRun {
                month: parse_month(&month)?,
                overwrite: !no_overwrite,
                preview,
                requirements: None,
            };
            let outcome = state.scheduler.generate_month(run).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::ListMonth { month, repair } => {
            let month = parse_month(&month)?;
            let shifts = if repair {
                state.scheduler.list_month_repairing(month).await?
            } else {
                state.scheduler.list_month(month).await?
            };
            println!("{}", serde_json::to_string_pretty(&shifts)?);
            Ok(())
        }
        Command::ExportMonth { month, out } => {
            let month = parse_month(&month)?;
            let shifts = state.scheduler.list_month(month).await?;
            let file = File::create(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            write_roster_csv(&shifts, file).context("Failed to write CSV")?;
            info!("Exported {} shifts for {} to {}", shifts.len(), month, out.display());
            Ok(())
        }
    }
}

fn parse_month(month: &str) -> Result<YearMonth> {
    month
        .parse()
        .with_context(|| format!("Invalid --month '{}'", month))
}

async fn serve(config: &Config, state: AppState) -> Result<()> {
    let app = router(state);
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    match config.tls_paths() {
        Some((cert_path, key_path)) => {
            let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
                .await
                .with_context(|| {
                    format!(
                        "Failed to load TLS cert/key from {} and {}",
                        cert_path.display(),
                        key_path.display()
                    )
                })?;
            info!("Starting server on https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        }
        None => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("Starting server on http://{}", addr);
            axum::serve(listener, app).await.context("HTTP server failed")?;
        }
    }
    Ok(())
}

mod config;
mod driver;
mod engine;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use driver::{CameraBackend, Driver};
use engine::SessionStatus;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use valentine_core::checkpoint::checkpoints;
use valentine_core::{CalendarDate, Journey};
use valentine_hw::Camera;

/// Extra time allowed for the camera on top of the model-load timeout.
const STARTUP_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "valentine", about = "Valentine's week journey and crown camera")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the week, one command per line on stdin
    Journey,
    /// Run the crown camera on its own and save a snapshot
    Crown {
        /// Seconds to keep the overlay live before capturing
        #[arg(long, default_value_t = 5)]
        seconds: u64,
        /// Where to write the PNG (defaults to the configured file name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List the checkpoints and which ones are open
    Checkpoints {
        /// Date to check against, YYYY-MM-DD
        #[arg(long)]
        date: Option<CalendarDate>,
    },
    /// List capture devices
    Cameras,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries rendered views; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Journey => {
            let assets = config.assets()?;
            let journey = Journey::new(config.journey_options());
            let mut driver = Driver::new(
                journey,
                assets,
                config.viewport(),
                CameraBackend::system(&config),
                std::io::stdout(),
            );
            driver.run(BufReader::new(tokio::io::stdin())).await?;
        }
        Commands::Crown { seconds, out } => crown(&config, Duration::from_secs(seconds), out).await?,
        Commands::Checkpoints { date } => {
            let today = date.or(config.reference_date).unwrap_or_else(CalendarDate::today);
            println!("Today: {today}");
            for c in checkpoints() {
                let state = if c.is_unlocked(today) { "open" } else { "locked 🔒" };
                println!(
                    "{:>2}  {:<6}  {} {:<14} {state}",
                    c.day,
                    c.unlock_date.short_label(),
                    c.emoji,
                    c.name
                );
            }
        }
        Commands::Cameras => {
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("No capture devices found");
            }
            for d in devices {
                println!("{}  {} ({}, {})", d.path, d.name, d.driver, d.bus);
            }
        }
    }

    Ok(())
}

async fn crown(config: &Config, hold: Duration, out: Option<PathBuf>) -> Result<()> {
    let assets = config.assets()?;
    let mut session = CameraBackend::system(config).start();
    let mut status = session.subscribe();

    let limit = Duration::from_secs(config.model_load_timeout_secs) + STARTUP_GRACE;
    let ready = tokio::time::timeout(
        limit,
        status.wait_for(|s| matches!(s, SessionStatus::Live | SessionStatus::Failed(_))),
    )
    .await
    .context("overlay did not start in time")?
    .context("overlay session ended")?
    .clone();

    if let SessionStatus::Failed(failure) = ready {
        session.close();
        anyhow::bail!("{failure}");
    }

    println!("Crown is live, capturing in {}s...", hold.as_secs());
    tokio::time::sleep(hold).await;

    let snapshot = session.capture()?;
    let path = out.unwrap_or_else(|| PathBuf::from(&assets.snapshot_file_name));
    snapshot
        .save(&path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    session.close();

    tracing::info!(frames = session.frames_drawn(), "crown session finished");
    println!("Saved {}x{} snapshot to {}", snapshot.width, snapshot.height, path.display());
    Ok(())
}

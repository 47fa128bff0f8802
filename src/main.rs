mod app;
mod config;
mod controller;
mod error;
mod export;
mod presenter;
mod service;
mod steps;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use controller::ResponseOrdering;
use error::AppError;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "artix-config",
    version,
    about = "Describe an Artix installation and get a setup.conf back"
)]
pub struct Cli {
    /// Base URL of the generation service.
    #[arg(long, env = "ARTIX_CONFIG_SERVER", default_value = "http://127.0.0.1:5000")]
    pub server: String,

    /// Directory that receives downloaded `setup.conf` files.
    #[arg(long, env = "ARTIX_CONFIG_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Replace an existing `setup.conf` instead of numbering the new one.
    #[arg(long)]
    pub overwrite: bool,

    /// Seconds to wait for the service before a request counts as failed.
    #[arg(long, env = "ARTIX_CONFIG_TIMEOUT", default_value_t = 60)]
    pub timeout_secs: u64,

    /// Ignore responses to submissions that have since been superseded.
    #[arg(long)]
    pub latest_wins: bool,
}

impl Cli {
    pub fn ordering(&self) -> ResponseOrdering {
        if self.latest_wins {
            ResponseOrdering::LatestSubmissionWins
        } else {
            ResponseOrdering::LastResponseWins
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        println!();
        ui::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}

/// Single-threaded runtime; everything interactive lives on one `LocalSet`.
fn run(cli: Cli) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, app::run(cli))
}

/// Diagnostics go to stderr, quiet unless `RUST_LOG` asks for more.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

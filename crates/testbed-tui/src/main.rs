//! Terminal controller for the co-design testbed.
//!
//! Lets an operator trigger simulated hardware validations for the
//! components of the active morphology, watch live telemetry, and keep an
//! append-only audit log of the session.

use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use testbed_core::Morphology;
use testbed_dispatch::{AuditLog, CallbackQueue, TaskDispatcher, TestbedHal};

mod app;
mod render;
mod state;
mod telemetry;

use app::App;
use state::UiState;

#[derive(Parser)]
#[command(name = "testbed-tui")]
#[command(about = "Co-Design Testbed Controller")]
#[command(version)]
struct Cli {
    /// Morphology config as a JSON file; defaults to the built-in
    /// quadruped rig
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base simulated validation latency in milliseconds
    #[arg(long, default_value = "1500")]
    latency_ms: u64,

    /// Probability [0, 1] that a validation fails (fault injection)
    #[arg(long, default_value = "0.0")]
    fault_rate: f64,

    /// Directory for the append-only audit log
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// Telemetry sample period in milliseconds
    #[arg(long, default_value = "100")]
    sample_ms: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing - write to file to avoid terminal interference
    // Logs go to /tmp/testbed-tui.log
    let log_file = std::fs::File::create("/tmp/testbed-tui.log").ok();
    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_env_filter("testbed_core=debug,testbed_dispatch=debug,testbed_tui=debug")
            .with_ansi(false)
            .init();
    }

    let cli = Cli::parse();

    // Load and validate the morphology before any UI is constructed, so a
    // bad config fails fast with a readable error.
    let morphology = match &cli.config {
        Some(path) => Morphology::from_file(path)?,
        None => Morphology::default(),
    };

    info!(morphology = %morphology.name, "Starting testbed controller");

    let audit = Arc::new(AuditLog::create(&cli.log_dir, &morphology.name));
    let hal = TestbedHal::new(&morphology.name)
        .with_latency(Duration::from_millis(cli.latency_ms))
        .with_fault_rate(cli.fault_rate);

    // Deferred-callback queue between worker threads and the UI loop
    let (callback_tx, callback_rx) = CallbackQueue::unbounded::<UiState>();
    let dispatcher = TaskDispatcher::new(Arc::new(callback_tx.clone()), Arc::clone(&audit));

    // Background telemetry sampler
    let shutdown = Arc::new(AtomicBool::new(false));
    let sampler = telemetry::spawn_sampler(
        hal.clone(),
        callback_tx,
        Arc::clone(&audit),
        Duration::from_millis(cli.sample_ms),
        Arc::clone(&shutdown),
    );

    // Initialize terminal (enters alternate screen, enables raw mode)
    let terminal = ratatui::init();

    // Run UI loop on main thread
    let mut app = App::new(
        UiState::new(&morphology),
        callback_rx,
        dispatcher,
        hal,
        Arc::clone(&audit),
    );
    let result = app.run(terminal);

    // Restore terminal (exits alternate screen, disables raw mode)
    ratatui::restore();

    // Stop the sampler; validation workers are fire-and-forget and exit
    // with the process.
    shutdown.store(true, Ordering::Relaxed);
    let _ = sampler.join();

    info!("Controller shutdown complete");

    result.map_err(|e| e.into())
}

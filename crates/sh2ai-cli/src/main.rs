use std::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sh2ai_core::{Patcher, PatcherConfig, StopSignal, check_memory_access};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod status;

#[derive(Parser)]
#[command(name = "sh2ai", version)]
#[command(about = "Keeps AI opponents enabled in Stronghold 2 multiplayer")]
struct Args {
    /// Emit events as JSON lines instead of human-readable status
    #[arg(long)]
    json: bool,

    /// Skip the effective-uid check (for CAP_SYS_PTRACE setups)
    #[arg(long)]
    skip_privilege_check: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sh2ai=info".parse()?)
                .add_directive("sh2ai_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if !args.skip_privilege_check {
        check_memory_access()?;
    }

    // Ctrl-C requests a stop; the worker is joined below before exiting.
    let shutdown = Arc::new(StopSignal::new());
    let shutdown_handler = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        shutdown_handler.request();
    })?;

    let (mut patcher, events) = Patcher::new(PatcherConfig::default());
    patcher.start();
    info!("monitoring for Stronghold 2 (Ctrl-C to quit)");

    let mut printer = status::StatusPrinter::new(args.json);
    while !shutdown.is_requested() {
        match events.recv_timeout(Duration::from_millis(250)) {
            Ok(event) => printer.print(&event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    patcher.stop();
    info!("AI enabled {} times this session", printer.enabled_count());

    Ok(())
}

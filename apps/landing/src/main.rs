use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

mod backend_bridge;
mod script;
mod session;

use anyhow::{Context, Result};
use backend_bridge::{commands::BackendCommand, runtime::spawn_backend_thread};
use clap::Parser;
use crossbeam_channel::bounded;
use page_core::{dom::landing_page, load_settings, submission::submitter_from_settings, PageController};
use session::Session;
use shared::protocol::PageEvent;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Plays a scripted visit against the landing page and prints the final page")]
struct Args {
    /// TOML file layered over the built-in site settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON lines of `{"after_ms": .., "event": ..}`. Defaults to the bundled demo visit.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Post submissions to the configured endpoint instead of simulating them.
    #[arg(long)]
    http: bool,
    /// How long to wait for outstanding timers and submissions after the script ends.
    #[arg(long, default_value_t = 15_000)]
    settle_timeout_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    let config = load_settings(args.config.as_deref())?;
    let submitter = submitter_from_settings(&config.submission, args.http)?;
    let steps = script::load_script(args.script.as_deref())?;
    let doc = landing_page(&config);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (event_tx, event_rx) = bounded::<PageEvent>(1024);
    let worker = spawn_backend_thread(cmd_rx, event_tx, submitter);

    let mut session = Session::new(PageController::new(config), doc, cmd_tx.clone());
    tracing::info!(steps = steps.len(), "starting scripted visit");

    for step in steps {
        session.pump_until(&event_rx, Instant::now() + step.delay());
        session.user_event(step.event);
    }

    let settle_deadline = Instant::now() + Duration::from_millis(args.settle_timeout_ms);
    if !session.settle(&event_rx, settle_deadline) {
        tracing::warn!("page still had outstanding work when the settle timeout expired");
    }
    tracing::info!(
        submitting = session.controller().state().submission.is_submitting(),
        pending_timers = session.controller().state().pending_timers(),
        "visit finished"
    );

    if let Err(err) = session::send_backend_command(&cmd_tx, BackendCommand::Shutdown) {
        tracing::warn!(error = %err, "backend worker already stopped");
    }
    if worker.join().is_err() {
        tracing::error!("backend worker panicked");
    }

    let snapshot = serde_json::to_string_pretty(&session.document().snapshot())
        .context("failed to serialize page snapshot")?;
    println!("{snapshot}");
    Ok(())
}

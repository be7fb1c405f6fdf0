//! KbSwitch service entry point.
//!
//! ```text
//! kbswitch [--config <PATH>] <COMMAND>
//!
//! Commands:
//!   run                 Start the engine and feed it input events
//!   check <DESCRIPTOR>  Print the canonical form of a shortcut descriptor
//!   bindings            List the configured shortcut slots
//! ```
//!
//! `run` reads events from stdin, one per line (`down <vk>`, `up <vk>`,
//! `focus <app-id>`). On Windows, `run --hooks` captures the real keyboard
//! instead. Ctrl-C or end of input stops it.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config_from()       -- TOML config, defaults on first run
//!  └─ LastLayoutWriter::spawn  -- background last_layout persistence
//!  └─ SwitchEngine::new/start  -- registry, layout service, indicator slot
//!  └─ InputSource::start       -- replay (stdin) or Windows hooks
//!       └─ input pump thread   -- engine.handle_input(event)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kbswitch_core::shortcut::codec;
use kbswitch_service::infrastructure::host_bridge::SwitchEngine;
use kbswitch_service::infrastructure::input_capture::{replay::ReplayInputSource, InputSource};
use kbswitch_service::infrastructure::storage::config::{
    load_config_from, resolve_config_path, AppConfig, CONFIG_PATH_ENV,
};
use kbswitch_service::infrastructure::storage::preferences::LastLayoutWriter;

/// How long shutdown waits for the last layout to reach disk.
const PERSIST_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keyboard layout switching service.
#[derive(Debug, Parser)]
#[command(name = "kbswitch", about = "Keyboard layout switching service", version)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Start the engine and feed it input events until Ctrl-C or end of input.
    Run {
        /// Capture the real keyboard with OS hooks (Windows only).
        #[arg(long)]
        hooks: bool,
    },
    /// Print the canonical form of a shortcut descriptor, or why it is unbound.
    Check { descriptor: String },
    /// List the configured shortcut slots with their canonical descriptors.
    Bindings,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = resolve_config_path(cli.config.as_deref())
        .context("could not locate the config file; pass --config")?;
    let loaded = load_config_from(&path);

    // Level from RUST_LOG, else the config's log_level.
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.service.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = loaded.with_context(|| format!("failed to load config from {}", path.display()))?;

    match cli.command {
        CliCommand::Run { hooks } => run(config, path, hooks).await,
        CliCommand::Check { descriptor } => {
            check(&descriptor);
            Ok(())
        }
        CliCommand::Bindings => {
            bindings(&config, path);
            Ok(())
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run(config: AppConfig, path: PathBuf, hooks: bool) -> anyhow::Result<()> {
    info!(config = %path.display(), "KbSwitch starting");

    let (writer, writer_task) = LastLayoutWriter::spawn(path);
    let engine = SwitchEngine::new(&config, Arc::new(writer));

    let mut changes = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(change) = changes.recv().await {
            info!(channel = change.channel, layout = %change.layout, "layout changed");
        }
    });

    engine.start();

    let source = input_source(hooks)?;
    let rx = source.start().context("failed to start input source")?;

    // A plain thread rather than spawn_blocking: stdin reads cannot be
    // cancelled, and the runtime would wait on them at shutdown.
    let (done_tx, done_rx) = oneshot::channel::<()>();
    let pump_engine = Arc::clone(&engine);
    std::thread::Builder::new()
        .name("kbswitch-input-pump".to_string())
        .spawn(move || {
            for event in rx {
                pump_engine.handle_input(event);
            }
            drop(pump_engine);
            let _ = done_tx.send(());
        })
        .context("failed to start input pump")?;

    info!("KbSwitch ready.  Press Ctrl-C to exit.");

    let input_ended = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "could not listen for Ctrl-C");
            }
            info!("shutdown signal received");
            false
        }
        _ = done_rx => {
            info!("input ended");
            true
        }
    };

    source.stop();
    drop(engine);
    if input_ended {
        // Every sender is gone, so the writer drains and exits.
        if tokio::time::timeout(PERSIST_FLUSH_TIMEOUT, writer_task).await.is_err() {
            warn!("timed out waiting for the last layout to be persisted");
        }
    }

    info!("KbSwitch stopped");
    Ok(())
}

fn input_source(hooks: bool) -> anyhow::Result<Box<dyn InputSource>> {
    if !hooks {
        return Ok(Box::new(ReplayInputSource::stdin()));
    }

    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(
            kbswitch_service::infrastructure::input_capture::windows::WindowsInputSource::new(),
        ))
    }

    #[cfg(not(target_os = "windows"))]
    {
        anyhow::bail!("--hooks is only supported on Windows")
    }
}

fn check(descriptor: &str) {
    match codec::parse_trigger(descriptor) {
        Ok(trigger) => println!("{trigger}"),
        Err(e) => println!("unbound ({e})"),
    }
}

fn bindings(config: &AppConfig, path: PathBuf) {
    let (writer, _writer_task) = LastLayoutWriter::spawn(path);
    let engine = SwitchEngine::new(config, Arc::new(writer));

    for (slot, descriptor) in engine.bindings() {
        let slot = slot.to_string();
        let canonical = codec::serialize(codec::parse(&descriptor).as_ref());
        if canonical.is_empty() {
            println!("{slot:<20} unbound");
        } else {
            println!("{slot:<20} {canonical}");
        }
    }
}

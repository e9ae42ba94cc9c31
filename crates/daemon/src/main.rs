// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Valor Daemon (valord)
//!
//! Background process that owns the job queue and runs agent sessions.
//!
//! Architecture:
//! - Supervisor: one worker loop per project, plus watchdog + checkpoints
//! - The chat bridge runs elsewhere and enqueues jobs through the store

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use valor_adapters::agent::ProcessSessionEngine;
use valor_adapters::classify::CommandClassifier;
use valor_adapters::notify::DesktopNotifyAdapter;
use valor_adapters::transport::NoOpChatTransport;
use valor_core::{SystemClock, UuidIdGen};
use valor_daemon::{Config, Supervisor, SupervisorExit};
use valor_engine::RestartSignal;
use valor_storage::JobStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before touching config or state
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("valord {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("valord {}", env!("CARGO_PKG_VERSION"));
                println!("Valor Daemon - runs the job queue and agent sessions");
                println!();
                println!("USAGE:");
                println!("    valord");
                println!();
                println!("State lives under $VALOR_STATE_DIR (default ~/.local/state/valor).");
                println!("Configuration is read from config.toml in that directory.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: valord [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    let _log_guard = setup_logging(&config)?;

    info!(state_dir = %config.state_dir.display(), "starting valord");

    let clock = SystemClock;
    let store = JobStore::open(&config.store_dir, clock.clone(), UuidIdGen)?;

    // Crash recovery: nothing can be live at startup, so every job left
    // `running` gets its one bounded revival.
    match store.recover(|_| false) {
        Ok(report) if !report.is_empty() => {
            info!(
                revived = report.revived.len(),
                failed = report.failed.len(),
                "crash recovery complete",
            );
        }
        Ok(_) => {}
        Err(e) => {
            error!(error = %e, "crash recovery failed");
            return Err(e.into());
        }
    }

    let restart = RestartSignal::with_flag_file(&config.restart_flag_path);
    restart.clear();

    let supervisor = Supervisor::new(
        store,
        ProcessSessionEngine::new(config.agent.clone()),
        CommandClassifier::new(config.classifier.clone()),
        NoOpChatTransport,
        DesktopNotifyAdapter,
        clock,
        restart,
        config,
    );

    let shutdown = Arc::new(Notify::new());
    let mut supervisor_handle = {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(supervisor.run(shutdown))
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("valord ready");

    let exit = tokio::select! {
        result = &mut supervisor_handle => result?,
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
            shutdown.notify_waiters();
            supervisor_handle.await?
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
            shutdown.notify_waiters();
            supervisor_handle.await?
        }
    };

    match exit {
        SupervisorExit::Restart => {
            info!("exiting for restart; process manager takes it from here");
        }
        SupervisorExit::Shutdown => {
            info!("valord stopped");
        }
    }

    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.logs_dir)?;
    let appender = tracing_appender::rolling::daily(&config.logs_dir, "valord.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

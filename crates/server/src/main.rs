// SPDX-License-Identifier: MIT

//! `jitrealmd`: the JitRealm driver binary. Three modes selected by CLI
//! flags: a single-user console session (default), a
//! multi-user TCP server (`--server`), and a deterministic benchmark
//! harness (`--perfbench`) that never binds a socket.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cli;
mod config;
mod connection;
mod error;
mod lifecycle;
mod perfbench;
mod runtime;
mod world_setup;

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use jit_commands::{builtins, CommandRegistry, Dispatcher};
use jit_core::{Clock, SystemClock};
use parking_lot::{Mutex, RwLock};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::error::ServerError;
use crate::lifecycle::{save_snapshot, startup, ResolvedPaths};
use crate::runtime::{notify_sessions_of_shutdown, run_server_mode, Shared};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(|| std::path::PathBuf::from("jitrealm.toml"));
    let mut config = config::load(&config_path)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.perfbench {
        return perfbench::run(&config, &cli.bench);
    }

    let paths = ResolvedPaths::from_config(&config);
    let _log_guard = setup_logging(&paths);
    info!(port = config.server.port, "starting {}", config.server.mud_name);

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async_main(config, cli, paths))
}

async fn async_main(config: config::AppConfig, cli: Cli, paths: ResolvedPaths) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let started = match startup(&config, &paths, clock.as_ref()) {
        Ok(started) => started,
        Err(e) => {
            error!(error = %e, "startup failed");
            anyhow::bail!(e);
        }
    };

    let mut registry = CommandRegistry::new();
    builtins::register_all(&mut registry)?;
    let dispatcher = Dispatcher::new(registry);

    let shared = Arc::new(Shared {
        world: Mutex::new(started.world),
        sessions: RwLock::new(HashMap::new()),
        config,
        paths,
        dispatcher,
        clock,
    });
    // Held for the process lifetime; released on drop at the end of this
    // function (or, on an early `?` return, when `shared` itself is dropped).
    let _lock = started.lock;

    let cancel = CancellationToken::new();
    let shutdown = spawn_shutdown_listener(cancel.clone());

    if cli.server {
        run_server(Arc::clone(&shared), cancel).await?;
    } else {
        run_console(Arc::clone(&shared), &cli, cancel).await?;
    }

    shutdown.abort();
    notify_sessions_of_shutdown(&shared);
    if let Err(e) = save_snapshot(&shared.world.lock(), &shared.paths, shared.clock.as_ref()) {
        error!(error = %e, "final snapshot save failed");
    }
    info!("shutdown complete");
    Ok(())
}

async fn run_server(shared: Arc<Shared>, cancel: CancellationToken) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", shared.config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::BindFailed(addr.clone(), e))?;
    info!(%addr, "listening");
    run_server_mode(shared, listener, cancel).await;
    Ok(())
}

/// Single-user console session: reads lines from stdin, dispatches them
/// against the same world/command
/// pipeline a network session would use, and prints the results to
/// stdout. `--player`/`--password` log in non-interactively; otherwise the
/// console prompts for both the way the network login handshake does.
async fn run_console(shared: Arc<Shared>, cli: &Cli, cancel: CancellationToken) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let (name, password) = match (&cli.player, &cli.password) {
        (Some(name), Some(password)) => (name.clone(), password.clone()),
        _ => {
            print!("What is your name? ");
            io::stdout().flush()?;
            let name = next_line(&mut lines)?;
            print!("Password: ");
            io::stdout().flush()?;
            let password = next_line(&mut lines)?;
            (name, password)
        }
    };

    let account = console_login(&shared, &name, &password)?;
    let heartbeat_interval = std::time::Duration::from_secs(shared.config.game_loop.default_heartbeat_seconds.max(1));

    let player_id = {
        let mut world = shared.world.lock();
        let now = shared.clock.now();
        let now_ms = shared.clock.epoch_ms();
        let start_room = jit_core::BlueprintId::new(&shared.config.paths.start_room);
        let room_id = connection::ensure_singleton(&mut world, &start_room, heartbeat_interval, now, now_ms)?;
        let player_blueprint = jit_core::BlueprintId::new(&shared.config.paths.player_blueprint);
        let (player_id, _) = world.spawn(&player_blueprint, Some(account.state.clone()), heartbeat_interval, now, now_ms)?;
        world.move_object(player_id.clone(), room_id, now, now_ms)?;
        player_id
    };

    println!("Welcome, {}.", account.name);

    loop {
        if cancel.is_cancelled() {
            break;
        }
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let now = shared.clock.now();
        let now_ms = shared.clock.epoch_ms();
        let mut world = shared.world.lock();
        match shared
            .dispatcher
            .dispatch(&mut world, &player_id, &account.name, account.wizard, &line, now, now_ms)
        {
            Ok(outcome) => {
                for l in &outcome.lines {
                    println!("{l}");
                }
                if outcome.disconnect {
                    break;
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    persist_console_player(&shared, &account.name, &player_id);
    Ok(())
}

fn next_line(lines: &mut io::Lines<io::StdinLock<'_>>) -> anyhow::Result<String> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => anyhow::bail!("stdin closed during login"),
    }
}

fn console_login(shared: &Shared, name: &str, password: &str) -> anyhow::Result<jit_persistence::PlayerAccount> {
    let existing = jit_persistence::load_account(&shared.paths.players_dir, name)?;
    match existing {
        Some(_) => {
            if !jit_persistence::validate_credentials(&shared.paths.players_dir, name, password) {
                anyhow::bail!("login failed for {name}");
            }
            let Some(account) = jit_persistence::load_account(&shared.paths.players_dir, name)? else {
                anyhow::bail!("account for {name} vanished between validation and load");
            };
            Ok(account)
        }
        None => Ok(jit_persistence::create_account(&shared.paths.players_dir, name, password, chrono::Utc::now())?),
    }
}

fn persist_console_player(shared: &Shared, name: &str, player_id: &jit_core::ObjectId) {
    let world = shared.world.lock();
    let Some(instance) = world.objects.get(player_id) else {
        return;
    };
    let Ok(Some(mut account)) = jit_persistence::load_account(&shared.paths.players_dir, name) else {
        return;
    };
    account.state = instance.state.clone();
    account.last_login = Some(chrono::Utc::now());
    let _ = jit_persistence::save_account(&shared.paths.players_dir, &account);
}

/// Two-signal shutdown: the first SIGTERM/SIGINT cancels `cancel` so the
/// running mode can drain and save;
/// a second one before that drain finishes aborts the process immediately
/// rather than waiting on a hung world-code call.
fn spawn_shutdown_listener(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut sigint = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to install SIGINT handler");
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
        }
        cancel.cancel();

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        warn!("second signal received, aborting immediately");
        std::process::exit(130);
    })
}

fn setup_logging(paths: &ResolvedPaths) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = paths.save_dir.join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "jitrealmd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    guard
}

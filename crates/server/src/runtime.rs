// SPDX-License-Identifier: MIT

//! Shared server state, the accept loop, and the tick loop. The
//! world-state critical section is a `parking_lot::Mutex` and the
//! session table its own `parking_lot::RwLock`, so session list
//! mutations block only new-connection/disconnection, not sends —
//! routing a tick-produced message to a session only needs a read lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use jit_commands::Dispatcher;
use jit_core::{Clock, ObjectId, SessionId};
use jit_world::{message_queue, recipients_for, MessageReceiver, WorldState};
use parking_lot::{Mutex, RwLock};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::connection::{handle_connection, tell_session, SessionHandle};
use crate::lifecycle::{save_snapshot, ResolvedPaths};

/// Everything a connection task or the tick loop needs, shared behind a
/// single `Arc`. `clock` is the one place wall time enters the system —
/// every other function takes `now`/`now_ms` as parameters instead of
/// calling `Instant::now()`/`SystemTime::now()` itself.
pub struct Shared {
    pub world: Mutex<WorldState>,
    pub sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    pub config: AppConfig,
    pub paths: ResolvedPaths,
    pub dispatcher: Dispatcher,
    pub clock: Arc<dyn Clock>,
}

/// Runs the accept loop (server mode) or nothing (console mode drives its
/// own connection directly) plus the tick loop, until `cancel` fires.
/// Returns once both have wound down so the caller can snapshot and
/// release the lock.
pub async fn run_server_mode(shared: Arc<Shared>, listener: TcpListener, cancel: CancellationToken) {
    let (messages_tx, messages_rx) = message_queue();
    shared.world.lock(); // sanity: world must already be built by the caller

    let tick_handle = tokio::spawn(tick_loop(Arc::clone(&shared), messages_rx, cancel.clone()));
    let accept_handle = tokio::spawn(accept_loop(listener, Arc::clone(&shared), cancel.clone(), messages_tx));

    let _ = tokio::join!(tick_handle, accept_handle);
}

async fn accept_loop(listener: TcpListener, shared: Arc<Shared>, cancel: CancellationToken, _messages_tx: jit_world::MessageSender) {
    let mut next_conn = 0u64;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("accept loop stopping");
                return;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        if shared.sessions.read().len() >= shared.config.server.max_connections {
                            warn!(%addr, "rejecting connection: at MaxConnections");
                            continue;
                        }
                        next_conn += 1;
                        let session_id = SessionId::for_player(format!("conn-{next_conn}"));
                        let shared = Arc::clone(&shared);
                        let cancel = cancel.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, session_id, shared, cancel).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                }
            }
        }
    }
}

/// Tick loop: advance clock, drain due heartbeats/callouts/combat rounds
/// through the safe invoker, drain the message queue to sessions, honour
/// the shutdown flag. Runs at `GameLoop.LoopDelayMs` cadence.
async fn tick_loop(shared: Arc<Shared>, mut messages_rx: MessageReceiver, cancel: CancellationToken) {
    let delay = Duration::from_millis(shared.config.game_loop.loop_delay_ms.max(1));
    let round_interval = Duration::from_secs(shared.config.combat.round_interval_seconds.max(1));
    let mut interval = tokio::time::interval(delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("tick loop stopping");
                return;
            }
            _ = interval.tick() => {
                run_one_tick(&shared, &mut messages_rx, round_interval);
            }
        }
    }
}

fn run_one_tick(shared: &Arc<Shared>, messages_rx: &mut MessageReceiver, round_interval: Duration) {
    let now = shared.clock.now();
    let now_ms = shared.clock.epoch_ms();
    let mut world = shared.world.lock();
    world.metrics.ticks += 1;

    let due_heartbeats: Vec<ObjectId> = world.heartbeat.due(now);
    for id in due_heartbeats {
        world.metrics.heartbeats_fired += 1;
        world.fire_heartbeat(&id, now, now_ms);
    }

    let due_callouts = world.callouts.due(now);
    for callout in &due_callouts {
        world.metrics.callouts_fired += 1;
        world.fire_callout(callout, now, now_ms);
    }

    let due_rounds = world.combat.rounds_due(now, round_interval);
    for _pair in due_rounds {
        // Damage resolution belongs to the external `kill` command; the
        // tick loop's job is only to keep the counter honest.
        world.metrics.combat_rounds += 1;
    }

    drop(world);
    deliver_messages(shared, messages_rx);

    if shared.config.game_loop.auto_save_enabled {
        maybe_auto_save(shared, now_ms);
    }
}

fn deliver_messages(shared: &Arc<Shared>, messages_rx: &mut MessageReceiver) {
    let drained = messages_rx.drain();
    if drained.is_empty() {
        return;
    }
    let sessions = shared.sessions.read();
    let routing: Vec<(&ObjectId, &ObjectId)> = sessions
        .values()
        .filter_map(|h| Some((h.player_id.as_ref()?, h.room.as_ref()?)))
        .collect();

    for message in &drained {
        let recipients = recipients_for(message, routing.iter().copied());
        for recipient in recipients {
            if let Some(handle) = sessions.values().find(|h| h.player_id.as_ref() == Some(recipient)) {
                let _ = handle.outbound.send(format!("{}\r\n", message.text));
            }
        }
    }
}

/// Best-effort periodic autosave; failures are logged and the world state
/// stays in-memory, retried on the next save cycle.
fn maybe_auto_save(shared: &Arc<Shared>, now_ms: u64) {
    use std::sync::atomic::{AtomicU64, Ordering};
    static LAST_SAVE: AtomicU64 = AtomicU64::new(0);

    let interval_ms = shared.config.game_loop.auto_save_interval_minutes.saturating_mul(60_000);
    if interval_ms == 0 {
        return;
    }
    let last = LAST_SAVE.load(Ordering::Relaxed);
    if now_ms.saturating_sub(last) < interval_ms {
        return;
    }
    LAST_SAVE.store(now_ms, Ordering::Relaxed);

    let world = shared.world.lock();
    match save_snapshot(&world, &shared.paths) {
        Ok(()) => {
            drop(world);
            shared.world.lock().metrics.snapshots_saved += 1;
            info!("autosave complete");
        }
        Err(e) => warn!(error = %e, "autosave failed"),
    }
}

/// Notifies every connected session of an impending shutdown.
pub fn notify_sessions_of_shutdown(shared: &Shared) {
    let sessions = shared.sessions.read();
    for handle in sessions.values() {
        let _ = handle.outbound.send("Server is shutting down.\r\n".to_string());
    }
}

// SPDX-License-Identifier: MIT

//! Per-session reader/writer pair: one accept loop spawns one reader
//! cooperative unit and one writer per session. The writer task owns the
//! socket's write half and is the only thing that ever writes to it, so
//! draining the outbound channel in order is the per-session output
//! mutex that keeps a concurrent tick message from interleaving mid-line
//! with editor redraws.

use std::sync::Arc;
use std::time::Instant;

use jit_core::{BlueprintId, ObjectId};
use jit_session::{DefaultRenderer, Draw, LineOutcome, Renderer, SessionState};
use jit_world::WorldState;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;

use crate::runtime::Shared;

/// What the tick loop and other sessions need to reach a connected
/// session: where to route text, and the routing keys (player id, room).
pub struct SessionHandle {
    pub player_id: Option<ObjectId>,
    pub room: Option<ObjectId>,
    pub outbound: UnboundedSender<String>,
}

/// Renders `lines` the way the session has negotiated (CRLF, ANSI on/off)
/// and queues them on its outbound channel. Best-effort: a session whose
/// writer task already exited silently drops the line — the only
/// failure mode is no receiver left.
pub fn tell_session(outbound: &UnboundedSender<String>, session: &SessionState, lines: &[String]) {
    let renderer = DefaultRenderer;
    let opts = session.render_options();
    for line in lines {
        let rendered = renderer.render(&Draw::Text(format!("{line}\r\n")), &opts);
        let _ = outbound.send(rendered);
    }
}

/// Finds (or clones) the world instance for `blueprint`'s single canonical
/// room/singleton (used for the start room): the first live instance of
/// that blueprint if one survived a snapshot restore, otherwise a fresh
/// clone.
pub fn ensure_singleton(
    world: &mut WorldState,
    blueprint: &BlueprintId,
    heartbeat_interval: std::time::Duration,
    now: Instant,
    now_ms: u64,
) -> anyhow::Result<ObjectId> {
    if let Some(existing) = world.objects.iter().find(|i| i.blueprint_id == *blueprint).map(|i| i.object_id.clone()) {
        return Ok(existing);
    }
    let (id, _) = world.spawn(blueprint, None, heartbeat_interval, now, now_ms)?;
    Ok(id)
}

/// Drives one connection end to end: login, then a read/dispatch loop.
/// Runs until the socket closes, the player `quit`s, or `cancel` fires.
pub async fn handle_connection(stream: TcpStream, session_id: jit_core::SessionId, shared: Arc<Shared>, cancel: tokio_util::sync::CancellationToken) {
    let (mut read_half, mut write_half) = tokio::io::split(stream);
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(line) = outbound_rx.recv().await {
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    shared.sessions.write().insert(
        session_id.clone(),
        SessionHandle {
            player_id: None,
            room: None,
            outbound: outbound_tx.clone(),
        },
    );

    let mut session = SessionState::new(session_id.clone());
    let welcome = shared.config.server.welcome_message.clone();
    tell_session(&outbound_tx, &session, &[welcome]);

    if let Err(e) = read_loop(&mut read_half, &mut session, &shared, &outbound_tx, &cancel).await {
        info!(session = %session_id, error = %e, "connection closed");
    }

    if let Some(player_id) = session.player_id.clone() {
        persist_player_on_disconnect(&shared, &session, &player_id);
    }
    shared.sessions.write().remove(&session_id);
    drop(outbound_tx);
    let _ = writer.await;
}

async fn read_loop(
    read_half: &mut ReadHalf<TcpStream>,
    session: &mut SessionState,
    shared: &Arc<Shared>,
    outbound_tx: &UnboundedSender<String>,
    cancel: &tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    let mut buf = [0u8; 512];

    login(session, shared, outbound_tx, read_half, &mut buf).await?;

    loop {
        let n = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            n = read_half.read(&mut buf) => n?,
        };
        if n == 0 {
            return Ok(());
        }
        for &byte in &buf[..n] {
            if let LineOutcome::Line(line) = session.editor.feed_byte(byte) {
                let disconnect = dispatch_line(session, shared, outbound_tx, &line);
                if disconnect {
                    return Ok(());
                }
            }
        }
    }
}

/// Reads one whole line of raw bytes (not yet through the line editor,
/// since login prompts are simple request/response and don't need
/// history/cursor editing) and returns it trimmed of CR/LF.
async fn read_raw_line(read_half: &mut ReadHalf<TcpStream>, buf: &mut [u8; 512]) -> anyhow::Result<Option<String>> {
    let mut line = Vec::new();
    loop {
        let n = read_half.read(buf).await?;
        if n == 0 {
            return Ok(None);
        }
        for &byte in &buf[..n] {
            if byte == b'\n' {
                let text = String::from_utf8_lossy(&line).trim_end_matches('\r').to_string();
                return Ok(Some(text));
            }
            line.push(byte);
        }
    }
}

/// Runs the login handshake: name, then password, against the on-disk
/// account store — creating a new account if the name is unused.
/// On success places the player in their last location (falling back to
/// the configured start room) and records the session's identity.
async fn login(
    session: &mut SessionState,
    shared: &Arc<Shared>,
    outbound_tx: &UnboundedSender<String>,
    read_half: &mut ReadHalf<TcpStream>,
    buf: &mut [u8; 512],
) -> anyhow::Result<()> {
    tell_session(outbound_tx, session, &["What is your name?".to_string()]);
    let Some(name) = read_raw_line(read_half, buf).await? else {
        anyhow::bail!("connection closed during login");
    };
    let name = name.trim().to_string();

    let existing = jit_persistence::load_account(&shared.paths.players_dir, &name)?;
    tell_session(outbound_tx, session, &["Password:".to_string()]);
    let Some(password) = read_raw_line(read_half, buf).await? else {
        anyhow::bail!("connection closed during login");
    };

    let account = match existing {
        Some(_) => {
            if !jit_persistence::validate_credentials(&shared.paths.players_dir, &name, &password) {
                tell_session(outbound_tx, session, &["Login failed.".to_string()]);
                anyhow::bail!("login failed for {name}");
            }
            let Some(account) = jit_persistence::load_account(&shared.paths.players_dir, &name)? else {
                anyhow::bail!("account for {name} vanished between validation and load");
            };
            account
        }
        None => jit_persistence::create_account(&shared.paths.players_dir, &name, &password, chrono::Utc::now())?,
    };

    let (player_id, room_id) = {
        let mut world = shared.world.lock();
        let now = shared.clock.now();
        let now_ms = shared.clock.epoch_ms();
        let heartbeat_interval = std::time::Duration::from_secs(shared.config.game_loop.default_heartbeat_seconds.max(1));
        let start_room = BlueprintId::new(&shared.config.paths.start_room);
        let room_id = ensure_singleton(&mut world, &start_room, heartbeat_interval, now, now_ms)?;
        let player_blueprint = BlueprintId::new(&shared.config.paths.player_blueprint);
        let (player_id, _) = world.spawn(&player_blueprint, Some(account.state.clone()), heartbeat_interval, now, now_ms)?;
        world.move_object(player_id.clone(), room_id.clone(), now, now_ms)?;
        (player_id, room_id)
    };

    session.log_in(player_id.clone(), account.name.clone(), account.wizard, room_id.clone());
    if let Some(handle) = shared.sessions.write().get_mut(&session.id) {
        handle.player_id = Some(player_id);
        handle.room = Some(room_id);
    }
    tell_session(outbound_tx, session, &[format!("Welcome back, {}.", account.name)]);
    Ok(())
}

/// Dispatches one logical line through the command pipeline and renders
/// whatever it queued. Returns whether the session should close.
fn dispatch_line(session: &SessionState, shared: &Arc<Shared>, outbound_tx: &UnboundedSender<String>, line: &str) -> bool {
    let Some(actor) = session.player_id.clone() else {
        return false;
    };
    let now = shared.clock.now();
    let now_ms = shared.clock.epoch_ms();
    let mut world = shared.world.lock();
    match shared
        .dispatcher
        .dispatch(&mut world, &actor, session.player_name.as_deref().unwrap_or(""), session.wizard, line, now, now_ms)
    {
        Ok(outcome) => {
            tell_session(outbound_tx, session, &outcome.lines);
            outcome.disconnect
        }
        Err(e) => {
            tell_session(outbound_tx, session, &[e.to_string()]);
            false
        }
    }
}

fn persist_player_on_disconnect(shared: &Arc<Shared>, session: &SessionState, player_id: &ObjectId) {
    let world = shared.world.lock();
    let Some(instance) = world.objects.get(player_id) else {
        return;
    };
    let mut account = match jit_persistence::load_account(&shared.paths.players_dir, session.player_name.as_deref().unwrap_or_default()) {
        Ok(Some(account)) => account,
        _ => return,
    };
    account.state = instance.state.clone();
    account.last_login = Some(chrono::Utc::now());
    let _ = jit_persistence::save_account(&shared.paths.players_dir, &account);
}

// SPDX-License-Identifier: MIT

//! Command dispatch pipeline: parse → registry lookup → context
//! construction → execution → room-event fan-out. Lookup precedence is
//! exact global name, then global alias, then local name, then local alias
//! (the registry already folds the first two together; this module adds
//! the local fallback).

use jit_core::ObjectId;
use jit_world::WorldState;

use crate::context::CommandContext;
use crate::error::CommandError;
use crate::registry::CommandRegistry;

pub struct Dispatcher {
    pub registry: CommandRegistry,
}

/// What the session layer needs back from one dispatched line: the output
/// to render, and whether the command asked for the session to be closed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub lines: Vec<String>,
    pub disconnect: bool,
}

impl Dispatcher {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    /// Splits `line` into a command word and the remaining words, runs the
    /// matching command (global first, then a local fallback against the
    /// actor's room and inventory), and fans out any room event the command
    /// produced. Returns the lines the command queued for the actor.
    pub fn dispatch(
        &self,
        world: &mut WorldState,
        actor: &ObjectId,
        actor_name: &str,
        wizard: bool,
        line: &str,
        now: std::time::Instant,
        now_ms: u64,
    ) -> Result<DispatchOutcome, CommandError> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(DispatchOutcome::default());
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        if let Some(spec) = self.registry.resolve(word, wizard) {
            let execute = spec.execute.clone();
            let mut ctx = CommandContext::new(actor.clone(), actor_name, wizard, &mut *world, now, now_ms);
            execute(&mut ctx, &args)?;
            let (lines, event, disconnect) = ctx.into_parts();
            if let Some(event) = event {
                self.fan_out(world, actor, event, now, now_ms);
            }
            return Ok(DispatchOutcome { lines, disconnect });
        }

        if let Some(local_owner) = self.find_local_command(world, actor, word) {
            let room_members = room_members_of(world, &local_owner);
            let result = world
                .objects
                .call(&local_owner, word, jit_core::CallClass::Hook, room_members, now_ms)
                .map_err(|e| CommandError::BadArgument(e.to_string()))?;
            world.metrics.record_invoke(&result.outcome);
            let lines = match result.outcome {
                jit_core::InvokeOutcome::Ok => Vec::new(),
                jit_core::InvokeOutcome::DomainError(reason) => vec![reason],
                jit_core::InvokeOutcome::Timeout => vec!["that didn't respond in time.".to_string()],
                jit_core::InvokeOutcome::Fatal(reason) => vec![reason],
            };
            return Ok(DispatchOutcome { lines, disconnect: false });
        }

        Err(CommandError::Unknown(word.to_string()))
    }

    /// Candidates are the actor's inventory and the actor's room's
    /// contents, each checked against its blueprint's method table.
    fn find_local_command(&self, world: &WorldState, actor: &ObjectId, word: &str) -> Option<ObjectId> {
        let mut candidates: Vec<&ObjectId> = world.containment.get_contents(actor).iter().collect();
        if let Some(room) = world.containment.get_container(actor) {
            candidates.extend(world.containment.get_contents(room).iter().filter(|m| *m != actor));
        }
        candidates.into_iter().find(|id| {
            world
                .objects
                .get(id)
                .and_then(|instance| world.objects.blueprint(&instance.blueprint_id))
                .is_some_and(|bp| bp.has_method(word))
        }).cloned()
    }

    fn fan_out(&self, world: &mut WorldState, actor: &ObjectId, event: jit_core::RoomEvent, now: std::time::Instant, now_ms: u64) {
        if let Some(room) = world.containment.get_container(actor).cloned() {
            world.fire_room_event(&room, &event, now, now_ms);
        }
    }
}

fn room_members_of(world: &WorldState, id: &ObjectId) -> Vec<String> {
    let Some(container) = world.containment.get_container(id) else {
        return Vec::new();
    };
    world
        .containment
        .get_contents(container)
        .iter()
        .filter(|m| *m != id)
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

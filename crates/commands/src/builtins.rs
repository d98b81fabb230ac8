// SPDX-License-Identifier: MIT

//! Driver-level built-in commands: leaving a session, asking the running
//! process about itself, and hot-reloading a blueprint. These live
//! alongside whatever in-world commands a given game's object library
//! registers.

use std::sync::Arc;

use jit_core::BlueprintId;

use crate::context::CommandContext;
use crate::error::CommandError;
use crate::registry::CommandSpec;

/// Registers every built-in command into `registry`. Called once at
/// startup before any world-specific local commands come into play.
pub fn register_all(registry: &mut crate::registry::CommandRegistry) -> Result<(), CommandError> {
    registry.register(quit())?;
    registry.register(status())?;
    registry.register(reload())?;
    Ok(())
}

fn quit() -> CommandSpec {
    CommandSpec {
        name: "quit".to_string(),
        aliases: vec!["qq".to_string()],
        category: "driver".to_string(),
        usage: "quit".to_string(),
        description: "leave the game".to_string(),
        wizard_only: false,
        execute: Arc::new(|ctx: &mut CommandContext, _args| {
            ctx.tell("Goodbye!");
            ctx.request_disconnect();
            Ok(())
        }),
    }
}

fn status() -> CommandSpec {
    CommandSpec {
        name: "status".to_string(),
        aliases: vec![],
        category: "driver".to_string(),
        usage: "status".to_string(),
        description: "report how many objects are currently live, plus health counters".to_string(),
        wizard_only: true,
        execute: Arc::new(|ctx: &mut CommandContext, _args| {
            let count = ctx.world.objects.instance_ids().count();
            ctx.tell(format!("{count} live objects."));
            let m = &ctx.world.metrics;
            ctx.tell(format!(
                "ticks={} heartbeats={} callouts={} combatRounds={} snapshots={}",
                m.ticks, m.heartbeats_fired, m.callouts_fired, m.combat_rounds, m.snapshots_saved
            ));
            ctx.tell(format!(
                "invoke: ok={} timeout={} domainError={} fatal={}",
                m.invoke_ok, m.invoke_timeout, m.invoke_domain_error, m.invoke_fatal
            ));
            Ok(())
        }),
    }
}

fn reload() -> CommandSpec {
    CommandSpec {
        name: "reload".to_string(),
        aliases: vec![],
        category: "driver".to_string(),
        usage: "reload <blueprintId>".to_string(),
        description: "recompile a blueprint and re-run on_reload on every live instance".to_string(),
        wizard_only: true,
        execute: Arc::new(|ctx: &mut CommandContext, args| {
            let Some(path) = args.first() else {
                return Err(CommandError::BadArgument("usage: reload <blueprintId>".to_string()));
            };
            let id = BlueprintId::new(path);
            let now_ms = ctx.now_ms;
            match ctx.world.objects.reload(&id, ctx.now, now_ms) {
                Ok(results) => {
                    for (_, result) in &results {
                        ctx.world.metrics.record_invoke(&result.outcome);
                    }
                    ctx.tell(format!("reloaded {} ({} live instances)", id, results.len()));
                }
                Err(e) => ctx.tell(format!("reload failed: {e}")),
            }
            Ok(())
        }),
    }
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! `--perfbench` deterministic benchmark harness: clones `--count`
//! instances of `--blueprint`, then drives `--ticks` simulated ticks
//! advancing a fake clock by `--loopDelayMs` per iteration rather
//! than actually sleeping, so a run's timing is reproducible regardless of
//! host load. Prints one summary line of `Metrics` at the end.

use std::time::Duration;

use jit_core::{BlueprintId, Clock, FakeClock};

use crate::cli::BenchArgs;
use crate::config::AppConfig;
use crate::world_setup::build_world;

/// Runs the benchmark against `config`'s world directory and security
/// budget, printing a summary line to stdout. Returns an error only for
/// setup failures (bad blueprint path, sandbox init); per-tick invoke
/// failures are tallied into `Metrics` like any other run, not surfaced as
/// an `Err`.
pub fn run(config: &AppConfig, args: &BenchArgs) -> anyhow::Result<()> {
    let Some(blueprint_path) = &args.blueprint else {
        anyhow::bail!("--perfbench requires --blueprint <id>");
    };

    let mut world = build_world(&config.paths, &config.security, &config.performance)?;

    let blueprint = BlueprintId::new(blueprint_path);
    let heartbeat_interval = Duration::from_secs(config.game_loop.default_heartbeat_seconds.max(1));

    let clock = FakeClock::new();
    let step = Duration::from_millis(args.loop_delay_ms.max(1));

    for _ in 0..args.count {
        world.spawn(&blueprint, None, heartbeat_interval, clock.now(), clock.epoch_ms())?;
    }

    for _ in 0..args.ticks {
        clock.advance(step);
        let now = clock.now();
        let now_ms = clock.epoch_ms();

        let due_heartbeats: Vec<_> = world.heartbeat.due(now);
        for id in due_heartbeats {
            world.metrics.heartbeats_fired += 1;
            world.fire_heartbeat(&id, now, now_ms);
        }

        if !args.no_callouts {
            let due_callouts = world.callouts.due(now);
            for callout in &due_callouts {
                world.metrics.callouts_fired += 1;
                world.fire_callout(callout, now, now_ms);
            }
        }

        world.metrics.ticks += 1;
    }

    let m = &world.metrics;
    println!(
        "perfbench: blueprint={blueprint} instances={} ticks={} heartbeats={} callouts={} invoke(ok={} timeout={} domainError={} fatal={})",
        args.count, m.ticks, m.heartbeats_fired, m.callouts_fired, m.invoke_ok, m.invoke_timeout, m.invoke_domain_error, m.invoke_fatal,
    );

    Ok(())
}

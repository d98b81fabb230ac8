// SPDX-License-Identifier: MIT

//! Wraps the `wasmtime::Engine` with the configuration the safe invoker
//! relies on: fuel consumption (CPU bound) and epoch interruption
//! (wall-clock bound).

use std::thread::{self, JoinHandle};
use std::time::Duration;

use wasmtime::{Config, Engine};

/// Owns the `wasmtime::Engine` plus the background thread that increments
/// its epoch counter. Wall-clock deadlines set on a `Store` are measured in
/// epoch ticks, so the ticker's period is the invoker's timing resolution.
pub struct SandboxEngine {
    engine: Engine,
    _ticker: JoinHandle<()>,
}

impl SandboxEngine {
    pub fn new(epoch_tick: Duration) -> anyhow::Result<Self> {
        let mut config = Config::new();
        config.consume_fuel(true);
        config.epoch_interruption(true);
        let engine = Engine::new(&config)?;

        let ticker_engine = engine.clone();
        let ticker = thread::Builder::new()
            .name("jit-sandbox-epoch".into())
            .spawn(move || loop {
                thread::sleep(epoch_tick);
                ticker_engine.increment_epoch();
            })?;

        Ok(Self {
            engine,
            _ticker: ticker,
        })
    }

    pub fn inner(&self) -> &Engine {
        &self.engine
    }
}

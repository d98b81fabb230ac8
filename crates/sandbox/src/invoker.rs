// SPDX-License-Identifier: MIT

//! Safe invoker: the only way anything calls into world code. Bounds both
//! CPU time (fuel) and wall-clock time (epoch deadline), classifies every
//! outcome, and never lets a panic escape the call.

use std::panic::{catch_unwind, AssertUnwindSafe};

use jit_core::{CallClass, InvokeOutcome};
use wasmtime::{Engine, Instance, Linker, Store, Trap};

use crate::host::HostContext;

/// Fuel/epoch-tick budgets for the two call classes (`Security.HookTimeoutMs`
/// / `Security.HeartbeatTimeoutMs`, converted to fuel units and epoch ticks
/// by the caller).
#[derive(Debug, Clone, Copy)]
pub struct SecurityBudget {
    pub hook_fuel: u64,
    pub hook_epoch_ticks: u64,
    pub heartbeat_fuel: u64,
    pub heartbeat_epoch_ticks: u64,
}

impl SecurityBudget {
    fn fuel(&self, class: CallClass) -> u64 {
        match class {
            CallClass::Hook => self.hook_fuel,
            CallClass::Heartbeat => self.heartbeat_fuel,
        }
    }

    fn epoch_ticks(&self, class: CallClass) -> u64 {
        match class {
            CallClass::Hook => self.hook_epoch_ticks,
            CallClass::Heartbeat => self.heartbeat_epoch_ticks,
        }
    }
}

pub struct SafeInvoker<T: HostContext> {
    engine: Engine,
    linker: Linker<T>,
    budget: SecurityBudget,
}

impl<T: HostContext> SafeInvoker<T> {
    pub fn new(engine: Engine, linker: Linker<T>, budget: SecurityBudget) -> Self {
        Self {
            engine,
            linker,
            budget,
        }
    }

    /// Instantiates a blueprint's module into a fresh `Store` for one live
    /// instance. Memory, globals, and tables are private to this store —
    /// nothing about one instance is observable from another.
    pub fn instantiate(
        &self,
        module: &wasmtime::Module,
        host: T,
    ) -> Result<(Store<T>, Instance), InvokeOutcome> {
        let mut store = Store::new(&self.engine, host);
        store.set_epoch_deadline(u64::MAX);
        self.linker
            .instantiate(&mut store, module)
            .map(|instance| (store, instance))
            .map_err(|e| InvokeOutcome::Fatal(e.to_string()))
    }

    /// Calls `method` with no arguments and no result, the shape every
    /// hook (`on_load`, `heartbeat`, callout targets, …) uses in this
    /// driver. Returns `domainError` if the method is not exported.
    pub fn call(
        &self,
        store: &mut Store<T>,
        instance: &Instance,
        method: &str,
        class: CallClass,
    ) -> InvokeOutcome {
        let func = match instance.get_typed_func::<(), ()>(&mut *store, method) {
            Ok(f) => f,
            Err(_) => {
                return InvokeOutcome::DomainError(format!("no such export: {method}"));
            }
        };

        store.set_fuel(self.budget.fuel(class)).ok();
        let deadline = self.budget.epoch_ticks(class).max(1);
        store.set_epoch_deadline(deadline);

        let result = catch_unwind(AssertUnwindSafe(|| func.call(&mut *store, ())));

        match result {
            Ok(Ok(())) => InvokeOutcome::Ok,
            Ok(Err(trap_err)) => classify_trap(trap_err),
            Err(_panic) => InvokeOutcome::Fatal("panic inside safe invoker".to_string()),
        }
    }
}

fn classify_trap(err: anyhow::Error) -> InvokeOutcome {
    if let Some(trap) = err.downcast_ref::<Trap>() {
        return match trap {
            Trap::OutOfFuel | Trap::Interrupt => InvokeOutcome::Timeout,
            other => InvokeOutcome::DomainError(other.to_string()),
        };
    }
    InvokeOutcome::Fatal(err.to_string())
}

#[cfg(test)]
#[path = "invoker_tests.rs"]
mod tests;

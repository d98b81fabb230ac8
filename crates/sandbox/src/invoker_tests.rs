// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::time::Duration;

use crate::engine::SandboxEngine;
use crate::linker::build_linker;

use super::*;

struct TestHost {
    state: HashMap<String, String>,
    logs: Vec<String>,
}

impl TestHost {
    fn new() -> Self {
        Self {
            state: HashMap::new(),
            logs: Vec::new(),
        }
    }
}

impl HostContext for TestHost {
    fn self_id(&self) -> String {
        "items/rusty_sword#000001".to_string()
    }
    fn state_get(&mut self, key: &str) -> Option<String> {
        self.state.get(key).cloned()
    }
    fn state_set(&mut self, key: &str, value: String) {
        self.state.insert(key.to_string(), value);
    }
    fn state_has(&mut self, key: &str) -> bool {
        self.state.contains_key(key)
    }
    fn is_in_room(&mut self, _other: &str) -> bool {
        false
    }
    fn log(&mut self, message: &str) {
        self.logs.push(message.to_string());
    }
    fn now_ms(&mut self) -> u64 {
        0
    }
    fn prev_reload_ms(&mut self) -> Option<u64> {
        None
    }
    fn room_event_kind(&mut self) -> Option<i32> {
        None
    }
    fn room_event_actor(&mut self) -> Option<String> {
        None
    }
    fn room_event_message(&mut self) -> Option<String> {
        None
    }
    fn schedule_callout(&mut self, _method: &str, _after_ms: u64, _repeat: bool, _interval_ms: u64) {}
}

fn budget() -> SecurityBudget {
    SecurityBudget {
        hook_fuel: 1_000_000,
        hook_epoch_ticks: 1_000,
        heartbeat_fuel: 1_000_000,
        heartbeat_epoch_ticks: 1_000,
    }
}

#[test]
fn successful_hook_call_returns_ok() {
    let sandbox = SandboxEngine::new(Duration::from_millis(5)).expect("engine");
    let linker = build_linker::<TestHost>(sandbox.inner()).expect("linker");
    let invoker = SafeInvoker::new(sandbox.inner().clone(), linker, budget());

    let module = wasmtime::Module::new(
        sandbox.inner(),
        r#"(module (func $on_load (export "on_load")))"#,
    )
    .expect("compiles");

    let (mut store, instance) = invoker
        .instantiate(&module, TestHost::new())
        .expect("instantiates");
    let outcome = invoker.call(&mut store, &instance, "on_load", CallClass::Hook);
    assert_eq!(outcome, InvokeOutcome::Ok);
}

#[test]
fn missing_export_is_a_domain_error() {
    let sandbox = SandboxEngine::new(Duration::from_millis(5)).expect("engine");
    let linker = build_linker::<TestHost>(sandbox.inner()).expect("linker");
    let invoker = SafeInvoker::new(sandbox.inner().clone(), linker, budget());

    let module = wasmtime::Module::new(
        sandbox.inner(),
        r#"(module (func $on_load (export "on_load")))"#,
    )
    .expect("compiles");

    let (mut store, instance) = invoker
        .instantiate(&module, TestHost::new())
        .expect("instantiates");
    let outcome = invoker.call(&mut store, &instance, "heartbeat", CallClass::Heartbeat);
    assert!(matches!(outcome, InvokeOutcome::DomainError(_)));
}

#[test]
fn runaway_loop_is_classified_as_timeout() {
    let sandbox = SandboxEngine::new(Duration::from_millis(5)).expect("engine");
    let linker = build_linker::<TestHost>(sandbox.inner()).expect("linker");
    let mut tight_budget = budget();
    tight_budget.hook_fuel = 1_000;
    let invoker = SafeInvoker::new(sandbox.inner().clone(), linker, tight_budget);

    let module = wasmtime::Module::new(
        sandbox.inner(),
        r#"(module (func $spin (export "spin") (loop $l (br $l))))"#,
    )
    .expect("compiles");

    let (mut store, instance) = invoker
        .instantiate(&module, TestHost::new())
        .expect("instantiates");
    let outcome = invoker.call(&mut store, &instance, "spin", CallClass::Hook);
    assert_eq!(outcome, InvokeOutcome::Timeout);
}

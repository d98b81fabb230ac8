// SPDX-License-Identifier: MIT

//! Shared vocabulary for the safe invoker, used by `jit-sandbox` (which
//! classifies outcomes) and `jit-world`/`jit-commands` (which consume them
//! without needing to know anything about wasmtime).

use std::fmt;

use crate::id::ObjectId;

/// Which budget a call is bound by (`Security.HookTimeoutMs` /
/// `Security.HeartbeatTimeoutMs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallClass {
    Hook,
    Heartbeat,
}

/// Outcome of a single call through the safe invoker. Never a Rust `Result`
/// that can carry an arbitrary error type — every failure mode the driver
/// must react to differently is named here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    Ok,
    Timeout,
    DomainError(String),
    Fatal(String),
}

impl InvokeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, InvokeOutcome::Ok)
    }
}

impl fmt::Display for InvokeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeOutcome::Ok => write!(f, "ok"),
            InvokeOutcome::Timeout => write!(f, "timeout"),
            InvokeOutcome::DomainError(reason) => write!(f, "domain error: {reason}"),
            InvokeOutcome::Fatal(reason) => write!(f, "fatal: {reason}"),
        }
    }
}

/// A diagnostic record for an invocation outcome worse than `Ok`, carrying
/// enough to log the offending object and method without forcing every
/// caller to thread the object id and method name through by hand.
#[derive(Debug, Clone)]
pub struct InvokeDiagnostic {
    pub object_id: ObjectId,
    pub method: String,
    pub class: CallClass,
    pub outcome: InvokeOutcome,
}

impl fmt::Display for InvokeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}::{} -> {}",
            match self.class {
                CallClass::Hook => "hook",
                CallClass::Heartbeat => "heartbeat",
            },
            self.object_id,
            self.method,
            self.outcome
        )
    }
}

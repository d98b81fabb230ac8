// SPDX-License-Identifier: MIT

//! Health/usage counters: a lightweight in-memory tally the `status`
//! built-in command reports, not a metrics-export pipeline — no
//! Prometheus/OTel wiring.

use jit_core::InvokeOutcome;

#[derive(Debug, Default, Clone, Copy)]
pub struct Metrics {
    pub ticks: u64,
    pub heartbeats_fired: u64,
    pub callouts_fired: u64,
    pub combat_rounds: u64,
    pub invoke_ok: u64,
    pub invoke_timeout: u64,
    pub invoke_domain_error: u64,
    pub invoke_fatal: u64,
    pub snapshots_saved: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies one safe-invoker outcome. Called at every site that gets a
    /// `CallResult` back from the object manager, not inside the manager
    /// itself — `jit-world`'s `ObjectManager` stays policy-free about what
    /// counts as observability.
    pub fn record_invoke(&mut self, outcome: &InvokeOutcome) {
        match outcome {
            InvokeOutcome::Ok => self.invoke_ok += 1,
            InvokeOutcome::Timeout => self.invoke_timeout += 1,
            InvokeOutcome::DomainError(_) => self.invoke_domain_error += 1,
            InvokeOutcome::Fatal(_) => self.invoke_fatal += 1,
        }
    }

    pub fn invoke_total(&self) -> u64 {
        self.invoke_ok + self.invoke_timeout + self.invoke_domain_error + self.invoke_fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_invoke_tallies_each_outcome_class() {
        let mut metrics = Metrics::new();
        metrics.record_invoke(&InvokeOutcome::Ok);
        metrics.record_invoke(&InvokeOutcome::Timeout);
        metrics.record_invoke(&InvokeOutcome::DomainError("no such export".to_string()));
        metrics.record_invoke(&InvokeOutcome::Fatal("linker error".to_string()));

        assert_eq!(metrics.invoke_ok, 1);
        assert_eq!(metrics.invoke_timeout, 1);
        assert_eq!(metrics.invoke_domain_error, 1);
        assert_eq!(metrics.invoke_fatal, 1);
        assert_eq!(metrics.invoke_total(), 4);
    }
}

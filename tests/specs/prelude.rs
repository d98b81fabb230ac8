// SPDX-License-Identifier: MIT

//! Test helpers for behavioral specifications.
//!
//! Most scenarios drive `jit-world`/`jit-sandbox` APIs directly without
//! spawning a process; the `cli/` specs are the ones that genuinely need
//! the compiled `jitrealmd` binary.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use jit_sandbox::{build_linker, Loader, SafeInvoker, SandboxEngine, SecurityBudget};
use jit_world::{HostState, MemorySourceProvider, ObjectManager, WorldState};

/// Returns the path to a binary built alongside this test binary.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

fn jitrealmd_binary() -> PathBuf {
    binary_path("jitrealmd")
}

pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: Vec::new(),
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string_lossy().to_string()));
        self
    }

    fn command(self) -> Command {
        let mut cmd = Command::new(jitrealmd_binary());
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }
}

/// Security budget generous enough that no spec scenario ever hits a
/// fuel/epoch timeout by accident; invoker behaviour under exhaustion has
/// its own dedicated unit tests in `jit-sandbox`.
fn generous_budget() -> SecurityBudget {
    SecurityBudget {
        hook_fuel: 10_000_000,
        hook_epoch_ticks: 100_000,
        heartbeat_fuel: 10_000_000,
        heartbeat_epoch_ticks: 100_000,
    }
}

/// Builds a `WorldState` backed by an in-memory blueprint source, the same
/// way `--perfbench` and the `jit-world` unit tests do, so scenario tests
/// never touch the filesystem for world sources.
pub fn world_with(blueprints: &[(&str, &str)]) -> WorldState {
    let mut source = MemorySourceProvider::new();
    for (id, wat) in blueprints {
        source.insert(*id, *wat);
    }
    let sandbox = SandboxEngine::new(Duration::from_millis(5)).expect("sandbox engine");
    let linker = build_linker::<HostState>(sandbox.inner()).expect("linker");
    let invoker = SafeInvoker::new(sandbox.inner().clone(), linker, generous_budget());
    let loader = Loader::new(sandbox.inner().clone());
    let objects = ObjectManager::new(loader, invoker, Arc::new(source));
    WorldState::new(objects)
}

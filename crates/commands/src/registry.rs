// SPDX-License-Identifier: MIT

//! Command registry: the static table of global commands plus alias
//! resolution. Local commands (advertised by room/inventory objects) are not
//! registered here — they are resolved at dispatch time straight off a
//! blueprint's method table (`jit_sandbox::Blueprint::has_method`), since an
//! object can start or stop exposing one on reload without the registry
//! knowing.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::CommandContext;
use crate::error::CommandError;

pub type Execute = Arc<dyn Fn(&mut CommandContext, &[String]) -> Result<(), CommandError> + Send + Sync>;

#[derive(Clone)]
pub struct CommandSpec {
    pub name: String,
    pub aliases: Vec<String>,
    pub category: String,
    pub usage: String,
    pub description: String,
    pub wizard_only: bool,
    pub execute: Execute,
}

/// Registered in insertion order (`IndexMap`) so a `help`/`commands` built-in
/// can list them the way they were registered at startup rather than in
/// hash order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, CommandSpec>,
    aliases: IndexMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: CommandSpec) -> Result<(), CommandError> {
        if self.commands.contains_key(&spec.name) || self.aliases.contains_key(&spec.name) {
            return Err(CommandError::DuplicateName(spec.name));
        }
        for alias in &spec.aliases {
            if self.commands.contains_key(alias) || self.aliases.contains_key(alias) {
                return Err(CommandError::DuplicateName(alias.clone()));
            }
        }
        for alias in &spec.aliases {
            self.aliases.insert(alias.clone(), spec.name.clone());
        }
        self.commands.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Lookup precedence is exact-name, then alias; local commands are
    /// resolved separately by the dispatcher, which only falls back to
    /// this lookup once it finds no matching local command.
    pub fn resolve(&self, word: &str, wizard: bool) -> Option<&CommandSpec> {
        let spec = self
            .commands
            .get(word)
            .or_else(|| self.aliases.get(word).and_then(|name| self.commands.get(name)))?;
        if spec.wizard_only && !wizard {
            return None;
        }
        Some(spec)
    }

    /// Visible commands for a `help`-style listing: wizard-only entries are
    /// omitted entirely for non-wizards — invisible and unreachable rather
    /// than merely refused.
    pub fn visible(&self, wizard: bool) -> impl Iterator<Item = &CommandSpec> {
        self.commands.values().filter(move |c| wizard || !c.wizard_only)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Compiler/loader. Reads a `.wat` source file, compiles it in isolation
//! via `wasmtime`, and produces a `Blueprint` whose capability bitset and
//! method table are derived entirely from the module's own export section.

use std::time::Instant;

use jit_core::BlueprintId;
use wasmtime::{Engine, Module};

use crate::blueprint::{capabilities_from_exports, count_on_load_like_exports, Blueprint};
use crate::error::LoadError;

pub struct Loader {
    engine: Engine,
}

impl Loader {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Compiles `source` (WebAssembly text format) into a `Blueprint`.
    /// `source` may be `.wat` text or raw `.wasm` bytes as text-decodable
    /// UTF-8; `wat::parse_str` accepts both. `now`/`now_ms` are the
    /// caller's own clock reading, stamped as `loaded_at`/`loaded_at_ms` —
    /// the loader never reads the clock itself.
    pub fn load(&self, id: BlueprintId, source: &str, now: Instant, now_ms: u64) -> Result<Blueprint, LoadError> {
        let binary = wat::parse_str(source).map_err(|e| LoadError::CompileFailure {
            id: id.clone(),
            reason: e.to_string(),
        })?;

        let module = Module::from_binary(&self.engine, &binary).map_err(|e| {
            LoadError::CompileFailure {
                id: id.clone(),
                reason: e.to_string(),
            }
        })?;

        let on_load_like = count_on_load_like_exports(&module);
        if on_load_like > 1 {
            return Err(LoadError::AmbiguousConcreteType {
                id: id.clone(),
                count: on_load_like,
            });
        }

        let (capabilities, methods) = capabilities_from_exports(&module);
        if capabilities.is_empty() && methods.is_empty() {
            return Err(LoadError::MissingConcreteType { id: id.clone() });
        }

        Ok(Blueprint {
            id,
            module,
            loaded_at: now,
            loaded_at_ms: now_ms,
            capabilities,
            methods,
        })
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

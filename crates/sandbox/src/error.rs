// SPDX-License-Identifier: MIT

//! Error classes for the compiler/loader.

use jit_core::BlueprintId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{id}: compilation failed: {reason}")]
    CompileFailure { id: BlueprintId, reason: String },

    #[error("{id}: no concrete type (missing `on_load`-capable export set)")]
    MissingConcreteType { id: BlueprintId },

    #[error("{id}: ambiguous concrete type ({count} constructor-like exports)")]
    AmbiguousConcreteType { id: BlueprintId, count: usize },

    #[error("{id}: sandbox policy violation: {reason}")]
    SandboxViolation { id: BlueprintId, reason: String },
}

// SPDX-License-Identifier: MIT

//! Compiler/loader, safe invoker, and sandbox policy.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod blueprint;
pub mod engine;
pub mod error;
pub mod host;
pub mod invoker;
pub mod linker;
pub mod loader;

pub use blueprint::Blueprint;
pub use engine::SandboxEngine;
pub use error::LoadError;
pub use host::HostContext;
pub use invoker::{SafeInvoker, SecurityBudget};
pub use linker::build_linker;
pub use loader::Loader;

// SPDX-License-Identifier: MIT

//! Resolves a blueprint id to its `.wat` source text under
//! `World/<category>/<name>.<src-suffix>`.

use std::path::PathBuf;

use jit_core::BlueprintId;

pub trait SourceProvider: Send + Sync {
    fn read_source(&self, id: &BlueprintId) -> std::io::Result<String>;
}

/// Reads world source files rooted under a configured `World/` directory
/// (`Paths.WorldDirectory`), with a `.wat` suffix.
pub struct FsSourceProvider {
    root: PathBuf,
    suffix: String,
}

impl FsSourceProvider {
    pub fn new(root: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            suffix: suffix.into(),
        }
    }

    pub fn path_for(&self, id: &BlueprintId) -> PathBuf {
        self.root.join(format!("{}.{}", id.as_str(), self.suffix))
    }
}

impl SourceProvider for FsSourceProvider {
    fn read_source(&self, id: &BlueprintId) -> std::io::Result<String> {
        std::fs::read_to_string(self.path_for(id))
    }
}

/// In-memory source provider for tests and `--perfbench`.
#[derive(Default)]
pub struct MemorySourceProvider {
    sources: std::collections::HashMap<String, String>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.sources.insert(id.into(), source.into());
        self
    }
}

impl SourceProvider for MemorySourceProvider {
    fn read_source(&self, id: &BlueprintId) -> std::io::Result<String> {
        self.sources
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, id.to_string()))
    }
}

// SPDX-License-Identifier: MIT

//! Atomic file writes, shared by both the world snapshot and player
//! account files: write beside the destination, fsync, then rename over
//! it so a crash mid-write never leaves a half-written file in place of a
//! good one.

use std::fs;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtomicWriteError {
    #[error("io error writing {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io(path: &Path, source: std::io::Error) -> AtomicWriteError {
    AtomicWriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `contents` to `path` by first writing a sibling `.tmp` file,
/// fsyncing it, then renaming it over `path`. `rename` within the same
/// filesystem is atomic, so a reader never observes a partial file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AtomicWriteError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io(path, e))?;
    }
    let tmp_path = path.with_extension(tmp_extension(path));
    {
        let mut tmp = fs::File::create(&tmp_path).map_err(|e| io(&tmp_path, e))?;
        tmp.write_all(contents).map_err(|e| io(&tmp_path, e))?;
        tmp.sync_all().map_err(|e| io(&tmp_path, e))?;
    }
    fs::rename(&tmp_path, path).map_err(|e| io(path, e))?;
    Ok(())
}

fn tmp_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.tmp"),
        None => "tmp".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parent_dirs_and_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/world.json");
        write_atomic(&path, b"{}").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "{}");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn write_atomic_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("world.json");
        write_atomic(&path, b"one").expect("write");
        write_atomic(&path, b"two").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "two");
    }
}

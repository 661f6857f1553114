//! Control-directory layout
//!
//! Path arithmetic inside `.git`. Resolution is a pure function of the
//! control root and the requested segments; the ensure-dir variants add
//! a three-way outcome every caller relies on:
//!
//! - `Ok(Some(path))` — the directory exists (or was just created)
//! - `Ok(None)` — absent, and creation was not requested
//! - `Err(NotADirectory)` — a file occupies the directory's place

use crate::artifacts::errors::WitError;
use anyhow::Context;
use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, new)]
pub struct Layout {
    git_path: Box<Path>,
}

impl Layout {
    pub fn git_path(&self) -> &Path {
        &self.git_path
    }

    /// Pure concatenation under the control root.
    pub fn path_to(&self, segments: &[&str]) -> PathBuf {
        segments
            .iter()
            .fold(self.git_path.to_path_buf(), |path, segment| {
                path.join(segment)
            })
    }

    /// Resolve a directory under the control root, optionally creating it
    /// (and its parents).
    pub fn dir(&self, segments: &[&str], create: bool) -> anyhow::Result<Option<PathBuf>> {
        let path = self.path_to(segments);

        if path.exists() {
            if path.is_dir() {
                return Ok(Some(path));
            }
            anyhow::bail!(WitError::NotADirectory(path));
        }

        if create {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("failed to create directory {}", path.display()))?;
            return Ok(Some(path));
        }

        Ok(None)
    }

    /// Resolve a file path, treating all but the last segment as its
    /// directory. The file itself is never created, only its directory.
    pub fn file(&self, segments: &[&str], create: bool) -> anyhow::Result<Option<PathBuf>> {
        let dir_segments = &segments[..segments.len().saturating_sub(1)];

        match self.dir(dir_segments, create)? {
            Some(_) => Ok(Some(self.path_to(segments))),
            None => Ok(None),
        }
    }
}

//! References (branches, HEAD, tags)
//!
//! References are human-readable names pointing to commits. They can be:
//! - Direct: containing an object id
//! - Symbolic: pointing to another reference (e.g., HEAD -> refs/heads/master)
//!
//! ## File Format
//!
//! References are stored as text files containing either:
//! - A 40-character hex object id (direct reference)
//! - `ref: <path>` for symbolic references
//!
//! Ref files are read-then-written without a transactional lock; the
//! exclusive file lock below only guards a single write. Last writer
//! wins.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Loose-ref manager rooted at the control directory.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the control directory (typically `.git`)
    path: Box<Path>,
}

/// A ref file's content: either a symbolic reference or a direct id.
#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef { target: String },
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef {
                target: symref_match[1].to_string(),
            }))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

impl Refs {
    /// Read the object id a ref file points to, following symbolic
    /// references until a direct id (or a missing file) is reached.
    fn read_symref(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        let ref_content = SymRefOrOid::read_symref_or_oid(path)?;

        match ref_content {
            Some(SymRefOrOid::SymRef { target }) => {
                self.read_symref(self.path.join(target).as_path())
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    /// Point HEAD at a branch (symbolically when the branch file exists,
    /// raw content otherwise).
    pub fn set_head(&self, revision: &str, raw_ref: String) -> anyhow::Result<()> {
        let revision_path = self.heads_path().join(revision).into_boxed_path();

        if revision_path.exists() {
            self.update_ref_file(self.head_path(), format!("ref: refs/heads/{revision}"))
        } else {
            self.update_ref_file(self.head_path(), raw_ref)
        }
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.head_path())
    }

    /// Resolve a ref name to an id, searching the control root, `refs/`,
    /// `refs/heads/` and `refs/tags/` in that order.
    pub fn read_ref(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let candidate = [
            self.path.to_path_buf(),
            self.refs_path().to_path_buf(),
            self.heads_path().to_path_buf(),
            self.tags_path().to_path_buf(),
        ]
        .iter()
        .map(|base_path| base_path.join(name))
        .find(|path| path.is_file());

        match candidate {
            Some(path) => self.read_symref(&path),
            None => Ok(None),
        }
    }

    pub fn create_tag_ref(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let tag_path = self.tags_path().join(name).into_boxed_path();

        if tag_path.exists() {
            anyhow::bail!("tag {name} already exists");
        }

        self.update_ref_file(tag_path, oid.as_ref().to_string())
    }

    pub fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.clone())
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    /// All refs under `refs/`, as names relative to the control root,
    /// plus HEAD.
    pub fn list_all_refs(&self) -> anyhow::Result<Vec<String>> {
        let mut refs: Vec<String> = WalkDir::new(self.refs_path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                if entry.path().is_file() {
                    let relative_path = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                    Some(relative_path.to_string_lossy().to_string())
                } else {
                    None
                }
            })
            .collect();
        refs.sort();
        refs.push(HEAD_REF_NAME.to_string());

        Ok(refs)
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    pub fn tags_path(&self) -> Box<Path> {
        self.refs_path().join("tags").into_boxed_path()
    }
}

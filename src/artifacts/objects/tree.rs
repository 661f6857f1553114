//! Tree object
//!
//! Trees represent directory snapshots: named entries pointing at blobs
//! (files) or other trees (subdirectories).
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! ## Ordering
//!
//! Entries are kept in a `BTreeMap` keyed by name, with directory names
//! carrying a trailing `/`. That makes serialization deterministic and
//! reproduces the canonical sort where a directory `a` orders after a
//! file `a.txt` (`/` sorts above `.`). The id of a tree therefore depends
//! only on its contents, never on insertion order.

use crate::artifacts::errors::WitError;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// A single tree record: mode plus the id of a blob or subtree.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub oid: ObjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Insert an entry. Directory entries are keyed with a trailing `/`
    /// so map order matches canonical tree order.
    pub fn add_entry(&mut self, name: &str, mode: EntryMode, oid: ObjectId) -> anyhow::Result<()> {
        if name.is_empty() || name.contains('/') || name.contains('\0') {
            anyhow::bail!("invalid tree entry name: {name:?}");
        }

        let key = if mode.is_tree() {
            format!("{name}/")
        } else {
            name.to_string()
        };
        self.entries.insert(key, TreeEntry::new(mode, oid));

        Ok(())
    }

    /// Entries in canonical order, names without the trailing `/`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.trim_end_matches('/'), entry))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        for (name, entry) in self.entries() {
            let header = format!("{:o} {}", entry.mode.as_u32(), name);
            content_bytes.write_all(header.as_bytes())?;
            content_bytes.push(0);
            entry.oid.write_h40_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut tree = Tree::default();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                anyhow::bail!(WitError::CorruptObject(
                    "truncated tree record: unterminated mode".to_string()
                ));
            }

            let mode_str = std::str::from_utf8(&mode_bytes).map_err(|_| {
                WitError::CorruptObject("tree entry mode is not valid utf-8".to_string())
            })?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            // Read "name\0"
            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || name_bytes.pop() != Some(b'\0') {
                anyhow::bail!(WitError::CorruptObject(
                    "truncated tree record: unterminated name".to_string()
                ));
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| {
                    WitError::CorruptObject("tree entry name is not valid utf-8".to_string())
                })?
                .to_owned();

            // Read object id
            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| WitError::CorruptObject("truncated tree record: short id".to_string()))
                .context("failed to read tree entry id")?;

            tree.add_entry(&name, mode, oid)?;
        }

        Ok(tree)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries()
            .map(|(name, entry)| {
                let object_type = if entry.mode.is_tree() {
                    ObjectType::Tree
                } else {
                    ObjectType::Blob
                };
                format!(
                    "{} {} {}\t{}",
                    entry.mode.as_str(),
                    object_type.as_str(),
                    entry.oid.as_ref(),
                    name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

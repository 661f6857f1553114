//! Commit object
//!
//! Commits tie a tree (directory snapshot) to its history: zero or more
//! parent commits, author/committer identities, and a message.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Headers are `key value` lines; a line starting with a space continues
//! the previous value (header folding). Keys this implementation does not
//! know are carried through opaquely so foreign commits re-serialize
//! without loss.

use crate::artifacts::errors::WitError;
use crate::artifacts::objects::author::Author;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Parse a `key value` header block with space-prefixed continuation
/// lines, keeping keys in file order. Shared by commit and tag payloads.
pub(crate) fn parse_headers(block: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in block.lines() {
        if let Some(continuation) = line.strip_prefix(' ') {
            let (_, value) = headers.last_mut().ok_or_else(|| {
                WitError::CorruptObject("header continuation before any header".to_string())
            })?;
            value.push('\n');
            value.push_str(continuation);
        } else {
            let (key, value) = line.split_once(' ').ok_or_else(|| {
                WitError::CorruptObject(format!("malformed header line `{line}`"))
            })?;
            headers.push((key.to_string(), value.to_string()));
        }
    }

    Ok(headers)
}

/// Re-fold a header value: embedded newlines become newline-space.
pub(crate) fn fold_header_value(value: &str) -> String {
    value.replace('\n', "\n ")
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for an initial commit, several for a
    /// merge); serialization preserves this order verbatim, so it is part
    /// of the commit's identity.
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    /// Unknown headers, in file order.
    extra_headers: Vec<(String, String)>,
    message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parents,
            tree_oid,
            author: author.clone(),
            committer: author,
            extra_headers: Vec::new(),
            message,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.extra_headers
    }

    fn payload(&self) -> String {
        let mut header_lines = Vec::new();

        header_lines.push(format!("tree {}", self.tree_oid.as_ref()));
        for parent in &self.parents {
            header_lines.push(format!("parent {}", parent.as_ref()));
        }
        header_lines.push(format!("author {}", self.author.display()));
        header_lines.push(format!("committer {}", self.committer.display()));
        for (key, value) in &self.extra_headers {
            header_lines.push(format!("{key} {}", fold_header_value(value)));
        }

        format!("{}\n\n{}", header_lines.join("\n"), self.message)
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content_bytes = self.payload().into_bytes();

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)
            .map_err(|_| WitError::CorruptObject("commit payload is not valid utf-8".to_string()))?;

        let (header_block, message) = content.split_once("\n\n").ok_or_else(|| {
            WitError::CorruptObject("commit payload has no header/message separator".to_string())
        })?;

        let mut parents = Vec::new();
        let mut tree_oid = None;
        let mut author = None;
        let mut committer = None;
        let mut extra_headers = Vec::new();

        for (key, value) in parse_headers(header_block)? {
            match key.as_str() {
                "tree" => tree_oid = Some(ObjectId::try_parse(value)?),
                "parent" => parents.push(ObjectId::try_parse(value)?),
                "author" => author = Some(Author::try_from(value.as_str())?),
                "committer" => committer = Some(Author::try_from(value.as_str())?),
                _ => extra_headers.push((key, value)),
            }
        }

        let tree_oid = tree_oid
            .ok_or_else(|| WitError::CorruptObject("commit missing tree header".to_string()))?;
        let author = author
            .ok_or_else(|| WitError::CorruptObject("commit missing author header".to_string()))?;
        let committer = committer.ok_or_else(|| {
            WitError::CorruptObject("commit missing committer header".to_string())
        })?;

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            extra_headers,
            message: message.to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.payload()
    }
}

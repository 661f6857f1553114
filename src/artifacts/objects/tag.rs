//! Tag object
//!
//! Annotated tags wrap another object (usually a commit) with a name,
//! an optional tagger identity, and a message.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! tag <size>\0
//! object <target-sha>
//! type <target-kind>
//! tag <name>
//! tagger <name> <email> <timestamp> <timezone>
//!
//! <tag message>
//! ```
//!
//! The header block uses the same `key value` format as commits,
//! including folding and opaque carry-through of unknown keys.

use crate::artifacts::errors::WitError;
use crate::artifacts::objects::author::Author;
use crate::artifacts::objects::commit::{fold_header_value, parse_headers};
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    object_oid: ObjectId,
    target_type: ObjectType,
    tagger: Option<Author>,
    /// Unknown headers, in file order.
    extra_headers: Vec<(String, String)>,
    message: String,
}

impl Tag {
    pub fn new(
        name: String,
        object_oid: ObjectId,
        target_type: ObjectType,
        tagger: Option<Author>,
        message: String,
    ) -> Self {
        Tag {
            name,
            object_oid,
            target_type,
            tagger,
            extra_headers: Vec::new(),
            message,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_oid(&self) -> &ObjectId {
        &self.object_oid
    }

    pub fn target_type(&self) -> ObjectType {
        self.target_type
    }

    pub fn tagger(&self) -> Option<&Author> {
        self.tagger.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn payload(&self) -> String {
        let mut header_lines = Vec::new();

        header_lines.push(format!("object {}", self.object_oid.as_ref()));
        header_lines.push(format!("type {}", self.target_type.as_str()));
        header_lines.push(format!("tag {}", self.name));
        if let Some(tagger) = &self.tagger {
            header_lines.push(format!("tagger {}", tagger.display()));
        }
        for (key, value) in &self.extra_headers {
            header_lines.push(format!("{key} {}", fold_header_value(value)));
        }

        format!("{}\n\n{}", header_lines.join("\n"), self.message)
    }
}

impl Packable for Tag {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content_bytes = self.payload().into_bytes();

        let mut tag_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tag_bytes.write_all(header.as_bytes())?;
        tag_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tag_bytes))
    }
}

impl Unpackable for Tag {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)
            .map_err(|_| WitError::CorruptObject("tag payload is not valid utf-8".to_string()))?;

        let (header_block, message) = content.split_once("\n\n").ok_or_else(|| {
            WitError::CorruptObject("tag payload has no header/message separator".to_string())
        })?;

        let mut name = None;
        let mut object_oid = None;
        let mut target_type = None;
        let mut tagger = None;
        let mut extra_headers = Vec::new();

        for (key, value) in parse_headers(header_block)? {
            match key.as_str() {
                "object" => object_oid = Some(ObjectId::try_parse(value)?),
                "type" => target_type = Some(ObjectType::try_from(value.as_str())?),
                "tag" => name = Some(value),
                "tagger" => tagger = Some(Author::try_from(value.as_str())?),
                _ => extra_headers.push((key, value)),
            }
        }

        let object_oid = object_oid
            .ok_or_else(|| WitError::CorruptObject("tag missing object header".to_string()))?;
        let target_type = target_type
            .ok_or_else(|| WitError::CorruptObject("tag missing type header".to_string()))?;
        let name =
            name.ok_or_else(|| WitError::CorruptObject("tag missing tag header".to_string()))?;

        Ok(Tag {
            name,
            object_oid,
            target_type,
            tagger,
            extra_headers,
            message: message.to_string(),
        })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn display(&self) -> String {
        self.payload()
    }
}

use crate::artifacts::errors::WitError;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    /// Parse the `<kind> <size>\0` header off the front of a serialized
    /// object, returning the kind and the declared payload length.
    ///
    /// The caller is expected to check the declared length against the
    /// bytes actually remaining.
    pub fn parse_header(data_reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut kind = Vec::new();
        data_reader.read_until(b' ', &mut kind)?;
        if kind.pop() != Some(b' ') {
            anyhow::bail!(WitError::CorruptObject(
                "truncated header: missing kind separator".to_string()
            ));
        }

        let kind = std::str::from_utf8(&kind)
            .map_err(|_| WitError::CorruptObject("header kind is not valid utf-8".to_string()))?;
        let object_type = ObjectType::try_from(kind)?;

        let mut size = Vec::new();
        data_reader.read_until(b'\0', &mut size)?;
        if size.pop() != Some(b'\0') {
            anyhow::bail!(WitError::CorruptObject(
                "truncated header: missing size terminator".to_string()
            ));
        }

        let size = std::str::from_utf8(&size)
            .map_err(|_| WitError::CorruptObject("header size is not valid utf-8".to_string()))?;
        let declared_length = size.parse::<usize>().map_err(|_| {
            WitError::CorruptObject(format!("invalid declared payload length `{size}`"))
        })?;

        Ok((object_type, declared_length))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            _ => Err(WitError::CorruptObject(format!("unrecognized object kind `{value}`")).into()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

use crate::artifacts::errors::WitError;

/// File mode of a tree entry.
///
/// Serialized in tree payloads as octal without leading zeros (`40000`
/// for directories), displayed zero-padded to six digits (`040000`) the
/// way `ls-tree` prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryMode {
    #[default]
    Regular,
    Executable,
    Symlink,
    Directory,
}

impl EntryMode {
    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::Regular => 0o100644,
            EntryMode::Executable => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::Regular => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Directory => "040000",
        }
    }

    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        let raw = u32::from_str_radix(mode, 8)
            .map_err(|_| WitError::CorruptObject(format!("invalid entry mode `{mode}`")))?;

        match raw {
            0o100644 => Ok(EntryMode::Regular),
            0o100755 => Ok(EntryMode::Executable),
            0o120000 => Ok(EntryMode::Symlink),
            0o40000 => Ok(EntryMode::Directory),
            _ => Err(WitError::CorruptObject(format!("unsupported entry mode `{mode}`")).into()),
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }
}

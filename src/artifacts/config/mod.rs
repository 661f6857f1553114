//! Repository configuration file
//!
//! The config lives at `.git/config` as sectioned key-value text:
//!
//! ```text
//! [core]
//!     repositoryformatversion = 0
//!     filemode = false
//!     bare = false
//! ```
//!
//! Sections and keys keep their file order so a load/write cycle
//! round-trips, including sections this implementation does not
//! understand.

use crate::artifacts::errors::WitError;
use anyhow::Context;
use std::path::Path;

pub const CORE_SECTION: &str = "core";
pub const FORMAT_VERSION_KEY: &str = "repositoryformatversion";
pub const FILEMODE_KEY: &str = "filemode";
pub const BARE_KEY: &str = "bare";

/// The only format version this implementation reads or writes.
pub const SUPPORTED_FORMAT_VERSION: u32 = 0;

/// One `[name]` section, entries in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    sections: Vec<Section>,
}

impl Config {
    /// Config written by `init`: format version 0, no filemode tracking,
    /// non-bare.
    pub fn defaults() -> Self {
        let mut config = Config::default();
        config.set(CORE_SECTION, FORMAT_VERSION_KEY, "0");
        config.set(CORE_SECTION, FILEMODE_KEY, "false");
        config.set(CORE_SECTION, BARE_KEY, "false");
        config
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            anyhow::bail!(WitError::ConfigMissing(
                path.parent().unwrap_or(path).to_path_buf()
            ));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut sections: Vec<Section> = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                let name = name
                    .strip_suffix(']')
                    .with_context(|| format!("malformed config section header: {line}"))?;
                sections.push(Section {
                    name: name.trim().to_string(),
                    entries: Vec::new(),
                });
            } else {
                let (key, value) = line
                    .split_once('=')
                    .with_context(|| format!("malformed config line: {line}"))?;
                let section = sections
                    .last_mut()
                    .context("config entry before any section header")?;
                section
                    .entries
                    .push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        Ok(Config { sections })
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.render())
            .with_context(|| format!("failed to write config file {}", path.display()))
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&format!("[{}]\n", section.name));
            for (key, value) in &section.entries {
                out.push_str(&format!("\t{key} = {value}\n"));
            }
        }
        out
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a key, updating in place when it exists so ordering is stable.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let section = match self.sections.iter_mut().find(|s| s.name == section) {
            Some(section) => section,
            None => {
                self.sections.push(Section {
                    name: section.to_string(),
                    entries: Vec::new(),
                });
                self.sections.last_mut().expect("just pushed")
            }
        };

        match section.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => section.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn format_version(&self) -> anyhow::Result<u32> {
        let raw = self
            .get(CORE_SECTION, FORMAT_VERSION_KEY)
            .with_context(|| format!("config has no {CORE_SECTION}.{FORMAT_VERSION_KEY}"))?;
        raw.parse::<u32>()
            .with_context(|| format!("invalid {FORMAT_VERSION_KEY}: {raw}"))
    }

    pub fn filemode(&self) -> bool {
        self.get(CORE_SECTION, FILEMODE_KEY) == Some("true")
    }

    pub fn bare(&self) -> bool {
        self.get(CORE_SECTION, BARE_KEY) == Some("true")
    }

    /// Forward-compat guard: refuse any format version other than 0.
    pub fn ensure_supported(&self) -> anyhow::Result<()> {
        let version = self.format_version()?;
        if version != SUPPORTED_FORMAT_VERSION {
            anyhow::bail!(WitError::UnsupportedFormatVersion(version));
        }
        Ok(())
    }
}

use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Hash a file as a blob, optionally storing it in the database.
    pub fn hash_object(&self, file: &Path, write: bool) -> anyhow::Result<()> {
        let content = std::fs::read(file)
            .with_context(|| format!("failed to read file {}", file.display()))?;
        let object = Blob::new(content.into());

        let object_id = if write {
            self.database().store(&object)?
        } else {
            self.database().hash_of(&object)?
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}

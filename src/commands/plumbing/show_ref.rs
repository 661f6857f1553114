use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List every ref with the id it resolves to. Refs that do not
    /// resolve yet (an unborn branch) are skipped.
    pub fn show_ref(&self) -> anyhow::Result<()> {
        for name in self.refs().list_all_refs()? {
            if let Some(object_id) = self.refs().read_ref(&name)? {
                writeln!(self.writer(), "{object_id} {name}")?;
            }
        }

        Ok(())
    }
}

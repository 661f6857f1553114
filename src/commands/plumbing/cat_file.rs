use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print the content of an object, resolving abbreviated ids.
    pub fn cat_file(&self, object_id: &str) -> anyhow::Result<()> {
        let object_id = self.database().resolve_prefix(object_id)?;
        let object = self.database().parse_object(&object_id)?;

        write!(self.writer(), "{}", object.display())?;

        Ok(())
    }
}

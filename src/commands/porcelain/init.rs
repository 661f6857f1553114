use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Create a new repository at `path` and report where it landed.
    pub fn init(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<()> {
        let repository = Repository::initialize(path, writer)?;

        write!(
            repository.writer(),
            "Initialized empty repository in {}",
            repository.path().display()
        )?;

        Ok(())
    }
}

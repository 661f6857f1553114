use crate::areas::repository::Repository;
use crate::artifacts::objects::author::Author;
use crate::artifacts::objects::tag::Tag;
use anyhow::Context;

impl Repository {
    /// Create a tag pointing at `target` (an id prefix, or HEAD when
    /// absent).
    ///
    /// A lightweight tag is just a ref file; an annotated tag stores a
    /// tag object and points the ref at it. The tagger identity comes
    /// from the environment, same as commit authorship.
    pub fn tag(
        &self,
        name: &str,
        target: Option<&str>,
        annotate: bool,
        message: Option<&str>,
    ) -> anyhow::Result<()> {
        let target_oid = match target {
            Some(prefix) => self.database().resolve_prefix(prefix)?,
            None => self
                .refs()
                .read_head()?
                .context("HEAD does not point at any commit yet")?,
        };

        if annotate {
            let tagger = Author::load_from_env()?;
            let target_type = self.database().object_type_of(&target_oid)?;
            let message = message.unwrap_or(name);

            let tag = Tag::new(
                name.to_string(),
                target_oid,
                target_type,
                Some(tagger),
                format!("{message}\n"),
            );
            let tag_oid = self.database().store(&tag)?;
            self.refs().create_tag_ref(name, &tag_oid)?;
        } else {
            self.refs().create_tag_ref(name, &target_oid)?;
        }

        Ok(())
    }
}

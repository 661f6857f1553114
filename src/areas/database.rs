//! Content-addressable object database
//!
//! Maps in-memory objects to their on-disk representation and back:
//! serialize, hash, zlib-compress, and persist under
//! `objects/<2-hex>/<38-hex>`; locate, decompress, validate the header,
//! and dispatch payload parsing by kind.
//!
//! Objects are immutable once written. The store never updates an
//! existing object in place; writing content that already exists is an
//! idempotent no-op.

use crate::artifacts::errors::WitError;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use fake::rand;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, new)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Compute the id an object would be stored under, without writing.
    pub fn hash_of(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        object.object_id()
    }

    /// Persist an object and return its id.
    ///
    /// The serialized bytes are compressed and written to a temporary
    /// file, then renamed into place, so a crash mid-write never leaves a
    /// readable path with partial content. If the destination already
    /// exists the write is skipped: identical content has an identical
    /// id, so there is nothing to do.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_content = object.serialize()?;
        let object_id = ObjectId::digest(&object_content);
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object_content)?;
        }

        Ok(object_id)
    }

    /// Read and parse an object by its full id.
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
            ObjectType::Tag => Ok(ObjectBox::Tag(Box::new(Tag::deserialize(object_reader)?))),
        }
    }

    pub fn object_type_of(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl std::io::BufRead)> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.exists() {
            anyhow::bail!(WitError::ObjectNotFound(object_id.to_string()));
        }

        let object_content = self.read_object(object_path)?;
        let total_length = object_content.len();
        let mut object_reader = Cursor::new(object_content);

        let (object_type, declared_length) = ObjectType::parse_header(&mut object_reader)
            .with_context(|| format!("failed to parse header of object {object_id}"))?;

        let remaining = total_length - object_reader.position() as usize;
        if remaining != declared_length {
            anyhow::bail!(WitError::CorruptObject(format!(
                "object {object_id} declares {declared_length} payload bytes but has {remaining}"
            )));
        }

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Resolve a hex prefix to the single object id it abbreviates.
    ///
    /// Zero matches fail with `ObjectNotFound`, more than one with
    /// `AmbiguousPrefix` listing every candidate.
    pub fn resolve_prefix(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!(WitError::ObjectNotFound(prefix.to_string()));
        }

        let mut matches = self.find_objects_by_prefix(&prefix.to_lowercase())?;
        matches.sort();

        match matches.len() {
            0 => anyhow::bail!(WitError::ObjectNotFound(prefix.to_string())),
            1 => Ok(matches.remove(0)),
            _ => anyhow::bail!(WitError::AmbiguousPrefix {
                prefix: prefix.to_string(),
                candidates: matches
                    .iter()
                    .map(|oid| oid.as_ref().to_string())
                    .collect(),
            }),
        }
    }

    /// Find all objects whose id starts with the given hex prefix.
    ///
    /// For prefixes of 2+ characters only the directory named by the
    /// first two is scanned; shorter prefixes scan every fan-out
    /// directory.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();

        if prefix.len() >= 2 {
            let dir_name = &prefix[..2];
            let file_prefix = &prefix[2..];
            let dir_path = self.path.join(dir_name);

            if dir_path.is_dir() {
                for entry in std::fs::read_dir(&dir_path)? {
                    let entry = entry?;
                    let file_name = entry.file_name();
                    let file_name_str = file_name.to_string_lossy();

                    if file_name_str.starts_with(file_prefix) {
                        let full_oid = format!("{}{}", dir_name, file_name_str);
                        if let Ok(oid) = ObjectId::try_parse(full_oid) {
                            matches.push(oid);
                        }
                    }
                }
            }
        } else {
            for i in 0..=255 {
                let dir_name = format!("{i:02x}");
                let dir_path = self.path.join(&dir_name);

                if !dir_path.is_dir() {
                    continue;
                }

                for entry in std::fs::read_dir(&dir_path)? {
                    let entry = entry?;
                    let file_name = entry.file_name();
                    let file_name_str = file_name.to_string_lossy();
                    let full_oid = format!("{}{}", dir_name, file_name_str);

                    if full_oid.starts_with(prefix)
                        && let Ok(oid) = ObjectId::try_parse(full_oid)
                    {
                        matches.push(oid);
                    }
                }
            }
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::author::Author;
    use crate::artifacts::objects::entry_mode::EntryMode;

    fn database(dir: &assert_fs::TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    fn oid(fill: char) -> ObjectId {
        ObjectId::try_parse(fill.to_string().repeat(40)).unwrap()
    }

    fn author() -> Author {
        let timestamp = chrono::DateTime::parse_from_rfc3339("2024-03-01T12:30:00+02:00").unwrap();
        Author::new_with_timestamp("Ada".to_string(), "ada@example.com".to_string(), timestamp)
    }

    #[test]
    fn blob_round_trips_through_disk() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);
        let blob = Blob::new(Bytes::from_static(b"hello world\n"));

        let object_id = database.store(&blob).unwrap();
        let parsed = database.parse_object(&object_id).unwrap();

        assert_eq!(parsed, ObjectBox::Blob(Box::new(blob)));
    }

    #[test]
    fn tree_round_trips_through_disk() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);
        let mut tree = Tree::default();
        tree.add_entry("src", EntryMode::Directory, oid('1')).unwrap();
        tree.add_entry("main.rs", EntryMode::Regular, oid('2'))
            .unwrap();

        let object_id = database.store(&tree).unwrap();
        let parsed = database.parse_object(&object_id).unwrap();

        assert_eq!(parsed, ObjectBox::Tree(Box::new(tree)));
    }

    #[test]
    fn commit_round_trips_through_disk() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);
        let commit = Commit::new(
            vec![oid('1'), oid('2')],
            oid('a'),
            author(),
            "merge upstream\n".to_string(),
        );

        let object_id = database.store(&commit).unwrap();
        let parsed = database.parse_object(&object_id).unwrap();

        assert_eq!(parsed, ObjectBox::Commit(Box::new(commit)));
    }

    #[test]
    fn tag_round_trips_through_disk() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);
        let tag = Tag::new(
            "v0.1.0".to_string(),
            oid('c'),
            ObjectType::Commit,
            Some(author()),
            "first release\n".to_string(),
        );

        let object_id = database.store(&tag).unwrap();
        let parsed = database.parse_object(&object_id).unwrap();

        assert_eq!(parsed, ObjectBox::Tag(Box::new(tag)));
    }

    #[test]
    fn store_is_idempotent() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);
        let blob = Blob::new(Bytes::from_static(b"same content"));

        let first = database.store(&blob).unwrap();
        let second = database.store(&blob).unwrap();

        assert_eq!(first, second);

        // exactly one file in the object directory
        let fanout_dir = dir.path().join("objects").join(&first.as_ref()[..2]);
        let files: Vec<_> = std::fs::read_dir(&fanout_dir).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn hash_is_content_sensitive() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);

        let a = database.hash_of(&Blob::new(Bytes::from_static(b"abc"))).unwrap();
        let b = database.hash_of(&Blob::new(Bytes::from_static(b"abc"))).unwrap();
        let c = database.hash_of(&Blob::new(Bytes::from_static(b"abd"))).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn reading_a_missing_object_fails_with_not_found() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);

        let err = database.parse_object(&oid('d')).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn length_mismatch_is_reported_as_corrupt() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);

        // forge an object whose header lies about its payload length
        let forged = Database::compress(Bytes::from_static(b"blob 99\0short")).unwrap();
        let object_id = oid('e');
        let object_path = dir.path().join("objects").join(object_id.to_path());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();
        std::fs::write(&object_path, &forged).unwrap();

        let err = database.parse_object(&object_id).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::CorruptObject(_))
        ));
    }

    #[test]
    fn unknown_kind_is_reported_as_corrupt() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);

        let forged = Database::compress(Bytes::from_static(b"blub 4\0abcd")).unwrap();
        let object_id = oid('f');
        let object_path = dir.path().join("objects").join(object_id.to_path());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();
        std::fs::write(&object_path, &forged).unwrap();

        let err = database.parse_object(&object_id).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::CorruptObject(_))
        ));
    }

    fn plant_object_file(dir: &assert_fs::TempDir, full_hex: &str) {
        let path = dir
            .path()
            .join("objects")
            .join(&full_hex[..2])
            .join(&full_hex[2..]);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn short_prefix_with_two_candidates_is_ambiguous() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);
        let first = format!("abc111{}", "0".repeat(34));
        let second = format!("abc222{}", "0".repeat(34));
        plant_object_file(&dir, &first);
        plant_object_file(&dir, &second);

        let err = database.resolve_prefix("abc").unwrap_err();

        match err.downcast_ref::<WitError>() {
            Some(WitError::AmbiguousPrefix { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.contains(&first));
                assert!(candidates.contains(&second));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn longer_unique_prefix_resolves() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);
        let first = format!("abc111{}", "0".repeat(34));
        let second = format!("abc222{}", "0".repeat(34));
        plant_object_file(&dir, &first);
        plant_object_file(&dir, &second);

        let resolved = database.resolve_prefix("abc111").unwrap();

        assert_eq!(resolved.as_ref(), first);
    }

    #[test]
    fn single_character_prefix_scans_all_directories() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);
        let only = format!("7b{}", "5".repeat(38));
        plant_object_file(&dir, &only);

        let resolved = database.resolve_prefix("7").unwrap();

        assert_eq!(resolved.as_ref(), only);
    }

    #[test]
    fn unmatched_prefix_fails_with_not_found() {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = database(&dir);

        let err = database.resolve_prefix("deadbeef").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::ObjectNotFound(_))
        ));
    }
}

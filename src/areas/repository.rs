use crate::areas::database::Database;
use crate::areas::layout::Layout;
use crate::areas::refs::Refs;
use crate::artifacts::config::Config;
use crate::artifacts::errors::WitError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;

pub const DEFAULT_BRANCH: &str = "master";

const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// The repository aggregate: worktree root, control root, loaded config,
/// and handles to the component areas.
///
/// Construction is two-phase: `open` resolves the path pair and then
/// validates it into an immutable aggregate, so a `Repository` value in
/// hand always refers to a usable layout (modulo `force`, which is the
/// initialization-in-progress escape hatch).
pub struct Repository {
    worktree: Box<Path>,
    git_path: Box<Path>,
    config: Config,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    refs: Refs,
    layout: Layout,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("worktree", &self.worktree)
            .field("git_path", &self.git_path)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Open an existing repository at `path`.
    ///
    /// Without `force`, the control directory must exist, the config file
    /// must be present, and its format version must be supported. With
    /// `force`, a missing config falls back to defaults and validation is
    /// skipped; `initialize` relies on this to assemble a repository
    /// whose layout does not exist yet.
    pub fn open(path: &Path, force: bool, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let worktree = if path.exists() {
            path.canonicalize()
                .with_context(|| format!("failed to canonicalize {}", path.display()))?
        } else {
            path.to_path_buf()
        };
        let git_path = worktree.join(".git");

        if !(force || git_path.is_dir()) {
            anyhow::bail!(WitError::NotARepository(worktree));
        }

        let config_path = git_path.join("config");
        let config = if config_path.is_file() {
            let config = Config::load(&config_path)?;
            if !force {
                config.ensure_supported()?;
            }
            config
        } else if force {
            Config::defaults()
        } else {
            anyhow::bail!(WitError::ConfigMissing(git_path));
        };

        let database = Database::new(git_path.join("objects").into_boxed_path());
        let refs = Refs::new(git_path.clone().into_boxed_path());
        let layout = Layout::new(git_path.clone().into_boxed_path());

        Ok(Repository {
            worktree: worktree.into_boxed_path(),
            git_path: git_path.into_boxed_path(),
            config,
            writer: RefCell::new(writer),
            database,
            refs,
            layout,
        })
    }

    /// Create a new repository at `path`.
    ///
    /// The worktree must be absent or an empty directory; anything else
    /// fails before a single file is written. Every layout step after
    /// that must succeed or the whole initialization fails — a
    /// `Repository` handle is never returned for a half-built layout.
    pub fn initialize(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repo = Self::open(path, true, writer)?;

        if repo.worktree.exists() {
            if !repo.worktree.is_dir() {
                anyhow::bail!(WitError::NotADirectory(repo.worktree.to_path_buf()));
            }
            if repo.worktree.read_dir()?.next().is_some() {
                anyhow::bail!(WitError::TargetNotEmpty(repo.worktree.to_path_buf()));
            }
        } else {
            std::fs::create_dir_all(&repo.worktree).with_context(|| {
                format!(
                    "failed to create worktree directory {}",
                    repo.worktree.display()
                )
            })?;
        }

        repo.layout
            .dir(&["branches"], true)?
            .context("failed to create branches directory")?;
        repo.layout
            .dir(&["objects"], true)?
            .context("failed to create objects directory")?;
        repo.layout
            .dir(&["refs", "tags"], true)?
            .context("failed to create refs/tags directory")?;
        repo.layout
            .dir(&["refs", "heads"], true)?
            .context("failed to create refs/heads directory")?;

        let description_path = repo
            .layout
            .file(&["description"], true)?
            .context("failed to resolve description file")?;
        std::fs::write(&description_path, DEFAULT_DESCRIPTION)
            .context("failed to write description file")?;

        repo.refs
            .set_head(DEFAULT_BRANCH, format!("ref: refs/heads/{DEFAULT_BRANCH}"))
            .context("failed to create initial HEAD reference")?;

        let config_path = repo
            .layout
            .file(&["config"], true)?
            .context("failed to resolve config file")?;
        repo.config.write(&config_path)?;

        Ok(repo)
    }

    /// Walk upward from `start` to the nearest enclosing repository.
    ///
    /// The walk is an explicit loop bounded by the depth of the
    /// canonicalized start path; it stops at the first ancestor holding a
    /// control directory, or at the filesystem root (where a path is its
    /// own parent, in effect).
    pub fn discover(
        start: &Path,
        required: bool,
        writer: Box<dyn std::io::Write>,
    ) -> anyhow::Result<Option<Self>> {
        let start = start
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {}", start.display()))?;

        let mut current = start.as_path();
        loop {
            if current.join(".git").is_dir() {
                return Ok(Some(Self::open(current, false, writer)?));
            }

            match current.parent() {
                Some(parent) if parent != current => current = parent,
                _ => break,
            }
        }

        if required {
            anyhow::bail!(WitError::NoRepositoryFound(start));
        }
        Ok(None)
    }

    pub fn path(&self) -> &Path {
        &self.worktree
    }

    pub fn git_path(&self) -> &Path {
        &self.git_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::config::SUPPORTED_FORMAT_VERSION;

    fn sink() -> Box<dyn std::io::Write> {
        Box::new(std::io::sink())
    }

    #[test]
    fn initialize_builds_the_full_layout() {
        let dir = assert_fs::TempDir::new().unwrap();
        let target = dir.path().join("project");

        let repo = Repository::initialize(&target, sink()).unwrap();

        let git_path = repo.git_path();
        for subdir in ["branches", "objects", "refs/tags", "refs/heads"] {
            assert!(git_path.join(subdir).is_dir(), "missing {subdir}");
        }

        let head = std::fs::read_to_string(git_path.join("HEAD")).unwrap();
        assert_eq!(head, format!("ref: refs/heads/{DEFAULT_BRANCH}"));

        let config = Config::load(&git_path.join("config")).unwrap();
        assert_eq!(config.format_version().unwrap(), SUPPORTED_FORMAT_VERSION);
        assert!(!config.filemode());
        assert!(!config.bare());

        assert!(git_path.join("description").is_file());
    }

    #[test]
    fn initialize_on_non_empty_directory_fails_and_writes_nothing() {
        let dir = assert_fs::TempDir::new().unwrap();
        std::fs::write(dir.path().join("precious.txt"), b"user data").unwrap();

        let err = Repository::initialize(dir.path(), sink()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::TargetNotEmpty(_))
        ));
        assert!(!dir.path().join(".git").exists());
    }

    #[test]
    fn initialize_on_a_file_fails_with_not_a_directory() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.path().join("a-file");
        std::fs::write(&file, b"").unwrap();

        let err = Repository::initialize(&file, sink()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::NotADirectory(_))
        ));
    }

    #[test]
    fn open_without_control_directory_fails() {
        let dir = assert_fs::TempDir::new().unwrap();

        let err = Repository::open(dir.path(), false, sink()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::NotARepository(_))
        ));
    }

    #[test]
    fn open_forced_without_config_falls_back_to_defaults() {
        let dir = assert_fs::TempDir::new().unwrap();

        let repo = Repository::open(dir.path(), true, sink()).unwrap();

        assert_eq!(repo.config().format_version().unwrap(), 0);
    }

    #[test]
    fn open_rejects_unsupported_format_version() {
        let dir = assert_fs::TempDir::new().unwrap();
        let git_path = dir.path().join(".git");
        std::fs::create_dir_all(&git_path).unwrap();
        std::fs::write(
            git_path.join("config"),
            "[core]\n\trepositoryformatversion = 1\n",
        )
        .unwrap();

        let err = Repository::open(dir.path(), false, sink()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::UnsupportedFormatVersion(1))
        ));
    }

    #[test]
    fn discover_finds_the_repository_from_a_nested_directory() {
        let dir = assert_fs::TempDir::new().unwrap();
        let root = dir.path().join("repo");
        Repository::initialize(&root, sink()).unwrap();
        let nested = root.join("sub").join("dir");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = Repository::discover(&nested, true, sink()).unwrap().unwrap();

        assert_eq!(repo.path(), root.canonicalize().unwrap());
    }

    #[test]
    fn discover_outside_any_repository() {
        let dir = assert_fs::TempDir::new().unwrap();

        let err = Repository::discover(dir.path(), true, sink()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WitError>(),
            Some(WitError::NoRepositoryFound(_))
        ));

        let absent = Repository::discover(dir.path(), false, sink()).unwrap();
        assert!(absent.is_none());
    }
}

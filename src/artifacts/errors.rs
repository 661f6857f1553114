//! Failure taxonomy for repository and object-store operations.
//!
//! Every variant is terminal: corruption is reported, never repaired, and
//! no operation retries. Plain I/O failures are not part of the taxonomy;
//! they stay as `std::io::Error` wrapped with context by the caller.
//! Callers that need to react to a specific failure `downcast_ref` it out
//! of the surrounding `anyhow::Error`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WitError {
    #[error("not a wit repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("config file missing in {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("unsupported repositoryformatversion {0}")]
    UnsupportedFormatVersion(u32),

    #[error("{} is not empty", .0.display())]
    TargetNotEmpty(PathBuf),

    #[error("no wit repository found starting from {}", .0.display())]
    NoRepositoryFound(PathBuf),

    #[error("object {0} not found")]
    ObjectNotFound(String),

    #[error("corrupt object: {0}")]
    CorruptObject(String),

    #[error("ambiguous object id prefix {prefix}: matches {}", .candidates.join(", "))]
    AmbiguousPrefix {
        prefix: String,
        candidates: Vec<String>,
    },
}

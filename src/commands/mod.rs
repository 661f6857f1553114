//! Command implementations
//!
//! Thin wrappers over the core, organized in two categories:
//!
//! - `plumbing`: low-level object and ref manipulation (hash-object,
//!   cat-file, show-ref, tag)
//! - `porcelain`: user-facing operations (init)
//!
//! The command table itself (argument parsing, dispatch) lives in the
//! binary, outside this crate's core.

pub mod plumbing;
pub mod porcelain;

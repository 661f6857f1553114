//! Plumbing commands (low-level operations)
//!
//! Direct access to the object database and refs, primarily for
//! scripting and as building blocks for porcelain commands.
//!
//! ## Commands
//!
//! - `hash-object`: Compute object ID and optionally store in database
//! - `cat-file`: Print a stored object
//! - `show-ref`: List references and the ids they resolve to
//! - `tag`: Create a lightweight or annotated tag

pub mod cat_file;
pub mod hash_object;
pub mod show_ref;
pub mod tag;

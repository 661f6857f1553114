//! Object types and operations
//!
//! All content is stored as immutable objects identified by SHA-1 hashes.
//! There are four kinds:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (names, modes, and object IDs)
//! - **Commit**: snapshot with metadata (author, message, parents, tree)
//! - **Tag**: annotated reference to another object
//!
//! All objects serialize to the format `<kind> <size>\0<payload>`; the
//! header participates in the hash, so kind and size are part of the
//! object's identity.

pub mod author;
pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tag;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

//! Core of a content-addressable version-control store.
//!
//! The crate is split the same way the on-disk repository is:
//!
//! - `areas`: repository-level components (repository aggregate, object
//!   database, refs, control-directory layout)
//! - `artifacts`: data types and formats (objects, config file, errors)
//! - `commands`: thin command wrappers consumed by the binary

pub mod areas;
pub mod artifacts;
pub mod commands;

//! Domain model.
//!
//! # Invariants
//! - Users are identified by a storage-assigned integer id.
//! - Deletion is a hard delete; there are no tombstones.

pub mod user;

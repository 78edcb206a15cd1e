//! Repository layer: data-access contracts and their SQLite implementation.
//!
//! # Invariants
//! - Repository APIs surface every database failure as `StorageError`.
//! - "Not found" is a value (`None`/`false`), never an error.

pub mod user_repo;

//! Use-case services over repositories.
//!
//! # Responsibility
//! - Enforce input rules before anything reaches storage.
//! - Keep console and other callers decoupled from SQLite details.

pub mod user_service;

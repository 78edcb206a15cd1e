//! Core data access and validation for usercrud.
//! Console front ends depend on this crate; it never reads stdin itself.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{close_db, open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{
    is_valid_age, is_valid_email_shape, User, UserId, UserValidationError, MAX_AGE, MIN_AGE,
};
pub use repo::user_repo::{
    FailureClass, RepoResult, SqliteUserRepository, StorageError, StorageOp, UserRepository,
};
pub use service::user_service::{ServiceResult, UserService, UserServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

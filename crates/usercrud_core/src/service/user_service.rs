//! User use-case service.
//!
//! # Responsibility
//! - Validate ids and user fields, then delegate to the repository.
//!
//! # Invariants
//! - A validation failure never reaches the repository.
//! - Storage failures pass through unchanged as `UserServiceError::Storage`.

use crate::model::user::{validate_id, validate_update_id, User, UserId, UserValidationError};
use crate::repo::user_repo::{StorageError, UserRepository};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, UserServiceError>;

/// Service error for user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    /// Input or business-rule violation. Safe to show and retry.
    Validation(UserValidationError),
    /// Database failure reported by the repository.
    Storage(StorageError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<UserValidationError> for UserServiceError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for UserServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Validating facade over a `UserRepository`.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates `user` and inserts it, returning the new id.
    pub fn create_user(&self, user: &User) -> ServiceResult<UserId> {
        user.validate().map_err(rejected("create_user"))?;
        Ok(self.repo.create(user)?)
    }

    /// Lists every user in ascending id order.
    pub fn get_all_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repo.find_all()?)
    }

    /// Looks up one user. `Ok(None)` when no such id exists.
    pub fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        let id = validate_id(id).map_err(rejected("get_user_by_id"))?;
        Ok(self.repo.find_by_id(id)?)
    }

    /// Validates and overwrites an existing user.
    ///
    /// Returns `false` when no row has `user.id`.
    pub fn update_user(&self, user: &User) -> ServiceResult<bool> {
        validate_update_id(user.id).map_err(rejected("update_user"))?;
        user.validate().map_err(rejected("update_user"))?;
        Ok(self.repo.update(user)?)
    }

    /// Deletes by id. Returns whether a user was removed.
    pub fn delete_user(&self, id: UserId) -> ServiceResult<bool> {
        let id = validate_id(id).map_err(rejected("delete_user"))?;
        Ok(self.repo.delete(id)?)
    }
}

fn rejected(op: &'static str) -> impl Fn(UserValidationError) -> UserServiceError {
    move |err| {
        debug!("event={op} module=service status=rejected reason={err}");
        UserServiceError::Validation(err)
    }
}

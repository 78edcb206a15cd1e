//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Translate user CRUD calls into SQL against the `users` table.
//! - Wrap every low-level failure into one `StorageError` kind.
//!
//! # Invariants
//! - Writes run in their own transaction: commit on success, rollback on failure.
//! - A failed rollback is logged and never replaces the original error.
//! - This layer does not apply `User::validate()`; the service layer does.
//! - `created_at` is written on insert only.

use crate::db::DbError;
use crate::model::user::{User, UserId};
use log::{debug, error, warn};
use rusqlite::{
    params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    age,
    created_at
FROM users";

pub type RepoResult<T> = Result<T, StorageError>;

/// Repository operation a `StorageError` was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Create,
    FindById,
    FindAll,
    Update,
    Delete,
}

impl StorageOp {
    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::FindById => "find_by_id",
            Self::FindAll => "find_all",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn action(self) -> &'static str {
        match self {
            Self::Create => "creating the user",
            Self::FindById => "looking up the user",
            Self::FindAll => "listing users",
            Self::Update => "updating the user",
            Self::Delete => "deleting the user",
        }
    }
}

/// Coarse failure category used to pick the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Database unreachable, locked, read-only or not a database.
    Connection,
    /// Malformed SQL or a schema mismatch.
    Query,
    /// A constraint or trigger rejected the write.
    Constraint,
    /// A stored row could not be mapped to `User`.
    InvalidData,
    /// `update` was called on a user without `id`.
    MissingId,
    Other,
}

impl FailureClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Query => "query",
            Self::Constraint => "constraint",
            Self::InvalidData => "invalid_data",
            Self::MissingId => "missing_id",
            Self::Other => "other",
        }
    }
}

/// Application-level storage failure.
///
/// `Display` is a readable message; `source()` keeps the database cause.
#[derive(Debug)]
pub struct StorageError {
    op: StorageOp,
    class: FailureClass,
    cause: Option<DbError>,
}

impl StorageError {
    fn from_sqlite(op: StorageOp, err: rusqlite::Error) -> Self {
        Self {
            op,
            class: classify(&err),
            cause: Some(DbError::Sqlite(err)),
        }
    }

    fn missing_id(op: StorageOp) -> Self {
        Self {
            op,
            class: FailureClass::MissingId,
            cause: None,
        }
    }

    pub fn op(&self) -> StorageOp {
        self.op
    }

    pub fn class(&self) -> FailureClass {
        self.class
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let action = self.op.action();
        match self.class {
            FailureClass::Connection => write!(
                f,
                "could not reach the database while {action}; check that the database file exists and is writable"
            ),
            FailureClass::Query => write!(f, "internal database query error while {action}"),
            FailureClass::Constraint => write!(f, "the database rejected the data while {action}"),
            FailureClass::InvalidData => write!(f, "stored user data is unreadable while {action}"),
            FailureClass::MissingId => write!(f, "a user id is required for {action}"),
            FailureClass::Other => write!(f, "database error while {action}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|err| err as &(dyn Error + 'static))
    }
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Inserts `user` and returns the storage-assigned id. `user.id` is ignored.
    fn create(&self, user: &User) -> RepoResult<UserId>;
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    /// All users ordered by ascending id.
    fn find_all(&self) -> RepoResult<Vec<User>>;
    /// Overwrites name, email and age. Returns whether a row matched `user.id`.
    fn update(&self, user: &User) -> RepoResult<bool>;
    /// Returns whether a row was removed. A missing row is not an error.
    fn delete(&self, id: UserId) -> RepoResult<bool>;
}

impl<R: UserRepository + ?Sized> UserRepository for &R {
    fn create(&self, user: &User) -> RepoResult<UserId> {
        (**self).create(user)
    }

    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> RepoResult<Vec<User>> {
        (**self).find_all()
    }

    fn update(&self, user: &User) -> RepoResult<bool> {
        (**self).update(user)
    }

    fn delete(&self, id: UserId) -> RepoResult<bool> {
        (**self).delete(id)
    }
}

/// SQLite-backed user repository borrowing the process connection.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Runs `work` in an immediate transaction scope.
    ///
    /// Commits on `Ok`; rolls back on `Err`. If `commit` itself fails the
    /// dropped transaction rolls back.
    fn in_transaction<T>(
        &self,
        op: StorageOp,
        work: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    ) -> RepoResult<T> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(|err| storage_failure(op, err))?;

        match work(&tx) {
            Ok(value) => {
                tx.commit().map_err(|err| storage_failure(op, err))?;
                Ok(value)
            }
            Err(err) => {
                let failure = storage_failure(op, err);
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=tx_rollback module=repo status=error op={} error={}",
                        op.as_str(),
                        rollback_err
                    );
                }
                Err(failure)
            }
        }
    }

    fn read<T>(
        &self,
        op: StorageOp,
        work: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> RepoResult<T> {
        work(self.conn).map_err(|err| storage_failure(op, err))
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create(&self, user: &User) -> RepoResult<UserId> {
        let id = self.in_transaction(StorageOp::Create, |tx| {
            tx.execute(
                "INSERT INTO users (
                    name,
                    email,
                    age,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4);",
                params![
                    user.name.as_str(),
                    user.email.as_deref(),
                    user.age,
                    user.created_at,
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;

        debug!("event=user_create module=repo status=ok user_id={id}");
        Ok(id)
    }

    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let found = self.read(StorageOp::FindById, |conn| {
            conn.query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()
        })?;

        debug!(
            "event=user_find module=repo status=ok user_id={id} found={}",
            found.is_some()
        );
        Ok(found)
    }

    fn find_all(&self) -> RepoResult<Vec<User>> {
        let users = self.read(StorageOp::FindAll, |conn| {
            let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
            let users = stmt
                .query_map([], parse_user_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })?;

        debug!(
            "event=user_list module=repo status=ok count={}",
            users.len()
        );
        Ok(users)
    }

    fn update(&self, user: &User) -> RepoResult<bool> {
        let Some(id) = user.id else {
            let err = StorageError::missing_id(StorageOp::Update);
            error!(
                "event=user_update module=repo status=error error_class={}",
                err.class().as_str()
            );
            return Err(err);
        };

        let changed = self.in_transaction(StorageOp::Update, |tx| {
            tx.execute(
                "UPDATE users
                 SET
                    name = ?1,
                    email = ?2,
                    age = ?3
                 WHERE id = ?4;",
                params![user.name.as_str(), user.email.as_deref(), user.age, id],
            )
        })?;

        debug!("event=user_update module=repo status=ok user_id={id} changed={changed}");
        Ok(changed > 0)
    }

    fn delete(&self, id: UserId) -> RepoResult<bool> {
        let changed = self.in_transaction(StorageOp::Delete, |tx| {
            tx.execute("DELETE FROM users WHERE id = ?1;", [id])
        })?;

        debug!("event=user_delete module=repo status=ok user_id={id} removed={changed}");
        Ok(changed > 0)
    }
}

fn storage_failure(op: StorageOp, err: rusqlite::Error) -> StorageError {
    let failure = StorageError::from_sqlite(op, err);
    error!(
        "event=user_{} module=repo status=error error_class={} error={}",
        op.as_str(),
        failure.class().as_str(),
        failure
            .source()
            .map_or_else(String::new, |cause| cause.to_string())
    );
    failure
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        age: row.get("age")?,
        created_at: row.get("created_at")?,
    })
}

fn classify(err: &rusqlite::Error) -> FailureClass {
    // Covers both `SqliteFailure` and `SqlInputError` (prepare-time failures).
    if let Some(code) = err.sqlite_error_code() {
        return match code {
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull => FailureClass::Connection,
            ErrorCode::ConstraintViolation => FailureClass::Constraint,
            _ => FailureClass::Query,
        };
    }

    match err {
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => FailureClass::InvalidData,
        rusqlite::Error::InvalidColumnName(_)
        | rusqlite::Error::InvalidColumnIndex(_)
        | rusqlite::Error::InvalidParameterName(_)
        | rusqlite::Error::InvalidParameterCount(..)
        | rusqlite::Error::MultipleStatement
        | rusqlite::Error::InvalidQuery => FailureClass::Query,
        _ => FailureClass::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, FailureClass, StorageError, StorageOp};
    use rusqlite::ffi;
    use std::error::Error;

    fn sqlite_failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn classify_maps_sqlite_codes() {
        assert_eq!(
            classify(&sqlite_failure(ffi::SQLITE_CANTOPEN)),
            FailureClass::Connection
        );
        assert_eq!(
            classify(&sqlite_failure(ffi::SQLITE_BUSY)),
            FailureClass::Connection
        );
        assert_eq!(
            classify(&sqlite_failure(ffi::SQLITE_CONSTRAINT)),
            FailureClass::Constraint
        );
        assert_eq!(
            classify(&sqlite_failure(ffi::SQLITE_ERROR)),
            FailureClass::Query
        );
        assert_eq!(
            classify(&rusqlite::Error::InvalidColumnName("nope".to_string())),
            FailureClass::Query
        );
        assert_eq!(
            classify(&rusqlite::Error::QueryReturnedNoRows),
            FailureClass::Other
        );
    }

    #[test]
    fn storage_error_keeps_cause_and_translates_message() {
        let err =
            StorageError::from_sqlite(StorageOp::Create, sqlite_failure(ffi::SQLITE_CANTOPEN));
        assert_eq!(err.op(), StorageOp::Create);
        assert_eq!(err.class(), FailureClass::Connection);
        assert!(err.to_string().contains("could not reach the database"));
        assert!(err.to_string().contains("creating the user"));
        assert!(err.source().is_some());
    }

    #[test]
    fn missing_id_has_no_cause() {
        let err = StorageError::missing_id(StorageOp::Update);
        assert_eq!(err.class(), FailureClass::MissingId);
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "a user id is required for updating the user");
    }
}

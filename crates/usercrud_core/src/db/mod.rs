//! SQLite connection bootstrap and schema setup.
//!
//! # Responsibility
//! - Open and close the process-wide SQLite connection.
//! - Make sure the `users` table exists before repositories touch it.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A database stamped with a newer version than this binary knows is refused.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{close_db, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, bootstrapping or closing the user database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file carries a `user_version` above [`schema::SCHEMA_VERSION`].
    NewerSchema(u32),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::NewerSchema(found) => write!(
                f,
                "users database has schema version {found}; this build only understands version {}",
                schema::SCHEMA_VERSION
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NewerSchema(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

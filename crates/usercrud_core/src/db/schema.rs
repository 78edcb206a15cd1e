//! `users` table bootstrap.
//!
//! There is a single schema version. Databases created by this binary are
//! stamped with it; unstamped databases get the table created if missing.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const USERS_TABLE_SQL: &str = include_str!("schema.sql");

/// Creates the `users` table when absent and stamps the schema version.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(DbError::NewerSchema(current));
    }

    let tx = conn.transaction()?;
    tx.execute_batch(USERS_TABLE_SQL)?;
    if current < SCHEMA_VERSION {
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }
    tx.commit()?;

    Ok(())
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

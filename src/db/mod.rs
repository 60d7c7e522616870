// src/db/mod.rs

//! Record store database
//!
//! Raw provider records are persisted in SQLite together with the columns
//! snapshots are ordered by. The database is the snapshot provider's source
//! of truth; the resolution engine never touches it.

pub mod records;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::{Connection, Transaction};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

pub use records::StoredRecord;

/// Create the database file and bring its schema up to date
pub fn init(db_path: impl AsRef<Path>) -> Result<()> {
    let db_path = db_path.as_ref();
    info!("Initializing record database at {}", db_path.display());

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    schema::migrate(&conn)?;
    Ok(())
}

/// Open an existing database, applying pending migrations
///
/// A missing file is an error rather than an empty store, so that a wrong
/// path does not silently produce "not found" for every request.
pub fn open(db_path: impl AsRef<Path>) -> Result<Connection> {
    let db_path = db_path.as_ref();
    if !db_path.is_file() {
        return Err(Error::IoError(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Database file {} does not exist", db_path.display()),
        )));
    }

    debug!("Opening record database {}", db_path.display());
    let conn = Connection::open(db_path)?;
    schema::migrate(&conn)?;
    Ok(conn)
}

/// Run `f` inside a transaction, committing only if it succeeds
pub fn transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let result = f(&tx)?;
    tx.commit()?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.sqlite");
        let err = open(&missing).unwrap_err();
        assert!(matches!(err, Error::IoError(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_init_creates_parent_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("var").join("records.sqlite");
        init(&db_path).unwrap();
        assert!(db_path.is_file());

        let conn = open(&db_path).unwrap();
        assert_eq!(schema::get_schema_version(&conn).unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("records.sqlite");
        init(&db_path).unwrap();
        let mut conn = open(&db_path).unwrap();

        let result: Result<()> = transaction(&mut conn, |tx| {
            tx.execute(
                "INSERT INTO records (item_id, revision, record) VALUES ('a', 1, '{}')",
                [],
            )?;
            Err(Error::ParseError("abort".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(StoredRecord::count(&conn).unwrap(), 0);
    }
}

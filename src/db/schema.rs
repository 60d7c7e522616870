// src/db/schema.rs

//! Record store schema
//!
//! Migrations are SQL batches applied in order; the number applied is kept in
//! SQLite's `user_version` header field, so opening an older database
//! upgrades it in place.

use crate::error::Result;
use rusqlite::Connection;
use tracing::{debug, info};

/// Migration `n` (1-based) is `MIGRATIONS[n - 1]`
const MIGRATIONS: &[&str] = &[
    // 1: one raw provider record per item. `item_id` has no declared type so
    // integer ids of the legacy provider and text ids of the current one are
    // stored unconverted.
    "CREATE TABLE records (
        item_id PRIMARY KEY,
        revision INTEGER NOT NULL,
        checkout_date TEXT,
        build_date TEXT,
        record TEXT NOT NULL
    );
    CREATE INDEX idx_records_order ON records(revision DESC, build_date DESC);",
];

/// Current schema version
pub const SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

/// Number of migrations applied to the database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Apply all pending migrations
pub fn migrate(conn: &Connection) -> Result<()> {
    let current = get_schema_version(conn)?;
    debug!("Record store schema version {}", current);

    for (version, sql) in (1..).zip(MIGRATIONS).skip(current.max(0) as usize) {
        info!("Applying record store migration {}", version);
        conn.execute_batch(&format!("BEGIN;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;"))?;
    }

    Ok(())
}

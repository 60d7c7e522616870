// src/db/records.rs

//! StoredRecord model - raw provider records with their ordering columns

use crate::error::{Error, Result};
use crate::record::raw::{GirderRecord, value_as_i64};
use crate::record::{ItemId, ProviderKind};
use rusqlite::{Connection, Row, params};
use serde::Deserialize;
use serde_json::Value;

/// One row of the `records` table
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub item_id: ItemId,
    pub revision: i64,
    pub checkout_date: Option<String>,
    pub build_date: Option<String>,
    /// Raw provider record as JSON text
    pub record: String,
}

#[derive(Deserialize)]
struct MidasColumns {
    item_id: Option<Value>,
    revision: Option<Value>,
    checkoutdate: Option<String>,
    date_creation: Option<String>,
}

impl StoredRecord {
    /// Derive the indexed columns of a raw provider record
    ///
    /// The legacy provider must carry integer `item_id` and `revision`;
    /// the current provider stores the item creation time as checkout date.
    pub fn from_raw(raw: &Value, provider: ProviderKind) -> Result<Self> {
        let record = serde_json::to_string(raw)?;

        match provider {
            ProviderKind::Midas => {
                let columns = MidasColumns::deserialize(raw)
                    .map_err(|e| Error::MalformedRecord(format!("unreadable midas record: {e}")))?;
                let item_id = columns
                    .item_id
                    .as_ref()
                    .and_then(value_as_i64)
                    .ok_or_else(|| Error::MalformedRecord("non-numeric item_id".to_string()))?;
                let revision = columns
                    .revision
                    .as_ref()
                    .and_then(value_as_i64)
                    .ok_or_else(|| {
                        Error::MalformedRecord(format!("item {item_id} has non-numeric revision"))
                    })?;

                Ok(Self {
                    item_id: ItemId::Int(item_id),
                    revision,
                    checkout_date: columns.checkoutdate,
                    build_date: columns.date_creation,
                    record,
                })
            }
            ProviderKind::Girder => {
                let item = GirderRecord::deserialize(raw)
                    .map_err(|e| Error::MalformedRecord(format!("unreadable girder record: {e}")))?;
                let item_id = item
                    .id
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| Error::MalformedRecord("missing _id".to_string()))?;
                let revision = item
                    .meta
                    .revision
                    .as_ref()
                    .and_then(value_as_i64)
                    .ok_or_else(|| {
                        Error::MalformedRecord(format!("item {item_id} has non-numeric revision"))
                    })?;

                Ok(Self {
                    item_id: ItemId::Text(item_id),
                    revision,
                    checkout_date: item.created,
                    build_date: item.meta.build_date,
                    record,
                })
            }
        }
    }

    /// Insert the row, replacing any row with the same item id
    pub fn upsert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO records (item_id, revision, checkout_date, build_date, record)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &self.item_id,
                &self.revision,
                &self.checkout_date,
                &self.build_date,
                &self.record,
            ],
        )?;
        Ok(())
    }

    /// Number of stored rows
    pub fn count(conn: &Connection) -> Result<usize> {
        let count: i64 = conn.query_row("SELECT count(1) FROM records", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// All rows in snapshot order: revision descending, then build date descending
    pub fn list_ordered(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT item_id, revision, checkout_date, build_date, record
             FROM records ORDER BY revision DESC, build_date DESC",
        )?;

        let rows = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Delete the row for `item_id`, returning whether it existed
    pub fn delete(conn: &Connection, item_id: &ItemId) -> Result<bool> {
        let changed = conn.execute("DELETE FROM records WHERE item_id = ?1", [item_id])?;
        Ok(changed > 0)
    }

    /// Parse the stored JSON back into a raw record
    pub fn raw(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.record)?)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            item_id: row.get(0)?,
            revision: row.get(1)?,
            checkout_date: row.get(2)?,
            build_date: row.get(3)?,
            record: row.get(4)?,
        })
    }
}

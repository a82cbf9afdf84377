//! Image record repository — operations on the `images` table.
//!
//! A record is *pending* iff `updated_when IS NULL AND skipped = 0`
//! and *terminal* otherwise. Terminal records are never selected for
//! annotation again; the pipeline never deletes rows.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, StoreError};
use crate::path_meta::AssetMeta;

/// A catalog row for one discovered image file.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: i64,
    pub collection: String,
    pub kind: String,
    pub file: String,
    pub filename: String,
    pub image_path: String,
    pub model: Option<String>,
    pub text: Option<String>,
    pub skipped: bool,
    pub created_when: String,
    pub scanned_when: String,
    pub updated_when: Option<String>,
}

impl ImageRecord {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            collection: row.get("collection")?,
            kind: row.get("type")?,
            file: row.get("file")?,
            filename: row.get("filename")?,
            image_path: row.get("image_path")?,
            model: row.get("model")?,
            text: row.get("text")?,
            skipped: row.get("skipped")?,
            created_when: row.get("created_when")?,
            scanned_when: row.get("scanned_when")?,
            updated_when: row.get("updated_when")?,
        })
    }

    /// Not yet annotated and not flagged skipped.
    pub fn is_pending(&self) -> bool {
        self.updated_when.is_none() && !self.skipped
    }
}

/// Refreshes `scanned_when` for an existing path. Returns `false` when
/// no record with that path exists. No other field is touched.
pub fn touch_scanned(
    conn: &Connection,
    image_path: &str,
    scanned_when: &str,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE images SET scanned_when = ?2 WHERE image_path = ?1",
        params![image_path, scanned_when],
    )?;
    Ok(changed > 0)
}

/// Inserts a newly discovered image. Metadata is fixed at this point
/// and never re-derived. Returns the assigned surrogate id.
pub fn insert(
    conn: &Connection,
    meta: &AssetMeta,
    image_path: &str,
    discovered_when: &str,
) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO images (collection, type, file, filename, image_path,
         created_when, scanned_when)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            meta.collection,
            meta.kind,
            meta.file,
            meta.filename,
            image_path,
            discovered_when,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Finds a record by its unique path.
pub fn find_by_path(db: &Database, image_path: &str) -> Result<Option<ImageRecord>, StoreError> {
    db.with_conn(|conn| {
        let record = conn
            .query_row(
                "SELECT * FROM images WHERE image_path = ?1",
                params![image_path],
                ImageRecord::from_row,
            )
            .optional()?;
        Ok(record)
    })
}

/// Selects the next pending record with an id strictly greater than
/// `after_id`. Ascending surrogate id is the authoritative work order:
/// ids are monotonic and immutable, so the sequence is total, stable
/// and crash-resumable.
pub fn next_pending_after(
    db: &Database,
    after_id: i64,
) -> Result<Option<ImageRecord>, StoreError> {
    db.with_conn(|conn| {
        let record = conn
            .query_row(
                "SELECT * FROM images
                 WHERE updated_when IS NULL AND skipped = 0 AND id > ?1
                 ORDER BY id ASC LIMIT 1",
                params![after_id],
                ImageRecord::from_row,
            )
            .optional()?;
        Ok(record)
    })
}

/// Persists a successful annotation in one statement: `model`, `text`
/// and `updated_when` become visible atomically, moving the record to
/// its terminal state.
pub fn mark_annotated(
    db: &Database,
    id: i64,
    model: &str,
    text: &str,
    updated_when: &str,
) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE images SET model = ?2, text = ?3, updated_when = ?4 WHERE id = ?1",
            params![id, model, text, updated_when],
        )?;
        Ok(())
    })
}

/// Administrative: permanently excludes a record from annotation.
/// Never called by the pipeline itself. Returns `false` when no record
/// with that path exists.
pub fn mark_skipped(db: &Database, image_path: &str) -> Result<bool, StoreError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE images SET skipped = 1 WHERE image_path = ?1",
            params![image_path],
        )?;
        Ok(changed > 0)
    })
}

/// Administrative: clears the skipped flag, returning the record to
/// the pending set if it has no annotation.
pub fn clear_skipped(db: &Database, image_path: &str) -> Result<bool, StoreError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE images SET skipped = 0 WHERE image_path = ?1",
            params![image_path],
        )?;
        Ok(changed > 0)
    })
}

/// Counts records awaiting annotation.
pub fn count_pending(db: &Database) -> Result<u64, StoreError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM images WHERE updated_when IS NULL AND skipped = 0",
            [],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

/// Counts successfully annotated records.
pub fn count_annotated(db: &Database) -> Result<u64, StoreError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM images WHERE updated_when IS NOT NULL",
            [],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

/// Counts all catalog rows.
pub fn count_all(db: &Database) -> Result<u64, StoreError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM images", [], |r| r.get(0))?;
        Ok(count)
    })
}

//! Resume cursor repository — the `resume_cursor` singleton row.
//!
//! The cursor records the most recently annotated path and when it was
//! annotated. It is advisory only: an operator or companion tool can
//! inspect where processing last was, but selection is always derived
//! fresh from the pending set. On interruption it may lag one record
//! behind the catalog without affecting correctness.

use rusqlite::{params, OptionalExtension};

use super::{Database, StoreError};

/// The advisory resume position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeCursor {
    pub image_path: String,
    pub annotated_when: String,
}

/// Reads the cursor, if any annotation has ever succeeded.
pub fn get(db: &Database) -> Result<Option<ResumeCursor>, StoreError> {
    db.with_conn(|conn| {
        let cursor = conn
            .query_row(
                "SELECT image_path, annotated_when FROM resume_cursor WHERE id = 1",
                [],
                |row| {
                    Ok(ResumeCursor {
                        image_path: row.get(0)?,
                        annotated_when: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(cursor)
    })
}

/// Moves the cursor to the given path in one upsert statement.
pub fn advance(db: &Database, image_path: &str, annotated_when: &str) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO resume_cursor (id, image_path, annotated_when)
             VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                 image_path = excluded.image_path,
                 annotated_when = excluded.annotated_when",
            params![image_path, annotated_when],
        )?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cursor() {
        let db = Database::open_in_memory().unwrap();
        assert!(get(&db).unwrap().is_none());
    }

    #[test]
    fn test_advance_and_get() {
        let db = Database::open_in_memory().unwrap();
        advance(&db, "/c/png/star.png", "2026-01-01T00:00:00Z").unwrap();

        let cursor = get(&db).unwrap().unwrap();
        assert_eq!(cursor.image_path, "/c/png/star.png");
        assert_eq!(cursor.annotated_when, "2026-01-01T00:00:00Z");
    }

    #[test]
    fn test_advance_replaces_singleton() {
        let db = Database::open_in_memory().unwrap();
        advance(&db, "/c/png/star.png", "2026-01-01T00:00:00Z").unwrap();
        advance(&db, "/c/png/moon.png", "2026-01-01T00:01:00Z").unwrap();

        let cursor = get(&db).unwrap().unwrap();
        assert_eq!(cursor.image_path, "/c/png/moon.png");

        db.with_conn(|conn| {
            let count: u32 =
                conn.query_row("SELECT COUNT(*) FROM resume_cursor", [], |r| r.get(0))?;
            assert_eq!(count, 1);
            Ok(())
        })
        .unwrap();
    }
}

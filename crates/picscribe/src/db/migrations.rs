//! Catalog migration system.
//!
//! Tracks applied migrations in a `_migrations` table and applies
//! pending ones in order. Schema evolution is idempotent by
//! construction: tables use CREATE IF NOT EXISTS and column additions
//! are guarded by a `PRAGMA table_info` existence check instead of
//! catching an "already exists" failure.

use rusqlite::Connection;

use super::error::StoreError;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
    /// Whether this migration needs conditional handling
    /// (e.g. ADD COLUMN that may already exist).
    kind: MigrationKind,
}

enum MigrationKind {
    /// Execute the SQL directly.
    Standard,
    /// ALTER TABLE ADD COLUMN — skip if column already exists.
    AddColumn {
        table: &'static str,
        column: &'static str,
    },
}

const CREATE_IMAGES: &str = "
CREATE TABLE IF NOT EXISTS images (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    collection    TEXT NOT NULL,
    type          TEXT NOT NULL,
    file          TEXT NOT NULL,
    filename      TEXT NOT NULL,
    image_path    TEXT NOT NULL UNIQUE,
    model         TEXT,
    text          TEXT,
    created_when  TEXT NOT NULL,
    scanned_when  TEXT NOT NULL,
    updated_when  TEXT
);
CREATE INDEX IF NOT EXISTS idx_images_updated_when ON images (updated_when);
";

const CREATE_RESUME_CURSOR: &str = "
CREATE TABLE IF NOT EXISTS resume_cursor (
    id             INTEGER PRIMARY KEY CHECK (id = 1),
    image_path     TEXT NOT NULL,
    annotated_when TEXT NOT NULL
);
";

const ADD_SKIPPED: &str = "
ALTER TABLE images ADD COLUMN skipped INTEGER NOT NULL DEFAULT 0;
";

/// All migrations in order. Each is applied at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_images_table",
        sql: CREATE_IMAGES,
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 2,
        description: "create_resume_cursor_table",
        sql: CREATE_RESUME_CURSOR,
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 3,
        description: "add_skipped_to_images",
        sql: ADD_SKIPPED,
        kind: MigrationKind::AddColumn {
            table: "images",
            column: "skipped",
        },
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> Result<(), StoreError> {
    // Create the migrations tracking table.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        let should_run = match &migration.kind {
            MigrationKind::Standard => true,
            MigrationKind::AddColumn { table, column } => !column_exists(conn, table, column)?,
        };

        if should_run {
            conn.execute_batch(migration.sql)
                .map_err(|e| StoreError::Migration {
                    version: migration.version,
                    reason: e.to_string(),
                })?;
        } else {
            log::info!(
                "Skipping migration v{} (condition not met)",
                migration.version
            );
        }

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

/// Checks whether a column exists on a table using `PRAGMA table_info`.
fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, StoreError> {
    // Validate identifier — only alphanumeric and underscores allowed.
    if !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::Migration {
            version: 0,
            reason: format!("Invalid table name: {}", table),
        });
    }
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|r| r.map(|name| name == column).unwrap_or(false));
    Ok(exists)
}

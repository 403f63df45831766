use crate::photokeep_core::error::{PhotokeepError, Result};
use rusqlite::{Connection, params};
use rusqlite_migration::{M, Migrations};
use std::path::Path;

const DB_FILE_NAME: &str = "database.db";

/// One fingerprinted file in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    pub path: String,
    pub fingerprint: String,
    pub size: u64,
}

/// Persistent path -> (fingerprint, size) index backed by SQLite.
///
/// The connection is owned by this value for one Organizer session and is
/// released on drop, on all exit paths.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    /// Open (or create) the index at `working_dir/database.db` and run
    /// migrations if necessary.
    pub fn open(working_dir: &Path) -> Result<Self> {
        let mut conn = Connection::open(working_dir.join(DB_FILE_NAME))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let migrations = Migrations::new(vec![M::up(
            r#"
            CREATE TABLE IF NOT EXISTS hashes (
                path TEXT PRIMARY KEY,
                fingerprint TEXT NOT NULL,
                size INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_hashes_fingerprint ON hashes (fingerprint);
            "#,
        )]);

        migrations.to_latest(&mut conn)?;

        Ok(Cache { conn })
    }

    /// Insert or fully replace the record for `path`.
    /// Idempotent under repeated identical calls.
    pub fn upsert(&self, path: &str, fingerprint: &str, size: u64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO hashes (path, fingerprint, size) VALUES (?1, ?2, ?3)
             ON CONFLICT (path) DO UPDATE SET fingerprint = ?2, size = ?3",
            params![path, fingerprint, size],
        )?;
        Ok(())
    }

    /// Look up a record by path. `None` if absent.
    ///
    /// The store guarantees path uniqueness; seeing more than one row here
    /// means the index file is corrupt.
    pub fn get_by_path(&self, path: &str) -> Result<Option<MediaRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, fingerprint, size FROM hashes WHERE path = ?1")?;
        let mut records = stmt
            .query_map(params![path], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match records.len() {
            0 => Ok(None),
            1 => Ok(Some(records.remove(0))),
            n => Err(PhotokeepError::Corruption(format!(
                "{} records share the path {}",
                n, path
            ))),
        }
    }

    /// All records sharing a fingerprint, ordered by path.
    /// Multiple matches are an expected, reportable condition.
    pub fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<MediaRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT path, fingerprint, size FROM hashes WHERE fingerprint = ?1 ORDER BY path",
        )?;
        let records = stmt
            .query_map(params![fingerprint], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// All records, ordered by path.
    pub fn get_all(&self) -> Result<Vec<MediaRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, fingerprint, size FROM hashes ORDER BY path")?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Remove the record for `path` if present; no-op if absent.
    pub fn delete_by_path(&self, path: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM hashes WHERE path = ?1", params![path])?;
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MediaRecord> {
    Ok(MediaRecord {
        path: row.get(0)?,
        fingerprint: row.get(1)?,
        size: row.get::<_, i64>(2)? as u64,
    })
}

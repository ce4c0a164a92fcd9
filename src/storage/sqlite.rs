//! SQLite storage implementation
//!
//! `SqliteStorage` keeps a small pool of idle connections. Each call checks a
//! connection out, uses it, and returns it, so concurrent workers never share
//! a connection. WAL mode and a busy timeout let their writes interleave.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ParagraphSink, Storage, StorageError, StorageResult};
use crate::storage::{ParagraphRecord, RunRecord, RunStatus};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Idle connections kept around for reuse
const MAX_IDLE_CONNECTIONS: usize = 16;

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// SQLite storage backend
pub struct SqliteStorage {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
}

impl SqliteStorage {
    /// Opens or creates the database at `path` and initializes the schema
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = open_connection(path)?;
        initialize_schema(&conn)?;

        Ok(Self {
            path: path.to_path_buf(),
            idle: Mutex::new(vec![conn]),
        })
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` with a connection checked out of the pool
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let conn = self.checkout()?;
        let result = f(&conn);
        self.checkin(conn);
        result
    }

    fn checkout(&self) -> StorageResult<Connection> {
        let pooled = self
            .idle
            .lock()
            .map_err(|_| StorageError::PoolPoisoned)?
            .pop();

        match pooled {
            Some(conn) => Ok(conn),
            None => Ok(open_connection(&self.path)?),
        }
    }

    fn checkin(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < MAX_IDLE_CONNECTIONS {
                idle.push(conn);
            }
        }
    }
}

/// Opens a connection configured for concurrent writers
fn open_connection(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA temp_store = MEMORY;
    ",
    )?;

    Ok(conn)
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        max_levels: row.get(4)?,
        status: run_status(row, 5)?,
        pages_crawled: row.get::<_, i64>(6)? as u64,
        paragraphs: row.get::<_, i64>(7)? as u64,
    })
}

fn run_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<RunStatus> {
    let raw: String = row.get(idx)?;
    RunStatus::from_db_string(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown run status '{}'", raw).into(),
        )
    })
}

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, max_levels, status, pages_crawled, paragraphs";

impl ParagraphSink for SqliteStorage {
    fn append(&self, record: &ParagraphRecord) -> StorageResult<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO paragraphs (paragraph, url, tag, captured_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.text,
                    record.source_url,
                    record.tag,
                    record.captured_at.to_rfc3339()
                ],
            )?;
            Ok(())
        })
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&self, config_hash: &str, max_levels: u32) -> StorageResult<i64> {
        self.with_connection(|conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO runs (started_at, config_hash, max_levels, status)
                 VALUES (?1, ?2, ?3, ?4)",
                params![now, config_hash, max_levels, RunStatus::Running.to_db_string()],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn complete_run(
        &self,
        run_id: i64,
        pages_crawled: u64,
        paragraphs: u64,
    ) -> StorageResult<()> {
        self.with_connection(|conn| {
            let now = Utc::now().to_rfc3339();
            let updated = conn.execute(
                "UPDATE runs SET status = ?1, finished_at = ?2, pages_crawled = ?3, paragraphs = ?4
                 WHERE id = ?5",
                params![
                    RunStatus::Completed.to_db_string(),
                    now,
                    pages_crawled as i64,
                    paragraphs as i64,
                    run_id
                ],
            )?;

            if updated == 0 {
                return Err(StorageError::RunNotFound(run_id));
            }
            Ok(())
        })
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.with_connection(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
        })
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.with_connection(|conn| {
            let run = conn
                .query_row(
                    &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                    [],
                    run_from_row,
                )
                .optional()?;
            Ok(run)
        })
    }

    // ===== Statistics =====

    fn count_paragraphs(&self) -> StorageResult<u64> {
        self.with_connection(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM paragraphs", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    fn count_paragraphs_by_tag(&self) -> StorageResult<Vec<(String, u64)>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT tag, COUNT(*) AS n FROM paragraphs GROUP BY tag ORDER BY n DESC, tag",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    fn count_distinct_urls(&self) -> StorageResult<u64> {
        self.with_connection(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(DISTINCT url) FROM paragraphs", [], |row| {
                    row.get(0)
                })?;
            Ok(count as u64)
        })
    }

    fn list_url_tags(&self) -> StorageResult<Vec<(String, String)>> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT DISTINCT url, tag FROM paragraphs ORDER BY url, tag")?;

            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

use duckdb::{params, AccessMode, Config, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::schema::{NcdRecord, TABLE_NAME};

/// Most rows a title search ever returns.
pub const MAX_MATCHES: usize = 5;

const MEMORY_PATH: &str = ":memory:";

/// A DuckDB file holding the `ncd_lookup` table.
///
/// The connection is closed when the store is dropped, so every operation
/// that opens one releases it on all exit paths.
pub struct NcdStore {
    conn: Connection,
    path: PathBuf,
}

impl NcdStore {
    /// Open the store at `path` for writing, creating the file if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|e| Error::store(&path, e))?;
        debug!(path = %path.display(), "opened store");
        Ok(Self { conn, path })
    }

    /// Open an existing store without write access. Fails if the file is absent.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| Error::store(&path, e))?;
        let conn = Connection::open_with_flags(&path, config).map_err(|e| Error::store(&path, e))?;
        debug!(path = %path.display(), "opened store read-only");
        Ok(Self { conn, path })
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::store(MEMORY_PATH, e))?;
        Ok(Self {
            conn,
            path: PathBuf::from(MEMORY_PATH),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fail(&self) -> impl Fn(duckdb::Error) -> Error + '_ {
        move |e| Error::store(&self.path, e)
    }

    /// Create the `ncd_lookup` table if it is absent. Existing tables are left alone.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {TABLE_NAME} (
                    NCD_mnl_sect_title TEXT,
                    NCD_id TEXT,
                    NCD_vrsn_num TEXT
                );"
            ))
            .map_err(self.fail())
    }

    /// Append `records` through a DuckDB appender inside a single transaction.
    /// Nothing is kept if any row fails. Returns the number of rows appended.
    pub fn append_batch(&mut self, records: &[NcdRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let path = self.path.clone();
        let fail = |e| Error::store(&path, e);

        let tx = self.conn.transaction().map_err(fail)?;
        {
            let mut appender = tx.appender(TABLE_NAME).map_err(fail)?;
            for r in records {
                appender
                    .append_row(params![r.section_title, r.ncd_id, r.version_number])
                    .map_err(fail)?;
            }
            appender.flush().map_err(fail)?;
        }
        tx.commit().map_err(fail)?;

        info!(rows = records.len(), path = %self.path.display(), "appended batch");
        Ok(records.len())
    }

    /// Total number of rows in `ncd_lookup`.
    pub fn count(&self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"), [], |r| r.get(0))
            .map_err(self.fail())?;
        Ok(n.max(0) as u64)
    }

    /// Up to [`MAX_MATCHES`] rows whose title contains `query`, ignoring case,
    /// in the table's scan order.
    pub fn search_titles(&self, query: &str) -> Result<Vec<NcdRecord>> {
        let sql = format!(
            "SELECT NCD_mnl_sect_title, NCD_id, NCD_vrsn_num
             FROM {TABLE_NAME}
             WHERE contains(lower(NCD_mnl_sect_title), lower(?::VARCHAR))
             LIMIT {MAX_MATCHES}"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(self.fail())?;
        let rows = stmt
            .query_map(params![query], record_from_row)
            .map_err(self.fail())?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(self.fail())
    }

    /// First row whose title contains `title`, or whose non-empty title is
    /// contained in `title`, ignoring case and surrounding whitespace.
    pub fn resolve_title(&self, title: &str) -> Result<Option<NcdRecord>> {
        let needle = title.trim();
        let sql = format!(
            "SELECT NCD_mnl_sect_title, NCD_id, NCD_vrsn_num
             FROM {TABLE_NAME}
             WHERE contains(lower(NCD_mnl_sect_title), lower(?::VARCHAR))
                OR (NCD_mnl_sect_title <> '' AND contains(lower(?::VARCHAR), lower(NCD_mnl_sect_title)))
             LIMIT 1"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(self.fail())?;
        let mut rows = stmt
            .query_map(params![needle, needle], record_from_row)
            .map_err(self.fail())?;
        rows.next().transpose().map_err(self.fail())
    }
}

fn record_from_row(row: &Row<'_>) -> duckdb::Result<NcdRecord> {
    Ok(NcdRecord {
        section_title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        ncd_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        version_number: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

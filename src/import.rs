// src/import.rs
use std::{
    fmt,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::duck::NcdStore;
use crate::error::Result;
use crate::process::read_ncd_csv;

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows: usize,
    pub db_path: PathBuf,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✅ Imported {} rows into {}",
            self.rows,
            self.db_path.display()
        )
    }
}

/// Load every row of `csv_path` into the store at `db_path`.
///
/// The table is created first if absent, then the whole file is parsed and
/// appended in one transaction. Rows already in the store are kept, so
/// importing the same file twice doubles it.
#[tracing::instrument(
    level = "info",
    skip_all,
    fields(csv = %csv_path.as_ref().display(), db = %db_path.as_ref().display())
)]
pub fn import_csv(csv_path: impl AsRef<Path>, db_path: impl AsRef<Path>) -> Result<ImportSummary> {
    let mut store = NcdStore::open(db_path.as_ref())?;
    store.ensure_schema()?;

    let records = read_ncd_csv(csv_path.as_ref())?;
    let rows = store.append_batch(&records)?;
    info!(rows, "import complete");

    Ok(ImportSummary {
        rows,
        db_path: store.path().to_path_buf(),
    })
}

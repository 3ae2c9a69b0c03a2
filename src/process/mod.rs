// src/process/mod.rs
use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::schema::{NcdRecord, REQUIRED_COLUMNS};

pub mod utils;

use utils::clean_header;

/// Positions of the required columns inside a particular file's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub section_title: usize,
    pub ncd_id: usize,
    pub version_number: usize,
}

impl ColumnIndex {
    /// Locate every required column in `headers`, reporting all that are absent.
    pub fn resolve(headers: &StringRecord, source: &Path) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(clean_header).collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        let mut found = [0usize; 3];
        let mut missing = Vec::new();
        for (slot, wanted) in found.iter_mut().zip(REQUIRED_COLUMNS) {
            match find(wanted) {
                Some(idx) => *slot = idx,
                None => missing.push(wanted.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(Error::SchemaMismatch {
                path: source.to_path_buf(),
                missing,
            });
        }

        Ok(Self {
            section_title: found[0],
            ncd_id: found[1],
            version_number: found[2],
        })
    }

    fn extract(&self, record: &StringRecord, line: u64) -> Result<NcdRecord> {
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .map(str::to_string)
                .ok_or_else(|| Error::MalformedRow {
                    line,
                    message: format!("missing field {}", name),
                })
        };
        Ok(NcdRecord {
            section_title: field(self.section_title, REQUIRED_COLUMNS[0])?,
            ncd_id: field(self.ncd_id, REQUIRED_COLUMNS[1])?,
            version_number: field(self.version_number, REQUIRED_COLUMNS[2])?,
        })
    }
}

/// Open `path` and parse every data row into an [`NcdRecord`], in file order.
///
/// A missing file is reported as [`Error::NotFound`]; any row that cannot be
/// decoded aborts the whole read.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_ncd_csv<P: AsRef<Path>>(path: P) -> Result<Vec<NcdRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;
    let records = parse_ncd_reader(BufReader::new(file), path)?;
    debug!(rows = records.len(), "parsed NCD csv");
    Ok(records)
}

/// Parse NCD rows from any reader; `source` only labels errors.
pub fn parse_ncd_reader<R: Read>(reader: R, source: &Path) -> Result<Vec<NcdRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| Error::malformed(1, &e))?.clone();
    let columns = ColumnIndex::resolve(&headers, source)?;
    trace!(?columns, "resolved header columns");

    let mut records = Vec::new();
    let mut record = StringRecord::new();
    loop {
        // header occupies line 1
        let fallback_line = records.len() as u64 + 2;
        match rdr.read_record(&mut record) {
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);
                records.push(columns.extract(&record, line)?);
            }
            Ok(false) => break,
            Err(e) => return Err(Error::malformed(fallback_line, &e)),
        }
    }
    Ok(records)
}

// src/error.rs
use std::path::PathBuf;

/// Errors raised while importing, querying or fetching NCD records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input CSV does not exist.
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The CSV header lacks one or more required columns.
    #[error("{} is missing required columns: {}", path.display(), missing.join(", "))]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },

    /// The store could not be opened, read or written.
    #[error("store unavailable at {}: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: duckdb::Error,
    },

    /// A data row could not be decoded against the header.
    #[error("malformed row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("CMS API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The CMS API answered but returned no policy for the reference.
    #[error("no NCD record found for id={id} version={version}")]
    PolicyNotFound { id: String, version: String },

    #[error("invalid CMS API response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn store(path: impl Into<PathBuf>, source: duckdb::Error) -> Self {
        Error::StoreUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Build a `MalformedRow` from a csv error, falling back to `line` when
    /// the reader has no position for it.
    pub(crate) fn malformed(line: u64, err: &csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(line);
        Error::MalformedRow {
            line,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

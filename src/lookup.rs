// src/lookup.rs
use std::{fmt, path::Path};

use tracing::info;

use crate::duck::NcdStore;
use crate::error::Result;
use crate::schema::NcdRecord;

/// Result of a title lookup. An empty result is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    NoMatch,
    /// `count` is the number of rows returned, never more than
    /// [`MAX_MATCHES`](crate::duck::MAX_MATCHES).
    Found { count: usize, records: Vec<NcdRecord> },
}

impl LookupOutcome {
    pub fn from_records(records: Vec<NcdRecord>) -> Self {
        if records.is_empty() {
            LookupOutcome::NoMatch
        } else {
            LookupOutcome::Found {
                count: records.len(),
                records,
            }
        }
    }

    pub fn count(&self) -> usize {
        match self {
            LookupOutcome::NoMatch => 0,
            LookupOutcome::Found { count, .. } => *count,
        }
    }

    pub fn records(&self) -> &[NcdRecord] {
        match self {
            LookupOutcome::NoMatch => &[],
            LookupOutcome::Found { records, .. } => records,
        }
    }
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::NoMatch => writeln!(f, "❌ No match found."),
            LookupOutcome::Found { count, records } => {
                writeln!(f, "🔍 Found {} match(es):", count)?;
                for r in records {
                    writeln!(
                        f,
                        "• {} — ID: {}, Version: {}",
                        r.section_title, r.ncd_id, r.version_number
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Case-insensitive substring search of section titles in the store at `db_path`.
#[tracing::instrument(level = "info", skip(db_path), fields(db = %db_path.as_ref().display()))]
pub fn lookup_ncd(query: &str, db_path: impl AsRef<Path>) -> Result<LookupOutcome> {
    let store = NcdStore::open_read_only(db_path)?;
    let outcome = LookupOutcome::from_records(store.search_titles(query)?);
    info!(matches = outcome.count(), "lookup complete");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::import::import_csv;
    use anyhow::Result;
    use std::{fs, path::PathBuf};
    use tempfile::{tempdir, TempDir};

    fn store_with(rows: &[(&str, &str, &str)]) -> Result<(TempDir, PathBuf)> {
        let tmp = tempdir()?;
        let csv = tmp.path().join("ncd.csv");
        let db = tmp.path().join("ncd.db");
        let mut text = String::from("\u{feff}NCD_mnl_sect_title,NCD_id,NCD_vrsn_num\n");
        for (title, id, version) in rows {
            text.push_str(&format!("\"{title}\",{id},{version}\n"));
        }
        fs::write(&csv, text)?;
        import_csv(&csv, &db)?;
        Ok((tmp, db))
    }

    #[test]
    fn lowercase_query_matches_mixed_and_upper_case_titles() -> Result<()> {
        let (_tmp, db) = store_with(&[
            ("Hyperbaric Oxygen Therapy", "20.29", "3"),
            ("HYPERBARIC OXYGEN THERAPY", "20.29", "4"),
            ("Cochlear Implantation", "50.3", "2"),
        ])?;

        let outcome = lookup_ncd("hyperbaric", &db)?;
        assert_eq!(outcome.count(), 2);
        assert!(outcome
            .records()
            .iter()
            .all(|r| r.section_title.to_lowercase().contains("hyperbaric")));
        Ok(())
    }

    #[test]
    fn matches_substring_in_middle_of_title() -> Result<()> {
        let (_tmp, db) = store_with(&[
            ("Hyperbaric Oxygen Therapy", "20.29", "3"),
            ("Home Use of Oxygen", "240.2", "4"),
        ])?;
        assert_eq!(lookup_ncd("Oxygen", &db)?.count(), 2);
        Ok(())
    }

    #[test]
    fn eight_matches_report_five() -> Result<()> {
        let rows: Vec<(String, String)> = (0..8)
            .map(|i| (format!("Oxygen Therapy Part {i}"), format!("{}", 300 + i)))
            .collect();
        let borrowed: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(t, id)| (t.as_str(), id.as_str(), "1"))
            .collect();
        let (_tmp, db) = store_with(&borrowed)?;

        let outcome = lookup_ncd("oxygen therapy", &db)?;
        assert_eq!(outcome.count(), 5);
        assert_eq!(outcome.records().len(), 5);
        Ok(())
    }

    #[test]
    fn no_match_is_not_an_error() -> Result<()> {
        let (_tmp, db) = store_with(&[("Hyperbaric Oxygen Therapy", "20.29", "3")])?;
        let outcome = lookup_ncd("acupuncture", &db)?;
        assert_eq!(outcome, LookupOutcome::NoMatch);
        assert_eq!(outcome.to_string(), "❌ No match found.\n");
        Ok(())
    }

    #[test]
    fn renders_header_and_one_line_per_record() {
        let outcome = LookupOutcome::from_records(vec![
            NcdRecord::new("Lumbar Artificial Disc Replacement", "313", "2"),
            NcdRecord::new("Electrical Nerve Stimulators", "240", "1"),
        ]);
        assert_eq!(
            outcome.to_string(),
            "🔍 Found 2 match(es):\n\
             • Lumbar Artificial Disc Replacement — ID: 313, Version: 2\n\
             • Electrical Nerve Stimulators — ID: 240, Version: 1\n"
        );
    }

    #[test]
    fn missing_store_is_unavailable() {
        let tmp = tempdir().unwrap();
        let err = lookup_ncd("oxygen", tmp.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
    }
}

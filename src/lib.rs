//! Load National Coverage Determination (NCD) exports into DuckDB and look
//! them up by section title.

pub mod config;
pub mod duck;
pub mod error;
pub mod fetch;
pub mod import;
pub mod lookup;
pub mod policy;
pub mod process;
pub mod schema;

pub use config::{Config, ConfigOverrides};
pub use duck::{NcdStore, MAX_MATCHES};
pub use error::{Error, Result};
pub use import::{import_csv, ImportSummary};
pub use lookup::{lookup_ncd, LookupOutcome};
pub use policy::{fetch_ncd_policy, PolicyOutcome, PolicyRequest};
pub use schema::NcdRecord;

// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// Name of the single table holding imported determinations.
pub const TABLE_NAME: &str = "ncd_lookup";

pub const COL_SECTION_TITLE: &str = "NCD_mnl_sect_title";
pub const COL_NCD_ID: &str = "NCD_id";
pub const COL_VERSION_NUMBER: &str = "NCD_vrsn_num";

/// Columns every input header must carry, in table order.
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_SECTION_TITLE, COL_NCD_ID, COL_VERSION_NUMBER];

/// One National Coverage Determination row as stored in `ncd_lookup`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct NcdRecord {
    #[serde(rename = "NCD_mnl_sect_title")]
    pub section_title: String,
    #[serde(rename = "NCD_id")]
    pub ncd_id: String,
    #[serde(rename = "NCD_vrsn_num")]
    pub version_number: String,
}

impl NcdRecord {
    pub fn new(
        section_title: impl Into<String>,
        ncd_id: impl Into<String>,
        version_number: impl Into<String>,
    ) -> Self {
        Self {
            section_title: section_title.into(),
            ncd_id: ncd_id.into(),
            version_number: version_number.into(),
        }
    }
}

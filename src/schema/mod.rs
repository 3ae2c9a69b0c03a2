pub mod types;

pub use types::{
    NcdRecord, COL_NCD_ID, COL_SECTION_TITLE, COL_VERSION_NUMBER, REQUIRED_COLUMNS, TABLE_NAME,
};

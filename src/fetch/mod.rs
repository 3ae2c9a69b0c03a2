// src/fetch/mod.rs

/// Client for the CMS coverage API
pub mod cms;

pub use cms::{strip_html, CmsClient, NcdPolicy, DEFAULT_CMS_API_URL};

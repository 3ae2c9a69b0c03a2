// src/fetch/cms.rs
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_CMS_API_URL: &str = "https://api.coverage.cms.gov/v1/data/ncd/";

#[derive(Debug, Deserialize)]
struct NcdResponse {
    #[serde(default)]
    data: Vec<NcdItem>,
}

/// A determination as the CMS API returns it; text fields may carry HTML.
#[derive(Debug, Deserialize, Default)]
struct NcdItem {
    #[serde(default)]
    document_id: Value,
    #[serde(default)]
    document_version: Value,
    title: Option<String>,
    benefit_category: Option<String>,
    indications_limitations: Option<String>,
    transmittal_number: Option<String>,
    transmittal_url: Option<String>,
}

/// Plain-text policy derived from the first item of a CMS response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NcdPolicy {
    pub document_id: Value,
    pub document_version: Value,
    pub title: String,
    pub benefit_category: String,
    pub indications_limitations: String,
    pub transmittal_number: String,
    pub transmittal_url: String,
}

impl From<NcdItem> for NcdPolicy {
    fn from(item: NcdItem) -> Self {
        let clean = |s: Option<String>| strip_html(s.as_deref().unwrap_or_default());
        Self {
            document_id: item.document_id,
            document_version: item.document_version,
            title: clean(item.title),
            benefit_category: clean(item.benefit_category),
            indications_limitations: clean(item.indications_limitations),
            transmittal_number: clean(item.transmittal_number),
            transmittal_url: item.transmittal_url.unwrap_or_default(),
        }
    }
}

impl NcdPolicy {
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drop markup, keep the text nodes and collapse runs of whitespace.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode a CMS API body, keeping only the first determination.
pub fn parse_policy_response(body: &str, id: &str, version: &str) -> Result<NcdPolicy> {
    let response: NcdResponse = serde_json::from_str(body)?;
    response
        .data
        .into_iter()
        .next()
        .map(NcdPolicy::from)
        .ok_or_else(|| Error::PolicyNotFound {
            id: id.to_string(),
            version: version.to_string(),
        })
}

/// Blocking client for `api.coverage.cms.gov`.
pub struct CmsClient {
    http: Client,
    base: Url,
}

impl CmsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid CMS API url {}: {}", base_url, e)))?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    /// `<base>?ncdid=<id>&ncdver=<version>`
    pub fn policy_url(&self, id: &str, version: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("ncdid", id)
            .append_pair("ncdver", version);
        url
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub fn fetch_policy(&self, id: &str, version: &str) -> Result<NcdPolicy> {
        let url = self.policy_url(id, version);
        info!(%url, "fetching CMS NCD data");
        let body = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()?
            .error_for_status()?
            .text()?;
        debug!(bytes = body.len(), "CMS response received");
        parse_policy_response(&body, id, version)
    }
}

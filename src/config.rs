// src/config.rs
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::{Error, Result};
use crate::fetch::DEFAULT_CMS_API_URL;

/// Locations and endpoints shared by every command.
///
/// Layered lowest to highest: [`Config::default`], an optional YAML file,
/// then environment variables and command-line flags (applied by the binary
/// through [`Config::with_overrides`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// CSV export read by `import`.
    pub csv_path: PathBuf,
    /// DuckDB file written by `import` and read by `lookup` / `policy`.
    pub db_path: PathBuf,
    pub cms_api_url: String,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("query_param_lookup.csv"),
            db_path: PathBuf::from("ncd_lookup.db"),
            cms_api_url: DEFAULT_CMS_API_URL.to_string(),
            http_timeout_secs: 30,
        }
    }
}

/// Values that take precedence over the file, usually from flags or env vars.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub csv_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub cms_api_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

impl Config {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        parse_yaml(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {}", path.display(), e)))?;
        parse_yaml(&text).map_err(|e| Error::Config(format!("parsing {}: {}", path.display(), e)))
    }

    /// Defaults, or the YAML file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_yaml_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(v) = overrides.csv_path {
            self.csv_path = v;
        }
        if let Some(v) = overrides.db_path {
            self.db_path = v;
        }
        if let Some(v) = overrides.cms_api_url {
            self.cms_api_url = v;
        }
        if let Some(v) = overrides.http_timeout_secs {
            self.http_timeout_secs = v;
        }
        self
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_yaml(text: &str) -> std::result::Result<Config, serde_yaml::Error> {
    // an empty document deserializes to unit, not a map
    if text.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(text)
}

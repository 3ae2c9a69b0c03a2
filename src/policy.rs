// src/policy.rs
use std::{fmt, path::Path};

use tracing::info;

use crate::duck::NcdStore;
use crate::error::{Error, Result};
use crate::fetch::{CmsClient, NcdPolicy};

/// What the caller knows about the determination they want.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyRequest {
    pub ncd_id: Option<String>,
    pub version: Option<String>,
    pub title: Option<String>,
}

/// An `(ncd_id, version)` pair the CMS API can be queried with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NcdReference {
    pub ncd_id: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutcome {
    /// A title was given but nothing in the store matched it.
    NoTitleMatch { title: String },
    Policy(NcdPolicy),
}

impl fmt::Display for PolicyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyOutcome::NoTitleMatch { title } => {
                writeln!(f, "⚠️ No match found for \"{}\"", title)
            }
            PolicyOutcome::Policy(policy) => {
                let json = policy.to_pretty_json().map_err(|_| fmt::Error)?;
                writeln!(f, "{}", json)
            }
        }
    }
}

impl PolicyRequest {
    /// Turn the request into a reference, looking the title up in `store`
    /// when no ID was supplied. `Ok(None)` means the title matched nothing.
    pub fn resolve(&self, store: Option<&NcdStore>) -> Result<Option<NcdReference>> {
        let mut ncd_id = non_empty(&self.ncd_id);
        let mut version = non_empty(&self.version);

        if ncd_id.is_none() {
            if let (Some(title), Some(store)) = (self.title(), store) {
                match store.resolve_title(title)? {
                    Some(hit) => {
                        info!(title, ncd_id = %hit.ncd_id, version = %hit.version_number, "matched title");
                        ncd_id = non_empty(&Some(hit.ncd_id));
                        version = non_empty(&Some(hit.version_number));
                    }
                    None => return Ok(None),
                }
            }
        }

        match (ncd_id, version) {
            (Some(ncd_id), Some(version)) => Ok(Some(NcdReference { ncd_id, version })),
            _ => Err(Error::Config("missing NCD ID or version".to_string())),
        }
    }

    /// The title to search for; blank titles count as absent.
    fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    fn needs_store(&self) -> bool {
        non_empty(&self.ncd_id).is_none() && self.title().is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// Resolve `request` against the store at `db_path` if needed, then fetch the
/// policy text from the CMS API.
#[tracing::instrument(level = "info", skip(client, db_path))]
pub fn fetch_ncd_policy(
    client: &CmsClient,
    request: &PolicyRequest,
    db_path: impl AsRef<Path>,
) -> Result<PolicyOutcome> {
    let reference = if request.needs_store() {
        let store = NcdStore::open_read_only(db_path)?;
        request.resolve(Some(&store))?
    } else {
        request.resolve(None)?
    };

    let Some(reference) = reference else {
        return Ok(PolicyOutcome::NoTitleMatch {
            title: request.title.clone().unwrap_or_default(),
        });
    };

    info!(ncd_id = %reference.ncd_id, version = %reference.version, "retrieving NCD");
    let policy = client.fetch_policy(&reference.ncd_id, &reference.version)?;
    Ok(PolicyOutcome::Policy(policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NcdRecord;
    use anyhow::Result;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    fn store() -> Result<NcdStore> {
        let mut store = NcdStore::open_in_memory()?;
        store.ensure_schema()?;
        store.append_batch(&[
            NcdRecord::new("Lumbar Artificial Disc Replacement", "313", "2"),
            NcdRecord::new("Electrical Nerve Stimulators", "240", "1"),
        ])?;
        Ok(store)
    }

    #[test]
    fn explicit_reference_skips_store() -> Result<()> {
        let request = PolicyRequest {
            ncd_id: Some("20.29".into()),
            version: Some("3".into()),
            title: Some("ignored".into()),
        };
        assert_eq!(
            request.resolve(None)?,
            Some(NcdReference {
                ncd_id: "20.29".into(),
                version: "3".into()
            })
        );
        Ok(())
    }

    #[test]
    fn title_resolves_through_store() -> Result<()> {
        let store = store()?;
        let request = PolicyRequest {
            title: Some("lumbar artificial disc".into()),
            ..Default::default()
        };
        assert_eq!(
            request.resolve(Some(&store))?,
            Some(NcdReference {
                ncd_id: "313".into(),
                version: "2".into()
            })
        );
        Ok(())
    }

    #[test]
    fn unknown_title_resolves_to_none() -> Result<()> {
        let store = store()?;
        let request = PolicyRequest {
            title: Some("Cochlear Implantation".into()),
            ..Default::default()
        };
        assert_eq!(request.resolve(Some(&store))?, None);
        Ok(())
    }

    #[test]
    fn id_without_version_is_rejected() {
        let request = PolicyRequest {
            ncd_id: Some("240".into()),
            ..Default::default()
        };
        assert!(matches!(request.resolve(None), Err(Error::Config(_))));
        assert!(matches!(
            PolicyRequest::default().resolve(None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn blank_title_is_treated_as_missing() -> Result<()> {
        let store = store()?;
        for title in ["", "   "] {
            let request = PolicyRequest {
                title: Some(title.into()),
                ..Default::default()
            };
            assert!(!request.needs_store());
            assert!(matches!(
                request.resolve(Some(&store)),
                Err(Error::Config(ref msg)) if msg == "missing NCD ID or version"
            ));
        }
        Ok(())
    }

    #[test]
    fn empty_id_falls_back_to_title() -> Result<()> {
        let store = store()?;
        let request = PolicyRequest {
            ncd_id: Some(String::new()),
            version: Some(String::new()),
            title: Some("electrical nerve".into()),
        };
        assert_eq!(
            request.resolve(Some(&store))?,
            Some(NcdReference {
                ncd_id: "240".into(),
                version: "1".into()
            })
        );
        Ok(())
    }

    #[test]
    fn unmatched_title_never_reaches_the_api() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let db = tmp.path().join("ncd.db");
        {
            let mut store = NcdStore::open(&db)?;
            store.ensure_schema()?;
            store.append_batch(&[NcdRecord::new("Home Oxygen", "240.2", "4")])?;
        }
        // unroutable base url: any request would fail with Http
        let client = CmsClient::new("http://127.0.0.1:9/", Duration::from_millis(200))?;
        let request = PolicyRequest {
            title: Some("acupuncture".into()),
            ..Default::default()
        };
        let outcome = fetch_ncd_policy(&client, &request, &db)?;
        assert_eq!(
            outcome,
            PolicyOutcome::NoTitleMatch {
                title: "acupuncture".into()
            }
        );
        assert_eq!(outcome.to_string(), "⚠️ No match found for \"acupuncture\"\n");
        Ok(())
    }

    #[test]
    fn policy_outcome_renders_json() {
        let policy: NcdPolicy = serde_json::from_value(json!({
            "document_id": 240,
            "document_version": 1,
            "title": "Electrical Nerve Stimulators",
            "benefit_category": "",
            "indications_limitations": "",
            "transmittal_number": "",
            "transmittal_url": ""
        }))
        .unwrap();
        let rendered = PolicyOutcome::Policy(policy).to_string();
        assert!(rendered.starts_with("{\n  \"document_id\": 240,"));
        assert!(rendered.ends_with("}\n"));
    }
}

//! Build canonical leads from raw discovery output.
//!
//! The discovery collaborator returns nominally-JSON text. Records are loosely
//! shaped and validated one at a time: a bad record is skipped, never fatal.

use std::collections::HashMap;

use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use sponsorscout_common::{ContactField, GroundingSource, Lead, SocialLinks};

use crate::evidence::{map_forensic_field, RawEvidence};
use crate::json_extract::extract_json;
use crate::lenient::{
    canonicalize_keys, lenient_evidence_map, lenient_social_links, lenient_string, KeyAliases,
};
use crate::normalize::{normalize_address, normalize_social_value, normalize_url};

/// Keys under which a wrapper object may carry the lead array.
const WRAPPER_KEYS: &[&str] = &["leads", "sponsors", "results"];

/// Spellings the discovery model uses for lead keys, best first.
const LEAD_KEY_ALIASES: &[KeyAliases] = &[
    ("companyName", &["companyName", "company_name", "company", "name"]),
    ("address", &["address", "location"]),
    ("contactName", &["contactName", "contact_name"]),
    ("socialLinks", &["socialLinks", "social_links"]),
    ("linkedin", &["linkedin", "linkedIn"]),
];

/// One lead as the discovery model reports it.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawDiscoveredLead {
    /// Business name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    /// Official website URL.
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    /// Full postal address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    /// Best person to contact about sponsorship.
    #[serde(default, deserialize_with = "lenient_string")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Why this business is a good sponsor fit.
    #[serde(default, deserialize_with = "lenient_string")]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient_social_links")]
    pub social_links: SocialLinks,
    #[serde(default, deserialize_with = "lenient_string")]
    pub instagram: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub twitter: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub facebook: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub youtube: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tiktok: Option<String>,
    /// Per-field provenance keyed by field name (e.g. "email", "socialLinks.instagram").
    #[serde(default, deserialize_with = "lenient_evidence_map")]
    pub evidence: HashMap<String, RawEvidence>,
}

impl RawDiscoveredLead {
    fn raw_field(&self, field: ContactField) -> Option<&str> {
        let nested = self.social_links.get(field);
        let value = match field {
            ContactField::Email => self.email.as_deref(),
            ContactField::Phone => self.phone.as_deref(),
            ContactField::Address => self.address.as_deref(),
            ContactField::ContactName => self.contact_name.as_deref(),
            ContactField::Website => self.website.as_deref(),
            ContactField::Instagram => nested.or(self.instagram.as_deref()),
            ContactField::Linkedin => nested.or(self.linkedin.as_deref()),
            ContactField::Twitter => nested.or(self.twitter.as_deref()),
            ContactField::Facebook => nested.or(self.facebook.as_deref()),
            ContactField::Youtube => nested.or(self.youtube.as_deref()),
            ContactField::Tiktok => nested.or(self.tiktok.as_deref()),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Evidence lookup tolerant of key casing and a `socialLinks.` prefix.
    fn evidence_index(&self) -> HashMap<String, &RawEvidence> {
        self.evidence
            .iter()
            .map(|(key, ev)| {
                let lower = key.trim().to_lowercase();
                let bare = lower
                    .strip_prefix("sociallinks.")
                    .or_else(|| lower.strip_prefix("social_links."))
                    .unwrap_or(&lower)
                    .replace('_', "");
                (bare, ev)
            })
            .collect()
    }

    /// Convert into a canonical lead. `None` when the record has no company name.
    pub fn into_lead(self, grounding: &[GroundingSource]) -> Option<Lead> {
        let name = self
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())?
            .to_string();

        let mut lead = Lead::new(name);
        let evidence = self.evidence_index();

        for field in ContactField::ALL {
            let Some(raw) = self.raw_field(field) else {
                continue;
            };
            let Some(value) = canonical_value(field, raw) else {
                continue;
            };
            let key = field.as_str().to_lowercase();
            if let Some(fwe) = map_forensic_field(Some(&value), evidence.get(&key).copied()) {
                lead.set_field(field, fwe);
            }
        }

        lead.description = self.description.as_deref().and_then(trimmed);
        lead.reasoning = self.reasoning.as_deref().and_then(trimmed);
        lead.grounding_sources = grounding.to_vec();
        Some(lead)
    }
}

fn trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn canonical_value(field: ContactField, raw: &str) -> Option<String> {
    match field {
        ContactField::Website => normalize_url(raw),
        ContactField::Address => normalize_address(raw),
        f if f.is_social() => normalize_social_value(raw),
        _ => trimmed(raw),
    }
}

/// Parse discovery collaborator output into leads.
///
/// Accepts a top-level array, an object wrapping an array under `leads`,
/// `sponsors` or `results`, or a single lead object. Unparseable text yields
/// an empty list.
pub fn parse_discovered_leads(text: &str, grounding: &[GroundingSource]) -> Vec<Lead> {
    let Some(value) = extract_json(text) else {
        warn!(len = text.len(), "Discovery output contained no usable JSON");
        return Vec::new();
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let wrapped = WRAPPER_KEYS
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                });
            wrapped.unwrap_or_else(|| vec![Value::Object(map)])
        }
        other => {
            warn!(kind = %value_kind(&other), "Discovery output was not an object or array");
            return Vec::new();
        }
    };

    let total = items.len();
    let leads: Vec<Lead> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let item = canonicalize_keys(item, LEAD_KEY_ALIASES);
            match serde_json::from_value::<RawDiscoveredLead>(item) {
                Ok(raw) => {
                    let lead = raw.into_lead(grounding);
                    if lead.is_none() {
                        debug!(index, "Skipping discovered record without a company name");
                    }
                    lead
                }
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed discovered record");
                    None
                }
            }
        })
        .collect();

    debug!(total, parsed = leads.len(), "Parsed discovery output");
    leads
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON Schema of the lead array the discovery prompt asks for.
pub fn discovery_schema() -> RootSchema {
    schemars::schema_for!(Vec<RawDiscoveredLead>)
}

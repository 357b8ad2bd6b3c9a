//! Tolerant readers for collaborator JSON.
//!
//! A field with the wrong shape degrades to absent or empty. It never fails
//! the record around it.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use sponsorscout_common::SocialLinks;

use crate::evidence::RawEvidence;

/// Alias spellings for one canonical key, in priority order.
pub(crate) type KeyAliases = (&'static str, &'static [&'static str]);

/// Fold alias spellings onto their canonical key.
///
/// The first alias holding a non-blank value wins and every other spelling is
/// dropped, so a record carrying both `companyName` and `name` keeps one of
/// them instead of tripping a duplicate-field error.
pub(crate) fn canonicalize_keys(item: Value, aliases: &[KeyAliases]) -> Value {
    let Value::Object(mut map) = item else {
        return item;
    };
    for (canonical, keys) in aliases {
        let mut chosen = None;
        for key in keys.iter() {
            if let Some(value) = map.remove(*key) {
                if chosen.is_none() && is_present(&value) {
                    chosen = Some(value);
                }
            }
        }
        if let Some(value) = chosen {
            map.insert((*canonical).to_string(), value);
        }
    }
    Value::Object(map)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Strings pass through, numbers are stringified, anything else is absent.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_text))
}

/// Like `lenient_string`, with absent collapsing to "".
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accept numbers, numeric strings ("0.8", "80%") and junk (→ None).
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_confidence_str(&s),
        _ => None,
    }))
}

fn parse_confidence_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    match trimmed.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|p| p / 100.0),
        None => trimmed.parse().ok(),
    }
}

/// Audit trails arrive as a list of strings, a list of objects, or one string.
pub(crate) fn lenient_trail<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let entries = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => vec![s],
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Some(other) => vec![other.to_string()],
    };
    Ok(entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect())
}

/// Social links from an object of per-platform strings. Non-string platform
/// values are dropped; a non-object is no links at all.
pub(crate) fn lenient_social_links<'de, D>(deserializer: D) -> Result<SocialLinks, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(map)) = value else {
        return Ok(SocialLinks::default());
    };

    Ok(SocialLinks {
        instagram: first_text(&map, &["instagram"]),
        linkedin: first_text(&map, &["linkedin", "linkedIn"]),
        twitter: first_text(&map, &["twitter"]),
        facebook: first_text(&map, &["facebook"]),
        youtube: first_text(&map, &["youtube"]),
        tiktok: first_text(&map, &["tiktok"]),
    })
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// Per-field evidence. A bare string entry is read as the source name;
/// entries of any other unusable shape are skipped one by one.
pub(crate) fn lenient_evidence_map<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, RawEvidence>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(map)) = value else {
        return Ok(HashMap::new());
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, entry)| {
            let evidence = match entry {
                Value::String(source) => RawEvidence::from_source(&source),
                Value::Object(fields) => {
                    match serde_json::from_value::<RawEvidence>(Value::Object(fields)) {
                        Ok(evidence) => evidence,
                        Err(e) => {
                            debug!(key = %key, error = %e, "Ignoring malformed evidence entry");
                            return None;
                        }
                    }
                }
                other => {
                    debug!(key = %key, value = %other, "Ignoring non-object evidence entry");
                    return None;
                }
            };
            Some((key, evidence))
        })
        .collect())
}

//! Evidence mapping: the single place that decides how much a fact is trusted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use sponsorscout_common::{clamp_confidence, EvidenceSource, FieldEvidence, FieldWithEvidence};

use crate::lenient::{lenient_f64, lenient_string};
use crate::normalize::normalize_url;

/// Evidence metadata as reported by an upstream source. Nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawEvidence {
    /// One of official_website, google_business, directory, social, manual.
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    /// 0.0 to 1.0.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
    /// Page where the value was seen.
    #[serde(default, alias = "source_url", alias = "url", deserialize_with = "lenient_string")]
    pub source_url: Option<String>,
}

impl RawEvidence {
    pub fn from_source(source: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            ..Self::default()
        }
    }
}

/// Build a `FieldWithEvidence` from a raw value and optional evidence.
///
/// Returns `None` when the value is empty after trimming. An unrecognized or
/// missing source classifies as `unknown`; a missing confidence falls back to
/// the source's default (0.9 first-party, 0.7 other known, 0.5 unknown).
/// Confidence is always clamped to [0, 1].
pub fn map_forensic_field(
    value: Option<&str>,
    evidence: Option<&RawEvidence>,
) -> Option<FieldWithEvidence> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    let source = evidence
        .and_then(|e| e.source.as_deref())
        .map(EvidenceSource::classify)
        .unwrap_or(EvidenceSource::Unknown);

    let confidence = evidence
        .and_then(|e| e.confidence)
        .filter(|c| !c.is_nan())
        .unwrap_or_else(|| source.default_confidence());

    let source_url = evidence
        .and_then(|e| e.source_url.as_deref())
        .and_then(normalize_url);

    Some(FieldWithEvidence {
        value: value.to_string(),
        evidence: FieldEvidence {
            source,
            confidence: clamp_confidence(confidence),
            source_url,
        },
    })
}

/// Evidence synthesized for a value a merge layer contributed.
pub fn synthesized(
    value: &str,
    source: EvidenceSource,
    confidence: f64,
    source_url: Option<&str>,
) -> Option<FieldWithEvidence> {
    let raw = RawEvidence {
        source: Some(source.as_str().to_string()),
        confidence: Some(confidence),
        source_url: source_url.map(str::to_string),
    };
    map_forensic_field(Some(value), Some(&raw))
}

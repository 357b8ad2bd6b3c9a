//! Re-verification pass: the one step allowed to overwrite merged fields.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use sponsorscout_common::{
    ContactField, EvidenceSource, Lead, SocialLinks, SponsorScoutError, VerificationReport,
    VerificationStatus,
};

use crate::evidence::synthesized;
use crate::json_extract::extract_json;
use crate::lenient::{
    canonicalize_keys, lenient_social_links, lenient_string, lenient_text, lenient_trail,
    KeyAliases,
};
use crate::normalize::{normalize_social_value, normalize_url};

/// Trust assigned to values the verification collaborator corrected.
const CORRECTION_CONFIDENCE: f64 = 0.95;

const RESPONSE_KEY_ALIASES: &[KeyAliases] = &[
    ("auditTrail", &["auditTrail", "audit_trail"]),
    ("correctedData", &["correctedData", "corrected_data"]),
];

const CORRECTION_KEY_ALIASES: &[KeyAliases] = &[("socialLinks", &["socialLinks", "social_links"])];

/// Output of the verification collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    /// VERIFIED, FAILED or COLLISION_DETECTED.
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    /// Why the verdict was reached.
    #[serde(default, deserialize_with = "lenient_text")]
    pub reasoning: String,
    /// Steps taken and pages consulted, in order.
    #[serde(default, deserialize_with = "lenient_trail")]
    pub audit_trail: Vec<String>,
    /// Replacement values for fields found to be wrong.
    #[serde(default, deserialize_with = "lenient_corrections")]
    pub corrected_data: Option<CorrectedData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectedData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_social_links")]
    pub social_links: SocialLinks,
}

/// Corrections only count when they arrive as an object.
fn lenient_corrections<'de, D>(deserializer: D) -> Result<Option<CorrectedData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(value @ Value::Object(_)) = value else {
        return Ok(None);
    };
    match serde_json::from_value(canonicalize_keys(value, CORRECTION_KEY_ALIASES)) {
        Ok(corrected) => Ok(Some(corrected)),
        Err(e) => {
            debug!(error = %e, "Ignoring malformed correctedData");
            Ok(None)
        }
    }
}

impl VerificationResponse {
    /// Terminal status for this response. Anything unrecognized or non-terminal
    /// counts as a failed verification.
    pub fn terminal_status(&self) -> VerificationStatus {
        match self.status.parse::<VerificationStatus>() {
            Ok(status) if status.is_terminal() => status,
            Ok(status) => {
                warn!(%status, "Verification returned a non-terminal status, treating as FAILED");
                VerificationStatus::Failed
            }
            Err(_) => {
                warn!(status = %self.status, "Unrecognized verification status, treating as FAILED");
                VerificationStatus::Failed
            }
        }
    }

    /// First audit-trail entry that is a URL, used as provenance for corrections.
    fn evidence_url(&self) -> Option<String> {
        self.audit_trail
            .iter()
            .find(|e| e.starts_with("http://") || e.starts_with("https://"))
            .and_then(|e| normalize_url(e))
    }
}

/// Parse verification collaborator output. `None` means no usable result.
pub fn parse_verification(text: &str) -> Option<VerificationResponse> {
    let value = extract_json(text)?;
    if !value.is_object() {
        warn!("Verification output was not a JSON object");
        return None;
    }
    match serde_json::from_value(canonicalize_keys(value, RESPONSE_KEY_ALIASES)) {
        Ok(response) => Some(response),
        Err(e) => {
            warn!(error = %e, "Verification output did not match the response shape");
            None
        }
    }
}

/// Start (or restart) verification for a lead.
pub fn begin_verification(lead: &Lead) -> Result<Lead, SponsorScoutError> {
    let mut next = lead.clone();
    next.verification_status = lead
        .verification_status
        .transition(VerificationStatus::Verifying)?;
    Ok(next)
}

/// Apply a verification result to a lead that is currently `VERIFYING`.
///
/// Corrected website, email and social links replace existing values
/// unconditionally, with `manual` evidence.
pub fn apply_verification(
    lead: &Lead,
    response: &VerificationResponse,
    verified_at: DateTime<Utc>,
) -> Result<Lead, SponsorScoutError> {
    let status = lead.verification_status.transition(response.terminal_status())?;

    let mut next = lead.clone();
    next.verification_status = status;
    next.verification = Some(VerificationReport {
        reasoning: response.reasoning.trim().to_string(),
        audit_trail: response.audit_trail.clone(),
        verified_at,
    });

    if let Some(corrected) = &response.corrected_data {
        let source_url = response.evidence_url();
        let mut overwrite = |field: ContactField, value: Option<String>| {
            let Some(value) = value else { return };
            if let Some(fwe) = synthesized(
                &value,
                EvidenceSource::Manual,
                CORRECTION_CONFIDENCE,
                source_url.as_deref(),
            ) {
                next.set_field(field, fwe);
            }
        };

        overwrite(
            ContactField::Website,
            corrected.website.as_deref().and_then(normalize_url),
        );
        overwrite(
            ContactField::Email,
            corrected
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        );
        for field in ContactField::SOCIAL {
            overwrite(
                field,
                corrected
                    .social_links
                    .get(field)
                    .and_then(normalize_social_value),
            );
        }
    }

    Ok(next)
}

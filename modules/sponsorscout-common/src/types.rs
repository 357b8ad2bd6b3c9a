use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SponsorScoutError;

// --- Evidence ---

/// Where a field value was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    OfficialWebsite,
    GoogleBusiness,
    Directory,
    Social,
    Manual,
    #[serde(other)]
    Unknown,
}

impl EvidenceSource {
    /// Classify a free-form source label. Anything outside the known set is `Unknown`.
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "official_website" => Self::OfficialWebsite,
            "google_business" => Self::GoogleBusiness,
            "directory" => Self::Directory,
            "social" => Self::Social,
            "manual" => Self::Manual,
            _ => Self::Unknown,
        }
    }

    /// Confidence assumed when the source did not state one.
    pub fn default_confidence(self) -> f64 {
        match self {
            Self::OfficialWebsite | Self::GoogleBusiness => 0.9,
            Self::Directory | Self::Social | Self::Manual => 0.7,
            Self::Unknown => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OfficialWebsite => "official_website",
            Self::GoogleBusiness => "google_business",
            Self::Directory => "directory",
            Self::Social => "social",
            Self::Manual => "manual",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEvidence {
    pub source: EvidenceSource,
    /// Always within [0, 1].
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl FieldEvidence {
    pub fn new(source: EvidenceSource, confidence: f64, source_url: Option<String>) -> Self {
        Self {
            source,
            confidence: clamp_confidence(confidence),
            source_url,
        }
    }

    /// Evidence assumed for a populated field that carries no provenance.
    pub fn unknown() -> Self {
        Self::new(EvidenceSource::Unknown, EvidenceSource::Unknown.default_confidence(), None)
    }
}

/// Clamp to [0, 1]. NaN collapses to 0; infinities saturate at the bounds.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// A value paired with the evidence that justifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWithEvidence {
    pub value: String,
    pub evidence: FieldEvidence,
}

// --- Contact fields ---

/// Every contact field on a lead that carries its own evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    Email,
    Phone,
    Address,
    ContactName,
    Website,
    Instagram,
    Linkedin,
    Twitter,
    Facebook,
    Youtube,
    Tiktok,
}

impl ContactField {
    pub const ALL: [ContactField; 11] = [
        ContactField::Email,
        ContactField::Phone,
        ContactField::Address,
        ContactField::ContactName,
        ContactField::Website,
        ContactField::Instagram,
        ContactField::Linkedin,
        ContactField::Twitter,
        ContactField::Facebook,
        ContactField::Youtube,
        ContactField::Tiktok,
    ];

    pub const SOCIAL: [ContactField; 6] = [
        ContactField::Instagram,
        ContactField::Linkedin,
        ContactField::Twitter,
        ContactField::Facebook,
        ContactField::Youtube,
        ContactField::Tiktok,
    ];

    pub fn is_social(self) -> bool {
        Self::SOCIAL.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::ContactName => "contactName",
            Self::Website => "website",
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One handle or profile URL per platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "linkedIn")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
}

impl SocialLinks {
    pub fn get(&self, field: ContactField) -> Option<&str> {
        let slot = match field {
            ContactField::Instagram => &self.instagram,
            ContactField::Linkedin => &self.linkedin,
            ContactField::Twitter => &self.twitter,
            ContactField::Facebook => &self.facebook,
            ContactField::Youtube => &self.youtube,
            ContactField::Tiktok => &self.tiktok,
            _ => return None,
        };
        slot.as_deref()
    }

    fn slot_mut(&mut self, field: ContactField) -> Option<&mut Option<String>> {
        match field {
            ContactField::Instagram => Some(&mut self.instagram),
            ContactField::Linkedin => Some(&mut self.linkedin),
            ContactField::Twitter => Some(&mut self.twitter),
            ContactField::Facebook => Some(&mut self.facebook),
            ContactField::Youtube => Some(&mut self.youtube),
            ContactField::Tiktok => Some(&mut self.tiktok),
            _ => None,
        }
    }
}

// --- Contact intelligence ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactKind {
    Email,
    Phone,
    Linkedin,
    Instagram,
    Twitter,
    #[serde(other)]
    Other,
}

/// A flattened, typed contact point gathered across enrichment passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactIntelligence {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub value: String,
    pub confidence: f64,
    /// Human-readable description of where this came from.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<DateTime<Utc>>,
    pub is_primary: bool,
}

// --- Verification ---

/// Lifecycle of the forensic audit pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verifying,
    Verified,
    Failed,
    CollisionDetected,
}

impl VerificationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Verified | Self::Failed | Self::CollisionDetected
        )
    }

    /// Validate a state change. Any state may restart at `Verifying`;
    /// terminal states are only reachable from `Verifying`.
    pub fn transition(self, next: Self) -> Result<Self, SponsorScoutError> {
        let allowed = match next {
            Self::Verifying => true,
            Self::Verified | Self::Failed | Self::CollisionDetected => self == Self::Verifying,
            Self::Pending => false,
        };
        if allowed {
            Ok(next)
        } else {
            Err(SponsorScoutError::InvalidTransition { from: self, to: next })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verifying => "VERIFYING",
            Self::Verified => "VERIFIED",
            Self::Failed => "FAILED",
            Self::CollisionDetected => "COLLISION_DETECTED",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = SponsorScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(&[' ', '-'][..], "_").as_str() {
            "PENDING" => Ok(Self::Pending),
            "VERIFYING" => Ok(Self::Verifying),
            "VERIFIED" => Ok(Self::Verified),
            "FAILED" => Ok(Self::Failed),
            "COLLISION_DETECTED" | "COLLISION" => Ok(Self::CollisionDetected),
            other => Err(SponsorScoutError::Parse(format!(
                "unknown verification status: {other}"
            ))),
        }
    }
}

/// Outcome of the last verification pass applied to a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub reasoning: String,
    #[serde(default)]
    pub audit_trail: Vec<String>,
    pub verified_at: DateTime<Utc>,
}

/// Citation passed through from the search/grounding collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

// --- Lead ---

/// A discovered prospective sponsor, before or after enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub field_evidence: BTreeMap<ContactField, FieldEvidence>,
    #[serde(default)]
    pub contact_intelligence: Vec<ContactIntelligence>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
    #[serde(default)]
    pub grounding_sources: Vec<GroundingSource>,
    pub discovered_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_name: company_name.into(),
            website: None,
            address: None,
            description: None,
            reasoning: None,
            email: None,
            phone: None,
            contact_name: None,
            social_links: SocialLinks::default(),
            field_evidence: BTreeMap::new(),
            contact_intelligence: Vec::new(),
            verification_status: VerificationStatus::Pending,
            verification: None,
            grounding_sources: Vec::new(),
            discovered_at: Utc::now(),
        }
    }

    /// Current value of a contact field. Whitespace-only values count as empty.
    pub fn field(&self, field: ContactField) -> Option<&str> {
        let value = match field {
            ContactField::Email => self.email.as_deref(),
            ContactField::Phone => self.phone.as_deref(),
            ContactField::Address => self.address.as_deref(),
            ContactField::ContactName => self.contact_name.as_deref(),
            ContactField::Website => self.website.as_deref(),
            social => self.social_links.get(social),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn has_field(&self, field: ContactField) -> bool {
        self.field(field).is_some()
    }

    /// Write a field and its evidence, replacing whatever was there.
    pub fn set_field(&mut self, field: ContactField, fwe: FieldWithEvidence) {
        let slot = match field {
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
            ContactField::Address => &mut self.address,
            ContactField::ContactName => &mut self.contact_name,
            ContactField::Website => &mut self.website,
            social => match self.social_links.slot_mut(social) {
                Some(slot) => slot,
                None => return,
            },
        };
        *slot = Some(fwe.value);
        self.field_evidence.insert(field, fwe.evidence);
    }

    /// Evidence for a field: the recorded one, the unknown default for a
    /// populated field without a record, or `None` when the field is empty.
    pub fn evidence_for(&self, field: ContactField) -> Option<FieldEvidence> {
        self.field(field)?;
        Some(
            self.field_evidence
                .get(&field)
                .cloned()
                .unwrap_or_else(FieldEvidence::unknown),
        )
    }

    pub fn has_primary(&self, kind: ContactKind) -> bool {
        self.contact_intelligence
            .iter()
            .any(|c| c.kind == kind && c.is_primary)
    }
}

// --- Supplemental layers ---

/// Which collaborator produced a merge layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplementalOrigin {
    EnrichmentApi,
    SiteScrape,
}

impl SupplementalOrigin {
    /// Trust class applied to fields this layer fills.
    pub fn evidence_class(self) -> (EvidenceSource, f64) {
        match self {
            Self::EnrichmentApi => (EvidenceSource::Directory, 0.9),
            Self::SiteScrape => (EvidenceSource::OfficialWebsite, 0.85),
        }
    }

    /// Label used when appending this layer's description text.
    pub fn description_label(self) -> &'static str {
        match self {
            Self::EnrichmentApi => "Company overview",
            Self::SiteScrape => "From website",
        }
    }

    /// Position in the fixed merge order: enrichment API before site scrape.
    pub fn merge_rank(self) -> u8 {
        match self {
            Self::EnrichmentApi => 1,
            Self::SiteScrape => 2,
        }
    }

    /// Short provenance string stamped on contact intelligence.
    pub fn source_label(self) -> &'static str {
        match self {
            Self::EnrichmentApi => "Enrichment API",
            Self::SiteScrape => "Website scrape",
        }
    }
}

/// A person returned by a people-search style source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPerson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_status: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

/// One merge layer's worth of data about an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementalData {
    pub origin: SupplementalOrigin,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    /// Page or endpoint this layer was read from.
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub contacts: Vec<ContactPerson>,
    /// When the collaborator produced this data.
    #[serde(default)]
    pub retrieved_at: Option<DateTime<Utc>>,
}

impl SupplementalData {
    /// The no-op layer. Used when a lookup fails or has nothing to say.
    pub fn empty(origin: SupplementalOrigin) -> Self {
        Self {
            origin,
            website: None,
            phone: None,
            address: None,
            description: None,
            social_links: SocialLinks::default(),
            source_url: None,
            contacts: Vec::new(),
            retrieved_at: None,
        }
    }

    pub fn field(&self, field: ContactField) -> Option<&str> {
        let value = match field {
            ContactField::Website => self.website.as_deref(),
            ContactField::Phone => self.phone.as_deref(),
            ContactField::Address => self.address.as_deref(),
            ContactField::Email | ContactField::ContactName => None,
            social => self.social_links.get(social),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

//! Fill-only merging of supplemental layers onto a base lead.
//!
//! A populated field is never overwritten here, whatever the incoming layer's
//! trust class. Only the verification pass may replace values.

use sponsorscout_common::{
    ContactField, ContactIntelligence, ContactKind, ContactPerson, Lead, SupplementalData,
};
use uuid::Uuid;

use crate::evidence::synthesized;
use crate::normalize::{normalize_address, normalize_social_value, normalize_url};

/// Fields a supplemental layer may fill at organization level.
const LAYER_FIELDS: [ContactField; 9] = [
    ContactField::Website,
    ContactField::Phone,
    ContactField::Address,
    ContactField::Instagram,
    ContactField::Linkedin,
    ContactField::Twitter,
    ContactField::Facebook,
    ContactField::Youtube,
    ContactField::Tiktok,
];

const PHONE_CONFIDENCE: f64 = 0.8;
const LINKEDIN_CONFIDENCE: f64 = 0.8;
const VERIFIED_EMAIL_CONFIDENCE: f64 = 0.95;
const UNVERIFIED_EMAIL_CONFIDENCE: f64 = 0.7;

/// What a single merge changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub filled: Vec<ContactField>,
    pub description_appended: bool,
    pub contacts_added: usize,
}

impl MergeReport {
    pub fn is_noop(&self) -> bool {
        self.filled.is_empty() && !self.description_appended && self.contacts_added == 0
    }
}

/// Merge one layer onto `base`, returning a new lead. `base` is not modified.
pub fn merge_supplemental_data(base: &Lead, supplemental: &SupplementalData) -> Lead {
    merge_with_report(base, supplemental).0
}

/// `merge_supplemental_data`, plus a report of what changed.
pub fn merge_with_report(base: &Lead, supplemental: &SupplementalData) -> (Lead, MergeReport) {
    let mut merged = base.clone();
    let mut report = MergeReport::default();
    let (source, confidence) = supplemental.origin.evidence_class();
    let source_url = supplemental.source_url.as_deref();

    for field in LAYER_FIELDS {
        if merged.has_field(field) {
            continue;
        }
        let Some(value) = supplemental.field(field).and_then(|raw| normalize_for(field, raw))
        else {
            continue;
        };
        if let Some(fwe) = synthesized(&value, source, confidence, source_url) {
            merged.set_field(field, fwe);
            report.filled.push(field);
        }
    }

    report.description_appended = append_description(&mut merged, supplemental);

    for (index, person) in supplemental.contacts.iter().enumerate() {
        let added = merge_person(&mut merged, supplemental, index, person, &mut report);
        report.contacts_added += added;
    }

    (merged, report)
}

/// Apply layers in the fixed merge order (enrichment API, then site scrape),
/// regardless of the order they were collected in.
pub fn apply_layers(base: &Lead, layers: &[SupplementalData]) -> Lead {
    let mut ordered: Vec<&SupplementalData> = layers.iter().collect();
    ordered.sort_by_key(|l| l.origin.merge_rank());
    ordered
        .into_iter()
        .fold(base.clone(), |lead, layer| merge_supplemental_data(&lead, layer))
}

fn normalize_for(field: ContactField, raw: &str) -> Option<String> {
    match field {
        ContactField::Website => normalize_url(raw),
        ContactField::Address => normalize_address(raw),
        f if f.is_social() => normalize_social_value(raw),
        _ => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

/// Descriptive text accumulates instead of competing: an empty description
/// adopts the layer's text, otherwise it is appended under a label.
fn append_description(lead: &mut Lead, supplemental: &SupplementalData) -> bool {
    let Some(text) = supplemental
        .description
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return false;
    };

    let updated = match lead.description.as_deref().map(str::trim) {
        None | Some("") => text.to_string(),
        Some(existing) if existing.contains(text) => return false,
        Some(existing) => format!(
            "{existing}\n\n{}: {text}",
            supplemental.origin.description_label()
        ),
    };
    lead.description = Some(updated);
    true
}

/// Fold one person into contact intelligence. The first person returned is the
/// primary contact and may fill the scalar email/phone/contact name.
fn merge_person(
    lead: &mut Lead,
    supplemental: &SupplementalData,
    index: usize,
    person: &ContactPerson,
    report: &mut MergeReport,
) -> usize {
    let (source, confidence) = supplemental.origin.evidence_class();
    let source_url = supplemental.source_url.as_deref();
    let is_first = index == 0;
    let label = person_label(person);
    let mut added = 0;

    if let Some(email) = person.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        let verified = person
            .email_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("verified"));
        let email_confidence = if verified {
            VERIFIED_EMAIL_CONFIDENCE
        } else {
            UNVERIFIED_EMAIL_CONFIDENCE
        };
        let last_verified = if verified { supplemental.retrieved_at } else { None };
        if push_intelligence(
            lead,
            supplemental,
            ContactKind::Email,
            email,
            email_confidence,
            &label,
            last_verified,
        ) {
            added += 1;
        }
        if is_first && !lead.has_field(ContactField::Email) {
            if let Some(fwe) = synthesized(email, source, confidence, source_url) {
                lead.set_field(ContactField::Email, fwe);
                report.filled.push(ContactField::Email);
            }
        }
    }

    for (phone_index, phone) in person.phone_numbers.iter().enumerate() {
        let phone = phone.trim();
        if phone.is_empty() {
            continue;
        }
        if push_intelligence(
            lead,
            supplemental,
            ContactKind::Phone,
            phone,
            PHONE_CONFIDENCE,
            &label,
            None,
        ) {
            added += 1;
        }
        if is_first && phone_index == 0 && !lead.has_field(ContactField::Phone) {
            if let Some(fwe) = synthesized(phone, source, confidence, source_url) {
                lead.set_field(ContactField::Phone, fwe);
                report.filled.push(ContactField::Phone);
            }
        }
    }

    if let Some(linkedin) = person.linkedin_url.as_deref().and_then(normalize_url) {
        if push_intelligence(
            lead,
            supplemental,
            ContactKind::Linkedin,
            &linkedin,
            LINKEDIN_CONFIDENCE,
            &label,
            None,
        ) {
            added += 1;
        }
    }

    if is_first && !lead.has_field(ContactField::ContactName) {
        if let Some(name) = person.name.as_deref() {
            if let Some(fwe) = synthesized(name, source, confidence, source_url) {
                lead.set_field(ContactField::ContactName, fwe);
                report.filled.push(ContactField::ContactName);
            }
        }
    }

    added
}

fn person_label(person: &ContactPerson) -> Option<String> {
    let name = person.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let title = person.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    match (name, title) {
        (Some(n), Some(t)) => Some(format!("{n} ({t})")),
        (Some(n), None) => Some(n.to_string()),
        (None, Some(t)) => Some(t.to_string()),
        (None, None) => None,
    }
}

/// Append a contact point unless the same (type, value) is already recorded.
/// The first entry of a type becomes primary. Returns true if appended.
fn push_intelligence(
    lead: &mut Lead,
    supplemental: &SupplementalData,
    kind: ContactKind,
    value: &str,
    confidence: f64,
    label: &Option<String>,
    last_verified: Option<chrono::DateTime<chrono::Utc>>,
) -> bool {
    let duplicate = lead
        .contact_intelligence
        .iter()
        .any(|c| c.kind == kind && c.value.eq_ignore_ascii_case(value));
    if duplicate {
        return false;
    }

    let is_primary = !lead.has_primary(kind);
    lead.contact_intelligence.push(ContactIntelligence {
        id: Uuid::new_v4(),
        kind,
        value: value.to_string(),
        confidence,
        source: supplemental.origin.source_label().to_string(),
        label: label.clone(),
        last_verified,
        is_primary,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use sponsorscout_common::{EvidenceSource, FieldEvidence, FieldWithEvidence, SupplementalOrigin};

    fn enrichment() -> SupplementalData {
        SupplementalData::empty(SupplementalOrigin::EnrichmentApi)
    }

    fn scrape() -> SupplementalData {
        SupplementalData::empty(SupplementalOrigin::SiteScrape)
    }

    fn with_field(mut lead: Lead, field: ContactField, value: &str, confidence: f64) -> Lead {
        lead.set_field(
            field,
            FieldWithEvidence {
                value: value.into(),
                evidence: FieldEvidence::new(EvidenceSource::Unknown, confidence, None),
            },
        );
        lead
    }

    #[test]
    fn merge_does_not_mutate_base() {
        let base = Lead::new("Acme");
        let mut layer = enrichment();
        layer.phone = Some("555-1111".into());
        let merged = merge_supplemental_data(&base, &layer);
        assert!(base.phone.is_none());
        assert_eq!(merged.phone.as_deref(), Some("555-1111"));
    }

    #[test]
    fn populated_field_is_never_overwritten() {
        let base = with_field(Lead::new("Acme"), ContactField::Phone, "555-0000", 0.1);
        let mut layer = enrichment();
        layer.phone = Some("555-9999".into());
        let merged = merge_supplemental_data(&base, &layer);
        assert_eq!(merged.phone.as_deref(), Some("555-0000"));
        assert_eq!(merged.field_evidence[&ContactField::Phone].confidence, 0.1);
    }

    #[test]
    fn enrichment_fill_is_tagged_directory() {
        let mut layer = enrichment();
        layer.address = Some(" 1 Main St,   Springfield ".into());
        let merged = merge_supplemental_data(&Lead::new("Acme"), &layer);
        assert_eq!(merged.address.as_deref(), Some("1 Main St, Springfield"));
        let ev = merged.evidence_for(ContactField::Address).unwrap();
        assert_eq!(ev.source, EvidenceSource::Directory);
        assert_eq!(ev.confidence, 0.9);
    }

    #[test]
    fn scrape_fill_is_tagged_official_website() {
        let mut layer = scrape();
        layer.social_links.instagram = Some("acme".into());
        layer.source_url = Some("https://acme.com".into());
        let merged = merge_supplemental_data(&Lead::new("Acme"), &layer);
        let ev = merged.evidence_for(ContactField::Instagram).unwrap();
        assert_eq!(ev.source, EvidenceSource::OfficialWebsite);
        assert_eq!(ev.confidence, 0.85);
        assert_eq!(ev.source_url.as_deref(), Some("https://acme.com/"));
    }

    #[test]
    fn description_is_adopted_then_appended_once() {
        let mut layer = enrichment();
        layer.description = Some("Makes anvils.".into());

        let merged = merge_supplemental_data(&Lead::new("Acme"), &layer);
        assert_eq!(merged.description.as_deref(), Some("Makes anvils."));

        let mut base = Lead::new("Acme");
        base.description = Some("Regional hardware brand.".into());
        let merged = merge_supplemental_data(&base, &layer);
        assert_eq!(
            merged.description.as_deref(),
            Some("Regional hardware brand.\n\nCompany overview: Makes anvils.")
        );

        let again = merge_supplemental_data(&merged, &layer);
        assert_eq!(again.description, merged.description);
    }

    #[test]
    fn first_person_is_primary_and_fills_scalars() {
        let mut layer = enrichment();
        layer.contacts = vec![
            ContactPerson {
                name: Some("Ann".into()),
                title: Some("CMO".into()),
                email: Some("a@x.com".into()),
                email_status: Some("verified".into()),
                phone_numbers: vec!["555-1".into(), "555-2".into()],
                linkedin_url: Some("linkedin.com/in/ann".into()),
            },
            ContactPerson {
                name: Some("Bob".into()),
                email: Some("b@x.com".into()),
                phone_numbers: vec!["555-3".into()],
                ..ContactPerson::default()
            },
        ];

        let (merged, report) = merge_with_report(&Lead::new("Acme"), &layer);

        let emails: Vec<_> = merged
            .contact_intelligence
            .iter()
            .filter(|c| c.kind == ContactKind::Email)
            .collect();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails.iter().filter(|c| c.is_primary).count(), 1);
        assert!(emails[0].is_primary && emails[0].value == "a@x.com");
        assert_eq!(emails[0].confidence, 0.95);
        assert_eq!(emails[1].confidence, 0.7);

        let phones: Vec<_> = merged
            .contact_intelligence
            .iter()
            .filter(|c| c.kind == ContactKind::Phone)
            .collect();
        assert_eq!(phones.len(), 3);
        assert!(phones.iter().all(|p| p.confidence == 0.8));
        assert_eq!(
            phones.iter().filter(|p| p.is_primary).map(|p| p.value.as_str()).collect::<Vec<_>>(),
            vec!["555-1"]
        );

        assert_eq!(merged.email.as_deref(), Some("a@x.com"));
        assert_eq!(merged.phone.as_deref(), Some("555-1"));
        assert_eq!(merged.contact_name.as_deref(), Some("Ann"));
        assert_eq!(emails[0].label.as_deref(), Some("Ann (CMO)"));
        assert_eq!(report.contacts_added, 6);
    }

    #[test]
    fn existing_scalar_email_is_kept() {
        let base = with_field(Lead::new("Acme"), ContactField::Email, "info@acme.com", 0.5);
        let mut layer = enrichment();
        layer.contacts = vec![ContactPerson {
            email: Some("a@x.com".into()),
            ..ContactPerson::default()
        }];
        let merged = merge_supplemental_data(&base, &layer);
        assert_eq!(merged.email.as_deref(), Some("info@acme.com"));
        assert_eq!(merged.contact_intelligence.len(), 1);
    }

    #[test]
    fn repeated_merge_does_not_duplicate_contacts_or_primaries() {
        let mut layer = enrichment();
        layer.contacts = vec![ContactPerson {
            email: Some("a@x.com".into()),
            ..ContactPerson::default()
        }];
        let once = merge_supplemental_data(&Lead::new("Acme"), &layer);
        let twice = merge_supplemental_data(&once, &layer);
        assert_eq!(twice.contact_intelligence.len(), 1);
    }

    #[test]
    fn layers_apply_in_fixed_order() {
        let mut api = enrichment();
        api.social_links.facebook = Some("https://facebook.com/acme-api".into());
        let mut site = scrape();
        site.social_links.facebook = Some("https://facebook.com/acme-site".into());

        // Collected out of order: scrape first.
        let merged = apply_layers(&Lead::new("Acme"), &[site, api]);
        assert_eq!(
            merged.social_links.facebook.as_deref(),
            Some("https://facebook.com/acme-api")
        );
        assert_eq!(
            merged.evidence_for(ContactField::Facebook).unwrap().source,
            EvidenceSource::Directory
        );
    }

    #[test]
    fn empty_layer_is_noop() {
        let base = with_field(Lead::new("Acme"), ContactField::Website, "https://acme.com/", 0.9);
        let (merged, report) = merge_with_report(&base, &scrape());
        assert!(report.is_noop());
        assert_eq!(merged, base);
    }
}

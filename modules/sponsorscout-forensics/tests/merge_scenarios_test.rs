//! End-to-end merge scenarios: discovery output as the base, then the
//! enrichment API layer, then the site-scrape layer.
//!
//! Run with: cargo test -p sponsorscout-forensics --test merge_scenarios_test

use sponsorscout_common::{
    ContactField, ContactKind, ContactPerson, EvidenceSource, Lead, SupplementalData,
    SupplementalOrigin,
};
use sponsorscout_forensics::{
    apply_layers, get_identity_keys, map_forensic_field, merge_supplemental_data,
    parse_discovered_leads, RawEvidence,
};

fn discovered(json: &str) -> Lead {
    let mut leads = parse_discovered_leads(json, &[]);
    assert_eq!(leads.len(), 1, "fixture should parse to exactly one lead");
    leads.remove(0)
}

fn enrichment_layer() -> SupplementalData {
    SupplementalData::empty(SupplementalOrigin::EnrichmentApi)
}

fn scrape_layer() -> SupplementalData {
    SupplementalData::empty(SupplementalOrigin::SiteScrape)
}

// ---------------------------------------------------------------------------
// Merge ordering
// ---------------------------------------------------------------------------

#[test]
fn enrichment_phone_survives_scrape_layer_without_phone() {
    let base = discovered(r#"{"companyName": "Acme", "website": "acme.com"}"#);

    let mut api = enrichment_layer();
    api.phone = Some("555-1111".into());
    let scrape = scrape_layer();

    let merged = apply_layers(&base, &[api, scrape]);

    assert_eq!(merged.phone.as_deref(), Some("555-1111"));
    let ev = merged.evidence_for(ContactField::Phone).unwrap();
    assert_eq!(ev.source, EvidenceSource::Directory);
    assert_eq!(ev.confidence, 0.9);
}

#[test]
fn scrape_only_fills_what_enrichment_left_empty() {
    let base = discovered(r#"{"companyName": "Acme", "website": "acme.com"}"#);

    let mut api = enrichment_layer();
    api.social_links.linkedin = Some("https://linkedin.com/company/acme".into());

    let mut scrape = scrape_layer();
    scrape.social_links.instagram = Some("acme".into());
    scrape.social_links.linkedin = Some("https://linkedin.com/company/acme-site".into());

    let merged = apply_layers(&base, &[api, scrape]);

    assert_eq!(merged.social_links.instagram.as_deref(), Some("acme"));
    let ig = merged.evidence_for(ContactField::Instagram).unwrap();
    assert_eq!(ig.source, EvidenceSource::OfficialWebsite);
    assert_eq!(ig.confidence, 0.85);

    assert_eq!(
        merged.social_links.linkedin.as_deref(),
        Some("https://linkedin.com/company/acme")
    );
    assert_eq!(
        merged.evidence_for(ContactField::Linkedin).unwrap().source,
        EvidenceSource::Directory
    );
}

// ---------------------------------------------------------------------------
// Non-overwrite
// ---------------------------------------------------------------------------

#[test]
fn low_confidence_discovery_guess_blocks_every_layer() {
    let base = discovered(
        r#"{"companyName": "Acme", "phone": "555-0000",
            "evidence": {"phone": {"source": "unknown", "confidence": 0.05}}}"#,
    );

    for origin in [SupplementalOrigin::EnrichmentApi, SupplementalOrigin::SiteScrape] {
        let mut layer = SupplementalData::empty(origin);
        layer.phone = Some("555-9999".into());
        layer.contacts = vec![ContactPerson {
            phone_numbers: vec!["555-7777".into()],
            ..ContactPerson::default()
        }];
        let merged = merge_supplemental_data(&base, &layer);
        assert_eq!(merged.phone.as_deref(), Some("555-0000"), "origin {origin:?}");
        assert_eq!(merged.evidence_for(ContactField::Phone).unwrap().confidence, 0.05);
    }
}

#[test]
fn every_field_survives_a_full_layer() {
    let base = discovered(
        r#"{"companyName": "Acme", "website": "acme.com", "email": "a@acme.com",
            "phone": "1", "address": "2 Road", "contactName": "Ann",
            "socialLinks": {"instagram": "a", "linkedin": "b", "twitter": "c",
                            "facebook": "d", "youtube": "e", "tiktok": "f"}}"#,
    );

    let mut layer = enrichment_layer();
    layer.website = Some("other.com".into());
    layer.phone = Some("9".into());
    layer.address = Some("9 Elsewhere".into());
    layer.social_links.instagram = Some("z".into());
    layer.social_links.linkedin = Some("z".into());
    layer.social_links.twitter = Some("z".into());
    layer.social_links.facebook = Some("z".into());
    layer.social_links.youtube = Some("z".into());
    layer.social_links.tiktok = Some("z".into());
    layer.contacts = vec![ContactPerson {
        name: Some("Zed".into()),
        email: Some("z@other.com".into()),
        phone_numbers: vec!["9".into()],
        ..ContactPerson::default()
    }];

    let merged = merge_supplemental_data(&base, &layer);
    for field in ContactField::ALL {
        assert_eq!(merged.field(field), base.field(field), "field {field}");
        assert_eq!(merged.evidence_for(field), base.evidence_for(field), "field {field}");
    }
}

// ---------------------------------------------------------------------------
// Contact intelligence
// ---------------------------------------------------------------------------

#[test]
fn first_enriched_person_owns_primary_email() {
    let base = discovered(r#"{"companyName": "Acme"}"#);
    let mut api = enrichment_layer();
    api.contacts = vec![
        ContactPerson {
            email: Some("a@x.com".into()),
            ..ContactPerson::default()
        },
        ContactPerson {
            email: Some("b@x.com".into()),
            ..ContactPerson::default()
        },
    ];

    let merged = merge_supplemental_data(&base, &api);

    let primaries: Vec<_> = merged
        .contact_intelligence
        .iter()
        .filter(|c| c.kind == ContactKind::Email && c.is_primary)
        .collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].value, "a@x.com");
    assert_eq!(merged.email.as_deref(), Some("a@x.com"));
}

#[test]
fn second_pass_keeps_existing_primary() {
    let base = discovered(r#"{"companyName": "Acme"}"#);
    let mut first = enrichment_layer();
    first.contacts = vec![ContactPerson {
        email: Some("a@x.com".into()),
        ..ContactPerson::default()
    }];
    let mut second = enrichment_layer();
    second.contacts = vec![ContactPerson {
        email: Some("c@x.com".into()),
        ..ContactPerson::default()
    }];

    let merged = merge_supplemental_data(&merge_supplemental_data(&base, &first), &second);

    let emails: Vec<_> = merged
        .contact_intelligence
        .iter()
        .filter(|c| c.kind == ContactKind::Email)
        .collect();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails.iter().filter(|c| c.is_primary).count(), 1);
    assert!(emails.iter().any(|c| c.is_primary && c.value == "a@x.com"));
    assert_eq!(merged.email.as_deref(), Some("a@x.com"));
}

// ---------------------------------------------------------------------------
// Evidence and identity properties
// ---------------------------------------------------------------------------

#[test]
fn confidence_always_within_unit_interval() {
    let sources = [
        None,
        Some("official_website"),
        Some("google_business"),
        Some("directory"),
        Some("social"),
        Some("manual"),
        Some("gossip"),
    ];
    let confidences = [
        None,
        Some(-10.0),
        Some(-0.0),
        Some(0.3),
        Some(1.0),
        Some(17.0),
        Some(f64::NEG_INFINITY),
        Some(f64::NAN),
    ];

    for source in sources {
        for confidence in confidences {
            let raw = RawEvidence {
                source: source.map(str::to_string),
                confidence,
                source_url: None,
            };
            let f = map_forensic_field(Some("x"), Some(&raw)).unwrap();
            assert!(
                (0.0..=1.0).contains(&f.evidence.confidence),
                "{source:?} {confidence:?} -> {}",
                f.evidence.confidence
            );
        }
    }
}

#[test]
fn filled_website_adds_domain_identity() {
    let base = discovered(r#"{"companyName": "Acme", "address": "1 Main St"}"#);
    let before = get_identity_keys(&base);

    let mut scrape = scrape_layer();
    scrape.website = Some("https://acme.com".into());
    let merged = merge_supplemental_data(&base, &scrape);

    assert_eq!(before, vec!["name:acme|1 main st"]);
    // The scrape filled a website, so a strong key now exists as well.
    assert_eq!(get_identity_keys(&merged), vec!["dom:acme.com"]);
}

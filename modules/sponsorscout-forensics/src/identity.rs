//! Dedup identity for sponsor entities.
//!
//! An entity yields every key it qualifies for, so "already seen" checks
//! succeed when any one of them matches a previously processed entity.

use std::collections::HashSet;

use sponsorscout_common::Lead;

use crate::normalize::{extract_handle, normalize_domain, normalize_social};

/// The attributes identity is derived from. Implemented by anything that
/// can be checked against the pipeline (leads, sponsors, deals).
pub trait IdentitySource {
    fn company_name(&self) -> &str;
    fn website(&self) -> Option<&str>;
    fn instagram(&self) -> Option<&str>;
    fn address(&self) -> Option<&str>;
}

impl IdentitySource for Lead {
    fn company_name(&self) -> &str {
        &self.company_name
    }

    fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    fn instagram(&self) -> Option<&str> {
        self.social_links.instagram.as_deref()
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// Derive dedup keys, strongest first:
///
/// - `dom:<domain>` when the website normalizes to a domain
/// - `ig:<handle>` when an Instagram handle is present
/// - `name:<name>|<address>` only when neither of the above exists
///
/// The result is never empty. Callers should compare it as a set.
pub fn get_identity_keys<E: IdentitySource + ?Sized>(entity: &E) -> Vec<String> {
    let mut keys = Vec::with_capacity(2);

    if let Some(domain) = entity.website().and_then(normalize_domain) {
        keys.push(format!("dom:{domain}"));
    }

    if let Some(handle) = entity
        .instagram()
        .and_then(extract_handle)
        .and_then(|h| normalize_social(&h))
    {
        keys.push(format!("ig:{handle}"));
    }

    if keys.is_empty() {
        let name = entity.company_name().trim().to_lowercase();
        let address = entity
            .address()
            .map(|a| a.trim().to_lowercase())
            .unwrap_or_default();
        keys.push(format!("name:{name}|{address}"));
    }

    keys
}

/// True when two entities share at least one identity key.
pub fn shares_identity<A, B>(a: &A, b: &B) -> bool
where
    A: IdentitySource + ?Sized,
    B: IdentitySource + ?Sized,
{
    let left: HashSet<String> = get_identity_keys(a).into_iter().collect();
    get_identity_keys(b).iter().any(|k| left.contains(k))
}

/// Set of identity keys for entities already processed.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    keys: HashSet<String>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from entities already in the pipeline.
    pub fn from_entities<'a, E, I>(entities: I) -> Self
    where
        E: IdentitySource + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut index = Self::new();
        for entity in entities {
            index.insert(entity);
        }
        index
    }

    /// Record an entity's keys. Returns true if none of them were known yet.
    pub fn insert<E: IdentitySource + ?Sized>(&mut self, entity: &E) -> bool {
        let keys = get_identity_keys(entity);
        let fresh = !keys.iter().any(|k| self.keys.contains(k));
        self.keys.extend(keys);
        fresh
    }

    /// True if any of the entity's keys has been seen.
    pub fn contains<E: IdentitySource + ?Sized>(&self, entity: &E) -> bool {
        get_identity_keys(entity)
            .iter()
            .any(|k| self.keys.contains(k))
    }

    /// Keep only leads not yet seen, deduplicating within the batch as well.
    /// Kept leads are added to the index.
    pub fn retain_new(&mut self, leads: Vec<Lead>) -> Vec<Lead> {
        let before = leads.len();
        let kept: Vec<Lead> = leads.into_iter().filter(|l| self.insert(l)).collect();
        if kept.len() < before {
            tracing::debug!(
                dropped = before - kept.len(),
                kept = kept.len(),
                "Dropped leads already in pipeline"
            );
        }
        kept
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str) -> Lead {
        Lead::new(name)
    }

    #[test]
    fn domain_key_from_website() {
        let mut l = lead("Acme");
        l.website = Some("https://www.Acme.com/about".into());
        assert_eq!(get_identity_keys(&l), vec!["dom:acme.com"]);
    }

    #[test]
    fn domain_and_instagram_both_returned() {
        let mut l = lead("Acme");
        l.website = Some("acme.com".into());
        l.social_links.instagram = Some("@AcmeCo".into());
        assert_eq!(get_identity_keys(&l), vec!["dom:acme.com", "ig:acmeco"]);
    }

    #[test]
    fn instagram_url_and_handle_agree() {
        let mut a = lead("Acme");
        a.social_links.instagram = Some("https://instagram.com/AcmeCo/".into());
        let mut b = lead("Acme Company");
        b.social_links.instagram = Some("acmeco".into());
        assert_eq!(get_identity_keys(&a), vec!["ig:acmeco"]);
        assert!(shares_identity(&a, &b));
    }

    #[test]
    fn fallback_uses_name_and_address() {
        let mut l = lead("  Acme Bakery ");
        l.address = Some(" 1 Main St ".into());
        assert_eq!(get_identity_keys(&l), vec!["name:acme bakery|1 main st"]);
    }

    #[test]
    fn fallback_without_address_has_empty_suffix() {
        assert_eq!(get_identity_keys(&lead("Acme")), vec!["name:acme|"]);
    }

    #[test]
    fn fallback_is_skipped_when_strong_key_exists() {
        let mut l = lead("Acme");
        l.address = Some("1 Main St".into());
        l.social_links.instagram = Some("acme".into());
        let keys = get_identity_keys(&l);
        assert!(keys.iter().all(|k| !k.starts_with("name:")));
    }

    #[test]
    fn keys_never_empty() {
        let mut l = lead("");
        l.website = Some("   ".into());
        l.social_links.instagram = Some("@".into());
        assert!(!get_identity_keys(&l).is_empty());
    }

    #[test]
    fn fuzzy_name_variants_do_not_collide() {
        assert!(!shares_identity(&lead("Acme Inc."), &lead("Acme, Inc")));
    }

    #[test]
    fn same_business_found_by_domain_then_by_domain_and_handle() {
        let mut by_domain = lead("Acme");
        by_domain.website = Some("http://acme.com".into());
        let mut by_both = lead("ACME LLC");
        by_both.website = Some("https://www.acme.com/shop".into());
        by_both.social_links.instagram = Some("acme_official".into());
        assert!(shares_identity(&by_domain, &by_both));
    }

    #[test]
    fn index_filters_seen_and_in_batch_duplicates() {
        let mut existing = lead("Acme");
        existing.website = Some("acme.com".into());
        let mut index = IdentityIndex::from_entities([&existing]);

        let mut dup_existing = lead("Acme again");
        dup_existing.website = Some("https://acme.com/".into());
        let mut fresh = lead("Globex");
        fresh.social_links.instagram = Some("globex".into());
        let mut dup_fresh = lead("Globex Corp");
        dup_fresh.social_links.instagram = Some("@Globex".into());

        let kept = index.retain_new(vec![dup_existing, fresh, dup_fresh]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].company_name, "Globex");
        assert!(index.contains(&kept[0]));
    }
}

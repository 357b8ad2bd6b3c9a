// Merge layers: one trait boundary per external collaborator.
//
// Each layer turns a lead into a SupplementalData record. Layers never touch
// the lead itself; merging is left to the pipeline so that a failing
// collaborator can be swapped for the empty layer.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use apollo_client::{ApolloClient, ApolloError, Organization, Person};
use site_scraper::{ScrapedSite, SiteScraper};
use sponsorscout_common::{ContactPerson, Lead, SocialLinks, SupplementalData, SupplementalOrigin};
use sponsorscout_forensics::normalize_domain;

#[async_trait]
pub trait EnrichmentLayer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Which collaborator this layer represents. Decides merge order and the
    /// trust class of filled fields.
    fn origin(&self) -> SupplementalOrigin;

    /// Look up supplemental data for a lead. Errors are isolated by the caller.
    async fn fetch(&self, lead: &Lead) -> Result<SupplementalData>;
}

// ---------------------------------------------------------------------------
// ApolloLayer
// ---------------------------------------------------------------------------

/// Organization enrichment plus a short people search, keyed by website domain.
pub struct ApolloLayer {
    client: ApolloClient,
    max_contacts: u32,
}

impl ApolloLayer {
    pub fn new(client: ApolloClient, max_contacts: u32) -> Self {
        Self {
            client,
            max_contacts,
        }
    }
}

#[async_trait]
impl EnrichmentLayer for ApolloLayer {
    fn name(&self) -> &str {
        "apollo"
    }

    fn origin(&self) -> SupplementalOrigin {
        SupplementalOrigin::EnrichmentApi
    }

    async fn fetch(&self, lead: &Lead) -> Result<SupplementalData> {
        let Some(domain) = lead.website.as_deref().and_then(normalize_domain) else {
            debug!(company = lead.company_name.as_str(), "No website domain, skipping enrichment API");
            return Ok(SupplementalData::empty(self.origin()));
        };

        let people = async {
            if self.max_contacts > 0 {
                self.client.search_people(&domain, self.max_contacts).await
            } else {
                Ok(Vec::new())
            }
        };
        let (organization, people) =
            futures::join!(self.client.enrich_organization(&domain), people);

        apollo_layer(&domain, organization, people)
    }
}

/// Combine the organization and people lookups into one layer.
///
/// Each lookup fails on its own: a failed half is logged and contributes
/// nothing. The layer only fails when both halves do.
pub fn apollo_layer(
    domain: &str,
    organization: Result<Option<Organization>, ApolloError>,
    people: Result<Vec<Person>, ApolloError>,
) -> Result<SupplementalData> {
    let (organization, people) = match (organization, people) {
        (Err(org_err), Err(people_err)) => {
            bail!("Apollo lookups failed for {domain}: organization: {org_err}; people: {people_err}")
        }
        pair => pair,
    };

    let organization = organization.unwrap_or_else(|e| {
        warn!(domain, error = %e, "Organization enrichment failed, keeping people search");
        None
    });
    let people = people.unwrap_or_else(|e| {
        warn!(domain, error = %e, "People search failed, keeping organization data");
        Vec::new()
    });

    Ok(organization_layer(organization.as_ref(), &people))
}

/// Convert an Apollo organization and its people into a merge layer.
pub fn organization_layer(organization: Option<&Organization>, people: &[Person]) -> SupplementalData {
    let mut layer = SupplementalData::empty(SupplementalOrigin::EnrichmentApi);
    layer.retrieved_at = Some(Utc::now());

    if let Some(org) = organization {
        layer.website = org.website_url.clone();
        layer.phone = org.best_phone().map(str::to_string);
        layer.address = org.full_address();
        layer.description = org.short_description.clone();
        layer.social_links = SocialLinks {
            linkedin: org.linkedin_url.clone(),
            twitter: org.twitter_url.clone(),
            facebook: org.facebook_url.clone(),
            ..SocialLinks::default()
        };
    }

    layer.contacts = people.iter().map(contact_person).collect();
    layer
}

fn contact_person(person: &Person) -> ContactPerson {
    ContactPerson {
        name: person.display_name(),
        title: person.title.clone(),
        email: person.usable_email().map(str::to_string),
        email_status: person.email_status.clone(),
        phone_numbers: person
            .phone_numbers
            .iter()
            .filter_map(|p| p.best())
            .map(str::to_string)
            .collect(),
        linkedin_url: person.linkedin_url.clone(),
    }
}

// ---------------------------------------------------------------------------
// ScrapeLayer
// ---------------------------------------------------------------------------

/// Reads social profiles, a phone link and the meta description off the
/// lead's own homepage.
pub struct ScrapeLayer {
    scraper: SiteScraper,
}

impl ScrapeLayer {
    pub fn new(scraper: SiteScraper) -> Self {
        Self { scraper }
    }
}

#[async_trait]
impl EnrichmentLayer for ScrapeLayer {
    fn name(&self) -> &str {
        "site-scrape"
    }

    fn origin(&self) -> SupplementalOrigin {
        SupplementalOrigin::SiteScrape
    }

    async fn fetch(&self, lead: &Lead) -> Result<SupplementalData> {
        let Some(website) = lead.website.as_deref().filter(|w| !w.trim().is_empty()) else {
            debug!(company = lead.company_name.as_str(), "No website, skipping site scrape");
            return Ok(SupplementalData::empty(self.origin()));
        };

        let site = self.scraper.scrape_site(website).await?;
        Ok(site_layer(&site))
    }
}

/// Convert a scraped homepage into a merge layer.
pub fn site_layer(site: &ScrapedSite) -> SupplementalData {
    let social = &site.social_links;
    let mut layer = SupplementalData::empty(SupplementalOrigin::SiteScrape);
    layer.phone = site.phone.clone();
    layer.description = site.description.clone();
    layer.social_links = SocialLinks {
        instagram: social.instagram.clone(),
        linkedin: social.linkedin.clone(),
        twitter: social.twitter.clone(),
        facebook: social.facebook.clone(),
        youtube: social.youtube.clone(),
        tiktok: social.tiktok.clone(),
    };
    layer.source_url = Some(site.url.clone());
    layer.retrieved_at = Some(Utc::now());
    layer
}

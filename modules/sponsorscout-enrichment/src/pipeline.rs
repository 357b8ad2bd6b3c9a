//! Enrichment pipeline: concurrent layer lookups, sequential fill-only merges.
//!
//! For each lead every layer is fetched concurrently. A failed lookup is
//! logged and replaced by the empty layer, so one collaborator going down never
//! loses the others' data. Layers are then merged in fixed order (enrichment
//! API before site scrape). Across leads the fan-out is bounded and the
//! output keeps the input order.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use apollo_client::ApolloClient;
use site_scraper::{ScraperOptions, SiteScraper};
use sponsorscout_common::{Config, Lead, SupplementalData};
use sponsorscout_forensics::merge_with_report;

use crate::layers::{ApolloLayer, EnrichmentLayer, ScrapeLayer};

/// Counters for one `enrich` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub leads: u32,
    pub lookups_attempted: u32,
    pub lookups_failed: u32,
    pub fields_filled: u32,
    pub descriptions_appended: u32,
    pub contacts_added: u32,
}

impl PipelineStats {
    fn absorb(&mut self, other: &PipelineStats) {
        self.leads += other.leads;
        self.lookups_attempted += other.lookups_attempted;
        self.lookups_failed += other.lookups_failed;
        self.fields_filled += other.fields_filled;
        self.descriptions_appended += other.descriptions_appended;
        self.contacts_added += other.contacts_added;
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Enrichment Complete ===")?;
        writeln!(f, "Leads:              {}", self.leads)?;
        writeln!(f, "Lookups attempted:  {}", self.lookups_attempted)?;
        writeln!(f, "Lookups failed:     {}", self.lookups_failed)?;
        writeln!(f, "Fields filled:      {}", self.fields_filled)?;
        writeln!(f, "Descriptions added: {}", self.descriptions_appended)?;
        writeln!(f, "Contacts added:     {}", self.contacts_added)
    }
}

pub struct EnrichmentPipeline {
    layers: Vec<Box<dyn EnrichmentLayer>>,
    concurrency: usize,
}

impl EnrichmentPipeline {
    pub fn new(layers: Vec<Box<dyn EnrichmentLayer>>, concurrency: usize) -> Self {
        Self {
            layers,
            concurrency: concurrency.max(1),
        }
    }

    /// Wire in every collaborator the configuration enables. The site scrape
    /// needs no credentials and is always present.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut layers: Vec<Box<dyn EnrichmentLayer>> = Vec::new();

        match &config.apollo_api_key {
            Some(key) => layers.push(Box::new(ApolloLayer::new(
                ApolloClient::new(key.clone()),
                config.apollo_max_contacts,
            ))),
            None => info!("APOLLO_API_KEY not set, enrichment API layer disabled"),
        }

        let scraper = SiteScraper::new(ScraperOptions {
            timeout: Duration::from_secs(config.scrape_timeout_secs),
            user_agent: config.scrape_user_agent.clone(),
            browserless_url: config.browserless_url.clone(),
            browserless_token: config.browserless_token.clone(),
        })?;
        layers.push(Box::new(ScrapeLayer::new(scraper)));

        Ok(Self::new(layers, config.enrich_concurrency))
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Enrich a batch. Output order equals input order.
    pub async fn enrich(&self, leads: Vec<Lead>) -> Vec<Lead> {
        self.enrich_with_stats(leads).await.0
    }

    pub async fn enrich_with_stats(&self, leads: Vec<Lead>) -> (Vec<Lead>, PipelineStats) {
        info!(
            leads = leads.len(),
            layers = ?self.layer_names(),
            concurrency = self.concurrency,
            "Starting enrichment"
        );

        let results: Vec<(Lead, PipelineStats)> = stream::iter(leads)
            .map(|lead| self.enrich_one(lead))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut stats = PipelineStats::default();
        let mut enriched = Vec::with_capacity(results.len());
        for (lead, lead_stats) in results {
            stats.absorb(&lead_stats);
            enriched.push(lead);
        }

        info!(
            leads = stats.leads,
            lookups_failed = stats.lookups_failed,
            fields_filled = stats.fields_filled,
            contacts_added = stats.contacts_added,
            "Enrichment finished"
        );
        (enriched, stats)
    }

    async fn enrich_one(&self, lead: Lead) -> (Lead, PipelineStats) {
        let mut stats = PipelineStats {
            leads: 1,
            ..PipelineStats::default()
        };

        let lookups = join_all(self.layers.iter().map(|layer| {
            let lead = &lead;
            async move {
                match layer.fetch(lead).await {
                    Ok(mut data) => {
                        // The merge trusts origin for evidence; pin it to the layer.
                        data.origin = layer.origin();
                        (data, false)
                    }
                    Err(e) => {
                        warn!(
                            layer = layer.name(),
                            company = lead.company_name.as_str(),
                            error = %e,
                            "Enrichment lookup failed, continuing with empty layer"
                        );
                        (SupplementalData::empty(layer.origin()), true)
                    }
                }
            }
        }))
        .await;

        let mut layers = Vec::with_capacity(lookups.len());
        for (data, failed) in lookups {
            stats.lookups_attempted += 1;
            if failed {
                stats.lookups_failed += 1;
            }
            layers.push(data);
        }
        layers.sort_by_key(|l| l.origin.merge_rank());

        let mut merged = lead;
        for layer in &layers {
            let (next, report) = merge_with_report(&merged, layer);
            stats.fields_filled += report.filled.len() as u32;
            stats.contacts_added += report.contacts_added as u32;
            if report.description_appended {
                stats.descriptions_appended += 1;
            }
            merged = next;
        }

        (merged, stats)
    }
}

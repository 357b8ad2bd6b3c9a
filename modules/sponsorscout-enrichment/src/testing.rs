// Test mocks for the enrichment pipeline.
//
// MockLayer (EnrichmentLayer): company-name -> canned SupplementalData or a
// canned failure, with an optional per-lead delay to shake up completion order.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use sponsorscout_common::{Lead, SupplementalData, SupplementalOrigin};

use crate::layers::EnrichmentLayer;

/// HashMap-based layer. Unregistered leads get the empty layer.
/// Builder pattern: `.on_lead()`, `.failing_for()`, `.failing()`, `.delayed()`.
pub struct MockLayer {
    name: String,
    origin: SupplementalOrigin,
    responses: HashMap<String, SupplementalData>,
    failures: HashSet<String>,
    fail_all: bool,
    delays: HashMap<String, Duration>,
}

impl MockLayer {
    pub fn new(name: &str, origin: SupplementalOrigin) -> Self {
        Self {
            name: name.to_string(),
            origin,
            responses: HashMap::new(),
            failures: HashSet::new(),
            fail_all: false,
            delays: HashMap::new(),
        }
    }

    pub fn on_lead(mut self, company_name: &str, data: SupplementalData) -> Self {
        self.responses.insert(company_name.to_string(), data);
        self
    }

    pub fn failing_for(mut self, company_name: &str) -> Self {
        self.failures.insert(company_name.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn delayed(mut self, company_name: &str, delay: Duration) -> Self {
        self.delays.insert(company_name.to_string(), delay);
        self
    }
}

#[async_trait]
impl EnrichmentLayer for MockLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn origin(&self) -> SupplementalOrigin {
        self.origin
    }

    async fn fetch(&self, lead: &Lead) -> Result<SupplementalData> {
        let company = lead.company_name.as_str();
        if let Some(delay) = self.delays.get(company) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_all || self.failures.contains(company) {
            bail!("{} unavailable for {company}", self.name);
        }

        Ok(self
            .responses
            .get(company)
            .cloned()
            .unwrap_or_else(|| SupplementalData::empty(self.origin)))
    }
}

pub mod error;
pub mod types;

pub use error::{ApolloError, Result};
pub use types::{Organization, PeopleSearchInput, Person, PhoneNumber};

use serde::de::DeserializeOwned;
use types::{OrganizationEnvelope, PeopleSearchResponse};

const BASE_URL: &str = "https://api.apollo.io/api/v1";

/// Titles that usually own sponsorship or community budgets.
const SPONSORSHIP_TITLES: &[&str] = &[
    "owner",
    "founder",
    "marketing",
    "community",
    "sponsorship",
    "partnerships",
    "general manager",
];

pub struct ApolloClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ApolloClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Point the client at another host (used by tests and proxies).
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Look up a company by its web domain. `Ok(None)` when Apollo has no match.
    pub async fn enrich_organization(&self, domain: &str) -> Result<Option<Organization>> {
        tracing::info!(domain, "Enriching organization");

        let url = format!("{}/organizations/enrich", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&[("domain", domain)])
            .send()
            .await?;

        let envelope: OrganizationEnvelope = read_json(resp).await?;
        if envelope.organization.is_none() {
            tracing::debug!(domain, "No organization match");
        }
        Ok(envelope.organization)
    }

    /// Find up to `limit` people at the company who are likely sponsorship contacts.
    pub async fn search_people(&self, domain: &str, limit: u32) -> Result<Vec<Person>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let input = PeopleSearchInput {
            q_organization_domains_list: vec![domain.to_string()],
            person_titles: SPONSORSHIP_TITLES.iter().map(|t| t.to_string()).collect(),
            per_page: limit,
            page: 1,
        };

        let url = format!("{}/mixed_people/search", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&input)
            .send()
            .await?;

        let body: PeopleSearchResponse = read_json(resp).await?;
        let mut people = body.people;
        people.extend(body.contacts);
        people.truncate(limit as usize);

        tracing::info!(domain, count = people.len(), "People search complete");
        Ok(people)
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApolloError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let text = resp.text().await?;
    Ok(serde_json::from_str(&text)?)
}

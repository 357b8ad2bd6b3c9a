use std::env;

use tracing::info;

use crate::error::SponsorScoutError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; SponsorScout/0.1; +https://sponsorscout.app/bot)";

/// Collaborator configuration loaded from environment variables.
///
/// Only the components that talk to external services read this. The forensic
/// core (normalize, evidence, identity, merge) takes no configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // Enrichment API
    pub apollo_api_key: Option<String>,
    pub apollo_max_contacts: u32,

    // Scraping
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub scrape_timeout_secs: u64,
    pub scrape_user_agent: String,

    // Pipeline
    pub enrich_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            apollo_api_key: None,
            apollo_max_contacts: 3,
            browserless_url: None,
            browserless_token: None,
            scrape_timeout_secs: 15,
            scrape_user_agent: DEFAULT_USER_AGENT.to_string(),
            enrich_concurrency: 4,
        }
    }
}

impl Config {
    /// Load configuration from environment variables. Every variable is optional;
    /// a collaborator whose key is missing is simply not wired in.
    pub fn from_env() -> Result<Self, SponsorScoutError> {
        let defaults = Self::default();
        Ok(Self {
            apollo_api_key: optional_env("APOLLO_API_KEY"),
            apollo_max_contacts: parsed_env("APOLLO_MAX_CONTACTS", defaults.apollo_max_contacts)?,
            browserless_url: optional_env("BROWSERLESS_URL"),
            browserless_token: optional_env("BROWSERLESS_TOKEN"),
            scrape_timeout_secs: parsed_env("SCRAPE_TIMEOUT_SECS", defaults.scrape_timeout_secs)?,
            scrape_user_agent: optional_env("SCRAPE_USER_AGENT")
                .unwrap_or(defaults.scrape_user_agent),
            enrich_concurrency: parsed_env("ENRICH_CONCURRENCY", defaults.enrich_concurrency)?
                .max(1),
        })
    }

    /// Log which collaborators are enabled without printing secrets.
    pub fn log_redacted(&self) {
        info!(
            apollo = self.apollo_api_key.is_some(),
            apollo_max_contacts = self.apollo_max_contacts,
            browserless = self.browserless_url.as_deref().unwrap_or("disabled"),
            browserless_token = self.browserless_token.is_some(),
            scrape_timeout_secs = self.scrape_timeout_secs,
            enrich_concurrency = self.enrich_concurrency,
            "Loaded configuration"
        );
    }
}

/// Unset and blank variables both read as absent.
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, SponsorScoutError> {
    match optional_env(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| SponsorScoutError::Config(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(default),
    }
}

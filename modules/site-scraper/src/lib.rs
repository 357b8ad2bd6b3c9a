pub mod error;
pub mod links;
pub mod meta;
pub mod social;

pub use error::{Result, ScrapeError};
pub use social::{scan_social_links, ScrapedSocialLinks};

use std::time::Duration;

use serde::Serialize;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SiteScraper/0.1)";

/// How pages are fetched.
#[derive(Debug, Clone)]
pub struct ScraperOptions {
    pub timeout: Duration,
    pub user_agent: String,
    /// Browserless base URL. When set, pages are rendered there instead of
    /// fetched directly.
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
}

impl Default for ScraperOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browserless_url: None,
            browserless_token: None,
        }
    }
}

/// Everything read off a company homepage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrapedSite {
    /// Final URL that was fetched.
    pub url: String,
    pub social_links: ScrapedSocialLinks,
    pub phone: Option<String>,
    pub description: Option<String>,
}

impl ScrapedSite {
    /// Parse already-fetched HTML.
    pub fn from_html(url: &str, html: &str) -> Self {
        let links = links::extract_links(html, url);
        Self {
            url: url.to_string(),
            social_links: scan_social_links(links.iter().map(|l| l.as_str())),
            phone: links::extract_phone(html),
            description: meta::meta_description(html),
        }
    }
}

pub struct SiteScraper {
    client: reqwest::Client,
    browserless: Option<Browserless>,
}

struct Browserless {
    base_url: String,
    token: Option<String>,
}

impl SiteScraper {
    pub fn new(options: ScraperOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()?;

        let browserless = options.browserless_url.map(|base_url| Browserless {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: options.browserless_token,
        });

        Ok(Self {
            client,
            browserless,
        })
    }

    /// Fetch a page's HTML, rendered through Browserless when configured.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let target = parse_target(url)?;

        match &self.browserless {
            Some(browserless) => self.fetch_rendered(browserless, target.as_str()).await,
            None => self.fetch_direct(target.as_str()).await,
        }
    }

    async fn fetch_direct(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }

    /// POST to the Browserless `/content` endpoint.
    async fn fetch_rendered(&self, browserless: &Browserless, url: &str) -> Result<String> {
        let endpoint = format!("{}/content", browserless.base_url);
        let mut req = self
            .client
            .post(&endpoint)
            .json(&serde_json::json!({ "url": url }));
        if let Some(token) = &browserless.token {
            req = req.query(&[("token", token)]);
        }

        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }

    /// Fetch a homepage and read social profiles, phone and summary off it.
    pub async fn scrape_site(&self, url: &str) -> Result<ScrapedSite> {
        let target = parse_target(url)?;
        let html = self.fetch_html(target.as_str()).await?;
        let site = ScrapedSite::from_html(target.as_str(), &html);

        tracing::info!(
            url = %target,
            bytes = html.len(),
            social = site.social_links.found(),
            phone = site.phone.is_some(),
            "Scraped site"
        );
        Ok(site)
    }

    pub async fn scrape_social_links(&self, url: &str) -> Result<ScrapedSocialLinks> {
        Ok(self.scrape_site(url).await?.social_links)
    }
}

/// Accept bare domains by assuming https; reject anything that isn't http(s).
fn parse_target(raw: &str) -> Result<url::Url> {
    let trimmed = raw.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed =
        url::Url::parse(&candidate).map_err(|e| ScrapeError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ScrapeError::InvalidUrl(raw.to_string()));
    }
    Ok(parsed)
}

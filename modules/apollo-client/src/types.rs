use serde::{Deserialize, Serialize};

// --- Organization enrichment ---

/// Response envelope for `GET /organizations/enrich`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationEnvelope {
    pub organization: Option<Organization>,
}

/// Company record. Every field is optional; Apollo omits what it doesn't know.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Organization {
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub phone: Option<String>,
    pub primary_phone: Option<PhoneNumber>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub short_description: Option<String>,
}

impl Organization {
    /// Best available company phone: the top-level field, then `primary_phone`.
    pub fn best_phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.primary_phone.as_ref().and_then(PhoneNumber::best))
    }

    /// Postal address assembled from its parts, skipping blanks.
    pub fn full_address(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.street_address,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|p| p.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhoneNumber {
    pub raw_number: Option<String>,
    pub sanitized_number: Option<String>,
    pub number: Option<String>,
}

impl PhoneNumber {
    pub fn best(&self) -> Option<&str> {
        [&self.sanitized_number, &self.raw_number, &self.number]
            .into_iter()
            .filter_map(|n| n.as_deref())
            .find(|n| !n.trim().is_empty())
    }
}

// --- People search ---

/// Request body for `POST /mixed_people/search`.
#[derive(Debug, Clone, Serialize)]
pub struct PeopleSearchInput {
    pub q_organization_domains_list: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub person_titles: Vec<String>,
    pub per_page: u32,
    pub page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeopleSearchResponse {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub contacts: Vec<Person>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Person {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub email_status: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
    pub linkedin_url: Option<String>,
}

impl Person {
    /// Display name: `name` if present, else first + last.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    }

    /// Apollo masks unrevealed emails with a placeholder address.
    pub fn usable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty() && !e.starts_with("email_not_unlocked"))
    }
}

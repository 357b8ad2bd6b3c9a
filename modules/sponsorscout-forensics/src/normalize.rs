//! Canonical forms for URLs, social handles and domains.
//!
//! Every function here is total: bad input yields `None` or a best-effort
//! string, never a panic or an error.

use url::Url;

/// Query parameters that only carry campaign attribution.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid"];

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Normalize a URL: trim, default to `https://`, drop tracking parameters.
///
/// If the result does not parse as a URL the prefixed string is returned as-is.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let prefixed = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let Ok(mut parsed) = Url::parse(&prefixed) else {
        return Some(prefixed);
    };

    if parsed.query().is_some() {
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let kept: Vec<&(String, String)> =
            pairs.iter().filter(|(k, _)| !is_tracking_param(k)).collect();

        if kept.is_empty() {
            parsed.set_query(None);
        } else if kept.len() != pairs.len() {
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    Some(parsed.to_string())
}

/// Normalize a bare social handle: trim, strip one leading `@` and trailing slashes.
pub fn normalize_handle(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_at = trimmed.strip_prefix('@').unwrap_or(trimmed);
    let handle = without_at.trim_end_matches('/');
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}

/// Reduce a URL or host string to a comparable domain: lowercase, no scheme,
/// no `www.`, nothing after the first `/`, `?` or `#`.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lower = raw.trim().to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let host = rest
        .split(|c: char| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return None;
    }
    Some(host.to_string())
}

/// Comparable social identity: normalized handle, lowercased.
pub fn normalize_social(raw: &str) -> Option<String> {
    normalize_handle(raw).map(|h| h.to_lowercase())
}

/// Pull the handle out of a profile URL (`https://instagram.com/acme/` → `acme`).
/// Bare handles pass through unchanged.
pub fn extract_handle(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !looks_like_url(trimmed) {
        return normalize_handle(trimmed);
    }
    let url = normalize_url(trimmed)?;
    let parsed = Url::parse(&url).ok()?;
    let segment = parsed
        .path_segments()?
        .find(|s| !s.is_empty())?
        .to_string();
    normalize_handle(&segment)
}

/// Normalize a social value that may be either a profile URL or a bare handle.
pub fn normalize_social_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if looks_like_url(trimmed) {
        normalize_url(trimmed)
    } else {
        normalize_handle(trimmed)
    }
}

fn looks_like_url(s: &str) -> bool {
    has_http_scheme(s) || s.to_ascii_lowercase().starts_with("www.") || {
        // "instagram.com/acme" style: a dotted host followed by a path
        let host = s.split('/').next().unwrap_or_default();
        s.contains('/') && host.contains('.') && !host.starts_with('@')
    }
}

/// Trim and collapse internal whitespace in a postal address.
pub fn normalize_address(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Matches `href` attributes on `<a>`, `<link>` and `<area>`.
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

/// Resolve a raw href against the page URL. Only http(s) targets survive;
/// the fragment is dropped.
fn resolve_href(raw: &str, base: Option<&url::Url>) -> Option<url::Url> {
    let raw = raw.trim();
    let mut parsed = if raw.starts_with("http://") || raw.starts_with("https://") {
        url::Url::parse(raw).ok()?
    } else if raw.starts_with("//") {
        url::Url::parse(&format!("https:{raw}")).ok()?
    } else {
        base?.join(raw).ok()?
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.set_fragment(None);
    Some(parsed)
}

/// All distinct http(s) links in `html`, in document order.
pub fn extract_links(html: &str, base_url: &str) -> Vec<url::Url> {
    let base = url::Url::parse(base_url).ok();
    let mut seen = HashSet::new();

    HREF_RE
        .captures_iter(html)
        .filter_map(|cap| resolve_href(&cap[1], base.as_ref()))
        .filter(|link| seen.insert(link.as_str().to_string()))
        .collect()
}

/// The first `tel:` link on the page, decoded, if it carries any digits.
pub fn extract_phone(html: &str) -> Option<String> {
    HREF_RE.captures_iter(html).find_map(|cap| {
        let raw = cap[1].trim();
        let number = raw
            .strip_prefix("tel:")
            .or_else(|| raw.strip_prefix("TEL:"))?
            .replace("%20", " ")
            .replace("%2B", "+")
            .replace("%2b", "+");
        let number = number.trim();
        number
            .chars()
            .any(|c: char| c.is_ascii_digit())
            .then(|| number.to_string())
    })
}

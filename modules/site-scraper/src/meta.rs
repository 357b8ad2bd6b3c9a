use std::sync::LazyLock;

use regex::Regex;

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z:\-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// Page summary from `<meta name="description">`, falling back to `og:description`.
pub fn meta_description(html: &str) -> Option<String> {
    let mut og = None;

    for tag in META_TAG_RE.find_iter(html) {
        let mut key = None;
        let mut content = None;
        for cap in ATTR_RE.captures_iter(tag.as_str()) {
            let value = cap.get(2).or_else(|| cap.get(3)).map(|m| m.as_str());
            match cap[1].to_ascii_lowercase().as_str() {
                "name" | "property" => key = value.map(str::to_ascii_lowercase),
                "content" => content = value,
                _ => {}
            }
        }

        let Some(text) = content.map(decode_entities).filter(|t| !t.is_empty()) else {
            continue;
        };
        match key.as_deref() {
            Some("description") => return Some(text),
            Some("og:description") if og.is_none() => og = Some(text),
            _ => {}
        }
    }

    og
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_name_description() {
        let html = r#"<head>
            <meta property="og:description" content="OG text">
            <meta content="Family bakery &amp; cafe since 1952" name="description">
        </head>"#;
        assert_eq!(
            meta_description(html).as_deref(),
            Some("Family bakery & cafe since 1952")
        );
    }

    #[test]
    fn falls_back_to_open_graph() {
        let html = r#"<meta property='og:description' content='Hardware   for builders'>"#;
        assert_eq!(meta_description(html).as_deref(), Some("Hardware for builders"));
    }

    #[test]
    fn blank_or_missing_is_none() {
        assert_eq!(meta_description(r#"<meta name="description" content="  ">"#), None);
        assert_eq!(meta_description("<title>Acme</title>"), None);
    }
}

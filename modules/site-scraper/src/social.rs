//! Social profile detection over a page's outbound links.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Profile URLs found on a site, one per platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedSocialLinks {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub youtube: Option<String>,
    pub tiktok: Option<String>,
}

impl ScrapedSocialLinks {
    pub fn is_empty(&self) -> bool {
        self.found() == 0
    }

    /// Number of platforms with a profile.
    pub fn found(&self) -> usize {
        [
            &self.instagram,
            &self.facebook,
            &self.twitter,
            &self.linkedin,
            &self.youtube,
            &self.tiktok,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }

    fn slot_mut(&mut self, platform: Platform) -> &mut Option<String> {
        match platform {
            Platform::Instagram => &mut self.instagram,
            Platform::Facebook => &mut self.facebook,
            Platform::Twitter => &mut self.twitter,
            Platform::Linkedin => &mut self.linkedin,
            Platform::Youtube => &mut self.youtube,
            Platform::Tiktok => &mut self.tiktok,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Platform {
    Instagram,
    Facebook,
    Twitter,
    Linkedin,
    Youtube,
    Tiktok,
}

// Anchored to the start of a resolved link so hosts like `netflix.com` never
// match the `x.com` pattern.
static RE_INSTAGRAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?instagram\.com/([A-Za-z0-9_.]+)").expect("valid regex")
});
static RE_FACEBOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|m\.)?facebook\.com/([A-Za-z0-9_.\-]+)")
        .expect("valid regex")
});
static RE_TWITTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|mobile\.)?(?:twitter|x)\.com/([A-Za-z0-9_]+)")
        .expect("valid regex")
});
static RE_LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:[a-z]{2,3}\.)?linkedin\.com/(?:company|school|in)/([A-Za-z0-9_\-%]+)")
        .expect("valid regex")
});
static RE_YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|m\.)?youtube\.com/(?:@|c/|channel/|user/)([A-Za-z0-9_.\-]+)")
        .expect("valid regex")
});
static RE_TIKTOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?tiktok\.com/@([A-Za-z0-9_.]+)").expect("valid regex")
});

const INSTAGRAM_SKIP: &[&str] = &[
    "p", "reel", "reels", "stories", "explore", "accounts", "tv", "s", "share",
];
const FACEBOOK_SKIP: &[&str] = &[
    "photo",
    "photos",
    "sharer",
    "sharer.php",
    "share",
    "events",
    "groups",
    "watch",
    "marketplace",
    "login",
    "dialog",
    "plugins",
    "tr",
    "profile.php",
];
const TWITTER_SKIP: &[&str] = &["intent", "share", "hashtag", "search", "i", "home", "widgets.js"];
const LINKEDIN_SKIP: &[&str] = &["login", "feed", "jobs"];
const YOUTUBE_SKIP: &[&str] = &["watch", "playlist", "results", "feed"];
const TIKTOK_SKIP: &[&str] = &["discover", "tag", "music", "sound"];

struct SocialPattern {
    platform: Platform,
    regex: &'static LazyLock<Regex>,
    skip_segments: &'static [&'static str],
}

static SOCIAL_PATTERNS: &[SocialPattern] = &[
    SocialPattern {
        platform: Platform::Instagram,
        regex: &RE_INSTAGRAM,
        skip_segments: INSTAGRAM_SKIP,
    },
    SocialPattern {
        platform: Platform::Facebook,
        regex: &RE_FACEBOOK,
        skip_segments: FACEBOOK_SKIP,
    },
    SocialPattern {
        platform: Platform::Twitter,
        regex: &RE_TWITTER,
        skip_segments: TWITTER_SKIP,
    },
    SocialPattern {
        platform: Platform::Linkedin,
        regex: &RE_LINKEDIN,
        skip_segments: LINKEDIN_SKIP,
    },
    SocialPattern {
        platform: Platform::Youtube,
        regex: &RE_YOUTUBE,
        skip_segments: YOUTUBE_SKIP,
    },
    SocialPattern {
        platform: Platform::Tiktok,
        regex: &RE_TIKTOK,
        skip_segments: TIKTOK_SKIP,
    },
];

/// Scan resolved links for profile URLs. The first profile seen for each
/// platform wins; share buttons and post permalinks are skipped.
pub fn scan_social_links<'a, I>(links: I) -> ScrapedSocialLinks
where
    I: IntoIterator<Item = &'a str>,
{
    let mut found = ScrapedSocialLinks::default();

    for link in links {
        for pattern in SOCIAL_PATTERNS {
            let slot = found.slot_mut(pattern.platform);
            if slot.is_some() {
                continue;
            }
            let Some(cap) = pattern.regex.captures(link) else {
                continue;
            };
            let handle = cap[1].to_lowercase();
            if pattern.skip_segments.contains(&handle.as_str()) {
                continue;
            }
            *slot = cap.get(0).map(|m| m.as_str().to_string());
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(links: &[&str]) -> ScrapedSocialLinks {
        scan_social_links(links.iter().copied())
    }

    #[test]
    fn finds_one_profile_per_platform() {
        let found = scan(&[
            "https://www.instagram.com/acme_co/",
            "https://facebook.com/AcmeCo",
            "https://x.com/acme",
            "https://www.linkedin.com/company/acme-co/about",
            "https://www.youtube.com/@acmechannel",
            "https://www.tiktok.com/@acme.co",
        ]);
        assert_eq!(found.instagram.as_deref(), Some("https://www.instagram.com/acme_co"));
        assert_eq!(found.facebook.as_deref(), Some("https://facebook.com/AcmeCo"));
        assert_eq!(found.twitter.as_deref(), Some("https://x.com/acme"));
        assert_eq!(
            found.linkedin.as_deref(),
            Some("https://www.linkedin.com/company/acme-co")
        );
        assert_eq!(found.youtube.as_deref(), Some("https://www.youtube.com/@acmechannel"));
        assert_eq!(found.tiktok.as_deref(), Some("https://www.tiktok.com/@acme.co"));
        assert_eq!(found.found(), 6);
    }

    #[test]
    fn share_and_post_links_are_skipped() {
        let found = scan(&[
            "https://www.facebook.com/sharer/sharer.php?u=acme.com",
            "https://twitter.com/intent/tweet?text=hi",
            "https://www.instagram.com/p/Cabc123/",
            "https://www.youtube.com/watch?v=abc",
        ]);
        assert!(found.is_empty());
    }

    #[test]
    fn first_hit_wins() {
        let found = scan(&[
            "https://instagram.com/p/xyz",
            "https://instagram.com/first",
            "https://instagram.com/second",
        ]);
        assert_eq!(found.instagram.as_deref(), Some("https://instagram.com/first"));
    }

    #[test]
    fn lookalike_hosts_do_not_match() {
        let found = scan(&["https://netflix.com/acme", "https://notinstagram.com/acme"]);
        assert!(found.is_empty());
    }
}

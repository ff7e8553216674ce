//! Content keys rendered on the public pages and their fallbacks.

use std::collections::HashMap;

use crate::db::models::{ContentBlock, ContentType};

/// Every slot the public pages read, with the text shown when the store has no block for it.
pub const DEFAULT_CONTENT: &[(&str, &str)] = &[
    ("hero_title", "Creative Solutions for the Digital Age"),
    (
        "hero_subtitle",
        "Graphic Design • Video Editing • Social Media • AI Automation",
    ),
    ("hero_cta", "View Our Work"),
    ("about_title", "About IMA"),
    (
        "about_text",
        "We are a creative studio specializing in visual storytelling, brand development, and cutting-edge digital solutions.",
    ),
    ("services_title", "What We Do"),
    ("contact_title", "Let's Create Together"),
    (
        "contact_subtitle",
        "Have a project in mind? We would love to hear from you.",
    ),
    ("featured_title", "Featured Work"),
    ("portfolio_title", "Our Portfolio"),
    (
        "portfolio_subtitle",
        "Explore our creative work across design, video, social media, and automation.",
    ),
    (
        "services_subtitle",
        "From concept to execution, we deliver creative solutions that make an impact.",
    ),
    ("contact_email", "hello@ima.studio"),
    ("contact_location", "Available Worldwide"),
];

pub fn default_for(key: &str) -> Option<&'static str> {
    DEFAULT_CONTENT
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Lookup table from content key to stored block.
#[derive(Debug, Clone, Default)]
pub struct ContentMap {
    blocks: HashMap<String, ContentBlock>,
}

impl ContentMap {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self {
            blocks: blocks.into_iter().map(|b| (b.key.clone(), b)).collect(),
        }
    }

    /// Stored value for `key`, else its default, else empty. Blank stored
    /// values count as absent.
    pub fn get(&self, key: &str) -> String {
        self.blocks
            .get(key)
            .map(|b| b.value.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| default_for(key).map(str::to_string))
            .unwrap_or_default()
    }

    pub fn content_type(&self, key: &str) -> ContentType {
        self.blocks
            .get(key)
            .map(|b| b.content_type)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn block(key: &str, value: &str) -> ContentBlock {
        ContentBlock {
            id: key.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            content_type: ContentType::Text,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stored_value_wins() {
        let map = ContentMap::new(vec![block("hero_title", "Bold Ideas")]);
        assert_eq!(map.get("hero_title"), "Bold Ideas");
    }

    #[test]
    fn test_missing_or_blank_key_uses_default() {
        let map = ContentMap::new(vec![block("hero_cta", "   ")]);
        assert_eq!(map.get("hero_title"), "Creative Solutions for the Digital Age");
        assert_eq!(map.get("hero_cta"), "View Our Work");
        assert_eq!(map.get("unknown_key"), "");
    }

    #[test]
    fn test_every_default_is_non_empty() {
        for (key, value) in DEFAULT_CONTENT {
            assert!(!value.is_empty(), "{} has no fallback", key);
        }
    }
}

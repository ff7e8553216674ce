//! Database Models - rows of the hosted content tables (serde maps them 1:1 onto columns).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Table;

/// Kind of value held by a content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Text,
    Html,
    ImageUrl,
}

/// Single keyed text/markup value rendered into a public page slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    pub updated_at: DateTime<Utc>,
}

impl Table for ContentBlock {
    const NAME: &'static str = "content_blocks";
}

/// Site navigation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub href: String,
    pub display_order: i32,
    pub is_visible: bool,
    pub is_external: bool,
}

impl Table for NavItem {
    const NAME: &'static str = "navigation_items";
}

/// Social platforms a link may point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Instagram,
    Facebook,
    Twitter,
    X,
    Tiktok,
    Youtube,
    Behance,
    Dribbble,
    Github,
}

impl Platform {
    pub const ALL: [Platform; 10] = [
        Platform::Linkedin,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::X,
        Platform::Tiktok,
        Platform::Youtube,
        Platform::Behance,
        Platform::Dribbble,
        Platform::Github,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::X => "x",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
            Platform::Behance => "behance",
            Platform::Dribbble => "dribbble",
            Platform::Github => "github",
        }
    }

    pub fn parse(s: &str) -> Option<Platform> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_lowercase())
    }

    /// Human-readable name shown in admin and footer
    pub fn display_name(&self) -> String {
        if *self == Platform::X {
            return "X (Twitter)".to_string();
        }
        let raw = self.as_str();
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: String,
    pub platform: Platform,
    pub url: String,
    pub is_visible: bool,
    pub display_order: i32,
}

impl Table for SocialLink {
    const NAME: &'static str = "social_links";
}

/// Portfolio categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Graphics,
    Video,
    SocialMedia,
    AiAutomation,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Graphics,
        Category::Video,
        Category::SocialMedia,
        Category::AiAutomation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Graphics => "graphics",
            Category::Video => "video",
            Category::SocialMedia => "social_media",
            Category::AiAutomation => "ai_automation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Graphics => "Graphic Design",
            Category::Video => "Video Editing",
            Category::SocialMedia => "Social Media",
            Category::AiAutomation => "AI Automation",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == s.trim())
    }
}

/// How `media_url` of a portfolio item is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Youtube,
    Instagram,
    Tiktok,
    Twitter,
}

impl MediaType {
    pub const ALL: [MediaType; 5] = [
        MediaType::Image,
        MediaType::Youtube,
        MediaType::Instagram,
        MediaType::Tiktok,
        MediaType::Twitter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Youtube => "youtube",
            MediaType::Instagram => "instagram",
            MediaType::Tiktok => "tiktok",
            MediaType::Twitter => "twitter",
        }
    }

    pub fn parse(s: &str) -> Option<MediaType> {
        MediaType::ALL.into_iter().find(|m| m.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub media_type: MediaType,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_featured: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table for PortfolioItem {
    const NAME: &'static str = "portfolio_items";
}

/// Contact form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub subscribe_newsletter: bool,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Table for Message {
    const NAME: &'static str = "messages";
}

/// Newsletter subscription, unique by email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Assigned by the store; omitted on upsert so a conflict never rewrites it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    pub source: String,
}

impl Table for Lead {
    const NAME: &'static str = "leads";
}

/// Singleton site settings row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub id: String,
    pub site_name: String,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_color: String,
    pub footer_text: Option<String>,
}

impl Table for SiteSettings {
    const NAME: &'static str = "site_settings";
}

pub const SETTINGS_ID: &str = "default";
pub const DEFAULT_LOGO_URL: &str = "https://customer-assets.emergentagent.com/job_ee8839b2-9350-41a5-9777-cc145839fd61/artifacts/dh6cyvhn_3.png";

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID.to_string(),
            site_name: "IMA".to_string(),
            logo_url: Some(DEFAULT_LOGO_URL.to_string()),
            favicon_url: Some(DEFAULT_LOGO_URL.to_string()),
            primary_color: "#E10600".to_string(),
            footer_text: Some("© 2025 IMA. All rights reserved.".to_string()),
        }
    }
}

/// Head metadata for one public page, keyed by slug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Table for PageMeta {
    const NAME: &'static str = "pages";
}

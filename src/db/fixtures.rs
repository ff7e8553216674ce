//! Demo content for local mode and first-run seeding.

use chrono::{Duration, Utc};

use super::models::{
    Category, ContentBlock, ContentType, MediaType, Message, NavItem, PageMeta, Platform,
    PortfolioItem, SiteSettings, SocialLink,
};
use super::{DataAccess, StoreError};

fn block(id: &str, key: &str, value: &str) -> ContentBlock {
    ContentBlock {
        id: id.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        content_type: ContentType::Text,
        updated_at: Utc::now(),
    }
}

pub fn content_blocks() -> Vec<ContentBlock> {
    vec![
        block("1", "hero_title", "Creative Solutions for the Digital Age"),
        block(
            "2",
            "hero_subtitle",
            "Graphic Design • Video Editing • Social Media • AI Automation",
        ),
        block("3", "hero_cta", "View Our Work"),
        block("4", "about_title", "About IMA"),
        block(
            "5",
            "about_text",
            "We are a creative studio specializing in visual storytelling, brand development, and cutting-edge digital solutions. Our mission is to transform ideas into impactful experiences that resonate with audiences and drive results.",
        ),
        block("6", "services_title", "What We Do"),
        block("7", "contact_title", "Let's Create Together"),
        block(
            "8",
            "contact_subtitle",
            "Have a project in mind? We would love to hear from you.",
        ),
    ]
}

pub fn navigation() -> Vec<NavItem> {
    [
        ("Home", "/"),
        ("Portfolio", "/portfolio"),
        ("Services", "/services"),
        ("About", "/about"),
        ("Contact", "/contact"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (label, href))| NavItem {
        id: (i + 1).to_string(),
        label: label.to_string(),
        href: href.to_string(),
        display_order: i as i32,
        is_visible: true,
        is_external: false,
    })
    .collect()
}

pub fn social_links() -> Vec<SocialLink> {
    [
        (Platform::Instagram, "https://instagram.com/ima"),
        (Platform::Linkedin, "https://linkedin.com/company/ima"),
        (Platform::Behance, "https://behance.net/ima"),
        (Platform::Youtube, "https://youtube.com/@ima"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (platform, url))| SocialLink {
        id: (i + 1).to_string(),
        platform,
        url: url.to_string(),
        is_visible: true,
        display_order: i as i32,
    })
    .collect()
}

pub fn portfolio() -> Vec<PortfolioItem> {
    let now = Utc::now();
    let item = |id: &str,
                title: &str,
                category: Category,
                description: &str,
                tools: &[&str],
                media_type: MediaType,
                media_url: Option<&str>,
                thumbnail: &str,
                is_featured: bool,
                age_days: i64| PortfolioItem {
        id: id.to_string(),
        title: title.to_string(),
        category,
        description: description.to_string(),
        tools_used: tools.iter().map(|t| t.to_string()).collect(),
        media_type,
        media_url: media_url.map(str::to_string),
        thumbnail_url: Some(thumbnail.to_string()),
        is_featured,
        is_published: true,
        created_at: now - Duration::days(age_days),
        updated_at: now - Duration::days(age_days),
    };

    vec![
        item(
            "1",
            "Brand Identity Design",
            Category::Graphics,
            "Complete brand identity package including logo, color palette, typography, and brand guidelines.",
            &["Adobe Illustrator", "Adobe Photoshop", "Figma"],
            MediaType::Image,
            None,
            "https://images.unsplash.com/photo-1600590008363-1c7dcf5d568d?w=800",
            true,
            0,
        ),
        item(
            "2",
            "Product Launch Video",
            Category::Video,
            "Cinematic product launch video with motion graphics and professional color grading.",
            &["Adobe Premiere Pro", "After Effects", "DaVinci Resolve"],
            MediaType::Youtube,
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https://images.unsplash.com/photo-1574717024653-61fd2cf4d44d?w=800",
            true,
            1,
        ),
        item(
            "3",
            "Social Media Campaign",
            Category::SocialMedia,
            "Comprehensive social media strategy and content creation for product launch.",
            &["Canva", "Adobe Express", "Hootsuite"],
            MediaType::Image,
            None,
            "https://images.unsplash.com/photo-1611162617474-5b21e879e113?w=800",
            false,
            2,
        ),
        item(
            "4",
            "AI Workflow Automation",
            Category::AiAutomation,
            "Custom AI-powered automation system for content scheduling and analytics.",
            &["Python", "OpenAI API", "Zapier", "Make"],
            MediaType::Image,
            None,
            "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=800",
            true,
            3,
        ),
    ]
}

pub fn messages() -> Vec<Message> {
    let now = Utc::now();
    vec![
        Message {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            subject: Some("Project Inquiry".to_string()),
            message: "Hi, I am interested in your graphic design services for my startup. We need a complete brand identity package including logo, business cards, and social media templates. Could you share your rates?".to_string(),
            subscribe_newsletter: true,
            is_read: false,
            created_at: now,
        },
        Message {
            id: "2".to_string(),
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            subject: Some("Collaboration Request".to_string()),
            message: "Hello! I run a creative agency and we are looking for video editors for ongoing projects. Would you be interested in discussing a partnership?".to_string(),
            subscribe_newsletter: false,
            is_read: true,
            created_at: now - Duration::days(1),
        },
        Message {
            id: "3".to_string(),
            name: "Mike Johnson".to_string(),
            email: "mike@example.com".to_string(),
            subject: Some("Quote Request".to_string()),
            message: "I need help with social media management for my e-commerce store. Can you provide a quote for monthly management services?".to_string(),
            subscribe_newsletter: true,
            is_read: true,
            created_at: now - Duration::days(2),
        },
    ]
}

pub fn pages() -> Vec<PageMeta> {
    [
        ("home", "Home", "IMA | Creative Studio", "Graphic design, video editing, social media and AI automation."),
        ("portfolio", "Portfolio", "Portfolio | IMA", "Explore our creative work in graphic design, video editing, social media, and AI automation."),
        ("services", "Services", "Services | IMA", "Professional creative services including graphic design, video editing, social media management, and AI automation."),
        ("about", "About", "About | IMA", "Learn about IMA - a creative studio specializing in visual storytelling and digital solutions."),
        ("contact", "Contact", "Contact | IMA", "Get in touch with IMA for your next creative project."),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (slug, title, meta_title, meta_description))| PageMeta {
        id: (i + 1).to_string(),
        slug: slug.to_string(),
        title: title.to_string(),
        meta_title: Some(meta_title.to_string()),
        meta_description: Some(meta_description.to_string()),
        updated_at: Utc::now(),
    })
    .collect()
}

/// Load the demo data set into an empty store. Returns `false` when the store
/// already holds content and nothing was written.
pub async fn seed(access: &DataAccess) -> Result<bool, StoreError> {
    let existing = access
        .from::<ContentBlock>()
        .eq("key", "hero_title")
        .limit(1)
        .select()
        .await?;
    if !existing.is_empty() {
        tracing::info!("Content already seeded, skipping fixtures");
        return Ok(false);
    }

    access.from::<SiteSettings>().upsert(&[SiteSettings::default()], "id").await?;
    access.from::<ContentBlock>().insert(&content_blocks()).await?;
    access.from::<NavItem>().insert(&navigation()).await?;
    access.from::<SocialLink>().insert(&social_links()).await?;
    access.from::<PortfolioItem>().insert(&portfolio()).await?;
    access.from::<Message>().insert(&messages()).await?;
    access.from::<PageMeta>().insert(&pages()).await?;

    tracing::info!("Seeded demo content");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let access = DataAccess::configured(MemoryBackend::new());
        assert!(seed(&access).await.unwrap());
        assert!(!seed(&access).await.unwrap());

        let blocks = access.from::<ContentBlock>().select().await.unwrap();
        assert_eq!(blocks.len(), content_blocks().len());
        let nav = access.from::<NavItem>().select().await.unwrap();
        assert_eq!(nav.len(), 5);
    }

    #[tokio::test]
    async fn test_seed_fails_when_unconfigured() {
        // select short-circuits to empty, the first write reports the cause
        let err = seed(&DataAccess::Unconfigured).await;
        assert!(matches!(err, Err(StoreError::NotConfigured)));
    }

    #[test]
    fn test_fixture_navigation_order_matches_position() {
        for (i, item) in navigation().iter().enumerate() {
            assert_eq!(item.display_order, i as i32);
        }
    }
}

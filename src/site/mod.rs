/*!
 * Public Site
 * Read-only mapping from stored content to the five public pages
 */
pub mod content;
pub mod html;
pub mod media;
pub mod pages;

use crate::db::models::{
    Category, ContentBlock, NavItem, PageMeta, PortfolioItem, SiteSettings, SocialLink,
    SETTINGS_ID,
};
use crate::db::{DataAccess, Direction, StoreError};
pub use content::ContentMap;

/// Featured work shown on the home page
pub const FEATURED_LIMIT: usize = 3;

/// Links shown when the store has no navigation rows.
pub const DEFAULT_NAVIGATION: &[(&str, &str)] = &[
    ("Home", "/"),
    ("Portfolio", "/portfolio"),
    ("Services", "/services"),
    ("About", "/about"),
    ("Contact", "/contact"),
];

/// Title and description used when a page has no stored metadata
pub const DEFAULT_PAGE_HEADS: &[(&str, &str, &str)] = &[
    (
        "home",
        "IMA | Creative Studio",
        "Graphic design, video editing, social media and AI automation.",
    ),
    (
        "portfolio",
        "Portfolio | IMA",
        "Explore our creative work in graphic design, video editing, social media, and AI automation.",
    ),
    (
        "services",
        "Services | IMA",
        "Professional creative services including graphic design, video editing, social media management, and AI automation.",
    ),
    (
        "about",
        "About | IMA",
        "Learn about IMA - a creative studio specializing in visual storytelling and digital solutions.",
    ),
    (
        "contact",
        "Contact | IMA",
        "Get in touch with IMA for your next creative project.",
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PageHead {
    pub title: String,
    pub description: String,
}

pub fn default_navigation() -> Vec<NavItem> {
    DEFAULT_NAVIGATION
        .iter()
        .enumerate()
        .map(|(i, (label, href))| NavItem {
            id: format!("default-{}", i),
            label: label.to_string(),
            href: href.to_string(),
            display_order: i as i32,
            is_visible: true,
            is_external: false,
        })
        .collect()
}

// ============================================================================
// Queries
// ============================================================================

pub async fn load_settings(access: &DataAccess) -> Result<Option<SiteSettings>, StoreError> {
    let mut rows = access
        .from::<SiteSettings>()
        .eq("id", SETTINGS_ID)
        .limit(1)
        .select()
        .await?;
    if rows.is_empty() {
        // Older stores keep a single row under another id
        rows = access.from::<SiteSettings>().limit(1).select().await?;
    }
    Ok(rows.into_iter().next())
}

pub async fn load_content(access: &DataAccess) -> Result<Vec<ContentBlock>, StoreError> {
    access.from::<ContentBlock>().select().await
}

/// Visible navigation in display order.
pub async fn load_navigation(access: &DataAccess) -> Result<Vec<NavItem>, StoreError> {
    access
        .from::<NavItem>()
        .eq("is_visible", true)
        .order("display_order", Direction::Asc)
        .select()
        .await
}

pub async fn load_social_links(access: &DataAccess) -> Result<Vec<SocialLink>, StoreError> {
    access
        .from::<SocialLink>()
        .eq("is_visible", true)
        .order("display_order", Direction::Asc)
        .select()
        .await
}

/// Published portfolio items, newest first.
pub async fn load_portfolio(access: &DataAccess) -> Result<Vec<PortfolioItem>, StoreError> {
    let items = access
        .from::<PortfolioItem>()
        .eq("is_published", true)
        .order("created_at", Direction::Desc)
        .select()
        .await?;
    Ok(published(items))
}

pub async fn load_pages(access: &DataAccess) -> Result<Vec<PageMeta>, StoreError> {
    access.from::<PageMeta>().select().await
}

// ============================================================================
// Selection rules
// ============================================================================

pub fn published(items: Vec<PortfolioItem>) -> Vec<PortfolioItem> {
    items.into_iter().filter(|i| i.is_published).collect()
}

/// Up to three published, featured items in store order.
pub fn featured(items: &[PortfolioItem]) -> Vec<&PortfolioItem> {
    items
        .iter()
        .filter(|i| i.is_published && i.is_featured)
        .take(FEATURED_LIMIT)
        .collect()
}

pub fn in_category(items: &[PortfolioItem], category: Option<Category>) -> Vec<&PortfolioItem> {
    items
        .iter()
        .filter(|i| i.is_published)
        .filter(|i| category.map_or(true, |c| i.category == c))
        .collect()
}

fn or_empty<T>(what: &str, result: Result<Vec<T>, StoreError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load {}", what);
        Vec::new()
    })
}

// ============================================================================
// Page data
// ============================================================================

/// Everything a public page needs, fetched once per request.
#[derive(Debug, Clone)]
pub struct SiteData {
    pub settings: SiteSettings,
    pub content: ContentMap,
    pub navigation: Vec<NavItem>,
    pub social_links: Vec<SocialLink>,
    pub portfolio: Vec<PortfolioItem>,
    pub pages: Vec<PageMeta>,
}

impl SiteData {
    /// Load from the store. Read failures are logged and rendered as if the
    /// store were empty.
    pub async fn load(access: &DataAccess) -> Self {
        let (settings, content, navigation, social_links, portfolio, pages) = tokio::join!(
            load_settings(access),
            load_content(access),
            load_navigation(access),
            load_social_links(access),
            load_portfolio(access),
            load_pages(access),
        );

        let settings = settings.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load site settings");
            None
        });
        let mut navigation = or_empty("navigation", navigation);
        if navigation.is_empty() {
            navigation = default_navigation();
        }

        Self {
            settings: settings.unwrap_or_default(),
            content: ContentMap::new(or_empty("content blocks", content)),
            navigation,
            social_links: or_empty("social links", social_links),
            portfolio: or_empty("portfolio", portfolio),
            pages: or_empty("page metadata", pages),
        }
    }

    /// Data used when nothing is stored.
    pub fn fallback() -> Self {
        Self {
            settings: SiteSettings::default(),
            content: ContentMap::default(),
            navigation: default_navigation(),
            social_links: Vec::new(),
            portfolio: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn featured(&self) -> Vec<&PortfolioItem> {
        featured(&self.portfolio)
    }

    pub fn head(&self, slug: &str) -> PageHead {
        let (default_title, default_description) = DEFAULT_PAGE_HEADS
            .iter()
            .find(|(s, _, _)| *s == slug)
            .map(|(_, t, d)| (t.to_string(), d.to_string()))
            .unwrap_or_else(|| (self.settings.site_name.clone(), String::new()));

        let stored = self.pages.iter().find(|p| p.slug == slug);
        let pick = |value: Option<&String>, default: String| {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or(default)
        };
        PageHead {
            title: pick(stored.and_then(|p| p.meta_title.as_ref()), default_title),
            description: pick(
                stored.and_then(|p| p.meta_description.as_ref()),
                default_description,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::db::models::MediaType;
    use crate::db::MemoryBackend;
    use chrono::Utc;

    fn item(id: &str, published: bool, featured: bool) -> PortfolioItem {
        PortfolioItem {
            id: id.to_string(),
            title: format!("Item {}", id),
            category: Category::Graphics,
            description: "d".to_string(),
            tools_used: vec![],
            media_type: MediaType::Image,
            media_url: None,
            thumbnail_url: None,
            is_featured: featured,
            is_published: published,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_featured_caps_at_three_in_store_order() {
        let items = vec![
            item("a", true, true),
            item("b", false, true),
            item("c", true, false),
            item("d", true, true),
            item("e", true, true),
            item("f", true, true),
        ];
        let ids: Vec<&str> = featured(&items).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d", "e"]);
    }

    #[test]
    fn test_featured_smaller_than_limit() {
        let items = vec![item("a", true, true), item("b", true, false)];
        assert_eq!(featured(&items).len(), 1);
    }

    #[test]
    fn test_category_filter_excludes_unpublished() {
        let mut video = item("v", true, false);
        video.category = Category::Video;
        let items = vec![item("a", true, false), item("b", false, false), video];
        assert_eq!(in_category(&items, None).len(), 2);
        let only_video = in_category(&items, Some(Category::Video));
        assert_eq!(only_video.len(), 1);
        assert_eq!(only_video[0].id, "v");
    }

    #[tokio::test]
    async fn test_load_unconfigured_uses_fallbacks() {
        let site = SiteData::load(&DataAccess::Unconfigured).await;
        assert_eq!(site.settings.site_name, "IMA");
        assert_eq!(site.navigation.len(), 5);
        assert!(site.portfolio.is_empty());
        assert_eq!(site.content.get("hero_cta"), "View Our Work");
        assert_eq!(site.head("contact").title, "Contact | IMA");
    }

    #[tokio::test]
    async fn test_load_hides_unpublished_and_invisible() {
        let access = DataAccess::configured(MemoryBackend::new());
        fixtures::seed(&access).await.unwrap();

        let mut draft = item("draft", false, true);
        draft.created_at = Utc::now() + chrono::Duration::days(1);
        access.from::<PortfolioItem>().insert(&[draft]).await.unwrap();
        access
            .from::<NavItem>()
            .eq("id", "5")
            .update(serde_json::json!({ "is_visible": false }))
            .await
            .unwrap();

        let site = SiteData::load(&access).await;
        assert!(site.portfolio.iter().all(|i| i.id != "draft"));
        assert_eq!(site.portfolio.len(), 4);
        assert_eq!(site.navigation.len(), 4);
        assert!(site.featured().iter().all(|i| i.is_published));
    }

    #[test]
    fn test_stored_page_meta_overrides_default_head() {
        let mut site = SiteData::fallback();
        site.pages.push(PageMeta {
            id: "1".to_string(),
            slug: "about".to_string(),
            title: "About".to_string(),
            meta_title: Some("Who We Are | IMA".to_string()),
            meta_description: Some("  ".to_string()),
            updated_at: Utc::now(),
        });
        let head = site.head("about");
        assert_eq!(head.title, "Who We Are | IMA");
        assert!(head.description.starts_with("Learn about IMA"));
    }
}

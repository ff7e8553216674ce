//! Markup helpers shared by the public pages.

use super::content::ContentMap;
use super::{PageHead, SiteData};
use crate::db::models::{ContentType, NavItem};

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// A content slot ready for output. `html` blocks are sanitized, everything
/// else is escaped.
pub fn block(content: &ContentMap, key: &str) -> String {
    let value = content.get(key);
    match content.content_type(key) {
        ContentType::Html => ammonia::clean(&value),
        ContentType::Text | ContentType::ImageUrl => escape(&value),
    }
}

fn nav_link(item: &NavItem, active: &str) -> String {
    let class = if item.href == active { " class=\"active\"" } else { "" };
    let target = if item.is_external {
        " target=\"_blank\" rel=\"noopener noreferrer\""
    } else {
        ""
    };
    format!(
        "<a href=\"{}\"{}{}>{}</a>",
        escape(&item.href),
        class,
        target,
        escape(&item.label)
    )
}

fn navbar(site: &SiteData, active: &str) -> String {
    let links: String = site
        .navigation
        .iter()
        .map(|item| nav_link(item, active))
        .collect();
    let logo = match &site.settings.logo_url {
        Some(url) => format!(
            "<img src=\"{}\" alt=\"{}\" class=\"logo\">",
            escape(url),
            escape(&site.settings.site_name)
        ),
        None => format!("<span class=\"logo\">{}</span>", escape(&site.settings.site_name)),
    };
    format!(
        "<header class=\"navbar\" data-testid=\"navbar\">\n  <a href=\"/\" class=\"brand\">{}</a>\n  <nav>{}</nav>\n</header>",
        logo, links
    )
}

fn footer(site: &SiteData) -> String {
    let social: String = site
        .social_links
        .iter()
        .map(|link| {
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"{}\">{}</a>",
                escape(&link.url),
                escape(&link.platform.display_name()),
                escape(&link.platform.display_name())
            )
        })
        .collect();
    let links: String = site
        .navigation
        .iter()
        .map(|item| nav_link(item, ""))
        .collect();
    let footer_text = site.settings.footer_text.as_deref().unwrap_or_default();
    format!(
        "<footer class=\"footer\" data-testid=\"footer\">\n  <nav>{}</nav>\n  <div class=\"social\">{}</div>\n  <p>{}</p>\n</footer>",
        links,
        social,
        escape(footer_text)
    )
}

/// Full public page around `body`.
pub fn layout(site: &SiteData, head: &PageHead, active: &str, body: &str) -> String {
    let favicon = site
        .settings
        .favicon_url
        .as_deref()
        .map(|url| format!("\n  <link rel=\"icon\" href=\"{}\">", escape(url)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <meta name="description" content="{description}">{favicon}
  <style>:root {{ --ima-primary: {color}; }}</style>
</head>
<body>
{navbar}
<main>
{body}
</main>
{footer}
</body>
</html>"#,
        title = escape(&head.title),
        description = escape(&head.description),
        favicon = favicon,
        color = escape(&site.settings.primary_color),
        navbar = navbar(site, active),
        body = body,
        footer = footer(site),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::db::models::ContentBlock;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_html_blocks_are_sanitized() {
        let content = ContentMap::new(vec![ContentBlock {
            id: "1".to_string(),
            key: "about_text".to_string(),
            value: "<p>Hi</p><script>alert(1)</script>".to_string(),
            content_type: ContentType::Html,
            updated_at: Utc::now(),
        }]);
        let out = block(&content, "about_text");
        assert!(out.contains("<p>Hi</p>"));
        assert!(!out.contains("script"));
    }

    #[test]
    fn test_text_blocks_are_escaped() {
        let content = ContentMap::new(vec![ContentBlock {
            id: "1".to_string(),
            key: "hero_title".to_string(),
            value: "<b>Bold</b>".to_string(),
            content_type: ContentType::Text,
            updated_at: Utc::now(),
        }]);
        assert_eq!(block(&content, "hero_title"), "&lt;b&gt;Bold&lt;/b&gt;");
    }

    #[test]
    fn test_layout_renders_head_and_chrome() {
        let site = SiteData::fallback();
        let head = PageHead {
            title: "Portfolio | IMA".to_string(),
            description: "Work & play".to_string(),
        };
        let page = layout(&site, &head, "/portfolio", "<p>body</p>");
        assert!(page.contains("<title>Portfolio | IMA</title>"));
        assert!(page.contains("Work &amp; play"));
        assert!(page.contains("<a href=\"/portfolio\" class=\"active\">Portfolio</a>"));
        assert!(page.contains("© 2025 IMA. All rights reserved."));
    }
}

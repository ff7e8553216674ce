//! Social Links: one row per platform presence.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::{ListEditor, Record, Screen};
use crate::db::models::{Platform, SocialLink};
use crate::db::{DataAccess, Direction, StoreError};

impl Record for SocialLink {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialForm {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_visible: Option<String>,
}

impl SocialForm {
    fn parsed(&self) -> Option<(Platform, String)> {
        let url = self.url.trim();
        if url.is_empty() {
            return None;
        }
        Some((Platform::parse(&self.platform)?, url.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct SocialEditor {
    pub list: ListEditor<SocialLink>,
}

impl SocialEditor {
    pub fn new(links: Vec<SocialLink>) -> Self {
        Self {
            list: ListEditor::new(links),
        }
    }

    /// Append a link. Blank url or unknown platform is a no-op.
    pub fn create(&mut self, form: &SocialForm) -> Option<String> {
        let (platform, url) = form.parsed()?;
        let id = Uuid::new_v4().to_string();
        self.list.push(SocialLink {
            id: id.clone(),
            platform,
            url,
            is_visible: form.is_visible.is_some(),
            display_order: self.list.len() as i32,
        });
        Some(id)
    }

    pub fn edit(&mut self, id: &str, form: &SocialForm) -> bool {
        let Some((platform, url)) = form.parsed() else {
            return false;
        };
        self.list.modify(id, |link| {
            link.platform = platform;
            link.url = url;
            link.is_visible = form.is_visible.is_some();
        })
    }

    pub fn toggle_visibility(&mut self, id: &str) -> bool {
        self.list.modify(id, |link| link.is_visible = !link.is_visible)
    }

    pub fn items(&self) -> &[SocialLink] {
        self.list.items()
    }
}

#[async_trait]
impl Screen for SocialEditor {
    async fn load(access: &DataAccess) -> Result<Self, StoreError> {
        let links = access
            .from::<SocialLink>()
            .order("display_order", Direction::Asc)
            .select()
            .await?;
        Ok(Self::new(links))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    fn form(platform: &str, url: &str) -> SocialForm {
        SocialForm {
            platform: platform.to_string(),
            url: url.to_string(),
            is_visible: Some("on".to_string()),
        }
    }

    #[test]
    fn test_create_appends_at_end_of_order() {
        let mut editor = SocialEditor::new(fixtures::social_links());
        editor.create(&form("tiktok", "https://tiktok.com/@ima")).unwrap();
        let last = editor.items().last().unwrap();
        assert_eq!(last.platform, Platform::Tiktok);
        assert_eq!(last.display_order, 4);
    }

    #[test]
    fn test_blank_url_or_unknown_platform_is_noop() {
        let mut editor = SocialEditor::new(fixtures::social_links());
        assert!(editor.create(&form("tiktok", " ")).is_none());
        assert!(editor.create(&form("myspace", "https://myspace.com/ima")).is_none());
        assert_eq!(editor.items().len(), 4);
    }

    #[test]
    fn test_edit_and_toggle() {
        let mut editor = SocialEditor::new(fixtures::social_links());
        assert!(editor.edit("1", &form("x", "https://x.com/ima")));
        assert_eq!(editor.list.get("1").unwrap().platform, Platform::X);

        assert!(editor.toggle_visibility("2"));
        let link = editor.list.get("2").unwrap();
        assert!(!link.is_visible);
        assert_eq!(link.display_order, 1);
        assert!(!editor.toggle_visibility("missing"));
    }
}

//! Portfolio Manager: showcased projects, newest first.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{optional, ListEditor, Record, Screen};
use crate::db::models::{Category, MediaType, PortfolioItem};
use crate::db::{DataAccess, Direction, StoreError};

impl Record for PortfolioItem {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Comma-separated
    #[serde(default)]
    pub tools_used: String,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub media_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub is_featured: Option<String>,
    #[serde(default)]
    pub is_published: Option<String>,
}

pub fn parse_tools(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl PortfolioForm {
    fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }

    fn apply(&self, item: &mut PortfolioItem) {
        item.title = self.title.trim().to_string();
        item.category = Category::parse(&self.category).unwrap_or(item.category);
        item.description = self.description.trim().to_string();
        item.tools_used = parse_tools(&self.tools_used);
        item.media_type = MediaType::parse(&self.media_type).unwrap_or_default();
        item.media_url = optional(&self.media_url);
        item.thumbnail_url = optional(&self.thumbnail_url);
        item.is_featured = self.is_featured.is_some();
        item.is_published = self.is_published.is_some();
        item.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioEditor {
    pub list: ListEditor<PortfolioItem>,
}

impl PortfolioEditor {
    pub fn new(items: Vec<PortfolioItem>) -> Self {
        Self {
            list: ListEditor::new(items),
        }
    }

    /// New items go first. Blank title or description is a no-op.
    pub fn create(&mut self, form: &PortfolioForm) -> Option<String> {
        if !form.is_complete() {
            return None;
        }
        let now = Utc::now();
        let mut item = PortfolioItem {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            category: Category::Graphics,
            description: String::new(),
            tools_used: Vec::new(),
            media_type: MediaType::Image,
            media_url: None,
            thumbnail_url: None,
            is_featured: false,
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        form.apply(&mut item);
        let id = item.id.clone();
        self.list.insert_first(item);
        Some(id)
    }

    /// Replace fields of an existing item; `created_at` is kept.
    pub fn edit(&mut self, id: &str, form: &PortfolioForm) -> bool {
        if !form.is_complete() {
            return false;
        }
        self.list.modify(id, |item| form.apply(item))
    }

    pub fn items(&self) -> &[PortfolioItem] {
        self.list.items()
    }
}

#[async_trait]
impl Screen for PortfolioEditor {
    async fn load(access: &DataAccess) -> Result<Self, StoreError> {
        let items = access
            .from::<PortfolioItem>()
            .order("created_at", Direction::Desc)
            .select()
            .await?;
        Ok(Self::new(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    fn form(title: &str, description: &str) -> PortfolioForm {
        PortfolioForm {
            title: title.to_string(),
            category: "video".to_string(),
            description: description.to_string(),
            tools_used: " Premiere Pro, ,After Effects ".to_string(),
            media_type: "youtube".to_string(),
            media_url: "https://youtu.be/abc123".to_string(),
            thumbnail_url: "".to_string(),
            is_featured: None,
            is_published: Some("on".to_string()),
        }
    }

    #[test]
    fn test_parse_tools_drops_blanks() {
        assert_eq!(parse_tools("a, b,,  c "), vec!["a", "b", "c"]);
        assert!(parse_tools(" , ").is_empty());
    }

    #[test]
    fn test_create_prepends() {
        let mut editor = PortfolioEditor::new(fixtures::portfolio());
        let id = editor.create(&form("Reel", "Showreel 2025")).unwrap();
        let first = &editor.items()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.category, Category::Video);
        assert_eq!(first.tools_used, vec!["Premiere Pro", "After Effects"]);
        assert_eq!(first.thumbnail_url, None);
        assert!(first.is_published);
        assert!(!first.is_featured);
    }

    #[test]
    fn test_create_requires_title_and_description() {
        let mut editor = PortfolioEditor::new(fixtures::portfolio());
        assert!(editor.create(&form("", "desc")).is_none());
        assert!(editor.create(&form("Title", "  ")).is_none());
        assert_eq!(editor.items().len(), 4);
    }

    #[test]
    fn test_edit_keeps_created_at_and_bumps_updated_at() {
        let mut editor = PortfolioEditor::new(fixtures::portfolio());
        let before = editor.list.get("3").unwrap().clone();
        assert!(editor.edit("3", &form("Campaign v2", "Updated")));
        let after = editor.list.get("3").unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.title, "Campaign v2");
        assert!(!editor.edit("missing", &form("x", "y")));
    }
}

//! Content Manager: keyed text blocks grouped by page section.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{ListEditor, Record, Screen};
use crate::db::models::{ContentBlock, ContentType};
use crate::db::{DataAccess, Direction, StoreError};

impl Record for ContentBlock {
    const KEY_COLUMN: &'static str = "key";

    fn key(&self) -> &str {
        &self.key
    }
}

/// Section headings and the key prefix that files a block under each.
pub const SECTIONS: [(&str, &str); 4] = [
    ("hero", "Hero Section"),
    ("about", "About Section"),
    ("services", "Services Section"),
    ("contact", "Contact Section"),
];

pub const OTHER_SECTION: &str = "Other";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentForm {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

impl ContentForm {
    fn content_type(&self) -> Option<ContentType> {
        match self.content_type.as_deref().map(str::trim) {
            Some("html") => Some(ContentType::Html),
            Some("image_url") => Some(ContentType::ImageUrl),
            Some("text") => Some(ContentType::Text),
            _ => None,
        }
    }
}

/// Lowercase, whitespace runs become `_`.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// "hero_title" -> "Hero Title"
pub fn format_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct ContentEditor {
    pub list: ListEditor<ContentBlock>,
}

impl ContentEditor {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self {
            list: ListEditor::new(blocks),
        }
    }

    /// Add a block. Blank key or value, or a key already present, is a no-op.
    pub fn create(&mut self, form: &ContentForm) -> Option<String> {
        let key = normalize_key(&form.key);
        let value = form.value.trim();
        if key.is_empty() || value.is_empty() || self.list.get(&key).is_some() {
            return None;
        }
        self.list.push(ContentBlock {
            id: Uuid::new_v4().to_string(),
            key: key.clone(),
            value: value.to_string(),
            content_type: form.content_type().unwrap_or_default(),
            updated_at: Utc::now(),
        });
        Some(key)
    }

    /// Replace the value of the block with `key`.
    pub fn edit(&mut self, key: &str, form: &ContentForm) -> bool {
        let content_type = form.content_type();
        self.list.modify(key, |block| {
            block.value = form.value.clone();
            if let Some(t) = content_type {
                block.content_type = t;
            }
            block.updated_at = Utc::now();
        })
    }

    /// Blocks per section heading in display order; empty sections are kept.
    pub fn grouped(&self) -> Vec<(&'static str, Vec<&ContentBlock>)> {
        let mut groups: Vec<(&'static str, Vec<&ContentBlock>)> = SECTIONS
            .iter()
            .map(|(_, title)| (*title, Vec::new()))
            .collect();
        let mut other = Vec::new();
        for block in self.list.items() {
            match SECTIONS
                .iter()
                .position(|(prefix, _)| block.key.starts_with(prefix))
            {
                Some(i) => groups[i].1.push(block),
                None => other.push(block),
            }
        }
        groups.push((OTHER_SECTION, other));
        groups
    }

    pub fn items(&self) -> &[ContentBlock] {
        self.list.items()
    }
}

#[async_trait]
impl Screen for ContentEditor {
    async fn load(access: &DataAccess) -> Result<Self, StoreError> {
        let blocks = access
            .from::<ContentBlock>()
            .order("key", Direction::Asc)
            .select()
            .await?;
        Ok(Self::new(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::db::MemoryBackend;

    fn form(key: &str, value: &str) -> ContentForm {
        ContentForm {
            key: key.to_string(),
            value: value.to_string(),
            content_type: None,
        }
    }

    #[test]
    fn test_normalize_and_format_key() {
        assert_eq!(normalize_key("  Footer  Tag Line "), "footer_tag_line");
        assert_eq!(format_key("hero_cta"), "Hero Cta");
    }

    #[test]
    fn test_create_rejects_blank_and_duplicate_keys() {
        let mut editor = ContentEditor::new(fixtures::content_blocks());
        assert_eq!(editor.create(&form("Promo Banner", "Sale")), Some("promo_banner".to_string()));
        assert!(editor.create(&form("hero title", "again")).is_none());
        assert!(editor.create(&form("x", " ")).is_none());
        assert_eq!(editor.items().len(), 9);
    }

    #[test]
    fn test_edit_by_key() {
        let mut editor = ContentEditor::new(fixtures::content_blocks());
        let before = editor.list.get("hero_cta").unwrap().updated_at;
        assert!(editor.edit("hero_cta", &form("", "See Projects")));
        let block = editor.list.get("hero_cta").unwrap();
        assert_eq!(block.value, "See Projects");
        assert!(block.updated_at >= before);
    }

    #[test]
    fn test_grouping_by_prefix() {
        let mut editor = ContentEditor::new(fixtures::content_blocks());
        editor.create(&form("footer_note", "Hi"));
        let groups = editor.grouped();
        assert_eq!(groups.len(), 5);
        assert_eq!(groups[0].0, "Hero Section");
        assert_eq!(groups[0].1.len(), 3);
        assert_eq!(groups[4].0, OTHER_SECTION);
        assert_eq!(groups[4].1[0].key, "footer_note");
    }

    #[tokio::test]
    async fn test_recreated_key_survives_save() {
        let access = DataAccess::configured(MemoryBackend::new());
        fixtures::seed(&access).await.unwrap();
        let mut editor = ContentEditor::load(&access).await.unwrap();
        editor.list.request_delete("hero_title");
        editor.list.confirm_delete();
        assert_eq!(editor.create(&form("hero_title", "Brand new")), Some("hero_title".to_string()));
        editor.list.save(&access).await.unwrap();

        let stored = access
            .from::<ContentBlock>()
            .eq("key", "hero_title")
            .select()
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value, "Brand new");
    }

    #[tokio::test]
    async fn test_delete_by_key_persists() {
        let access = DataAccess::configured(MemoryBackend::new());
        fixtures::seed(&access).await.unwrap();
        let mut editor = ContentEditor::load(&access).await.unwrap();
        editor.list.request_delete("hero_cta");
        editor.list.confirm_delete();
        editor.list.save(&access).await.unwrap();

        let keys: Vec<String> = access
            .from::<ContentBlock>()
            .select()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.key)
            .collect();
        assert_eq!(keys.len(), 7);
        assert!(!keys.contains(&"hero_cta".to_string()));
    }
}

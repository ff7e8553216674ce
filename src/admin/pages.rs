//! Pages: per-page title and search metadata, keyed by slug.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use super::{optional, ListEditor, Record, Screen};
use crate::db::models::PageMeta;
use crate::db::{DataAccess, Direction, StoreError};

impl Record for PageMeta {
    const KEY_COLUMN: &'static str = "slug";

    fn key(&self) -> &str {
        &self.slug
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
}

#[derive(Debug, Clone)]
pub struct PagesEditor {
    pub list: ListEditor<PageMeta>,
}

impl PagesEditor {
    pub fn new(pages: Vec<PageMeta>) -> Self {
        Self {
            list: ListEditor::new(pages),
        }
    }

    /// Blank title is a no-op; blank meta fields clear them.
    pub fn edit(&mut self, slug: &str, form: &PageForm) -> bool {
        let Some(title) = optional(&form.title) else {
            return false;
        };
        self.list.modify(slug, |page| {
            page.title = title;
            page.meta_title = optional(&form.meta_title);
            page.meta_description = optional(&form.meta_description);
            page.updated_at = Utc::now();
        })
    }

    pub fn items(&self) -> &[PageMeta] {
        self.list.items()
    }
}

#[async_trait]
impl Screen for PagesEditor {
    async fn load(access: &DataAccess) -> Result<Self, StoreError> {
        let pages = access
            .from::<PageMeta>()
            .order("slug", Direction::Asc)
            .select()
            .await?;
        Ok(Self::new(pages))
    }
}

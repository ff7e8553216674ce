//! Navigation Manager: ordered site menu links.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::{ListEditor, Record, Screen};
use crate::db::models::NavItem;
use crate::db::{DataAccess, Direction, StoreError};

impl Record for NavItem {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Add/edit form. Checkboxes are present only when ticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavForm {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub is_visible: Option<String>,
    #[serde(default)]
    pub is_external: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct NavigationEditor {
    pub list: ListEditor<NavItem>,
}

impl NavigationEditor {
    pub fn new(items: Vec<NavItem>) -> Self {
        Self {
            list: ListEditor::new(items),
        }
    }

    /// Append a link at the end of the order. Blank label or href is a no-op.
    pub fn create(&mut self, form: &NavForm) -> Option<String> {
        let label = form.label.trim();
        let href = form.href.trim();
        if label.is_empty() || href.is_empty() {
            return None;
        }
        let id = Uuid::new_v4().to_string();
        self.list.push(NavItem {
            id: id.clone(),
            label: label.to_string(),
            href: href.to_string(),
            display_order: self.list.len() as i32,
            is_visible: form.is_visible.is_some(),
            is_external: form.is_external.is_some(),
        });
        Some(id)
    }

    pub fn edit(&mut self, id: &str, form: &NavForm) -> bool {
        let label = form.label.trim();
        let href = form.href.trim();
        if label.is_empty() || href.is_empty() {
            return false;
        }
        self.list.modify(id, |item| {
            item.label = label.to_string();
            item.href = href.to_string();
            item.is_visible = form.is_visible.is_some();
            item.is_external = form.is_external.is_some();
        })
    }

    pub fn toggle_visibility(&mut self, id: &str) -> bool {
        self.list.modify(id, |item| item.is_visible = !item.is_visible)
    }

    /// Swap with the neighbour and renumber. Moving past either end is a no-op.
    pub fn move_item(&mut self, id: &str, direction: Move) -> bool {
        let Some(index) = self.list.position(id) else {
            return false;
        };
        let target = match direction {
            Move::Up if index > 0 => index - 1,
            Move::Down if index + 1 < self.list.len() => index + 1,
            _ => return false,
        };
        let items = self.list.items_mut();
        items.swap(index, target);
        renumber(items);
        true
    }

    pub fn items(&self) -> &[NavItem] {
        self.list.items()
    }
}

/// `display_order` equals position.
pub fn renumber(items: &mut [NavItem]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.display_order = i as i32;
    }
}

#[async_trait]
impl Screen for NavigationEditor {
    async fn load(access: &DataAccess) -> Result<Self, StoreError> {
        let items = access
            .from::<NavItem>()
            .order("display_order", Direction::Asc)
            .select()
            .await?;
        Ok(Self::new(items))
    }
}

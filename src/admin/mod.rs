/*!
 * Admin Console
 * Editable in-memory copies of stored records, pushed back on save
 */
pub mod content;
pub mod dashboard;
pub mod messages;
pub mod navigation;
pub mod pages;
pub mod portfolio;
pub mod settings;
pub mod social;
pub mod views;

use async_trait::async_trait;

use crate::db::{DataAccess, StoreError, Table};

pub use content::ContentEditor;
pub use dashboard::Dashboard;
pub use messages::{MessageFilter, MessagesScreen};
pub use navigation::NavigationEditor;
pub use pages::PagesEditor;
pub use portfolio::PortfolioEditor;
pub use settings::SettingsEditor;
pub use social::SocialEditor;

/// A row an editor can address by one identifying column.
pub trait Record: Table + Clone {
    /// Column that identifies the row, also the upsert conflict target
    const KEY_COLUMN: &'static str = "id";

    fn key(&self) -> &str;
}

/// Shared list state: items, a pending delete waiting for confirmation, and
/// the keys removed since the last save.
#[derive(Debug, Clone)]
pub struct ListEditor<T: Record> {
    items: Vec<T>,
    pending_delete: Option<String>,
    removed: Vec<String>,
    dirty: bool,
}

impl<T: Record> ListEditor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            pending_delete: None,
            removed: Vec::new(),
            dirty: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<T> {
        self.dirty = true;
        &mut self.items
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|i| i.key() == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|i| i.key() == key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn pending_delete(&self) -> Option<&T> {
        self.pending_delete.as_deref().and_then(|k| self.get(k))
    }

    /// Apply `f` to the item with `key`. Returns `false` when there is none.
    pub fn modify(&mut self, key: &str, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|i| i.key() == key) {
            Some(item) => {
                f(item);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn push(&mut self, item: T) {
        self.restore(item.key());
        self.items.push(item);
        self.dirty = true;
    }

    pub fn insert_first(&mut self, item: T) {
        self.restore(item.key());
        self.items.insert(0, item);
        self.dirty = true;
    }

    /// A key added back in the same draft is no longer removed.
    fn restore(&mut self, key: &str) {
        self.removed.retain(|k| k != key);
    }

    /// Ask for confirmation before deleting `key`.
    pub fn request_delete(&mut self, key: &str) -> bool {
        if self.get(key).is_none() {
            return false;
        }
        self.pending_delete = Some(key.to_string());
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Remove the item awaiting confirmation.
    pub fn confirm_delete(&mut self) -> Option<T> {
        let key = self.pending_delete.take()?;
        let index = self.position(&key)?;
        let item = self.items.remove(index);
        self.removed.push(key);
        self.dirty = true;
        Some(item)
    }

    /// Delete the removed keys, then write every kept row.
    pub async fn save(&mut self, access: &DataAccess) -> Result<(), StoreError> {
        while let Some(key) = self.removed.first().cloned() {
            access
                .from::<T>()
                .eq(T::KEY_COLUMN, key.as_str())
                .delete()
                .await?;
            self.removed.remove(0);
        }
        if !self.items.is_empty() {
            access
                .from::<T>()
                .upsert(&self.items, T::KEY_COLUMN)
                .await?;
        }
        self.dirty = false;
        tracing::info!(table = T::NAME, rows = self.items.len(), "admin changes saved");
        Ok(())
    }
}

/// Unsaved state of the one admin screen currently open.
#[derive(Debug, Clone)]
pub enum Draft {
    Navigation(NavigationEditor),
    Social(SocialEditor),
    Portfolio(PortfolioEditor),
    Content(ContentEditor),
    Messages(MessagesScreen),
    Settings(SettingsEditor),
    Pages(PagesEditor),
}

/// An admin screen whose state can be parked in the session between requests.
#[async_trait]
pub trait Screen: Sized + Send + Into<Draft> + TryFrom<Draft, Error = Draft> {
    async fn load(access: &DataAccess) -> Result<Self, StoreError>;
}

macro_rules! screen_draft {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Draft {
            fn from(screen: $ty) -> Self {
                Draft::$variant(screen)
            }
        }

        impl TryFrom<Draft> for $ty {
            type Error = Draft;

            fn try_from(draft: Draft) -> Result<Self, Draft> {
                match draft {
                    Draft::$variant(screen) => Ok(screen),
                    other => Err(other),
                }
            }
        }
    };
}

screen_draft!(NavigationEditor, Navigation);
screen_draft!(SocialEditor, Social);
screen_draft!(PortfolioEditor, Portfolio);
screen_draft!(ContentEditor, Content);
screen_draft!(MessagesScreen, Messages);
screen_draft!(SettingsEditor, Settings);
screen_draft!(PagesEditor, Pages);

/// Trim a form field, mapping blank to `None`.
pub fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

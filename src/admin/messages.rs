//! Messages inbox: contact submissions, newest first.

use async_trait::async_trait;
use serde::Deserialize;

use super::Screen;
use crate::db::models::Message;
use crate::db::{DataAccess, Direction, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFilter {
    #[default]
    All,
    Unread,
}

impl MessageFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFilter::All => "all",
            MessageFilter::Unread => "unread",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessagesScreen {
    messages: Vec<Message>,
    pub filter: MessageFilter,
    selected: Option<String>,
    pending_delete: Option<String>,
}

impl MessagesScreen {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            filter: MessageFilter::All,
            selected: None,
            pending_delete: None,
        }
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Messages passing the current filter.
    pub fn visible(&self) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| self.filter == MessageFilter::All || !m.is_read)
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_read).count()
    }

    pub fn selected(&self) -> Option<&Message> {
        let id = self.selected.as_deref()?;
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn pending_delete(&self) -> Option<&Message> {
        let id = self.pending_delete.as_deref()?;
        self.messages.iter().find(|m| m.id == id)
    }

    /// Open a message. An unread one is marked read here and in the store;
    /// re-selecting a read message writes nothing. Returns whether a write happened.
    pub async fn select(&mut self, access: &DataAccess, id: &str) -> Result<bool, StoreError> {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        self.selected = Some(id.to_string());
        if message.is_read {
            return Ok(false);
        }

        access
            .from::<Message>()
            .eq("id", id)
            .update(serde_json::json!({ "is_read": true }))
            .await?;
        message.is_read = true;
        Ok(true)
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn request_delete(&mut self, id: &str) -> bool {
        if self.messages.iter().all(|m| m.id != id) {
            return false;
        }
        self.pending_delete = Some(id.to_string());
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the message awaiting confirmation, in the store first.
    pub async fn confirm_delete(&mut self, access: &DataAccess) -> Result<bool, StoreError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(false);
        };
        access.from::<Message>().eq("id", id.as_str()).delete().await?;
        self.messages.retain(|m| m.id != id);
        if self.selected.as_deref() == Some(id.as_str()) {
            self.selected = None;
        }
        Ok(true)
    }
}

#[async_trait]
impl Screen for MessagesScreen {
    async fn load(access: &DataAccess) -> Result<Self, StoreError> {
        let messages = access
            .from::<Message>()
            .order("created_at", Direction::Desc)
            .select()
            .await?;
        Ok(Self::new(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::db::MemoryBackend;

    async fn seeded() -> (DataAccess, MessagesScreen) {
        let access = DataAccess::configured(MemoryBackend::new());
        fixtures::seed(&access).await.unwrap();
        let screen = MessagesScreen::load(&access).await.unwrap();
        (access, screen)
    }

    async fn stored_read(access: &DataAccess, id: &str) -> bool {
        access
            .from::<Message>()
            .eq("id", id)
            .select()
            .await
            .unwrap()[0]
            .is_read
    }

    #[tokio::test]
    async fn test_newest_first() {
        let (_, screen) = seeded().await;
        let ids: Vec<&str> = screen.all().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_selecting_unread_marks_read_once() {
        let (access, mut screen) = seeded().await;
        assert_eq!(screen.unread_count(), 1);
        assert!(screen.select(&access, "1").await.unwrap());
        assert!(stored_read(&access, "1").await);
        assert_eq!(screen.unread_count(), 0);

        assert!(!screen.select(&access, "1").await.unwrap());
        assert!(!screen.select(&access, "2").await.unwrap());
        assert_eq!(screen.selected().unwrap().id, "2");
    }

    #[tokio::test]
    async fn test_failed_mark_read_leaves_message_unread() {
        let (_, mut screen) = seeded().await;
        let err = screen.select(&DataAccess::Unconfigured, "1").await;
        assert!(err.is_err());
        assert!(!screen.all()[0].is_read);
    }

    #[tokio::test]
    async fn test_unread_filter() {
        let (_, mut screen) = seeded().await;
        screen.filter = MessageFilter::Unread;
        let visible = screen.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "1");
    }

    #[tokio::test]
    async fn test_delete_clears_selection() {
        let (access, mut screen) = seeded().await;
        screen.select(&access, "2").await.unwrap();
        assert!(screen.request_delete("2"));
        screen.cancel_delete();
        assert!(!screen.confirm_delete(&access).await.unwrap());

        screen.request_delete("2");
        assert!(screen.confirm_delete(&access).await.unwrap());
        assert!(screen.selected().is_none());
        assert_eq!(access.from::<Message>().select().await.unwrap().len(), 2);
    }
}

//! Admin landing page: record counts and the latest inbox entries.

use crate::db::models::{Lead, Message, PortfolioItem};
use crate::db::{DataAccess, Direction, StoreError};

pub const RECENT_MESSAGES: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub portfolio_count: usize,
    pub message_count: usize,
    pub unread_count: usize,
    pub lead_count: usize,
    pub recent: Vec<Message>,
}

impl Dashboard {
    pub async fn load(access: &DataAccess) -> Result<Self, StoreError> {
        let (portfolio, messages, leads) = tokio::join!(
            access.from::<PortfolioItem>().select(),
            access
                .from::<Message>()
                .order("created_at", Direction::Desc)
                .select(),
            access.from::<Lead>().select(),
        );
        let messages = messages?;

        Ok(Self {
            portfolio_count: portfolio?.len(),
            message_count: messages.len(),
            unread_count: messages.iter().filter(|m| !m.is_read).count(),
            lead_count: leads?.len(),
            recent: messages.into_iter().take(RECENT_MESSAGES).collect(),
        })
    }
}

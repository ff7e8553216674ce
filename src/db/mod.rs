pub mod fixtures;
pub mod memory;
pub mod models;
pub mod rest;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{marker::PhantomData, sync::Arc, time::Duration};

pub use memory::MemoryBackend;
pub use rest::{RestBackend, RestConfig};

/// A typed row of one hosted table.
pub trait Table: Serialize + DeserializeOwned + Send + Sync + 'static {
    const NAME: &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Content store is not configured")]
    NotConfigured,

    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Store rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Duplicate value for unique column {column} in {table}")]
    Conflict { table: String, column: String },

    #[error("Failed to decode {table} row: {message}")]
    Decode { table: String, message: String },

    #[error("Refusing unfiltered {0} on {1}")]
    Unfiltered(&'static str, String),
}

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Row selection shared by every backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

/// Untyped CRUD over JSON rows; one implementation per storage target.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, StoreError>;

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, StoreError>;

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, StoreError>;

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// A handle whose requests run as the given signed-in session, when the
    /// backend distinguishes callers.
    fn scoped(&self, _access_token: &str) -> Option<Arc<dyn StoreBackend>> {
        None
    }
}

/// Access layer handed to every page and screen.
///
/// `Unconfigured` never touches the network: reads come back empty so public
/// pages render their defaults, writes fail with [`StoreError::NotConfigured`].
#[derive(Clone)]
pub enum DataAccess {
    Configured(Arc<dyn StoreBackend>),
    Unconfigured,
}

impl std::fmt::Debug for DataAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataAccess::Configured(_) => write!(f, "DataAccess::Configured"),
            DataAccess::Unconfigured => write!(f, "DataAccess::Unconfigured"),
        }
    }
}

impl DataAccess {
    pub fn configured(backend: impl StoreBackend + 'static) -> Self {
        DataAccess::Configured(Arc::new(backend))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, DataAccess::Configured(_))
    }

    /// Access layer acting on behalf of a signed-in admin.
    pub fn for_session(&self, access_token: &str) -> DataAccess {
        match self {
            DataAccess::Configured(backend) => match backend.scoped(access_token) {
                Some(scoped) => DataAccess::Configured(scoped),
                None => self.clone(),
            },
            DataAccess::Unconfigured => DataAccess::Unconfigured,
        }
    }

    /// Start a query against the table backing `T`.
    pub fn from<T: Table>(&self) -> TableQuery<'_, T> {
        TableQuery {
            access: self,
            query: Query::default(),
            _row: PhantomData,
        }
    }

    fn backend(&self) -> Result<&Arc<dyn StoreBackend>, StoreError> {
        match self {
            DataAccess::Configured(backend) => Ok(backend),
            DataAccess::Unconfigured => Err(StoreError::NotConfigured),
        }
    }
}

/// Typed, per-table query builder.
pub struct TableQuery<'a, T: Table> {
    access: &'a DataAccess,
    query: Query,
    _row: PhantomData<T>,
}

impl<'a, T: Table> TableQuery<'a, T> {
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.query.order.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub async fn select(self) -> Result<Vec<T>, StoreError> {
        let backend = match self.access {
            DataAccess::Configured(backend) => backend,
            DataAccess::Unconfigured => return Ok(Vec::new()),
        };
        let rows = backend.select(T::NAME, &self.query).await?;
        decode_rows(rows)
    }

    pub async fn insert(self, rows: &[T]) -> Result<Vec<T>, StoreError> {
        let backend = self.access.backend()?;
        let rows = backend.insert(T::NAME, encode_rows(rows)?).await?;
        decode_rows(rows)
    }

    /// Apply a partial update to every row matching the filters.
    pub async fn update(self, patch: Value) -> Result<Vec<T>, StoreError> {
        let backend = self.access.backend()?;
        if self.query.filters.is_empty() {
            return Err(StoreError::Unfiltered("update", T::NAME.to_string()));
        }
        let rows = backend.update(T::NAME, &self.query.filters, patch).await?;
        decode_rows(rows)
    }

    pub async fn upsert(self, rows: &[T], on_conflict: &str) -> Result<Vec<T>, StoreError> {
        let backend = self.access.backend()?;
        let rows = backend
            .upsert(T::NAME, encode_rows(rows)?, on_conflict)
            .await?;
        decode_rows(rows)
    }

    pub async fn delete(self) -> Result<u64, StoreError> {
        let backend = self.access.backend()?;
        if self.query.filters.is_empty() {
            return Err(StoreError::Unfiltered("delete", T::NAME.to_string()));
        }
        backend.delete(T::NAME, &self.query.filters).await
    }
}

fn encode_rows<T: Table>(rows: &[T]) -> Result<Vec<Value>, StoreError> {
    rows.iter()
        .map(|row| {
            serde_json::to_value(row).map_err(|e| StoreError::Decode {
                table: T::NAME.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn decode_rows<T: Table>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| StoreError::Decode {
                table: T::NAME.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Round-trip latency to the store.
pub async fn health_check(access: &DataAccess) -> Result<Duration, StoreError> {
    let backend = access.backend()?;
    let start = std::time::Instant::now();
    backend.ping().await?;
    Ok(start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::models::{Lead, Message, NavItem};
    use super::*;

    fn nav(id: &str, order: i32) -> NavItem {
        NavItem {
            id: id.to_string(),
            label: format!("Item {}", id),
            href: format!("/{}", id),
            display_order: order,
            is_visible: true,
            is_external: false,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_select_returns_empty() {
        let access = DataAccess::Unconfigured;
        assert!(!access.is_configured());
        let rows = access.from::<NavItem>().select().await.unwrap();
        assert!(rows.is_empty());
        let rows = access
            .from::<Message>()
            .eq("is_read", false)
            .limit(3)
            .select()
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_writes_fail_with_configuration_error() {
        let access = DataAccess::Unconfigured;
        let item = nav("a", 0);

        let err = access.from::<NavItem>().insert(&[item.clone()]).await;
        assert!(matches!(err, Err(StoreError::NotConfigured)));

        let err = access
            .from::<NavItem>()
            .eq("id", "a")
            .update(serde_json::json!({ "label": "x" }))
            .await;
        assert!(matches!(err, Err(StoreError::NotConfigured)));

        let err = access.from::<NavItem>().upsert(&[item], "id").await;
        assert!(matches!(err, Err(StoreError::NotConfigured)));

        let err = access.from::<NavItem>().eq("id", "a").delete().await;
        assert!(matches!(err, Err(StoreError::NotConfigured)));

        assert!(matches!(
            health_check(&access).await,
            Err(StoreError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_unfiltered_delete_is_refused() {
        let access = DataAccess::configured(MemoryBackend::new());
        access
            .from::<NavItem>()
            .insert(&[nav("a", 0)])
            .await
            .unwrap();
        let err = access.from::<NavItem>().delete().await;
        assert!(matches!(err, Err(StoreError::Unfiltered("delete", _))));
        assert_eq!(access.from::<NavItem>().select().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_builder_records_filters_order_and_limit() {
        let access = DataAccess::Unconfigured;
        let q = access
            .from::<Message>()
            .eq("is_read", false)
            .order("created_at", Direction::Desc)
            .limit(5);
        assert_eq!(q.query().filters[0].column, "is_read");
        assert_eq!(q.query().order[0].direction, Direction::Desc);
        assert_eq!(q.query().limit, Some(5));
    }

    #[tokio::test]
    async fn test_typed_upsert_on_email_updates_in_place() {
        let access = DataAccess::configured(MemoryBackend::new());
        let lead = Lead {
            id: None,
            email: "sam@example.com".to_string(),
            name: "Sam".to_string(),
            source: "contact_form".to_string(),
        };
        access.from::<Lead>().upsert(&[lead.clone()], "email").await.unwrap();
        let renamed = Lead {
            name: "Samantha".to_string(),
            ..lead
        };
        access.from::<Lead>().upsert(&[renamed], "email").await.unwrap();

        let leads = access.from::<Lead>().select().await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Samantha");
        assert!(leads[0].id.is_some());
    }
}

//! In-process store with the same row semantics as the hosted one.
//! Backs `LOCAL_BACKEND` mode and the test suite.

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Map, Value};
use std::{cmp::Ordering, collections::HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Direction, Filter, Query, StoreBackend, StoreError};

/// Unique columns of the hosted schema.
const UNIQUE_COLUMNS: &[(&str, &str)] = &[
    ("content_blocks", "key"),
    ("leads", "email"),
    ("pages", "slug"),
    ("site_settings", "id"),
];

#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| row.get(&f.column).unwrap_or(&Value::Null) == &f.value)
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            // Timestamps compare by instant, not by text
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

fn unique_columns(table: &str) -> impl Iterator<Item = &'static str> + '_ {
    UNIQUE_COLUMNS
        .iter()
        .filter(move |(t, _)| *t == table)
        .map(|(_, column)| *column)
}

fn ensure_object(table: &str, row: Value) -> Result<Map<String, Value>, StoreError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode {
            table: table.to_string(),
            message: format!("expected object row, got {}", other),
        }),
    }
}

fn assign_id(row: &mut Map<String, Value>) {
    let missing = matches!(row.get("id"), None | Some(Value::Null));
    if missing {
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
}

fn check_unique(table: &str, rows: &[Value], candidate: &Map<String, Value>) -> Result<(), StoreError> {
    for column in unique_columns(table) {
        let Some(value) = candidate.get(column) else {
            continue;
        };
        if rows.iter().any(|r| r.get(column) == Some(value)) {
            return Err(StoreError::Conflict {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if !query.order.is_empty() {
            // Stable sort keeps insertion order among ties
            rows.sort_by(|a, b| {
                for order in &query.order {
                    let left = a.get(&order.column).unwrap_or(&Value::Null);
                    let right = b.get(&order.column).unwrap_or(&Value::Null);
                    let ord = match order.direction {
                        Direction::Asc => compare_values(left, right),
                        Direction::Desc => compare_values(right, left),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.tables.write().await;
        let existing = tables.entry(table.to_string()).or_default();

        let mut staged: Vec<Value> = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = ensure_object(table, row)?;
            assign_id(&mut row);
            check_unique(table, existing, &row)?;
            check_unique(table, &staged, &row)?;
            staged.push(Value::Object(row));
        }

        existing.extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let patch = ensure_object(table, patch)?;
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| matches(row, filters)) {
            if let Value::Object(map) = row {
                for (k, v) in &patch {
                    map.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.tables.write().await;
        let existing = tables.entry(table.to_string()).or_default();

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = ensure_object(table, row)?;
            let key = row.get(on_conflict).cloned().unwrap_or(Value::Null);
            let position = if key.is_null() {
                None
            } else {
                existing
                    .iter()
                    .position(|r| r.get(on_conflict) == Some(&key))
            };

            match position {
                Some(index) => {
                    if let Value::Object(current) = &mut existing[index] {
                        for (k, v) in row {
                            current.insert(k, v);
                        }
                    }
                    result.push(existing[index].clone());
                }
                None => {
                    assign_id(&mut row);
                    check_unique(table, existing, &row)?;
                    let row = Value::Object(row);
                    existing.push(row.clone());
                    result.push(row);
                }
            }
        }
        Ok(result)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !matches(row, filters));
        Ok((before - rows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Order;
    use serde_json::json;

    fn eq(column: &str, value: Value) -> Filter {
        Filter {
            column: column.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_missing_ids() {
        let store = MemoryBackend::new();
        let rows = store
            .insert("leads", vec![json!({ "email": "a@b.co", "name": "A" })])
            .await
            .unwrap();
        assert!(rows[0]["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_unique_column() {
        let store = MemoryBackend::new();
        store
            .insert("content_blocks", vec![json!({ "id": "1", "key": "hero_title" })])
            .await
            .unwrap();
        let err = store
            .insert("content_blocks", vec![json!({ "id": "2", "key": "hero_title" })])
            .await;
        assert!(matches!(err, Err(StoreError::Conflict { .. })));
        let rows = store.select("content_blocks", &Query::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_limits() {
        let store = MemoryBackend::new();
        store
            .insert(
                "portfolio_items",
                vec![
                    json!({ "id": "a", "is_published": true, "created_at": "2025-01-01T00:00:00Z" }),
                    json!({ "id": "b", "is_published": false, "created_at": "2025-01-03T00:00:00Z" }),
                    json!({ "id": "c", "is_published": true, "created_at": "2025-01-02T00:00:00.500Z" }),
                    json!({ "id": "d", "is_published": true, "created_at": "2025-01-02T00:00:00Z" }),
                ],
            )
            .await
            .unwrap();

        let query = Query {
            filters: vec![eq("is_published", json!(true))],
            order: vec![Order {
                column: "created_at".to_string(),
                direction: Direction::Desc,
            }],
            limit: Some(2),
        };
        let rows = store.select("portfolio_items", &query).await.unwrap();
        let ids: Vec<&str> = rows.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[tokio::test]
    async fn test_update_patches_matching_rows_only() {
        let store = MemoryBackend::new();
        store
            .insert(
                "messages",
                vec![
                    json!({ "id": "1", "is_read": false }),
                    json!({ "id": "2", "is_read": false }),
                ],
            )
            .await
            .unwrap();
        let updated = store
            .update("messages", &[eq("id", json!("1"))], json!({ "is_read": true }))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);

        let unread = store
            .select(
                "messages",
                &Query {
                    filters: vec![eq("is_read", json!(false))],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0]["id"], "2");
    }

    #[tokio::test]
    async fn test_upsert_merges_on_conflict_column() {
        let store = MemoryBackend::new();
        for name in ["First", "Second"] {
            store
                .upsert(
                    "leads",
                    vec![json!({ "email": "x@y.z", "name": name, "source": "contact_form" })],
                    "email",
                )
                .await
                .unwrap();
        }
        let rows = store.select("leads", &Query::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Second");
    }

    #[tokio::test]
    async fn test_delete_reports_removed_count() {
        let store = MemoryBackend::new();
        store
            .insert("social_links", vec![json!({ "id": "1" }), json!({ "id": "2" })])
            .await
            .unwrap();
        let removed = store
            .delete("social_links", &[eq("id", json!("2"))])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.delete("missing", &[eq("id", json!("2"))]).await.unwrap(), 0);
    }
}

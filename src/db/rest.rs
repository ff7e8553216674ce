//! PostgREST client for the hosted content store.

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response};
use serde_json::Value;
use std::{sync::Arc, time::Duration};

use super::{Direction, Filter, Query, StoreBackend, StoreError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct RestConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base: String,
    anon_key: String,
    /// Signed-in user's access token; the anon key is used when absent.
    bearer: Option<String>,
}

impl RestBackend {
    pub fn new(config: RestConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key,
            bearer: None,
        })
    }

    /// Same connection, requests authorized as the given session.
    pub fn with_access_token(&self, access_token: &str) -> Self {
        Self {
            bearer: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.bearer.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, format!("{}/{}", self.base, table))
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
            .header(header::ACCEPT, "application/json")
    }

    async fn send(&self, table: &str, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!(table = %table, error = %e, "content store request failed");
            StoreError::Request(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        tracing::warn!(table = %table, status = %status, message = %message, "content store rejected request");
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows(&self, table: &str, response: Response) -> Result<Vec<Value>, StoreError> {
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(other) => Ok(vec![other]),
            Err(e) => Err(StoreError::Decode {
                table: table.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Renders a filter value the way PostgREST expects it in a query string.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| {
            let op = if f.value.is_null() {
                "is.null".to_string()
            } else {
                format!("eq.{}", literal(&f.value))
            };
            (f.column.clone(), op)
        })
        .collect()
}

pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(&query.filters));
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| {
                let dir = match o.direction {
                    Direction::Asc => "asc",
                    Direction::Desc => "desc",
                };
                format!("{}.{}", o.column, dir)
            })
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

#[async_trait]
impl StoreBackend for RestBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .request(Method::GET, table)
            .query(&query_params(query));
        let response = self.send(table, builder).await?;
        self.rows(table, response).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows);
        let response = self.send(table, builder).await?;
        self.rows(table, response).await
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .request(Method::PATCH, table)
            .query(&filter_params(filters))
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self.send(table, builder).await?;
        self.rows(table, response).await
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .request(Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&rows);
        let response = self.send(table, builder).await?;
        self.rows(table, response).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let builder = self
            .request(Method::DELETE, table)
            .query(&filter_params(filters))
            .header("Prefer", "return=representation");
        let response = self.send(table, builder).await?;
        Ok(self.rows(table, response).await?.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let builder = self
            .client
            .get(format!("{}/", self.base))
            .header("apikey", &self.anon_key);
        self.send("", builder).await.map(|_| ())
    }

    fn scoped(&self, access_token: &str) -> Option<Arc<dyn StoreBackend>> {
        Some(Arc::new(self.with_access_token(access_token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Order;
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> RestBackend {
        RestBackend::new(RestConfig {
            url: server.uri(),
            anon_key: "anon-key".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_query_params_render_postgrest_syntax() {
        let query = Query {
            filters: vec![
                Filter {
                    column: "is_published".to_string(),
                    value: json!(true),
                },
                Filter {
                    column: "subject".to_string(),
                    value: Value::Null,
                },
            ],
            order: vec![
                Order {
                    column: "display_order".to_string(),
                    direction: Direction::Asc,
                },
                Order {
                    column: "created_at".to_string(),
                    direction: Direction::Desc,
                },
            ],
            limit: Some(3),
        };
        let params = query_params(&query);
        assert!(params.contains(&("is_published".to_string(), "eq.true".to_string())));
        assert!(params.contains(&("subject".to_string(), "is.null".to_string())));
        assert!(params.contains(&(
            "order".to_string(),
            "display_order.asc,created_at.desc".to_string()
        )));
        assert!(params.contains(&("limit".to_string(), "3".to_string())));
    }

    #[tokio::test]
    async fn test_select_sends_key_headers_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/navigation_items"))
            .and(query_param("is_visible", "eq.true"))
            .and(header_eq("apikey", "anon-key"))
            .and(header_eq("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "1" }])))
            .mount(&server)
            .await;

        let rows = backend(&server)
            .select(
                "navigation_items",
                &Query {
                    filters: vec![Filter {
                        column: "is_visible".to_string(),
                        value: json!(true),
                    }],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_uses_on_conflict_and_merge_preference() {
        let server = MockServer::start().await;
        let lead = json!({ "email": "a@b.co", "name": "A", "source": "contact_form" });
        Mock::given(method("POST"))
            .and(path("/rest/v1/leads"))
            .and(query_param("on_conflict", "email"))
            .and(body_json(json!([lead.clone()])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([lead.clone()])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = backend(&server)
            .upsert("leads", vec![lead], "email")
            .await
            .unwrap();
        assert_eq!(rows[0]["email"], "a@b.co");

        let requests = server.received_requests().await.unwrap();
        let prefer = requests[0]
            .headers
            .get("prefer")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(prefer.contains("resolution=merge-duplicates"));
    }

    #[tokio::test]
    async fn test_scoped_backend_sends_session_token() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/messages"))
            .and(query_param("id", "eq.m1"))
            .and(header_eq("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "m1" }])))
            .mount(&server)
            .await;

        let scoped = backend(&server).with_access_token("user-token");
        let removed = scoped
            .delete(
                "messages",
                &[Filter {
                    column: "id".to_string(),
                    value: json!("m1"),
                }],
            )
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_rejection_surfaces_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/messages"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "message": "permission denied for table messages" })),
            )
            .mount(&server)
            .await;

        let err = backend(&server)
            .insert("messages", vec![json!({ "id": "1" })])
            .await
            .unwrap_err();
        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("permission denied"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

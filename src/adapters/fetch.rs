//! Gateway data hook. A fetch wrapper for frontends and scripts that reports
//! loading, ready and failed states instead of raising errors.

use crate::domain::DomainError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Result of a gateway fetch as seen by a caller rendering it.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

impl<T> From<Result<T, DomainError>> for FetchState<T> {
    fn from(result: Result<T, DomainError>) -> Self {
        match result {
            Ok(data) => Self::Ready(data),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Query pairs for list endpoints. Blank search terms are left out.
pub fn search_query(term: &str, page: u32, limit: u32) -> Vec<(String, String)> {
    let mut query = Vec::with_capacity(3);
    let term = term.trim();
    if !term.is_empty() {
        query.push(("search".to_string(), term.to_string()));
    }
    query.push(("page".to_string(), page.to_string()));
    query.push(("limit".to_string(), limit.to_string()));
    query
}

/// HTTP client for the gateway.
#[derive(Clone)]
pub struct GatewayFetcher {
    client: Arc<Client>,
    base_url: String,
}

impl GatewayFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// GETs `path` with `query` and decodes the body as `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> FetchState<T> {
        self.try_fetch(path, query).await.into()
    }

    async fn try_fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, DomainError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "gateway fetch");

        let res = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("Request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|body| body["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            return Err(DomainError::Transport(format!("Gateway error {status}: {message}")));
        }

        res.json::<T>()
            .await
            .map_err(|e| DomainError::InvalidPayload(format!("Undecodable response: {e}")))
    }
}

/// A remote resource bound to one path and query. Starts in `Loading`.
#[derive(Debug)]
pub struct Resource<T> {
    path: String,
    query: Vec<(String, String)>,
    state: FetchState<T>,
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            query,
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Fetches and replaces the state with the outcome.
    pub async fn load(&mut self, fetcher: &GatewayFetcher) -> &FetchState<T> {
        self.state = fetcher.fetch(&self.path, &self.query).await;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde::Deserialize;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        name: String,
    }

    async fn serve() -> GatewayFetcher {
        let app = Router::new()
            .route(
                "/items",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    let name = q.get("search").cloned().unwrap_or_else(|| "all".into());
                    Json(json!([{ "id": 1, "name": name }]))
                }),
            )
            .route(
                "/missing",
                get(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({
                            "error": true,
                            "code": "NOT_FOUND",
                            "message": "client 9 not found"
                        })),
                    )
                }),
            )
            .route("/garbled", get(|| async { "not json" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        GatewayFetcher::new(format!("http://{addr}/"))
    }

    #[test]
    fn blank_search_is_skipped() {
        let q = search_query("  ", 2, 10);
        assert_eq!(
            q,
            vec![("page".into(), "2".into()), ("limit".into(), "10".into())]
        );
        assert_eq!(search_query(" oak ", 1, 20)[0], ("search".into(), "oak".into()));
    }

    #[tokio::test]
    async fn resource_moves_from_loading_to_ready() {
        let fetcher = serve().await;
        let mut items: Resource<Vec<Item>> = Resource::new("/items", search_query("oak", 1, 20));
        assert!(items.state().is_loading());

        let state = items.load(&fetcher).await;
        assert_eq!(
            state.data().unwrap(),
            &vec![Item {
                id: 1,
                name: "oak".into()
            }]
        );
    }

    #[tokio::test]
    async fn failures_carry_a_message() {
        let fetcher = serve().await;

        let state: FetchState<Value> = fetcher.fetch("missing", &[]).await;
        let msg = state.error().unwrap();
        assert!(msg.contains("404"));
        assert!(msg.contains("client 9 not found"));

        let state: FetchState<Vec<Item>> = fetcher.fetch("garbled", &[]).await;
        assert!(state.error().unwrap().contains("Undecodable"));
    }

    #[tokio::test]
    async fn unreachable_gateway_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = GatewayFetcher::new(format!("http://{addr}"));
        let state: FetchState<Value> = fetcher.fetch("health", &[]).await;
        assert!(state.error().unwrap().contains("Request failed"));
    }
}

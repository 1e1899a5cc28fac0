use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use rr_core::service::{ArticleQueryService, DEFAULT_SEARCH_LIMIT};
use rr_storage::StoreFactory;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ArticlesParams {
    #[serde(default)]
    pub query: String,
}

/// GET /api/articles: the full listing ordered by rank, or a semantic
/// search when a non-empty `query` is present. Success is a JSON array;
/// any failure is `{"error": ...}` with a 500. Legacy clients discriminate
/// on the body shape, not only the status.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticlesParams>,
) -> Response {
    let store = state.stores.open();
    let mut service = ArticleQueryService::new(store, state.embedder.clone());

    let outcome = if params.query.is_empty() {
        service
            .get_all_articles()
            .await
            .map(|articles| Json(articles).into_response())
    } else {
        service
            .search_articles(&params.query, DEFAULT_SEARCH_LIMIT)
            .await
            .map(|hits| Json(hits).into_response())
    };

    // The gateway is released on every path before the response goes out.
    service.close().await;

    outcome.unwrap_or_else(|err| {
        tracing::error!(error = %err, "articles request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response()
    })
}

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

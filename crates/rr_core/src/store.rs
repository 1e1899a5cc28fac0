use async_trait::async_trait;

use crate::models::{Article, ScoredArticle};
use crate::Result;

/// Read-side gateway to the article store. A gateway instance is a
/// request-scoped resource: construct it, run the reads, then `close` it.
#[async_trait]
pub trait ArticleStore: Send {
    /// Establish the session. Idempotent; a failure leaves the gateway
    /// not-connected so the next call retries from scratch.
    async fn connect(&mut self) -> Result<()>;

    /// Unfiltered scalar read of up to `limit` articles, in store order.
    async fn list_all(&mut self, limit: usize) -> Result<Vec<Article>>;

    /// Similarity search against the title embedding, best matches first.
    async fn search_by_vector(&mut self, vector: &[f32], limit: usize)
        -> Result<Vec<ScoredArticle>>;

    /// Release the session. Safe to call when not connected.
    async fn close(&mut self);
}

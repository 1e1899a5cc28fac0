use std::sync::Arc;

use crate::embedding::Embedder;
use crate::models::{Article, ScoredArticle};
use crate::store::ArticleStore;
use crate::Result;

/// Listing reads the whole (small) corpus in one page.
pub const DEFAULT_LIST_LIMIT: usize = 100;
/// Default number of search hits returned to callers.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Answers "all articles" and "articles matching a query" over a
/// request-scoped store gateway and a shared embedder.
pub struct ArticleQueryService {
    store: Box<dyn ArticleStore>,
    embedder: Arc<dyn Embedder>,
}

impl ArticleQueryService {
    pub fn new(store: Box<dyn ArticleStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// All articles, sorted ascending by rank. The sort happens here: the
    /// store does not guarantee retrieval order. Stable, so ties keep the
    /// order the store returned them in.
    pub async fn get_all_articles(&mut self) -> Result<Vec<Article>> {
        let mut articles = self.store.list_all(DEFAULT_LIST_LIMIT).await?;
        articles.sort_by_key(|article| article.rank);
        Ok(articles)
    }

    /// Semantic search: embed the query, then search by vector. Hits come
    /// back in the store's relevance order and are not re-sorted. An
    /// embedding failure surfaces before the store is ever touched.
    pub async fn search_articles(
        &mut self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredArticle>> {
        let vector = self.embedder.embed(query).await?;
        tracing::debug!(query, dimension = vector.len(), "embedded search query");
        self.store.search_by_vector(&vector, limit).await
    }

    /// Release the gateway session.
    pub async fn close(mut self) {
        self.store.close().await;
    }
}

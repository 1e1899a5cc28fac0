use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rr_core::{Article, ArticleStore, Result, ScoredArticle};

use crate::StoreFactory;

/// In-memory article corpus. The corpus is shared; every `open` hands out a
/// fresh request-scoped handle over it, so it can stand in for the real
/// store in tests and local development without changing the call sites.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    corpus: Arc<RwLock<Vec<(Article, Vec<f32>)>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one article with its title embedding. Re-inserting an id
    /// replaces the previous record.
    pub async fn insert(&self, article: Article, embedding: Vec<f32>) {
        let mut corpus = self.corpus.write().await;
        if let Some(existing) = corpus.iter_mut().find(|(a, _)| a.id == article.id) {
            *existing = (article, embedding);
        } else {
            corpus.push((article, embedding));
        }
    }
}

impl StoreFactory for MemoryBackend {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn open(&self) -> Box<dyn ArticleStore> {
        Box::new(MemoryStore {
            corpus: self.corpus.clone(),
        })
    }
}

pub struct MemoryStore {
    corpus: Arc<RwLock<Vec<(Article, Vec<f32>)>>>,
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn list_all(&mut self, limit: usize) -> Result<Vec<Article>> {
        let corpus = self.corpus.read().await;
        Ok(corpus
            .iter()
            .take(limit)
            .map(|(article, _)| article.clone())
            .collect())
    }

    async fn search_by_vector(
        &mut self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredArticle>> {
        let corpus = self.corpus.read().await;
        let mut hits: Vec<ScoredArticle> = corpus
            .iter()
            .map(|(article, embedding)| ScoredArticle {
                article: article.clone(),
                score: cosine_similarity(vector, embedding),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn close(&mut self) {}
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, title: &str) -> Article {
        Article {
            id,
            rank: id,
            title: title.to_string(),
            url: format!("https://example.com/{id}"),
            likes: 0,
            views: 0,
            brief_content: String::new(),
        }
    }

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        let similarity = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_guards_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn search_orders_by_similarity_and_respects_limit() {
        let backend = MemoryBackend::new();
        backend.insert(article(1, "far"), vec![0.0, 1.0]).await;
        backend.insert(article(2, "near"), vec![1.0, 0.1]).await;
        backend.insert(article(3, "nearest"), vec![1.0, 0.0]).await;

        let mut store = backend.open();
        let hits = store.search_by_vector(&[1.0, 0.0], 2).await.unwrap();

        let ids: Vec<i64> = hits.iter().map(|h| h.article.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn empty_corpus_returns_empty_results() {
        let backend = MemoryBackend::new();
        let mut store = backend.open();

        assert!(store.list_all(100).await.unwrap().is_empty());
        assert!(store
            .search_by_vector(&[1.0, 0.0], 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn insert_replaces_existing_id() {
        let backend = MemoryBackend::new();
        backend.insert(article(1, "old title"), vec![1.0]).await;
        backend.insert(article(1, "new title"), vec![1.0]).await;

        let mut store = backend.open();
        let articles = store.list_all(100).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "new title");
    }
}

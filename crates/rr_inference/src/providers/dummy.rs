use async_trait::async_trait;

use rr_core::{Embedder, Error, Result};

/// Deterministic offline embedder: a byte-frequency vector, L2-normalized so
/// cosine scores land in the usual range. Lets the whole stack run in tests
/// and local development without an embedding API.
pub struct DummyEmbedder {
    dimension: usize,
}

impl DummyEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for DummyEmbedder {
    fn name(&self) -> &str {
        "dummy"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::Embedding("cannot embed empty text".to_string()));
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for (position, byte) in text.bytes().enumerate() {
            let slot = (byte as usize + position) % self.dimension;
            embedding[slot] += 1.0;
        }

        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_same_vector() {
        let embedder = DummyEmbedder::new(16);
        let first = embedder.embed("stable output").await.unwrap();
        let second = embedder.embed("stable output").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn different_texts_differ() {
        let embedder = DummyEmbedder::new(16);
        let a = embedder.embed("rust async runtimes").await.unwrap();
        let b = embedder.embed("vector databases").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn vector_has_configured_dimension_and_unit_norm() {
        let embedder = DummyEmbedder::new(32);
        let embedding = embedder.embed("normalize me").await.unwrap();
        assert_eq!(embedding.len(), 32);

        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let embedder = DummyEmbedder::new(16);
        assert!(matches!(
            embedder.embed("  ").await.unwrap_err(),
            Error::Embedding(_)
        ));
    }
}

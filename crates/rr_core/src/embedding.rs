use async_trait::async_trait;

use crate::Result;

/// Converts free text into a fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Embed one piece of text. Input must be non-empty; each call is a
    /// fresh request, nothing is cached or retried.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

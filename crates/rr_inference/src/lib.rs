use std::env;
use std::sync::Arc;

use rr_core::{Embedder, Error, Result};

pub mod providers;

pub use providers::dummy::DummyEmbedder;
pub use providers::openai::OpenAiEmbedder;

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub url: String,
    pub model: String,
    pub api_key: String,
    pub dimension: usize,
}

impl EmbeddingConfig {
    /// Config comes from the environment; nothing is validated here. A bad
    /// URL or key shows up as an upstream failure on the first embed call.
    pub fn from_env() -> Self {
        Self {
            url: env::var("EMBEDDING_URL").unwrap_or_default(),
            model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            api_key: env::var("EMBEDDING_API_KEY").unwrap_or_default(),
            dimension: env::var("EMBEDDING_DIMENSION")
                .ok()
                .and_then(|dim| dim.parse().ok())
                .unwrap_or(1024),
        }
    }
}

pub fn create_embedder(provider: &str, config: EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match provider {
        "openai" => Ok(Arc::new(OpenAiEmbedder::new(config))),
        "dummy" => Ok(Arc::new(DummyEmbedder::new(config.dimension))),
        other => Err(Error::Config(format!(
            "unknown embedding provider: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmbeddingConfig {
        EmbeddingConfig {
            url: "http://embeddings.internal/v1/embeddings".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key: "key".to_string(),
            dimension: 8,
        }
    }

    #[test]
    fn selector_knows_its_providers() {
        assert_eq!(create_embedder("openai", config()).unwrap().name(), "openai");
        let dummy = create_embedder("dummy", config()).unwrap();
        assert_eq!(dummy.name(), "dummy");
        assert_eq!(dummy.dimension(), 8);
        assert!(matches!(
            create_embedder("word2vec", config()),
            Err(Error::Config(_))
        ));
    }
}

use std::sync::Arc;

use rr_core::{ArticleStore, Error, Result};

pub mod backends;

pub use backends::memory::MemoryBackend;
pub use backends::milvus::{MilvusConfig, MilvusStore};

/// Hands out store gateways. Each `open` returns a fresh, request-scoped
/// gateway; nothing about an open session is shared between callers.
pub trait StoreFactory: Send + Sync {
    fn backend(&self) -> &'static str;

    fn open(&self) -> Box<dyn ArticleStore>;
}

pub struct MilvusFactory {
    config: MilvusConfig,
}

impl MilvusFactory {
    pub fn new(config: MilvusConfig) -> Self {
        Self { config }
    }
}

impl StoreFactory for MilvusFactory {
    fn backend(&self) -> &'static str {
        "milvus"
    }

    fn open(&self) -> Box<dyn ArticleStore> {
        Box::new(MilvusStore::new(self.config.clone()))
    }
}

pub fn create_factory(backend: &str) -> Result<Arc<dyn StoreFactory>> {
    match backend {
        "milvus" => Ok(Arc::new(MilvusFactory::new(MilvusConfig::from_env()))),
        "memory" => Ok(Arc::new(MemoryBackend::new())),
        other => Err(Error::Config(format!("unknown store backend: {other}"))),
    }
}

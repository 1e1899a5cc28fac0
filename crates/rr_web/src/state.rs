use std::sync::Arc;

use rr_core::Embedder;
use rr_storage::StoreFactory;

/// Shared application state. Only the store factory and the stateless
/// embedder live here; store gateways themselves are opened per request.
pub struct AppState {
    pub stores: Arc<dyn StoreFactory>,
    pub embedder: Arc<dyn Embedder>,
}

pub mod embedding;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use embedding::Embedder;
pub use error::Error;
pub use models::{Article, ScoredArticle};
pub use service::ArticleQueryService;
pub use store::ArticleStore;

pub type Result<T> = std::result::Result<T, Error>;

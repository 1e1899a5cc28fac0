use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;

use rr_core::service::{ArticleQueryService, DEFAULT_SEARCH_LIMIT};
use rr_core::{Article, Embedder};
use rr_inference::EmbeddingConfig;
use rr_storage::{MilvusConfig, MilvusStore, StoreFactory};
use rr_web::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse and semantically search the article corpus")]
struct Cli {
    /// Store backend: milvus or memory.
    #[arg(long, default_value = "milvus")]
    store: String,
    /// Embedding provider: openai or dummy.
    #[arg(long, default_value = "openai")]
    embedder: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
    /// Create the database, the article collection and its vector index.
    Init,
    /// Embed article titles from a JSON file and insert them into the store.
    Ingest { file: PathBuf },
    /// Drop the article collection.
    Drop,
    /// Print the full listing, ordered by rank.
    List,
    /// Semantic search over article titles.
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

/// One record of an ingest file: the article fields minus the store-assigned
/// id. Counts default to zero so partially scraped corpora still load.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedArticle {
    #[serde(default)]
    rank: i64,
    title: String,
    url: String,
    #[serde(default)]
    likes: i64,
    #[serde(default)]
    views: i64,
    #[serde(default)]
    brief_content: String,
}

impl From<SeedArticle> for Article {
    fn from(seed: SeedArticle) -> Self {
        Article {
            id: 0,
            rank: seed.rank,
            title: seed.title,
            url: seed.url,
            likes: seed.likes,
            views: seed.views,
            brief_content: seed.brief_content,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let embedder = rr_inference::create_embedder(&cli.embedder, EmbeddingConfig::from_env())?;

    match cli.command {
        Commands::Serve { addr } => {
            let stores = rr_storage::create_factory(&cli.store)?;
            info!(
                backend = stores.backend(),
                embedder = embedder.name(),
                %addr,
                "starting readrank"
            );
            let app = rr_web::create_app(AppState { stores, embedder });
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            axum::serve(listener, app).await.context("server error")?;
        }
        Commands::Init => {
            let store = MilvusStore::new(MilvusConfig::from_env());
            store.ensure_database().await?;
            store.create_collection().await?;
            info!("collection ready");
        }
        Commands::Ingest { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let seeds: Vec<SeedArticle> =
                serde_json::from_str(&raw).context("ingest file must be a JSON array of articles")?;

            let mut rows = Vec::with_capacity(seeds.len());
            for seed in seeds {
                let embedding = embedder.embed(&seed.title).await?;
                rows.push((Article::from(seed), embedding));
            }

            let store = MilvusStore::new(MilvusConfig::from_env());
            let inserted = store.insert(&rows).await?;
            info!(inserted, "ingest complete");
        }
        Commands::Drop => {
            let store = MilvusStore::new(MilvusConfig::from_env());
            store.drop_collection().await?;
            info!("collection dropped");
        }
        Commands::List => {
            let stores = rr_storage::create_factory(&cli.store)?;
            let mut service = ArticleQueryService::new(stores.open(), embedder);
            let outcome = service.get_all_articles().await;
            service.close().await;
            for article in outcome? {
                println!(
                    "{:>4}  {}  ({} likes, {} views)  {}",
                    article.rank, article.title, article.likes, article.views, article.url
                );
            }
        }
        Commands::Search { query, limit } => {
            let stores = rr_storage::create_factory(&cli.store)?;
            let mut service = ArticleQueryService::new(stores.open(), embedder);
            let outcome = service.search_articles(&query, limit).await;
            service.close().await;
            for hit in outcome? {
                println!("{:.4}  {}  {}", hit.score, hit.article.title, hit.article.url);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_records_tolerate_missing_counts() {
        let seeds: Vec<SeedArticle> = serde_json::from_str(
            r#"[{"rank": 1, "title": "t", "url": "https://example.com/t"},
                {"rank": 2, "title": "u", "url": "https://example.com/u",
                 "likes": 4, "views": 9, "briefContent": "short"}]"#,
        )
        .unwrap();

        let first = Article::from(seeds.into_iter().next().unwrap());
        assert_eq!(first.id, 0);
        assert_eq!(first.likes, 0);
        assert_eq!(first.brief_content, "");
    }
}

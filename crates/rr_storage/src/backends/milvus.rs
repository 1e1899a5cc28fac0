use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use rr_core::{Article, ArticleStore, Error, Result, ScoredArticle};

/// Fields requested from the store for both read operations. The title
/// embedding itself is never part of the output.
const OUTPUT_FIELDS: [&str; 6] = ["rank", "title", "url", "likes", "views", "briefContent"];
const VECTOR_FIELD: &str = "title_vector";

const HAS_COLLECTION: &str = "/v2/vectordb/collections/has";
const LOAD_COLLECTION: &str = "/v2/vectordb/collections/load";
const CREATE_COLLECTION: &str = "/v2/vectordb/collections/create";
const DROP_COLLECTION: &str = "/v2/vectordb/collections/drop";
const CREATE_DATABASE: &str = "/v2/vectordb/databases/create";
const QUERY_ENTITIES: &str = "/v2/vectordb/entities/query";
const SEARCH_ENTITIES: &str = "/v2/vectordb/entities/search";
const INSERT_ENTITIES: &str = "/v2/vectordb/entities/insert";

#[derive(Debug, Clone)]
pub struct MilvusConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub collection: String,
    pub username: String,
    pub password: String,
    pub dimension: usize,
}

impl MilvusConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("MILVUS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("MILVUS_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(19530),
            database: env::var("MILVUS_DATABASE").unwrap_or_else(|_| "juejin".to_string()),
            collection: env::var("MILVUS_COLLECTION").unwrap_or_else(|_| "articles".to_string()),
            username: env::var("MILVUS_USERNAME").unwrap_or_default(),
            password: env::var("MILVUS_PASSWORD").unwrap_or_default(),
            dimension: env::var("MILVUS_DIMENSION")
                .ok()
                .and_then(|dim| dim.parse().ok())
                .unwrap_or(1024),
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    fn token(&self) -> Option<String> {
        if self.username.is_empty() && self.password.is_empty() {
            None
        } else {
            Some(format!("{}:{}", self.username, self.password))
        }
    }
}

/// Milvus v2 RESTful response envelope. Failures come back as a non-zero
/// `code` plus a `message`, with HTTP 200.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// Gateway to the Milvus collection holding the article corpus. The session
/// is established lazily by the first read and torn down with `close`.
pub struct MilvusStore {
    client: Client,
    config: MilvusConfig,
    connected: bool,
}

impl MilvusStore {
    pub fn new(config: MilvusConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            connected: false,
        }
    }

    /// One RESTful call. Transport failures, non-2xx statuses and non-zero
    /// envelope codes all surface as a plain message; callers decide which
    /// error variant that message belongs to.
    async fn call(&self, path: &str, body: Value) -> std::result::Result<Value, String> {
        let mut request = self
            .client
            .post(format!("{}{}", self.config.base_url(), path))
            .json(&body);
        if let Some(token) = self.config.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        let envelope: Envelope = response.json().await.map_err(|e| e.to_string())?;
        if envelope.code != 0 {
            return Err(format!("code {}: {}", envelope.code, envelope.message));
        }
        Ok(envelope.data)
    }

    fn scoped(&self) -> Value {
        json!({
            "dbName": self.config.database,
            "collectionName": self.config.collection,
        })
    }

    fn scoped_with(&self, extra: Value) -> Value {
        let mut body = self.scoped();
        if let (Some(target), Some(source)) = (body.as_object_mut(), extra.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        body
    }

    /// Create the logical database if it is missing. Used by corpus
    /// administration, not by the read path.
    pub async fn ensure_database(&self) -> Result<()> {
        match self
            .call(CREATE_DATABASE, json!({ "dbName": self.config.database }))
            .await
        {
            Ok(_) => Ok(()),
            Err(message) if message.contains("already exist") => Ok(()),
            Err(message) => Err(Error::StoreUnavailable(format!(
                "create database {}: {message}",
                self.config.database
            ))),
        }
    }

    /// Create the article collection with its HNSW cosine index over the
    /// title embedding, then load it.
    pub async fn create_collection(&self) -> Result<()> {
        let schema = json!({
            "autoId": true,
            "enableDynamicField": false,
            "fields": [
                { "fieldName": "id", "dataType": "Int64", "isPrimary": true },
                { "fieldName": "rank", "dataType": "Int64" },
                { "fieldName": "title", "dataType": "VarChar",
                  "elementTypeParams": { "max_length": 512 } },
                { "fieldName": VECTOR_FIELD, "dataType": "FloatVector",
                  "elementTypeParams": { "dim": self.config.dimension } },
                { "fieldName": "url", "dataType": "VarChar",
                  "elementTypeParams": { "max_length": 512 } },
                { "fieldName": "likes", "dataType": "Int64" },
                { "fieldName": "views", "dataType": "Int64" },
                { "fieldName": "briefContent", "dataType": "VarChar",
                  "elementTypeParams": { "max_length": 2048 } },
            ],
        });
        let index_params = json!([{
            "fieldName": VECTOR_FIELD,
            "indexName": "title_vector_idx",
            "indexType": "HNSW",
            "metricType": "COSINE",
            "params": { "M": 8, "efConstruction": 64 },
        }]);

        self.call(
            CREATE_COLLECTION,
            self.scoped_with(json!({ "schema": schema, "indexParams": index_params })),
        )
        .await
        .map_err(|message| {
            Error::StoreOperation(format!(
                "create collection {}: {message}",
                self.config.collection
            ))
        })?;

        self.call(LOAD_COLLECTION, self.scoped())
            .await
            .map_err(|message| {
                Error::StoreOperation(format!(
                    "load collection {}: {message}",
                    self.config.collection
                ))
            })?;

        tracing::info!(collection = %self.config.collection, "created and loaded collection");
        Ok(())
    }

    /// Insert articles with their title embeddings. The store assigns ids.
    pub async fn insert(&self, articles: &[(Article, Vec<f32>)]) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        let rows: Vec<Value> = articles
            .iter()
            .map(|(article, embedding)| {
                json!({
                    "rank": article.rank,
                    "title": article.title,
                    "title_vector": embedding,
                    "url": article.url,
                    "likes": article.likes,
                    "views": article.views,
                    "briefContent": article.brief_content,
                })
            })
            .collect();
        let count = rows.len();

        let data = self
            .call(INSERT_ENTITIES, self.scoped_with(json!({ "data": rows })))
            .await
            .map_err(|message| Error::StoreOperation(format!("insert: {message}")))?;

        Ok(data
            .get("insertCount")
            .and_then(Value::as_u64)
            .unwrap_or(count as u64) as usize)
    }

    /// Drop the collection. A missing collection is a no-op.
    pub async fn drop_collection(&self) -> Result<()> {
        let data = self
            .call(HAS_COLLECTION, self.scoped())
            .await
            .map_err(|message| Error::StoreUnavailable(format!("has collection: {message}")))?;
        if !data.get("has").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(());
        }

        self.call(DROP_COLLECTION, self.scoped())
            .await
            .map_err(|message| {
                Error::StoreOperation(format!(
                    "drop collection {}: {message}",
                    self.config.collection
                ))
            })?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for MilvusStore {
    async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }

        let data = self
            .call(HAS_COLLECTION, self.scoped())
            .await
            .map_err(|message| Error::StoreUnavailable(format!("has collection: {message}")))?;
        if !data.get("has").and_then(Value::as_bool).unwrap_or(false) {
            return Err(Error::StoreUnavailable(format!(
                "collection {} does not exist",
                self.config.collection
            )));
        }

        self.call(LOAD_COLLECTION, self.scoped())
            .await
            .map_err(|message| {
                Error::StoreUnavailable(format!(
                    "load collection {}: {message}",
                    self.config.collection
                ))
            })?;

        tracing::debug!(
            database = %self.config.database,
            collection = %self.config.collection,
            "connected to milvus"
        );
        self.connected = true;
        Ok(())
    }

    async fn list_all(&mut self, limit: usize) -> Result<Vec<Article>> {
        self.connect().await?;

        let data = self
            .call(
                QUERY_ENTITIES,
                self.scoped_with(json!({
                    "filter": "",
                    "outputFields": OUTPUT_FIELDS,
                    "limit": limit,
                })),
            )
            .await
            .map_err(|message| Error::StoreOperation(format!("query: {message}")))?;

        let rows = data.as_array().map(Vec::as_slice).unwrap_or_default();
        Ok(rows.iter().map(article_from_row).collect())
    }

    async fn search_by_vector(
        &mut self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredArticle>> {
        self.connect().await?;

        // The corpus changes slowly; search reads tolerate bounded staleness.
        let data = self
            .call(
                SEARCH_ENTITIES,
                self.scoped_with(json!({
                    "data": [vector],
                    "annsField": VECTOR_FIELD,
                    "filter": "",
                    "limit": limit,
                    "outputFields": OUTPUT_FIELDS,
                    "consistencyLevel": "Bounded",
                })),
            )
            .await
            .map_err(|message| Error::StoreOperation(format!("search: {message}")))?;

        let rows = data.as_array().map(Vec::as_slice).unwrap_or_default();
        Ok(rows.iter().map(scored_from_row).collect())
    }

    async fn close(&mut self) {
        // The RESTful session holds no server-side state; dropping the
        // connected flag is all a release amounts to.
        self.connected = false;
    }
}

/// Decode one store row leniently: persisted records may predate the full
/// schema, so missing numbers become 0 and missing text becomes empty.
fn article_from_row(row: &Value) -> Article {
    Article {
        id: int_field(row, "id"),
        rank: int_field(row, "rank"),
        title: text_field(row, "title"),
        url: text_field(row, "url"),
        likes: int_field(row, "likes"),
        views: int_field(row, "views"),
        brief_content: text_field(row, "briefContent"),
    }
}

fn scored_from_row(row: &Value) -> ScoredArticle {
    ScoredArticle {
        article: article_from_row(row),
        score: row
            .get("distance")
            .and_then(Value::as_f64)
            .unwrap_or(0.0) as f32,
    }
}

fn int_field(row: &Value, name: &str) -> i64 {
    row.get(name).and_then(Value::as_i64).unwrap_or(0)
}

fn text_field(row: &Value, name: &str) -> String {
    row.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MilvusConfig {
        MilvusConfig {
            host: "milvus.internal".to_string(),
            port: 19530,
            database: "juejin".to_string(),
            collection: "articles".to_string(),
            username: String::new(),
            password: String::new(),
            dimension: 1024,
        }
    }

    #[test]
    fn base_url_joins_host_and_port() {
        assert_eq!(config().base_url(), "http://milvus.internal:19530");
    }

    #[test]
    fn token_only_with_credentials() {
        assert_eq!(config().token(), None);

        let mut with_auth = config();
        with_auth.username = "root".to_string();
        with_auth.password = "secret".to_string();
        assert_eq!(with_auth.token(), Some("root:secret".to_string()));
    }

    #[test]
    fn full_row_decodes() {
        let row = json!({
            "id": 42,
            "rank": 3,
            "title": "Async in practice",
            "url": "https://example.com/async",
            "likes": 15,
            "views": 900,
            "briefContent": "runtimes compared",
        });
        let article = article_from_row(&row);
        assert_eq!(article.id, 42);
        assert_eq!(article.rank, 3);
        assert_eq!(article.title, "Async in practice");
        assert_eq!(article.views, 900);
        assert_eq!(article.brief_content, "runtimes compared");
    }

    #[test]
    fn partial_row_defaults_instead_of_failing() {
        let row = json!({ "id": 7, "title": "sparse" });
        let article = article_from_row(&row);
        assert_eq!(article.rank, 0);
        assert_eq!(article.likes, 0);
        assert_eq!(article.views, 0);
        assert_eq!(article.url, "");
        assert_eq!(article.brief_content, "");
    }

    #[test]
    fn search_row_picks_up_distance_as_score() {
        let row = json!({ "id": 1, "title": "hit", "distance": 0.91 });
        let hit = scored_from_row(&row);
        assert!((hit.score - 0.91).abs() < 1e-6);

        let no_score = scored_from_row(&json!({ "id": 2 }));
        assert_eq!(no_score.score, 0.0);
    }

    #[test]
    fn envelope_carries_failure_code_and_message() {
        let envelope: Envelope = serde_json::from_value(json!({
            "code": 1100,
            "message": "collection not loaded",
        }))
        .unwrap();
        assert_eq!(envelope.code, 1100);
        assert_eq!(envelope.message, "collection not loaded");
        assert!(envelope.data.is_null());
    }
}

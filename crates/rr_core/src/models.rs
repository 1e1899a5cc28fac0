use serde::{Deserialize, Serialize};

/// An article as persisted in the store. `id` is assigned by the store and
/// `rank` is a precomputed display order, not recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub brief_content: String,
}

/// A search hit: an article plus its similarity score. Listings never carry
/// a score, so this is a separate type rather than an optional field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Article {
        Article {
            id: 7,
            rank: 1,
            title: "Intro to HNSW".to_string(),
            url: "https://example.com/hnsw".to_string(),
            likes: 12,
            views: 340,
            brief_content: "Graph-based ANN indexes".to_string(),
        }
    }

    #[test]
    fn listing_shape_has_no_score() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("score").is_none());
        assert_eq!(value["briefContent"], "Graph-based ANN indexes");
        assert_eq!(value["rank"], 1);
    }

    #[test]
    fn search_shape_is_flat_with_score() {
        let hit = ScoredArticle {
            article: sample(),
            score: 0.83,
        };
        let value = serde_json::to_value(hit).unwrap();
        assert_eq!(value["title"], "Intro to HNSW");
        assert!((value["score"].as_f64().unwrap() - 0.83).abs() < 1e-6);
    }

    #[test]
    fn missing_fields_default_on_deserialize() {
        let article: Article =
            serde_json::from_str(r#"{"id": 3, "title": "bare"}"#).unwrap();
        assert_eq!(article.rank, 0);
        assert_eq!(article.likes, 0);
        assert_eq!(article.views, 0);
        assert_eq!(article.url, "");
        assert_eq!(article.brief_content, "");
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::types::Rating;

/// What the blacklist needs to know about a post
pub trait ContentItem {
    /// Lower-cased union of every tag category
    fn tags(&self) -> HashSet<String>;
    /// `None` when the rating is missing or unrecognised
    fn rating(&self) -> Option<Rating>;
    fn score(&self) -> i64;
    fn fav_count(&self) -> i64;
}

/// Values read once from a `ContentItem` for a single evaluation
#[derive(Debug, Clone, Default)]
pub struct ItemFacts {
    pub tags: HashSet<String>,
    pub rating: Option<Rating>,
    pub score: i64,
    pub fav_count: i64,
}

impl ItemFacts {
    pub fn from_item<I: ContentItem + ?Sized>(item: &I) -> Self {
        Self {
            tags: item.tags(),
            rating: item.rating(),
            score: item.score(),
            fav_count: item.fav_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub up: i64,
    #[serde(default)]
    pub down: i64,
    #[serde(default)]
    pub total: i64,
}

/// Tags of a post grouped by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTags {
    #[serde(default)]
    pub general: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub character: Vec<String>,
    #[serde(default)]
    pub artist: Vec<String>,
    #[serde(default)]
    pub copyright: Vec<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub meta: Vec<String>,
    #[serde(default)]
    pub invalid: Vec<String>,
    #[serde(default)]
    pub contributor: Vec<String>,
}

impl PostTags {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.general
            .iter()
            .chain(&self.species)
            .chain(&self.character)
            .chain(&self.artist)
            .chain(&self.copyright)
            .chain(&self.lore)
            .chain(&self.meta)
            .chain(&self.invalid)
            .chain(&self.contributor)
    }
}

/// A post as returned by the `/posts.json` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub score: Score,
    #[serde(default)]
    pub fav_count: i64,
    #[serde(default)]
    pub tags: PostTags,
}

impl ContentItem for Post {
    fn tags(&self) -> HashSet<String> {
        self.tags.iter().map(|t| t.to_lowercase()).collect()
    }

    fn rating(&self) -> Option<Rating> {
        self.rating
    }

    fn score(&self) -> i64 {
        self.score.total
    }

    fn fav_count(&self) -> i64 {
        self.fav_count
    }
}

/// Body of a `/posts.json` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl PostPage {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse posts page")
    }
}

/// A post payload that was never deserialized into `Post`, such as the
/// JSON handed to background jobs. Missing or odd fields degrade to
/// empty/zero values.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    value: Value,
}

impl RawPost {
    pub fn new(value: Value) -> Self {
        // Single-post responses wrap the post as {"post": {...}}
        match value {
            Value::Object(mut map) if map.len() == 1 && map.contains_key("post") => {
                Self { value: map.remove("post").unwrap_or(Value::Null) }
            }
            value => Self { value },
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value = serde_json::from_str(json).context("Failed to parse post payload")?;
        Ok(Self::new(value))
    }

    /// Split a `{"posts": [...]}` body into raw posts
    pub fn from_page(page: Value) -> Vec<Self> {
        match page {
            Value::Object(mut map) => match map.remove("posts") {
                Some(Value::Array(posts)) => posts.into_iter().map(Self::new).collect(),
                _ => vec![],
            },
            Value::Array(posts) => posts.into_iter().map(Self::new).collect(),
            _ => vec![],
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.value.get("id").and_then(Value::as_i64)
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }
}

impl ContentItem for RawPost {
    fn tags(&self) -> HashSet<String> {
        let mut tags = HashSet::new();
        match self.value.get("tags") {
            Some(Value::Object(categories)) => {
                for tag in categories.values().filter_map(Value::as_array).flatten() {
                    if let Some(tag) = tag.as_str() {
                        tags.insert(tag.to_lowercase());
                    }
                }
            }
            Some(Value::String(tag_string)) => {
                tags.extend(tag_string.split_whitespace().map(str::to_lowercase));
            }
            _ => {}
        }
        tags
    }

    fn rating(&self) -> Option<Rating> {
        self.value
            .get("rating")
            .and_then(Value::as_str)
            .and_then(Rating::from_name)
    }

    fn score(&self) -> i64 {
        match self.value.get("score") {
            Some(Value::Object(score)) => score.get("total").and_then(Value::as_i64).unwrap_or(0),
            Some(score) => score.as_i64().unwrap_or(0),
            None => 0,
        }
    }

    fn fav_count(&self) -> i64 {
        self.value
            .get("fav_count")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "id": 42,
            "rating": "q",
            "score": { "up": 20, "down": -3, "total": 17 },
            "fav_count": 9,
            "tags": {
                "general": ["Solo", "smile"],
                "species": ["fox"],
                "character": [],
                "artist": ["someone"],
                "meta": ["hi_res"]
            }
        })
    }

    #[test]
    fn typed_post_reads_all_categories() {
        let post: Post = serde_json::from_value(sample()).unwrap();
        let tags = post.tags();

        assert!(tags.contains("solo"));
        assert!(tags.contains("fox"));
        assert!(tags.contains("someone"));
        assert!(tags.contains("hi_res"));
        assert_eq!(tags.len(), 5);
        assert_eq!(ContentItem::rating(&post), Some(Rating::Questionable));
        assert_eq!(ContentItem::score(&post), 17);
        assert_eq!(ContentItem::fav_count(&post), 9);
    }

    #[test]
    fn raw_post_agrees_with_typed_post() {
        let post: Post = serde_json::from_value(sample()).unwrap();
        let raw = RawPost::new(sample());

        assert_eq!(raw.id(), Some(42));
        assert_eq!(raw.tags(), post.tags());
        assert_eq!(raw.rating(), ContentItem::rating(&post));
        assert_eq!(raw.score(), ContentItem::score(&post));
        assert_eq!(raw.fav_count(), ContentItem::fav_count(&post));
    }

    #[test]
    fn raw_post_unwraps_single_post_body() {
        let raw = RawPost::new(json!({ "post": sample() }));
        assert_eq!(raw.id(), Some(42));
    }

    #[test]
    fn raw_post_degrades_on_odd_fields() {
        let raw = RawPost::new(json!({
            "rating": "z",
            "score": 5,
            "tags": "Fox  canine"
        }));

        assert_eq!(raw.rating(), None);
        assert_eq!(raw.score(), 5);
        assert_eq!(raw.fav_count(), 0);
        assert_eq!(
            raw.tags(),
            ["fox", "canine"]
                .iter()
                .map(|t| t.to_string())
                .collect::<HashSet<_>>()
        );

        let empty = RawPost::new(Value::Null);
        assert!(empty.tags().is_empty());
        assert_eq!(empty.score(), 0);
    }

    #[test]
    fn posts_page_parsing() {
        let body = json!({ "posts": [sample(), { "id": 7 }] });

        let raw = RawPost::from_page(body.clone());
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1].id(), Some(7));

        let page = PostPage::from_json_str(&body.to_string()).unwrap();
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.posts[1].rating, None);
        assert!(page.posts[1].tags.iter().next().is_none());

        assert!(PostPage::from_json_str("{not json").is_err());
    }
}

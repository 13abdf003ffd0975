use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Category, Story};

/// Upstream source of ranked stories.
#[async_trait]
pub trait StorySource: Send + Sync {
    async fn list_ranked_ids(&self, category: Category) -> Result<Vec<i64>>;

    async fn fetch_item(&self, id: i64) -> Result<Story>;

    /// First `limit` stories of a ranked list, fetched one after another in
    /// upstream order. Any single failure fails the whole call.
    async fn get_items(&self, category: Category, limit: usize) -> Result<Vec<Story>> {
        let ids = self.list_ranked_ids(category).await?;

        let mut stories = Vec::with_capacity(limit.min(ids.len()));
        for id in ids.into_iter().take(limit) {
            stories.push(self.fetch_item(id).await?);
        }
        Ok(stories)
    }
}

#[derive(Debug, Deserialize)]
struct HnItem {
    title: Option<String>,
    by: Option<String>,
    score: Option<i64>,
    url: Option<String>,
}

pub struct HnClient {
    client: Client,
    base_url: String,
}

impl HnClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("hn-digest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[allow(dead_code)]
    pub async fn get_top_items(&self, limit: usize) -> Result<Vec<Story>> {
        self.get_items(Category::Top, limit).await
    }

    #[allow(dead_code)]
    pub async fn get_best_items(&self, limit: usize) -> Result<Vec<Story>> {
        self.get_items(Category::Best, limit).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl StorySource for HnClient {
    async fn list_ranked_ids(&self, category: Category) -> Result<Vec<i64>> {
        let ids: Vec<i64> = self.get_json(category.listing_path()).await?;
        tracing::debug!(%category, count = ids.len(), "Fetched ranked ids");
        Ok(ids)
    }

    async fn fetch_item(&self, id: i64) -> Result<Story> {
        // Deleted or unknown items come back as a literal `null`.
        let item: Option<HnItem> = self.get_json(&format!("item/{}.json", id)).await?;
        let item = item
            .ok_or_else(|| AppError::UpstreamUnavailable(format!("item {} not found", id)))?;

        Ok(Story {
            id,
            title: item.title,
            author: item.by,
            score: item.score,
            url: item.url,
        })
    }
}

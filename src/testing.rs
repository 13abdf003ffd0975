//! In-memory stand-ins for the network collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::ai::TextGenerator;
use crate::error::{AppError, Result};
use crate::hn::StorySource;
use crate::models::{Category, Story};
use crate::services::PageLoader;

/// Serves canned page text; unknown URLs fail as if they timed out.
#[derive(Default)]
pub struct FakeLoader {
    pages: HashMap<String, String>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeLoader {
    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Highest number of concurrent `load_text` calls observed.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageLoader for FakeLoader {
    async fn load_text(&self, url: &str) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::PageRetrieval(format!("{}: operation timed out", url)))
    }
}

/// Records prompts and answers with a fixed reply, or a reply derived from
/// the first context line.
#[derive(Default)]
pub struct FakeGenerator {
    reply: Option<String>,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if self.fail {
            return Err(AppError::ModelInvocation("model offline".to_string()));
        }
        if let Some(reply) = &self.reply {
            return Ok(reply.clone());
        }

        let first_line = prompt
            .split("Context:\n")
            .nth(1)
            .and_then(|rest| rest.lines().next())
            .unwrap_or_default();
        Ok(format!("Summary of: {}", first_line))
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

/// Ranked lists held in memory.
#[derive(Default)]
pub struct FakeSource {
    lists: HashMap<Category, Vec<Story>>,
    missing: HashSet<i64>,
    offline: AtomicBool,
}

impl FakeSource {
    pub fn with_list(mut self, category: Category, stories: Vec<Story>) -> Self {
        self.lists.insert(category, stories);
        self
    }

    /// Make fetching a single item fail.
    pub fn without_item(mut self, id: i64) -> Self {
        self.missing.insert(id);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorySource for FakeSource {
    async fn list_ranked_ids(&self, category: Category) -> Result<Vec<i64>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::UpstreamUnavailable("connection refused".to_string()));
        }
        Ok(self
            .lists
            .get(&category)
            .map(|stories| stories.iter().map(|s| s.id).collect())
            .unwrap_or_default())
    }

    async fn fetch_item(&self, id: i64) -> Result<Story> {
        if self.missing.contains(&id) {
            return Err(AppError::UpstreamUnavailable(format!("item {}: HTTP 500", id)));
        }
        self.lists
            .values()
            .flatten()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AppError::UpstreamUnavailable(format!("item {} not found", id)))
    }
}

pub fn story(id: i64, title: Option<&str>, url: Option<&str>) -> Story {
    Story {
        id,
        title: title.map(String::from),
        author: Some(format!("user{}", id)),
        score: Some(id * 10),
        url: url.map(String::from),
    }
}

use serde::{Deserialize, Serialize};

use super::{Story, StoredStory};

/// Placeholder used when an item has neither a link nor a title.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable";

/// Synopsis of one story's linked page, keyed by the story id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySummary {
    pub id: i64,
    /// Empty when the story had no link.
    pub url: String,
    pub summary: String,
}

impl StorySummary {
    pub fn new(id: i64, url: Option<&str>, summary: String) -> Self {
        Self {
            id,
            url: url.unwrap_or_default().to_string(),
            summary,
        }
    }

    /// Sentinel text for a page that could not be summarized.
    pub fn unavailable_for(url: &str) -> String {
        format!("{} for {}", SUMMARY_UNAVAILABLE, url)
    }

    /// Summary used when no worker produced a result for `story`.
    pub fn placeholder(story: &Story) -> Self {
        let summary = match story.link() {
            Some(url) => Self::unavailable_for(url),
            None => story
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| SUMMARY_UNAVAILABLE.to_string()),
        };
        Self::new(story.id, story.link(), summary)
    }

    pub fn is_placeholder(&self) -> bool {
        self.summary == SUMMARY_UNAVAILABLE
            || (!self.url.is_empty() && self.summary == Self::unavailable_for(&self.url))
    }
}

/// A stored story joined with its summary, in ranked order.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestEntry {
    pub stored: StoredStory,
    pub summary: Option<StorySummary>,
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One of the ranked lists tracked independently in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Best,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Top, Category::Best];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Best => "best",
        }
    }

    /// Upstream endpoint returning the ranked id list.
    pub fn listing_path(&self) -> &'static str {
        match self {
            Category::Top => "topstories.json",
            Category::Best => "beststories.json",
        }
    }

    pub fn stories_table(&self) -> &'static str {
        match self {
            Category::Top => "top_stories",
            Category::Best => "best_stories",
        }
    }

    pub fn summaries_table(&self) -> &'static str {
        match self {
            Category::Top => "summaries_top",
            Category::Best => "summaries_best",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Category::Top),
            "best" => Ok(Category::Best),
            other => Err(anyhow::anyhow!("unknown category '{}' (expected top or best)", other).into()),
        }
    }
}

/// A ranked item as reported by the upstream API. Absent upstream fields stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub url: Option<String>,
}

/// Row as read back from the store, including bookkeeping columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredStory {
    pub story: Story,
    pub position: i64,
    pub fetched_at: DateTime<Utc>,
}

impl Story {
    /// Non-empty link target, if the item has one.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

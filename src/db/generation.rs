use std::collections::{HashMap, HashSet};

use crate::error::{AppError, Result};
use crate::models::{Category, Story, StorySummary};

/// A complete replacement result set for one category, staged in memory
/// until every story has its summary.
#[derive(Debug, Clone)]
pub struct Generation {
    category: Category,
    stories: Vec<Story>,
    summaries: HashMap<i64, StorySummary>,
}

impl Generation {
    pub fn new(category: Category, stories: Vec<Story>) -> Self {
        Self {
            category,
            summaries: HashMap::with_capacity(stories.len()),
            stories,
        }
    }

    #[allow(dead_code)]
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Insert or overwrite the summary for `summary.id`.
    pub fn stage(&mut self, summary: StorySummary) {
        self.summaries.insert(summary.id, summary);
    }

    #[allow(dead_code)]
    pub fn extend<I: IntoIterator<Item = StorySummary>>(&mut self, summaries: I) {
        for summary in summaries {
            self.stage(summary);
        }
    }

    #[allow(dead_code)]
    pub fn staged(&self) -> usize {
        self.summaries.len()
    }

    pub fn placeholders(&self) -> usize {
        self.summaries.values().filter(|s| s.is_placeholder()).count()
    }

    /// The staged summary ids must be exactly the story ids.
    pub fn verify(&self) -> Result<()> {
        let story_ids: HashSet<i64> = self.stories.iter().map(|s| s.id).collect();

        let mut missing: Vec<i64> = story_ids
            .iter()
            .filter(|id| !self.summaries.contains_key(id))
            .copied()
            .collect();
        let mut orphaned: Vec<i64> = self
            .summaries
            .keys()
            .filter(|id| !story_ids.contains(id))
            .copied()
            .collect();

        if missing.is_empty() && orphaned.is_empty() {
            return Ok(());
        }

        missing.sort_unstable();
        orphaned.sort_unstable();
        Err(AppError::InconsistentGeneration {
            category: self.category,
            missing,
            orphaned,
        })
    }

    /// Stories in ranked order and their summaries in the same order.
    pub(crate) fn into_parts(mut self) -> (Category, Vec<Story>, Vec<StorySummary>) {
        let summaries = self
            .stories
            .iter()
            .filter_map(|s| self.summaries.remove(&s.id))
            .collect();
        (self.category, self.stories, summaries)
    }
}

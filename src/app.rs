use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;

use crate::ai::{OllamaClient, PageSummarizer};
use crate::config::Config;
use crate::db::{Generation, Repository};
use crate::error::Result;
use crate::hn::{HnClient, StorySource};
use crate::models::{Category, DigestEntry};
use crate::pipeline::Dispatcher;
use crate::services::HttpPageLoader;

/// Stages of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    Fetching,
    Summarizing,
    Committing,
    Done,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshStage::Fetching => "FETCHING",
            RefreshStage::Summarizing => "SUMMARIZING",
            RefreshStage::Committing => "COMMITTING",
            RefreshStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful refresh cycle.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub category: Category,
    pub stories: usize,
    pub placeholders: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RefreshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: stored {} stories ({} without a generated summary) in {:.1}s",
            self.category,
            self.stories,
            self.placeholders,
            self.elapsed.as_secs_f64()
        )
    }
}

pub struct App {
    pub repository: Repository,
    source: Arc<dyn StorySource>,
    summarizer: Arc<PageSummarizer>,
    worker_cap: usize,
    story_limit: usize,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let source = Arc::new(HnClient::new(&config.hn_base_url, config.upstream_timeout())?);

        // One backend client for the whole process.
        let generator = Arc::new(OllamaClient::new(
            &config.ollama_base,
            &config.summary_model,
            config.temperature,
            config.model_timeout(),
        )?);
        let loader = Arc::new(HttpPageLoader::new(config.page_timeout())?);
        let summarizer = Arc::new(PageSummarizer::new(loader, generator));

        tracing::info!(
            model = summarizer.model_version(),
            backend = %config.ollama_base,
            workers = config.summary_workers,
            limit = config.story_limit,
            "Initialized"
        );

        Ok(Self::with_components(
            repository,
            source,
            summarizer,
            config.summary_workers,
            config.story_limit,
        ))
    }

    pub fn with_components(
        repository: Repository,
        source: Arc<dyn StorySource>,
        summarizer: Arc<PageSummarizer>,
        worker_cap: usize,
        story_limit: usize,
    ) -> Self {
        Self {
            repository,
            source,
            summarizer,
            worker_cap: worker_cap.max(1),
            story_limit,
        }
    }

    /// Fetch, summarize and atomically replace one category's result set.
    /// A fetch failure leaves the store untouched.
    pub async fn refresh_category(&self, category: Category) -> Result<RefreshReport> {
        let started = Instant::now();
        let enter = |stage: RefreshStage| tracing::info!(%category, %stage, "Refresh stage");

        enter(RefreshStage::Fetching);
        let stories = self
            .source
            .get_items(category, self.story_limit)
            .await
            .inspect_err(|e| tracing::error!(%category, error = %e, "Fetch failed; store left untouched"))?;

        enter(RefreshStage::Summarizing);
        let mut generation = Generation::new(category, stories);
        let dispatcher = Dispatcher::new(Arc::clone(&self.summarizer), self.worker_cap);
        let items = generation.stories().to_vec();
        dispatcher
            .run(&items, |summary| {
                tracing::debug!(%category, id = summary.id, "Summary ready");
                generation.stage(summary);
            })
            .await;

        enter(RefreshStage::Committing);
        let report = RefreshReport {
            category,
            stories: generation.stories().len(),
            placeholders: generation.placeholders(),
            elapsed: Duration::ZERO,
        };
        self.repository
            .commit(generation)
            .await
            .inspect_err(|e| tracing::error!(%category, error = %e, "Commit failed; previous data kept"))?;

        enter(RefreshStage::Done);
        Ok(RefreshReport {
            elapsed: started.elapsed(),
            ..report
        })
    }

    /// Refresh every category, each on its own worker pool. All cycles run to
    /// completion; the first failure (if any) is returned afterwards.
    pub async fn refresh_all(&self) -> Result<Vec<RefreshReport>> {
        let outcomes = join_all(Category::ALL.iter().map(|&c| self.refresh_category(c))).await;

        let mut reports = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(report) => reports.push(report),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }

    pub async fn digest(&self, category: Category) -> Result<Vec<DigestEntry>> {
        self.repository.get_digest(category).await
    }
}

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::ai::PageSummarizer;
use crate::models::{Story, StorySummary};

/// Summarizes a batch of stories on a fixed-size pool of workers.
pub struct Dispatcher {
    summarizer: Arc<PageSummarizer>,
    worker_cap: usize,
}

impl Dispatcher {
    pub fn new(summarizer: Arc<PageSummarizer>, worker_cap: usize) -> Self {
        Self {
            summarizer,
            worker_cap: worker_cap.max(1),
        }
    }

    #[allow(dead_code)]
    pub fn worker_cap(&self) -> usize {
        self.worker_cap
    }

    /// Summarize every story, returning results in completion order.
    #[allow(dead_code)]
    pub async fn process_batch(&self, items: &[Story]) -> Vec<StorySummary> {
        let mut results = Vec::with_capacity(items.len());
        self.run(items, |summary| results.push(summary)).await;
        results
    }

    /// Summarize every story and hand each result to `on_result` as soon as
    /// it arrives. Exactly one result is delivered per input story, even if a
    /// worker dies mid-item.
    pub async fn run<F>(&self, items: &[Story], mut on_result: F)
    where
        F: FnMut(StorySummary),
    {
        if items.is_empty() {
            return;
        }

        let queue = Arc::new(Mutex::new(items.iter().cloned().collect::<VecDeque<_>>()));
        let (tx, mut rx) = mpsc::channel::<StorySummary>(items.len());
        let mut workers = JoinSet::new();

        for worker in 0..self.worker_cap.min(items.len()) {
            let queue = Arc::clone(&queue);
            let summarizer = Arc::clone(&self.summarizer);
            let tx = tx.clone();

            workers.spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(story) = next else {
                        break;
                    };

                    tracing::debug!(worker, id = story.id, "Summarizing story");
                    let summary = summarizer
                        .summarize(story.link(), story.title.as_deref())
                        .await;

                    if tx
                        .send(StorySummary::new(story.id, story.link(), summary))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut pending: HashSet<i64> = items.iter().map(|s| s.id).collect();
        while let Some(summary) = rx.recv().await {
            pending.remove(&summary.id);
            on_result(summary);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Summary worker terminated abnormally");
            }
        }

        for story in items.iter().filter(|s| pending.remove(&s.id)) {
            tracing::error!(id = story.id, "No summary produced; storing placeholder");
            on_result(StorySummary::placeholder(story));
        }
    }
}

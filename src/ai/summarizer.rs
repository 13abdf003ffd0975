use std::sync::Arc;
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::models::{StorySummary, SUMMARY_UNAVAILABLE};
use crate::services::PageLoader;

use super::{TextGenerator, TextSplitter};

/// Only the leading chunks of a page are sent to the model.
pub const MAX_CONTEXT_CHUNKS: usize = 4;

pub fn summary_prompt(context: &str) -> String {
    format!(
        "You are a concise technical summarizer.\n\n\
         Context:\n{}\n\n\
         Provide:\n\
         - 2-3 sentence summary\n\
         - 3 bullet points\n",
        context
    )
}

/// Turns a story link into a short synopsis of the linked page.
pub struct PageSummarizer {
    loader: Arc<dyn PageLoader>,
    generator: Arc<dyn TextGenerator>,
    splitter: TextSplitter,
    max_chunks: usize,
}

impl PageSummarizer {
    pub fn new(loader: Arc<dyn PageLoader>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            loader,
            generator,
            splitter: TextSplitter::default(),
            max_chunks: MAX_CONTEXT_CHUNKS,
        }
    }

    pub fn model_version(&self) -> &str {
        self.generator.model_name()
    }

    /// Always returns displayable text. Without a link the title (or a fixed
    /// sentinel) stands in; any retrieval or model failure yields
    /// `"Summary unavailable for {url}"`.
    pub async fn summarize(&self, url: Option<&str>, fallback_title: Option<&str>) -> String {
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            return fallback_title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(SUMMARY_UNAVAILABLE)
                .to_string();
        };

        let started = Instant::now();
        match self.try_summarize(url).await {
            Ok(summary) => {
                tracing::debug!(
                    url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Summarized page"
                );
                summary
            }
            Err(e) => {
                tracing::warn!(
                    url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Summarization failed; using placeholder"
                );
                StorySummary::unavailable_for(url)
            }
        }
    }

    async fn try_summarize(&self, url: &str) -> Result<String> {
        let text = self.loader.load_text(url).await?;

        let context = self.build_context(&text);
        if context.is_empty() {
            return Err(AppError::PageRetrieval(format!("{}: no readable text", url)));
        }

        let output = self.generator.generate(&summary_prompt(&context)).await?;
        if output.trim().is_empty() {
            return Err(AppError::ModelInvocation(format!(
                "{} returned an empty response",
                self.generator.model_name()
            )));
        }

        Ok(output)
    }

    /// First few overlapping chunks of `text`, in document order.
    pub fn build_context(&self, text: &str) -> String {
        self.splitter
            .split(text)
            .into_iter()
            .take(self.max_chunks)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

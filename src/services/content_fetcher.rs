use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

// Wide enough that html2text does not hard-wrap paragraphs.
const TEXT_WIDTH: usize = 400;

/// Retrieves a page and returns its readable text.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load_text(&self, url: &str) -> Result<String>;
}

pub struct HttpPageLoader {
    client: Client,
}

impl HttpPageLoader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    async fn load_text(&self, page_url: &str) -> Result<String> {
        let url = Url::parse(page_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::PageRetrieval(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                page_url
            )));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::PageRetrieval(format!("{}: {}", page_url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::PageRetrieval(format!(
                "{}: HTTP {}",
                page_url,
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::PageRetrieval(format!("{}: {}", page_url, e)))?;

        let text = extract_text(&html)?;
        if text.is_empty() {
            return Err(AppError::PageRetrieval(format!(
                "{}: no readable text",
                page_url
            )));
        }

        tracing::debug!(url = page_url, chars = text.chars().count(), "Loaded page text");
        Ok(text)
    }
}

/// Convert HTML to plain text, trimming lines and keeping single blank lines
/// as paragraph breaks.
pub fn extract_text(html: &str) -> Result<String> {
    static BLANK_RUNS: OnceLock<Option<Regex>> = OnceLock::new();

    let text = html2text::from_read(html.as_bytes(), TEXT_WIDTH)
        .map_err(|e| AppError::PageRetrieval(format!("html conversion failed: {}", e)))?;

    let trimmed = text
        .lines()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n");

    let trimmed = trimmed.trim();
    match BLANK_RUNS.get_or_init(|| Regex::new(r"\n{3,}").ok()) {
        Some(blank_runs) => Ok(blank_runs.replace_all(trimmed, "\n\n").into_owned()),
        None => Ok(trimmed.to_string()),
    }
}

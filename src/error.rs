use thiserror::Error;

use crate::models::Category;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("page retrieval failed: {0}")]
    PageRetrieval(String),

    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("commit of {category} stories failed: {source}")]
    StoreCommit {
        category: Category,
        #[source]
        source: tokio_rusqlite::Error,
    },

    #[error("inconsistent {category} generation: missing summaries {missing:?}, orphaned summaries {orphaned:?}")]
    InconsistentGeneration {
        category: Category,
        missing: Vec<i64>,
        orphaned: Vec<i64>,
    },

    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

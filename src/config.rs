use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

const APP_DIR: &str = "hn-digest";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_hn_base_url")]
    pub hn_base_url: String,

    #[serde(default = "default_ollama_base")]
    pub ollama_base: String,

    #[serde(default = "default_summary_model")]
    pub summary_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_summary_workers")]
    pub summary_workers: usize,

    #[serde(default = "default_story_limit")]
    pub story_limit: usize,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    #[serde(default = "default_model_timeout")]
    pub model_timeout_secs: u64,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("hn_stories.db").to_string_lossy().to_string()
}

fn default_hn_base_url() -> String {
    "https://hacker-news.firebaseio.com/v0".to_string()
}

fn default_ollama_base() -> String {
    "http://localhost:11434".to_string()
}

fn default_summary_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_summary_workers() -> usize {
    4
}

fn default_story_limit() -> usize {
    5
}

fn default_upstream_timeout() -> u64 {
    5
}

fn default_page_timeout() -> u64 {
    15
}

fn default_model_timeout() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            hn_base_url: default_hn_base_url(),
            ollama_base: default_ollama_base(),
            summary_model: default_summary_model(),
            temperature: default_temperature(),
            summary_workers: default_summary_workers(),
            story_limit: default_story_limit(),
            upstream_timeout_secs: default_upstream_timeout(),
            page_timeout_secs: default_page_timeout(),
            model_timeout_secs: default_model_timeout(),
        }
    }
}

impl Config {
    /// Reads the config file (writing defaults on first run), then applies
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Overlay environment-style settings. `lookup` returns the raw value for a key.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = lookup("HN_DB_PATH") {
            self.db_path = v;
        }
        if let Some(v) = lookup("HN_API_BASE") {
            self.hn_base_url = v;
        }
        if let Some(v) = lookup("OLLAMA_BASE") {
            self.ollama_base = v;
        }
        if let Some(v) = lookup("SUMMARY_MODEL") {
            self.summary_model = v;
        }
        if let Some(v) = lookup("SUMMARY_WORKERS") {
            self.summary_workers = parse_setting("SUMMARY_WORKERS", &v)?;
        }
        if let Some(v) = lookup("STORY_LIMIT") {
            self.story_limit = parse_setting("STORY_LIMIT", &v)?;
        }
        if let Some(v) = lookup("SUMMARY_TEMPERATURE") {
            self.temperature = parse_setting("SUMMARY_TEMPERATURE", &v)?;
        }

        self.summary_workers = self.summary_workers.max(1);
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} has invalid value '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn partial_file_uses_defaults() {
        let config: Config = toml::from_str("summary_model = \"mistral\"\n").unwrap();
        assert_eq!(config.summary_model, "mistral");
        assert_eq!(config.summary_workers, 4);
        assert_eq!(config.story_limit, 5);
        assert_eq!(config.ollama_base, "http://localhost:11434");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::default();
        let vars = env(&[
            ("OLLAMA_BASE", "http://gpu-box:11434"),
            ("SUMMARY_MODEL", "qwen2.5:7b"),
            ("SUMMARY_WORKERS", "8"),
            ("STORY_LIMIT", " 10 "),
            ("HN_DB_PATH", ""),
        ]);
        let db_path = config.db_path.clone();

        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.ollama_base, "http://gpu-box:11434");
        assert_eq!(config.summary_model, "qwen2.5:7b");
        assert_eq!(config.summary_workers, 8);
        assert_eq!(config.story_limit, 10);
        assert_eq!(config.db_path, db_path);
    }

    #[test]
    fn worker_count_never_drops_to_zero() {
        let mut config = Config::default();
        let vars = env(&[("SUMMARY_WORKERS", "0")]);
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.summary_workers, 1);
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let mut config = Config::default();
        let vars = env(&[("STORY_LIMIT", "five")]);
        let err = config.apply_overrides(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("STORY_LIMIT")));
    }
}

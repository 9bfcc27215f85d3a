use crate::models::FeedSource;
use itertools::Itertools;
use serde::Deserialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Feeds listed under one category, in the order they should be read
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFeeds {
    pub category: String,
    #[serde(default)]
    pub feeds: Vec<String>,
}

impl CategoryFeeds {
    /// Feed sources for this category, repeated URLs listed once
    pub fn sources(&self) -> Vec<FeedSource> {
        self.feeds
            .iter()
            .unique()
            .map(|url| FeedSource {
                url: url.clone(),
                category: self.category.clone(),
            })
            .collect()
    }
}

/// Run-wide tunables plus the category → feeds mapping
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_entries_per_feed")]
    pub entries_per_feed: usize,
    #[serde(default = "default_max_items_per_category")]
    pub max_items_per_category: usize,
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,
    #[serde(default = "default_description_max_chars")]
    pub description_max_chars: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_placeholder_base")]
    pub placeholder_base: String,
    #[serde(default = "default_placeholder_title_chars")]
    pub placeholder_title_chars: usize,
    #[serde(default)]
    pub categories: Vec<CategoryFeeds>,
}

fn default_entries_per_feed() -> usize {
    3
}

fn default_max_items_per_category() -> usize {
    25
}

fn default_enrich_concurrency() -> usize {
    4
}

fn default_description_max_chars() -> usize {
    150
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_user_agent() -> String {
    concat!(
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) ",
        "AppleWebKit/537.36 (KHTML, like Gecko) ",
        "Chrome/127.0.0.0 Safari/537.36"
    )
    .to_string()
}

fn default_placeholder_base() -> String {
    "https://via.placeholder.com/320x180".to_string()
}

fn default_placeholder_title_chars() -> usize {
    40
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entries_per_feed: default_entries_per_feed(),
            max_items_per_category: default_max_items_per_category(),
            enrich_concurrency: default_enrich_concurrency(),
            description_max_chars: default_description_max_chars(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            placeholder_base: default_placeholder_base(),
            placeholder_title_chars: default_placeholder_title_chars(),
            categories: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, Box<dyn Error>> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.enrich_concurrency = config.enrich_concurrency.max(1);
        Ok(config)
    }

    /// Read and parse a YAML config file
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let yaml = fs::read_to_string(path).await?;
        let config = Self::from_yaml_str(&yaml)?;
        info!(
            categories = config.categories.len(),
            feeds = config.categories.iter().map(|c| c.feeds.len()).sum::<usize>(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

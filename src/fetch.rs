use crate::config::Config;
use crate::utils::truncate_for_log;
use futures::future::join_all;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Something that can GET a URL and hand back its body as text
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// reqwest-backed fetcher used for both feeds and article pages
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let res = self.client.get(url).send().await?.error_for_status()?;
        debug!(%url, final_url = %res.url(), status = %res.status(), "Fetched");
        Ok(res.text().await?)
    }
}

/// Fetch one URL; any failure is logged and becomes `None`
#[instrument(level = "debug", skip(fetcher))]
pub async fn fetch_text<F: Fetch>(fetcher: &F, url: &str) -> Option<String> {
    match fetcher.fetch(url).await {
        Ok(body) => {
            debug!(
                bytes = body.len(),
                preview = %truncate_for_log(&body, 120).replace('\n', " "),
                "Body received"
            );
            Some(body)
        }
        Err(e) => {
            warn!(%url, error = %e, "Fetch failed; treating as no data");
            None
        }
    }
}

/// Fetch every URL at once. Outcomes come back in input order and one
/// failure never affects its siblings.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn fetch_all<F: Fetch>(fetcher: &F, urls: &[String]) -> Vec<Option<String>> {
    join_all(urls.iter().map(|url| fetch_text(fetcher, url))).await
}


#[cfg(test)]
mod tests {
    use super::testing::FakeFetcher;
    use super::*;

    #[tokio::test]
    async fn test_fetch_text_absorbs_failure() {
        let fetcher = FakeFetcher::new().with("https://x/ok", "body");
        assert_eq!(fetch_text(&fetcher, "https://x/ok").await.as_deref(), Some("body"));
        assert_eq!(fetch_text(&fetcher, "https://x/missing").await, None);
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_order_and_isolates_failures() {
        let fetcher = FakeFetcher::new()
            .with("https://x/1", "one")
            .with("https://x/3", "three");
        let urls = vec![
            "https://x/1".to_string(),
            "https://x/2".to_string(),
            "https://x/3".to_string(),
        ];
        let out = fetch_all(&fetcher, &urls).await;
        assert_eq!(
            out,
            vec![Some("one".to_string()), None, Some("three".to_string())]
        );
        assert_eq!(fetcher.max_in_flight.get(), 3);
    }

    #[test]
    fn test_http_fetcher_builds_from_config() {
        assert!(HttpFetcher::new(&Config::default()).is_ok());
    }
}

use async_trait::async_trait;
use bm_core::{Error, Result};
use std::time::Duration;

/// Browser-like identity; some sites reject unidentified clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of raw page HTML. The HTTP implementation lives behind this seam
/// so pagination and orchestration can run against canned pages in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch a page. Network errors, timeouts, and non-2xx statuses are all
    /// failures; callers treat them as "no data", never as fatal.
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

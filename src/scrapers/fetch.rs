//! Plain HTTP GET for listing and article pages.

use crate::error::{NewsError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP client preconfigured with a request timeout and a browser-like
/// User-Agent; several outlets reject anything that does not look like one.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build the shared client.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Sent with every request.
    /// * `timeout` - Whole-request timeout; an expired request is a fetch failure.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch a page body, treating any non-2xx status as an error.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

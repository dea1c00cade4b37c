//! Async HTTP client wrapping reqwest.
//!
//! Just HTTP requests with redirects, per-request timeouts, and the
//! identifying user-agent. Status handling and retry live with the
//! phases — a non-200 here is data, not an error.

use anyhow::Result;
use std::time::Duration;

/// HTTP client shared by both network phases.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with the given identifying user-agent.
    pub fn new(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Single GET returning status and body text. Only network-level
    /// failures (DNS, connect, timeout) surface as `Err`.
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<(u16, String)> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok((status, body))
    }

    /// Single GET returning status and the raw body bytes.
    pub async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<(u16, Vec<u8>)> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default();
        Ok((status, body))
    }
}

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Status and raw body of the provider's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// The request/response primitive the backend posts payloads through.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body`, already encoded as JSON, to `url`.
    ///
    /// Only network-level failures are errors; any status code is a response.
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, anyhow::Error>;
}

pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, anyhow::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().context("Failed to build the HTTP client.")?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, anyhow::Error> {
        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to execute request to {}", url))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read the response body.")?;
        Ok(HttpResponse { status, body })
    }
}

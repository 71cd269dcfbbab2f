use std::future::Future;

use thiserror::Error;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const PREDICT_PATH: &str = "/predict";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("request to {url} failed: {reason}")]
    Connect { url: String, reason: String },
    /// A response arrived but its body could not be read.
    #[error("reading response body from {url} failed: {reason}")]
    Body { url: String, reason: String },
}

/// Sends a JSON body to a backend path and returns the raw response text.
/// Status codes are not interpreted; the caller decodes whatever came back.
pub trait Transport {
    fn post_json(
        &self,
        path: &str,
        body: String,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        // No timeout: requests wait as long as the platform transport allows.
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        path: &str,
        body: String,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        async move {
            let resp = request.send().await.map_err(|e| TransportError::Connect {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            debug!("[anemia-page] POST {} returned {}", url, resp.status());
            resp.text().await.map_err(|e| TransportError::Body {
                url,
                reason: e.to_string(),
            })
        }
    }
}

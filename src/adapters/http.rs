use crate::core::validator::INVALID_SERIES_FORMAT;
use crate::core::{ConfigProvider, Transport};
use crate::utils::error::{ProjectionError, Result, TransportFailureKind};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// reqwest-backed JSON transport rooted at a base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.into();
        validate_url("api_base_url", &base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            tracing::error!("API setup error: {}", e);
            ProjectionError::transport(TransportFailureKind::Setup, e.to_string())
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!("Could not read error response body: {}", e);
                String::new()
            });
            tracing::error!("API error response ({}): {}", status, body);
            return Err(ProjectionError::transport(
                TransportFailureKind::Responded,
                server_error_message(&body),
            ));
        }

        let body = response.text().await.map_err(classify)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Response body is not JSON: {}", e);
            ProjectionError::schema(INVALID_SERIES_FORMAT)
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("Making API request to: {}", url);
        self.send(
            self.client
                .get(&url)
                .header(CONTENT_TYPE, "application/json"),
        )
        .await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("Making API request to: {}", url);
        self.send(self.client.post(&url).json(body)).await
    }
}

// A JSON `error` field wins over the raw body text.
fn server_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "Server error".to_string();
    }

    serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| trimmed.to_string())
}

fn classify(e: reqwest::Error) -> ProjectionError {
    if e.is_builder() {
        tracing::error!("API setup error: {}", e);
        ProjectionError::transport(TransportFailureKind::Setup, e.to_string())
    } else {
        tracing::error!("API request error: {}", e);
        ProjectionError::transport(TransportFailureKind::NoResponse, "No response from server")
    }
}

use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// JSON-over-HTTP collaborator used by the store.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value>;
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
}

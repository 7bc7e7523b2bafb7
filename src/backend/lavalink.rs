use std::time::Duration;

use async_trait::async_trait;

use crate::common::BackendError;
use crate::config::BackendConfig;
use crate::protocol::LoadResult;

use super::SearchBackend;

/// Search backend speaking the Lavalink v4 REST API.
///
/// Only `loadtracks` is used; playback, sessions and the websocket stay with
/// the bot's connection layer.
pub struct LavalinkRestBackend {
    client: reqwest::Client,
    base_url: String,
    password: String,
}

impl LavalinkRestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl SearchBackend for LavalinkRestBackend {
    async fn resolve(&self, query: &str, source: Option<&str>) -> Result<LoadResult, BackendError> {
        let identifier = match source {
            Some(prefix) => format!("{}:{}", prefix, query),
            None => query.to_string(),
        };

        let url = format!(
            "{}/v4/loadtracks?identifier={}",
            self.base_url,
            urlencoding::encode(&identifier)
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.password)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let result: LoadResult = serde_json::from_str(&body)?;

        if let LoadResult::Error(err) = &result {
            tracing::debug!(
                "Node reported load error for '{}': {}",
                identifier,
                err.message.as_deref().unwrap_or("no message")
            );
            return Err(BackendError::Load {
                cause: err.cause.clone(),
                message: err.message.clone().unwrap_or_default(),
            });
        }

        Ok(result)
    }
}

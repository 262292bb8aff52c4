use crate::config::Config;
use crate::upstream::{UpstreamClient, UpstreamError};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifResult {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    images: Value,
}

pub struct GifLookup {
    upstream: UpstreamClient,
    url: String,
    api_key: String,
    country_token: String,
}

impl GifLookup {
    pub fn new(config: &Config) -> Self {
        Self {
            upstream: UpstreamClient::new("giphy", Duration::from_secs(config.upstream_timeout_secs)),
            url: config.giphy_search_url(),
            api_key: config.giphy_api_key.clone(),
            country_token: config.gif_country_token.clone(),
        }
    }

    /// Best-matching GIF for `phrase`, or `None` when the provider has nothing.
    pub async fn search(&self, phrase: &str) -> Result<Option<GifResult>, UpstreamError> {
        let query = format!("{} {}", self.country_token, phrase);
        tracing::debug!(query = %query, "searching for gif");

        let response: SearchResponse = self
            .upstream
            .fetch_json(&self.url, &[
                ("q", &query),
                ("limit", "1"),
                ("api_key", &self.api_key),
            ])
            .await?;

        let Some(first) = response.data.first() else {
            tracing::info!(query = %query, "no gif found");
            return Ok(None);
        };

        let original = &first.images["original"];
        let url = original["url"]
            .as_str()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| self.missing("images.original.url"))?;
        let width = dimension(&original["width"]).ok_or_else(|| self.missing("images.original.width"))?;
        let height = dimension(&original["height"]).ok_or_else(|| self.missing("images.original.height"))?;

        Ok(Some(GifResult {
            url: url.to_string(),
            width,
            height,
        }))
    }

    fn missing(&self, field: &'static str) -> UpstreamError {
        UpstreamError::UnexpectedShape {
            provider: self.upstream.provider(),
            field,
        }
    }
}

// Giphy reports pixel sizes as strings ("480").
fn dimension(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

use super::types::*;
use crate::config::Config;
use crate::upstream::{UpstreamClient, UpstreamError};
use std::time::Duration;

pub struct HolidayApiClient {
    upstream: UpstreamClient,
    url: String,
    api_key: String,
}

impl HolidayApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            upstream: UpstreamClient::new(
                "holiday-api",
                Duration::from_secs(config.upstream_timeout_secs),
            ),
            url: config.holiday_url(),
            api_key: config.holiday_api_key.clone(),
        }
    }

    pub async fn get_holidays(
        &self,
        country: &str,
        year: i32,
    ) -> Result<Vec<HolidayRecord>, UpstreamError> {
        let year = year.to_string();
        let response: HolidayApiResponse = self
            .upstream
            .fetch_json(&self.url, &[
                ("country", country),
                ("year", &year),
                ("key", &self.api_key),
            ])
            .await?;

        if let Some(message) = response.error {
            return Err(UpstreamError::Provider {
                provider: self.upstream.provider(),
                message,
            });
        }
        if let Some(status) = response.status.filter(|status| *status != 200) {
            return Err(UpstreamError::Provider {
                provider: self.upstream.provider(),
                message: format!("status {}", status),
            });
        }

        Ok(response.holidays.unwrap_or_default())
    }
}

//! CoinGecko historical price client.

use super::{DataSourceError, PriceDataSource};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout for price lookups.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default CoinGecko API base URL.
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Price data source backed by CoinGecko's `/coins/{id}/history` endpoint.
#[derive(Debug, Clone)]
pub struct CoinGeckoDataSource {
    client: Client,
    base_url: String,
}

impl CoinGeckoDataSource {
    /// Create a new CoinGecko data source.
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Create with the public CoinGecko API URL.
    pub fn default_url() -> Self {
        Self::new(DEFAULT_PRICE_API_URL.to_string())
    }
}

#[async_trait]
impl PriceDataSource for CoinGeckoDataSource {
    async fn fetch_daily_price(&self, day: NaiveDate) -> Result<Option<f64>, DataSourceError> {
        // History endpoint takes dd-mm-yyyy, day and month unpadded.
        let date_str = format!("{}-{}-{}", day.day(), day.month(), day.year());
        let url = format!("{}/coins/solana/history", self.base_url);

        debug!("Fetching SOL price for {}", date_str);

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[("date", date_str.as_str()), ("localization", "false")])
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == 429 {
            return Err(DataSourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(DataSourceError::HttpError {
                status: status.as_u16(),
                message: if status.is_server_error() {
                    "Server error".to_string()
                } else {
                    "Client error".to_string()
                },
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))?;

        Ok(body
            .get("market_data")
            .and_then(|m| m.get("current_price"))
            .and_then(|p| p.get("usd"))
            .and_then(|v| v.as_f64()))
    }
}

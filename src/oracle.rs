//! Day-granularity USD price oracle for the native asset.
//!
//! Prices are cached per UTC calendar day for the lifetime of the process. A
//! lookup never fails: when the upstream service throttles, errors, or has no
//! record for the day, a fixed fallback price is returned and cached as
//! provisional, so a later scan can pick up the real price once the upstream
//! recovers.

use crate::datasource::PriceDataSource;
use crate::domain::TimeS;
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Price used when the upstream has no answer for a day.
pub const FALLBACK_SOL_PRICE_USD: f64 = 170.0;

/// How long a fallback-filled cache entry suppresses re-queries.
const PROVISIONAL_TTL: Duration = Duration::from_secs(900);

/// Delays applied around upstream price queries.
#[derive(Debug, Clone, Copy)]
pub struct OraclePacing {
    /// Wait before every upstream query, on cache miss.
    pub pre_query: Duration,
    /// Extra wait after a throttled query, before giving up on it.
    pub throttle_penalty: Duration,
}

impl OraclePacing {
    /// Production delays tuned for free-tier rate limits.
    pub fn standard() -> Self {
        Self {
            pre_query: Duration::from_millis(1500),
            throttle_penalty: Duration::from_secs(5),
        }
    }

    /// No delays, for tests.
    pub fn none() -> Self {
        Self {
            pre_query: Duration::ZERO,
            throttle_penalty: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    /// Set for fallback entries; a real upstream price caches indefinitely.
    provisional_until: Option<Instant>,
}

/// Caching price oracle. `price_at` never fails.
pub struct PriceOracle {
    source: Arc<dyn PriceDataSource>,
    pacing: OraclePacing,
    cache: Mutex<HashMap<NaiveDate, CachedPrice>>,
}

impl PriceOracle {
    /// Create a new oracle over a price data source.
    pub fn new(source: Arc<dyn PriceDataSource>, pacing: OraclePacing) -> Self {
        Self {
            source,
            pacing,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// USD price of the native asset at `timestamp`, at day granularity.
    pub async fn price_at(&self, timestamp: TimeS) -> f64 {
        let day = day_of(timestamp);

        if let Some(price) = self.cached(day).await {
            return price;
        }

        // Cache miss. The lock is not held across the fetch, so two scans
        // resolving the same day may both query; both cache the same fact.
        tokio::time::sleep(self.pacing.pre_query).await;

        match self.source.fetch_daily_price(day).await {
            Ok(Some(price)) => {
                info!("SOL price on {}: ${:.2}", day, price);
                self.store(day, price, None).await;
                price
            }
            Ok(None) => {
                warn!("No SOL price recorded for {}, using fallback", day);
                self.store_fallback(day).await
            }
            Err(e) if e.is_rate_limit() => {
                warn!("Price service rate limit hit, waiting before fallback");
                tokio::time::sleep(self.pacing.throttle_penalty).await;
                self.store_fallback(day).await
            }
            Err(e) => {
                error!("Error fetching SOL price for {}: {}", day, e);
                self.store_fallback(day).await
            }
        }
    }

    async fn cached(&self, day: NaiveDate) -> Option<f64> {
        let cache = self.cache.lock().await;
        let entry = cache.get(&day)?;
        match entry.provisional_until {
            Some(deadline) if Instant::now() >= deadline => None,
            _ => Some(entry.price),
        }
    }

    async fn store(&self, day: NaiveDate, price: f64, provisional_until: Option<Instant>) {
        self.cache.lock().await.insert(
            day,
            CachedPrice {
                price,
                provisional_until,
            },
        );
    }

    async fn store_fallback(&self, day: NaiveDate) -> f64 {
        info!("Using fallback SOL price: ${}", FALLBACK_SOL_PRICE_USD);
        self.store(
            day,
            FALLBACK_SOL_PRICE_USD,
            Some(Instant::now() + PROVISIONAL_TTL),
        )
        .await;
        FALLBACK_SOL_PRICE_USD
    }
}

/// UTC calendar day containing `timestamp`.
fn day_of(timestamp: TimeS) -> NaiveDate {
    DateTime::from_timestamp(timestamp.as_i64(), 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .date_naive()
}

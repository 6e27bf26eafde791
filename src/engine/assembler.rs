//! Draw assembly: ordering, USD valuation, filtering, and numbering.

use crate::domain::{ClassifiedBuy, NumberedBuy, PricedBuy, TimeS};
use crate::oracle::PriceOracle;
use crate::scan::ScanError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Most buys a single draw can number.
pub const DRAW_CAP: usize = 69;

/// Outcome of a draw assembly run.
///
/// `total_buys` counts every classified buy before the minimum-USD filter,
/// so callers can tell "nothing qualified" apart from "nothing happened".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawReport {
    pub total_buys: usize,
    pub numbered_buys: Vec<NumberedBuy>,
}

/// Turns classified buys into a numbered draw sheet.
#[derive(Clone)]
pub struct DrawAssembler {
    oracle: Arc<PriceOracle>,
    lookup_pace: Duration,
}

impl DrawAssembler {
    pub fn new(oracle: Arc<PriceOracle>, lookup_pace: Duration) -> Self {
        Self {
            oracle,
            lookup_pace,
        }
    }

    /// Assemble a draw: sort chronologically, price, filter, cap, number.
    ///
    /// Buys sharing a block time keep their discovery order. When `min_usd`
    /// is set, buys strictly below it are dropped after pricing, but still
    /// count toward `total_buys`. At most [`DRAW_CAP`] buys are numbered.
    pub async fn assemble(
        &self,
        mut raw: Vec<ClassifiedBuy>,
        min_usd: Option<f64>,
        timezone: Tz,
        cancel: &CancellationToken,
    ) -> Result<DrawReport, ScanError> {
        raw.sort_by_key(|buy| buy.timestamp);
        let total_buys = raw.len();

        let priced = self.price_all(raw, cancel).await?;
        let numbered_buys: Vec<NumberedBuy> = priced
            .into_iter()
            .filter(|buy| min_usd.map_or(true, |min| buy.usd_amount >= min))
            .take(DRAW_CAP)
            .enumerate()
            .map(|(i, priced)| NumberedBuy {
                formatted_date: format_block_time(priced.buy.timestamp, timezone),
                priced,
                number: (i + 1) as u32,
            })
            .collect();

        info!(
            "Assembled draw: {} buys classified, {} numbered",
            total_buys,
            numbered_buys.len()
        );
        Ok(DrawReport {
            total_buys,
            numbered_buys,
        })
    }

    /// Attach USD valuations to buys, in the order given.
    ///
    /// Pricing cannot fail; days the oracle cannot resolve carry its fallback
    /// price. Each lookup is paced to keep the oracle's upstream happy.
    pub async fn price_all(
        &self,
        raw: Vec<ClassifiedBuy>,
        cancel: &CancellationToken,
    ) -> Result<Vec<PricedBuy>, ScanError> {
        let mut priced = Vec::with_capacity(raw.len());
        for buy in raw {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            let price = self.oracle.price_at(buy.timestamp).await;
            priced.push(PricedBuy::from_classified(buy, price));
            tokio::time::sleep(self.lookup_pace).await;
        }
        Ok(priced)
    }
}

/// Render a block time in the caller's timezone, en-US style.
fn format_block_time(timestamp: TimeS, timezone: Tz) -> String {
    let utc = DateTime::<Utc>::from_timestamp(timestamp.0, 0).unwrap_or(DateTime::UNIX_EPOCH);
    utc.with_timezone(&timezone)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

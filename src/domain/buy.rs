//! Buy types flowing through the classification and draw pipeline.
//!
//! These serialize with the wire field names consumers already depend on
//! (`tokenAmount`, `solAmount`, `priceInSol`, `solPriceUSD`, `usdAmount`,
//! `priceInUSD`, `number`, `formattedDate`), so they can be embedded in API
//! responses and saved draw records without a separate DTO layer.

use crate::domain::{Signature, TimeS, Wallet};
use serde::{Deserialize, Serialize};

/// A purchase of the target token identified from balance deltas.
///
/// Only created for a non-excluded wallet with a net positive token gain and
/// an inferable native-asset spend: `token_amount > 0` and `sol_amount > 0`
/// hold for every instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedBuy {
    /// Buying wallet.
    pub wallet: Wallet,
    /// Amount of the target token acquired, in user-facing units.
    pub token_amount: f64,
    /// Native-asset spend attributed to this buy, in whole units.
    pub sol_amount: f64,
    /// Implied per-token price in the native asset.
    pub price_in_sol: f64,
    /// Block time of the transaction.
    pub timestamp: TimeS,
    /// Transaction signature.
    pub signature: Signature,
}

/// A classified buy with USD valuation attached.
///
/// Invariant: `usd_amount = sol_amount * sol_price_usd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedBuy {
    #[serde(flatten)]
    pub buy: ClassifiedBuy,
    /// USD price of the native asset on the buy's calendar day.
    #[serde(rename = "solPriceUSD")]
    pub sol_price_usd: f64,
    /// Total USD value of the spend.
    pub usd_amount: f64,
    /// Per-token USD price.
    #[serde(rename = "priceInUSD")]
    pub price_in_usd: f64,
}

impl PricedBuy {
    /// Attach a USD valuation to a classified buy.
    pub fn from_classified(buy: ClassifiedBuy, sol_price_usd: f64) -> Self {
        let usd_amount = buy.sol_amount * sol_price_usd;
        let price_in_usd = usd_amount / buy.token_amount;
        PricedBuy {
            buy,
            sol_price_usd,
            usd_amount,
            price_in_usd,
        }
    }
}

/// A priced buy holding a draw number.
///
/// Numbers are 1-based, unique within a single assembly run, monotonic with
/// chronological order, and never exceed the draw cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberedBuy {
    #[serde(flatten)]
    pub priced: PricedBuy,
    /// Assigned draw number, 1..=69.
    pub number: u32,
    /// Block time rendered in the caller's timezone.
    pub formatted_date: String,
}

//! Data source abstraction for the ledger RPC and the historical price service.

use crate::domain::{EnrichedTransaction, Mint, Signature, SignatureRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;

pub mod coingecko;
pub mod mock;
pub mod rpc;

pub use coingecko::CoinGeckoDataSource;
pub use mock::{MockLedgerDataSource, MockPriceDataSource};
pub use rpc::RpcDataSource;

/// Ledger access: signature-index pagination and transaction detail.
///
/// Implementations perform single requests; retry, backoff, and pacing are
/// the caller's concern so they stay testable with scripted sources.
#[async_trait]
pub trait LedgerDataSource: Send + Sync + fmt::Debug {
    /// Fetch one page of the signature index for an account, newest first.
    ///
    /// # Arguments
    /// * `account` - Account whose signature index to read (the token mint)
    /// * `before` - Exclusive upper-bound cursor; None fetches the newest page
    /// * `limit` - Maximum entries to return (upstream caps at 100)
    async fn fetch_signature_page(
        &self,
        account: &Mint,
        before: Option<&Signature>,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>, DataSourceError>;

    /// Fetch full parsed transaction detail for a signature.
    ///
    /// # Returns
    /// The balance-change record, or None when the ledger has no entry for
    /// this signature.
    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<EnrichedTransaction>, DataSourceError>;
}

/// Historical price access for the native asset.
#[async_trait]
pub trait PriceDataSource: Send + Sync + fmt::Debug {
    /// USD price of the native asset on a calendar day.
    ///
    /// # Returns
    /// The day's price, or None when the service has no record for that day.
    async fn fetch_daily_price(&self, day: NaiveDate) -> Result<Option<f64>, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded (caller should implement backoff)
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

impl DataSourceError {
    /// Whether this error is an upstream throttle signal.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, DataSourceError::RateLimited)
    }
}

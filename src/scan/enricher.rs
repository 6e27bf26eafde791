//! Transaction enrichment with throttle-aware retries.

use crate::datasource::{DataSourceError, LedgerDataSource};
use crate::domain::{EnrichedTransaction, Signature};
use crate::scan::ThrottleBackoff;
use backoff::future::retry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Fetches full transaction records, retrying throttled requests.
///
/// Every outcome funnels to `Option`: missing records, swaps with no token
/// activity, exhausted retries, and hard errors all come back `None` so one
/// bad transaction never sinks a scan.
#[derive(Clone)]
pub struct TransactionEnricher {
    source: Arc<dyn LedgerDataSource>,
    pace: Duration,
    backoff_base: Duration,
}

impl TransactionEnricher {
    pub fn new(source: Arc<dyn LedgerDataSource>, pace: Duration) -> Self {
        Self {
            source,
            pace,
            backoff_base: Duration::from_secs(2),
        }
    }

    /// Same retry schedule with a custom step, for tests.
    pub fn with_backoff_base(
        source: Arc<dyn LedgerDataSource>,
        pace: Duration,
        base: Duration,
    ) -> Self {
        Self {
            source,
            pace,
            backoff_base: base,
        }
    }

    /// Fetch one transaction, retrying on throttling only.
    ///
    /// Non-throttle errors fail immediately. A record with no post-transaction
    /// token balances is treated as absent since nothing can be classified
    /// from it. Every call ends with the inter-request pace, win or lose.
    pub async fn fetch(&self, signature: &Signature) -> Option<EnrichedTransaction> {
        let outcome = self.fetch_inner(signature).await;
        tokio::time::sleep(self.pace).await;
        outcome
    }

    async fn fetch_inner(&self, signature: &Signature) -> Option<EnrichedTransaction> {
        let policy = ThrottleBackoff::with_base(self.backoff_base);
        let result = retry(policy, || async {
            match self.source.fetch_transaction(signature).await {
                Ok(tx) => Ok(tx),
                Err(DataSourceError::RateLimited) => {
                    warn!("Rate limited fetching {}, will retry", signature.short());
                    Err(backoff::Error::transient(DataSourceError::RateLimited))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await;

        match result {
            Ok(Some(tx)) => {
                if tx.post_token_balances.is_empty() {
                    debug!("Transaction {} has no token activity", signature.short());
                    None
                } else {
                    Some(tx)
                }
            }
            Ok(None) => {
                debug!("No ledger record for {}", signature.short());
                None
            }
            Err(e) if e.is_rate_limit() => {
                error!(
                    "Giving up on {} after repeated rate limits",
                    signature.short()
                );
                None
            }
            Err(e) => {
                warn!("Failed to fetch transaction {}: {}", signature.short(), e);
                None
            }
        }
    }
}

//! Mock data sources for testing without network calls.

use super::{DataSourceError, LedgerDataSource, PriceDataSource};
use crate::domain::{EnrichedTransaction, Mint, Signature, SignatureRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory ledger serving a scripted signature index and transaction set.
///
/// The signature index is held newest-first, exactly as the RPC returns it,
/// and pages are cut with the same `before`-cursor semantics, so pagination
/// logic is exercised for real.
#[derive(Debug, Default)]
pub struct MockLedgerDataSource {
    signatures: Vec<SignatureRecord>,
    transactions: HashMap<String, EnrichedTransaction>,
    fail_pages_from: Option<usize>,
    fail_transactions: Vec<String>,
    throttles: Mutex<HashMap<String, usize>>,
    page_calls: Mutex<usize>,
    tx_calls: Mutex<HashMap<String, usize>>,
}

impl MockLedgerDataSource {
    /// Create a new mock ledger with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full signature index, newest first.
    pub fn with_signatures(mut self, signatures: Vec<SignatureRecord>) -> Self {
        self.signatures = signatures;
        self
    }

    /// Add a transaction, keyed by its signature.
    pub fn with_transaction(mut self, tx: EnrichedTransaction) -> Self {
        self.transactions.insert(tx.signature.as_str().to_string(), tx);
        self
    }

    /// Fail every page request whose zero-based index is at or past `page`.
    pub fn failing_pages_from(mut self, page: usize) -> Self {
        self.fail_pages_from = Some(page);
        self
    }

    /// Fail every detail fetch for `signature` with a network error.
    pub fn failing_transaction(mut self, signature: &str) -> Self {
        self.fail_transactions.push(signature.to_string());
        self
    }

    /// Answer the first `count` detail fetches for `signature` with a
    /// rate-limit error before serving the real data.
    pub fn with_transaction_throttles(self, signature: &str, count: usize) -> Self {
        self.throttles
            .lock()
            .unwrap()
            .insert(signature.to_string(), count);
        self
    }

    /// Number of page requests served (including failed ones).
    pub fn page_requests(&self) -> usize {
        *self.page_calls.lock().unwrap()
    }

    /// Number of detail fetches attempted for `signature`.
    pub fn transaction_calls(&self, signature: &str) -> usize {
        self.tx_calls
            .lock()
            .unwrap()
            .get(signature)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl LedgerDataSource for MockLedgerDataSource {
    async fn fetch_signature_page(
        &self,
        _account: &Mint,
        before: Option<&Signature>,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>, DataSourceError> {
        let call_index = {
            let mut calls = self.page_calls.lock().unwrap();
            let index = *calls;
            *calls += 1;
            index
        };

        if let Some(from) = self.fail_pages_from {
            if call_index >= from {
                return Err(DataSourceError::NetworkError(
                    "injected page failure".to_string(),
                ));
            }
        }

        let start = match before {
            None => 0,
            Some(cursor) => match self
                .signatures
                .iter()
                .position(|r| r.signature == *cursor)
            {
                Some(pos) => pos + 1,
                None => return Ok(Vec::new()),
            },
        };

        Ok(self
            .signatures
            .iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<EnrichedTransaction>, DataSourceError> {
        *self
            .tx_calls
            .lock()
            .unwrap()
            .entry(signature.as_str().to_string())
            .or_insert(0) += 1;

        if self.fail_transactions.iter().any(|s| s == signature.as_str()) {
            return Err(DataSourceError::NetworkError(
                "injected transaction failure".to_string(),
            ));
        }

        {
            let mut throttles = self.throttles.lock().unwrap();
            if let Some(remaining) = throttles.get_mut(signature.as_str()) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(DataSourceError::RateLimited);
                }
            }
        }

        Ok(self.transactions.get(signature.as_str()).cloned())
    }
}

/// Mock price service with per-day prices and scripted throttling.
#[derive(Debug, Default)]
pub struct MockPriceDataSource {
    prices: HashMap<NaiveDate, f64>,
    fail_always: bool,
    throttles: Mutex<usize>,
    queries: Mutex<usize>,
}

impl MockPriceDataSource {
    /// Create a new mock price source with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price for a calendar day.
    pub fn with_price(mut self, day: NaiveDate, price: f64) -> Self {
        self.prices.insert(day, price);
        self
    }

    /// Answer the next `count` queries with a rate-limit error.
    pub fn with_throttles(self, count: usize) -> Self {
        *self.throttles.lock().unwrap() = count;
        self
    }

    /// Fail every query with a network error.
    pub fn failing(mut self) -> Self {
        self.fail_always = true;
        self
    }

    /// Number of queries served.
    pub fn queries(&self) -> usize {
        *self.queries.lock().unwrap()
    }
}

#[async_trait]
impl PriceDataSource for MockPriceDataSource {
    async fn fetch_daily_price(&self, day: NaiveDate) -> Result<Option<f64>, DataSourceError> {
        *self.queries.lock().unwrap() += 1;

        {
            let mut throttles = self.throttles.lock().unwrap();
            if *throttles > 0 {
                *throttles -= 1;
                return Err(DataSourceError::RateLimited);
            }
        }

        if self.fail_always {
            return Err(DataSourceError::NetworkError(
                "injected price failure".to_string(),
            ));
        }

        Ok(self.prices.get(&day).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeS;

    fn record(sig: &str, block_time: i64) -> SignatureRecord {
        SignatureRecord::new(Signature::new(sig.to_string()), Some(TimeS::new(block_time)))
    }

    #[tokio::test]
    async fn test_mock_ledger_pages_follow_cursor() {
        let mock = MockLedgerDataSource::new().with_signatures(vec![
            record("sig3", 3000),
            record("sig2", 2000),
            record("sig1", 1000),
        ]);
        let mint = Mint::new("tokenMint".to_string());

        let page1 = mock.fetch_signature_page(&mint, None, 2).await.unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].signature.as_str(), "sig3");

        let cursor = page1.last().unwrap().signature.clone();
        let page2 = mock
            .fetch_signature_page(&mint, Some(&cursor), 2)
            .await
            .unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].signature.as_str(), "sig1");
    }

    #[tokio::test]
    async fn test_mock_ledger_injected_page_failure() {
        let mock = MockLedgerDataSource::new()
            .with_signatures(vec![record("sig1", 1000)])
            .failing_pages_from(0);
        let mint = Mint::new("tokenMint".to_string());

        let result = mock.fetch_signature_page(&mint, None, 100).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_ledger_throttles_then_serves() {
        let tx = EnrichedTransaction {
            signature: Signature::new("sig1".to_string()),
            block_time: Some(TimeS::new(1000)),
            account_keys: vec![],
            pre_balances: vec![],
            post_balances: vec![],
            pre_token_balances: vec![],
            post_token_balances: vec![],
        };
        let mock = MockLedgerDataSource::new()
            .with_transaction(tx)
            .with_transaction_throttles("sig1", 1);
        let sig = Signature::new("sig1".to_string());

        let first = mock.fetch_transaction(&sig).await;
        assert!(matches!(first, Err(DataSourceError::RateLimited)));

        let second = mock.fetch_transaction(&sig).await.unwrap();
        assert!(second.is_some());
        assert_eq!(mock.transaction_calls("sig1"), 2);
    }

    #[tokio::test]
    async fn test_mock_price_source() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mock = MockPriceDataSource::new().with_price(day, 150.0);

        let price = mock.fetch_daily_price(day).await.unwrap();
        assert_eq!(price, Some(150.0));

        let other = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
        let missing = mock.fetch_daily_price(other).await.unwrap();
        assert_eq!(missing, None);
        assert_eq!(mock.queries(), 2);
    }
}

//! Paginated signature discovery over a time window.

use crate::datasource::LedgerDataSource;
use crate::domain::{Mint, Signature, SignatureRecord, TimeS};
use crate::scan::{Pacing, ScanError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Signatures requested per page.
pub const PAGE_LIMIT: usize = 100;
/// Hard cap on pages walked per scan.
pub const MAX_PAGES: usize = 20;

/// Walks an account's signature history newest-first, keeping the records
/// whose block time falls inside the requested window.
#[derive(Clone)]
pub struct SignatureScanner {
    source: Arc<dyn LedgerDataSource>,
    pacing: Pacing,
}

impl SignatureScanner {
    pub fn new(source: Arc<dyn LedgerDataSource>, pacing: Pacing) -> Self {
        Self { source, pacing }
    }

    /// Collect every in-window signature for `token`, oldest first.
    ///
    /// Pagination stops at the first record older than `start` (history is
    /// newest-first, so nothing beyond it can qualify), on a short page, at
    /// [`MAX_PAGES`], or on a page error. A failed page logs a warning and
    /// returns what was collected so far; only cancellation aborts the scan.
    pub async fn scan(
        &self,
        token: &Mint,
        start: TimeS,
        end: TimeS,
        cancel: &CancellationToken,
    ) -> Result<Vec<SignatureRecord>, ScanError> {
        let mut collected: Vec<SignatureRecord> = Vec::new();
        let mut before: Option<Signature> = None;
        let mut pages = 0;

        while pages < MAX_PAGES {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let records = match self
                .source
                .fetch_signature_page(token, before.as_ref(), PAGE_LIMIT)
                .await
            {
                Ok(records) => records,
                Err(e) => {
                    warn!("Signature page {} failed, keeping partial scan: {}", pages + 1, e);
                    break;
                }
            };
            pages += 1;

            if records.is_empty() {
                debug!("Signature history exhausted after {} pages", pages);
                break;
            }

            let mut reached_start = false;
            let mut kept = 0;
            for record in &records {
                match record.block_time {
                    Some(t) if t < start => {
                        reached_start = true;
                        break;
                    }
                    Some(t) if t <= end => {
                        collected.push(record.clone());
                        kept += 1;
                    }
                    // Newer than the window, or no block time: skip.
                    _ => {}
                }
            }
            debug!(
                "Page {}: {} signatures, {} in window",
                pages,
                records.len(),
                kept
            );

            if reached_start || records.len() < PAGE_LIMIT {
                break;
            }
            before = records.last().map(|r| r.signature.clone());
            tokio::time::sleep(self.pacing.signature_page).await;
        }

        // Pages arrive newest-first; downstream wants chronological order.
        collected.sort_by_key(|record| record.block_time);
        info!(
            "Found {} signatures in window across {} pages",
            collected.len(),
            pages
        );
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MockLedgerDataSource;

    fn record(signature: &str, block_time: i64) -> SignatureRecord {
        SignatureRecord::new(
            Signature::new(signature.to_string()),
            Some(TimeS::new(block_time)),
        )
    }

    fn token() -> Mint {
        Mint::new("tokenMint1111111111111111111111111111111111".to_string())
    }

    fn scanner(source: MockLedgerDataSource) -> (SignatureScanner, Arc<MockLedgerDataSource>) {
        let source = Arc::new(source);
        (
            SignatureScanner::new(source.clone(), Pacing::none()),
            source,
        )
    }

    #[tokio::test]
    async fn test_scan_keeps_only_in_window_records() {
        // Newest-first history: one after the window, two inside, one before.
        let source = MockLedgerDataSource::new().with_signatures(vec![
            record("after", 2_000),
            record("in2", 1_500),
            record("in1", 1_200),
            record("before", 500),
        ]);
        let (scanner, _) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(1_000),
                TimeS::new(1_800),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let sigs: Vec<&str> = records.iter().map(|r| r.signature.as_str()).collect();
        assert_eq!(sigs, vec!["in1", "in2"]);
    }

    #[tokio::test]
    async fn test_scan_result_is_chronological() {
        let source = MockLedgerDataSource::new().with_signatures(vec![
            record("newest", 1_700),
            record("middle", 1_500),
            record("oldest", 1_200),
        ]);
        let (scanner, _) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(1_000),
                TimeS::new(1_800),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let times: Vec<i64> = records
            .iter()
            .map(|r| r.block_time.unwrap().0)
            .collect();
        assert_eq!(times, vec![1_200, 1_500, 1_700]);
    }

    #[tokio::test]
    async fn test_scan_follows_cursor_across_pages() {
        // 150 records spanning two pages, all inside the window.
        let history: Vec<SignatureRecord> = (0..150)
            .map(|i| record(&format!("sig{i}"), 10_000 - i))
            .collect();
        let source = MockLedgerDataSource::new().with_signatures(history);
        let (scanner, source) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(0),
                TimeS::new(20_000),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 150);
        assert_eq!(source.page_requests(), 2);
    }

    #[tokio::test]
    async fn test_scan_stops_at_first_record_older_than_window() {
        // Page one crosses the window start, so the scan must not request
        // a second page even though more history exists.
        let mut history: Vec<SignatureRecord> = (0..50)
            .map(|i| record(&format!("in{i}"), 5_000 - i))
            .collect();
        history.push(record("too-old", 100));
        let extra: Vec<SignatureRecord> = (0..100).map(|i| record(&format!("x{i}"), 90 - i)).collect();
        history.extend(extra);
        let source = MockLedgerDataSource::new().with_signatures(history);
        let (scanner, source) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(1_000),
                TimeS::new(6_000),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 50);
        assert_eq!(source.page_requests(), 1);
    }

    #[tokio::test]
    async fn test_scan_honors_page_cap() {
        // More full pages than the cap allows.
        let history: Vec<SignatureRecord> = (0..2_500)
            .map(|i| record(&format!("sig{i}"), 1_000_000 - i))
            .collect();
        let source = MockLedgerDataSource::new().with_signatures(history);
        let (scanner, source) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(0),
                TimeS::new(2_000_000),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(source.page_requests(), MAX_PAGES);
        assert_eq!(records.len(), MAX_PAGES * PAGE_LIMIT);
    }

    #[tokio::test]
    async fn test_scan_stops_after_short_page() {
        let history: Vec<SignatureRecord> =
            (0..30).map(|i| record(&format!("sig{i}"), 5_000 - i)).collect();
        let source = MockLedgerDataSource::new().with_signatures(history);
        let (scanner, source) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(0),
                TimeS::new(10_000),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 30);
        assert_eq!(source.page_requests(), 1);
    }

    #[tokio::test]
    async fn test_page_failure_keeps_partial_scan() {
        let history: Vec<SignatureRecord> = (0..150)
            .map(|i| record(&format!("sig{i}"), 10_000 - i))
            .collect();
        let source = MockLedgerDataSource::new()
            .with_signatures(history)
            .failing_pages_from(1);
        let (scanner, _) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(0),
                TimeS::new(20_000),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        // First page survived, second failed.
        assert_eq!(records.len(), 100);
    }

    #[tokio::test]
    async fn test_records_without_block_time_skipped() {
        let source = MockLedgerDataSource::new().with_signatures(vec![
            record("in1", 1_500),
            SignatureRecord::new(Signature::new("untimed".to_string()), None),
            record("in2", 1_200),
        ]);
        let (scanner, _) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(1_000),
                TimeS::new(1_800),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let sigs: Vec<&str> = records.iter().map(|r| r.signature.as_str()).collect();
        assert_eq!(sigs, vec!["in2", "in1"]);
    }

    #[tokio::test]
    async fn test_window_boundaries_inclusive() {
        let source = MockLedgerDataSource::new().with_signatures(vec![
            record("at-end", 1_800),
            record("at-start", 1_000),
        ]);
        let (scanner, _) = scanner(source);

        let records = scanner
            .scan(
                &token(),
                TimeS::new(1_000),
                TimeS::new(1_800),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_scan_returns_no_partial_result() {
        let source = MockLedgerDataSource::new().with_signatures(vec![record("sig", 1_500)]);
        let (scanner, _) = scanner(source);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = scanner
            .scan(&token(), TimeS::new(1_000), TimeS::new(1_800), &cancel)
            .await;

        assert!(matches!(result, Err(ScanError::Cancelled)));
    }
}

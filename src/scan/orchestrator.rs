//! Sequential scan pipeline: discover signatures, enrich, classify, assemble.

use crate::domain::{ClassifiedBuy, Mint, PricedBuy, TimeS};
use crate::engine::{classify_buys, DrawAssembler, DrawReport};
use crate::exclusions::ExclusionRegistry;
use crate::scan::{ScanError, SignatureScanner, TransactionEnricher};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// One scan's input window.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub token: Mint,
    pub start: TimeS,
    pub end: TimeS,
}

/// Raw scan outcome: every classified buy priced, nothing filtered.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// Signatures found in the window, including ones that enriched to
    /// nothing.
    pub total_transactions: usize,
    pub buys: Vec<PricedBuy>,
}

/// Drives a full scan one transaction at a time.
///
/// The pipeline is deliberately sequential: a single worker walking
/// signatures in order is what keeps free-tier RPC endpoints from
/// throttling the whole run. Partial upstream failures degrade the result,
/// they never abort it; only cancellation does.
#[derive(Clone)]
pub struct ScanOrchestrator {
    scanner: SignatureScanner,
    enricher: TransactionEnricher,
    assembler: DrawAssembler,
    exclusions: Arc<ExclusionRegistry>,
}

impl ScanOrchestrator {
    pub fn new(
        scanner: SignatureScanner,
        enricher: TransactionEnricher,
        assembler: DrawAssembler,
        exclusions: Arc<ExclusionRegistry>,
    ) -> Self {
        Self {
            scanner,
            enricher,
            assembler,
            exclusions,
        }
    }

    /// Scan the window and assemble a numbered draw.
    pub async fn run_draw(
        &self,
        request: &ScanRequest,
        min_usd: Option<f64>,
        timezone: Tz,
        cancel: &CancellationToken,
    ) -> Result<DrawReport, ScanError> {
        let (_, buys) = self.classify_window(request, cancel).await?;
        self.assembler
            .assemble(buys, min_usd, timezone, cancel)
            .await
    }

    /// Scan the window and return every buy priced, unfiltered and uncapped.
    pub async fn scan_all(
        &self,
        request: &ScanRequest,
        cancel: &CancellationToken,
    ) -> Result<ScanSummary, ScanError> {
        let (total_transactions, buys) = self.classify_window(request, cancel).await?;
        let buys = self.assembler.price_all(buys, cancel).await?;
        Ok(ScanSummary {
            total_transactions,
            buys,
        })
    }

    async fn classify_window(
        &self,
        request: &ScanRequest,
        cancel: &CancellationToken,
    ) -> Result<(usize, Vec<ClassifiedBuy>), ScanError> {
        info!(
            "Scanning {} from {} to {}",
            request.token,
            request.start.as_i64(),
            request.end.as_i64()
        );
        let signatures = self
            .scanner
            .scan(&request.token, request.start, request.end, cancel)
            .await?;
        let total = signatures.len();

        let mut buys = Vec::new();
        for (index, record) in signatures.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            if (index + 1) % 10 == 0 {
                info!("Processing transaction {}/{}", index + 1, total);
            }
            if let Some(tx) = self.enricher.fetch(&record.signature).await {
                buys.extend(classify_buys(&tx, &request.token, &self.exclusions));
            }
        }

        info!("Classified {} buys from {} transactions", buys.len(), total);
        Ok((total, buys))
    }
}

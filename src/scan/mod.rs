//! The scan pipeline: signature discovery, enrichment, classification, and
//! draw assembly, run by a single sequential worker.

use thiserror::Error;

pub mod enricher;
pub mod orchestrator;
pub mod pacing;
pub mod scanner;

pub use enricher::TransactionEnricher;
pub use orchestrator::{ScanOrchestrator, ScanRequest, ScanSummary};
pub use pacing::{Pacing, ThrottleBackoff, MAX_THROTTLE_RETRIES};
pub use scanner::{SignatureScanner, MAX_PAGES, PAGE_LIMIT};

/// Pipeline-level failure.
///
/// Upstream trouble degrades results instead of erroring; the only way a
/// running scan fails is being told to stop.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The caller abandoned the run. Partial work is discarded.
    #[error("Scan cancelled")]
    Cancelled,
}

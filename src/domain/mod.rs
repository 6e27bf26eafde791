//! Domain types for the token buy-draw pipeline.
//!
//! This module provides:
//! - Domain primitives: TimeS, Signature, Wallet, Mint
//! - Ledger transaction types with pre/post balance records
//! - Buy types (classified, priced, numbered) with their wire serialization
//! - Exclusion registry entries and persisted draw records

pub mod buy;
pub mod draw;
pub mod exclusion;
pub mod primitives;
pub mod transaction;

pub use buy::{ClassifiedBuy, NumberedBuy, PricedBuy};
pub use draw::SavedDraw;
pub use exclusion::{ExclusionEntry, DEFAULT_EXCLUSION_REASON};
pub use primitives::{Mint, Signature, TimeS, Wallet};
pub use transaction::{
    EnrichedTransaction, SignatureRecord, TokenBalance, LAMPORTS_PER_SOL,
};

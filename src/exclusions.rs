//! Process-wide exclusion registry.
//!
//! Wallets listed here never appear in a draw. The registry is read-mostly:
//! the classifier checks membership on every candidate buyer, while mutations
//! only happen through the admin surface, which also writes them through to
//! the database.

use crate::domain::{ExclusionEntry, Wallet};
use std::collections::HashMap;
use std::sync::RwLock;

/// Liquidity-pool wallet seeded on first start.
pub const SEED_EXCLUSION_WALLET: &str = "HLnpSz9h2S4hiLQ43rnSD9XkcUThA7B8hQMKmDaiTLcC";
/// Reason recorded for the seeded wallet.
pub const SEED_EXCLUSION_REASON: &str = "Liquidity Pool - High frequency trading account";

/// Set of excluded wallets with their reasons.
#[derive(Debug, Default)]
pub struct ExclusionRegistry {
    entries: RwLock<HashMap<String, ExclusionEntry>>,
}

impl ExclusionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding only the seeded liquidity-pool wallet.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.add(ExclusionEntry::new(
            Wallet::new(SEED_EXCLUSION_WALLET.to_string()),
            Some(SEED_EXCLUSION_REASON.to_string()),
        ));
        registry
    }

    /// Create a registry hydrated from persisted entries.
    pub fn from_entries(entries: Vec<ExclusionEntry>) -> Self {
        let registry = Self::new();
        for entry in entries {
            registry.add(entry);
        }
        registry
    }

    /// Whether a wallet is excluded.
    pub fn contains(&self, wallet: &Wallet) -> bool {
        self.entries.read().unwrap().contains_key(wallet.as_str())
    }

    /// Add an entry. Returns false when the wallet was already excluded;
    /// the existing entry is kept in that case.
    pub fn add(&self, entry: ExclusionEntry) -> bool {
        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(entry.wallet.as_str()) {
            return false;
        }
        entries.insert(entry.wallet.as_str().to_string(), entry);
        true
    }

    /// Remove a wallet. Returns false when it was not excluded.
    pub fn remove(&self, wallet: &Wallet) -> bool {
        self.entries.write().unwrap().remove(wallet.as_str()).is_some()
    }

    /// Drop every entry and restore the seeded liquidity-pool wallet.
    pub fn reset_to_defaults(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
        let seed = ExclusionEntry::new(
            Wallet::new(SEED_EXCLUSION_WALLET.to_string()),
            Some(SEED_EXCLUSION_REASON.to_string()),
        );
        entries.insert(seed.wallet.as_str().to_string(), seed);
    }

    /// All entries, oldest first with ties broken by wallet.
    pub fn list(&self) -> Vec<ExclusionEntry> {
        let mut entries: Vec<ExclusionEntry> =
            self.entries.read().unwrap().values().cloned().collect();
        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.wallet.cmp(&b.wallet))
        });
        entries
    }

    /// Number of excluded wallets.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

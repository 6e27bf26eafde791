//! Ledger transaction types returned by the RPC data source.

use crate::domain::{Mint, Signature, TimeS, Wallet};
use serde::{Deserialize, Serialize};

/// Lamports per unit of the native asset.
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// One entry from the per-account signature index, newest-first on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Transaction signature.
    pub signature: Signature,
    /// Ledger-recorded block time; absent for very old or unconfirmed entries.
    pub block_time: Option<TimeS>,
}

impl SignatureRecord {
    /// Create a new SignatureRecord.
    pub fn new(signature: Signature, block_time: Option<TimeS>) -> Self {
        SignatureRecord {
            signature,
            block_time,
        }
    }
}

/// Token balance entry (pre or post) for one token account in a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Index into the transaction's account list.
    pub account_index: usize,
    /// Mint of the token held by this account.
    pub mint: Mint,
    /// Owning wallet of the token account, when the ledger reports it.
    pub owner: Option<Wallet>,
    /// Balance in user-facing units (decimals already applied).
    pub ui_amount: f64,
}

/// Full balance-change record for one transaction.
///
/// Owned transiently for the duration of classification and discarded after;
/// nothing downstream holds onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    /// Transaction signature.
    pub signature: Signature,
    /// Ledger-recorded block time.
    pub block_time: Option<TimeS>,
    /// Ordered account list; balance arrays index into this.
    pub account_keys: Vec<Wallet>,
    /// Native-asset balances before execution, in lamports, per account index.
    pub pre_balances: Vec<u64>,
    /// Native-asset balances after execution, in lamports, per account index.
    pub post_balances: Vec<u64>,
    /// Token balances before execution.
    pub pre_token_balances: Vec<TokenBalance>,
    /// Token balances after execution.
    pub post_token_balances: Vec<TokenBalance>,
}

impl EnrichedTransaction {
    /// Native-asset delta for the account at `index`, in whole units.
    ///
    /// Returns None when either balance array does not cover the index.
    pub fn native_delta(&self, index: usize) -> Option<f64> {
        let pre = *self.pre_balances.get(index)?;
        let post = *self.post_balances.get(index)?;
        Some((post as i64 - pre as i64) as f64 / LAMPORTS_PER_SOL)
    }
}

//! Buy classification from balance deltas.
//!
//! A transaction is a buy of the target token when some wallet's token
//! balance went up and a native-asset spend can be tied to it. The spend is
//! attributed directly when the gaining wallet's own account paid; otherwise
//! the largest spend anywhere in the transaction stands in for it, since
//! swaps routed through intermediate accounts rarely debit the buyer's key
//! directly.

use crate::domain::{ClassifiedBuy, EnrichedTransaction, Mint, Wallet};
use crate::exclusions::ExclusionRegistry;
use tracing::debug;

/// Native-asset spends at or below this size are ignored (fee dust).
pub const MIN_SOL_SPEND: f64 = 0.0001;

/// Classify every buy of `target` in a transaction.
///
/// Returns one entry per non-excluded wallet that gained the target token
/// and has an attributable spend, in the order wallets appear in the ledger
/// record. Wallets in the exclusion registry are skipped. A transaction with
/// no spend anywhere yields nothing.
pub fn classify_buys(
    tx: &EnrichedTransaction,
    target: &Mint,
    exclusions: &ExclusionRegistry,
) -> Vec<ClassifiedBuy> {
    let block_time = match tx.block_time {
        Some(t) => t,
        None => {
            debug!("Transaction {} has no block time, skipping", tx.signature.short());
            return Vec::new();
        }
    };

    // Token gains for the target mint, accumulated per owning wallet.
    let mut gains: Vec<(Wallet, f64)> = Vec::new();
    let mut found_target = false;

    for post in &tx.post_token_balances {
        if post.mint != *target {
            continue;
        }
        found_target = true;

        let pre_amount = tx
            .pre_token_balances
            .iter()
            .find(|pre| pre.account_index == post.account_index)
            .map(|pre| pre.ui_amount)
            .unwrap_or(0.0);
        let change = post.ui_amount - pre_amount;

        if change > 0.0 {
            if let Some(owner) = &post.owner {
                accumulate(&mut gains, owner, change);
            }
        }
    }

    if !found_target {
        return Vec::new();
    }

    // Native-asset spends, accumulated per account address.
    let mut spends: Vec<(Wallet, f64)> = Vec::new();
    let accounts = tx.pre_balances.len().min(tx.post_balances.len());
    for index in 0..accounts {
        let delta = match tx.native_delta(index) {
            Some(d) => d,
            None => continue,
        };
        if delta < -MIN_SOL_SPEND {
            if let Some(account) = tx.account_keys.get(index) {
                accumulate(&mut spends, account, delta.abs());
            }
        }
    }

    let max_spend = spends
        .iter()
        .map(|(_, amount)| *amount)
        .fold(0.0_f64, f64::max);

    let mut buys = Vec::new();
    for (wallet, token_amount) in gains {
        if exclusions.contains(&wallet) {
            debug!("Excluded wallet {} gained tokens, skipping", wallet.short());
            continue;
        }

        let direct = spends
            .iter()
            .find(|(account, _)| *account == wallet)
            .map(|(_, amount)| *amount)
            .unwrap_or(0.0);

        let sol_amount = if direct > 0.0 {
            direct
        } else if max_spend > 0.0 {
            debug!(
                "No direct spend for {}, attributing largest spend {:.4}",
                wallet.short(),
                max_spend
            );
            max_spend
        } else {
            continue;
        };

        buys.push(ClassifiedBuy {
            wallet,
            token_amount,
            sol_amount,
            price_in_sol: sol_amount / token_amount,
            timestamp: block_time,
            signature: tx.signature.clone(),
        });
    }

    buys
}

fn accumulate(tallies: &mut Vec<(Wallet, f64)>, wallet: &Wallet, amount: f64) {
    match tallies.iter_mut().find(|(w, _)| w == wallet) {
        Some((_, total)) => *total += amount,
        None => tallies.push((wallet.clone(), amount)),
    }
}

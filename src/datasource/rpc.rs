//! JSON-RPC ledger client.
//!
//! Talks to a Solana-style RPC node over the standard `getSignaturesForAddress`
//! and `getTransaction` methods. Requests are single-shot: retry and pacing
//! live in the scan layer, not here.

use super::{DataSourceError, LedgerDataSource};
use crate::domain::{
    EnrichedTransaction, Mint, Signature, SignatureRecord, TimeS, TokenBalance, Wallet,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-request timeout for ledger calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Ledger data source using a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcDataSource {
    client: Client,
    rpc_url: String,
}

impl RpcDataSource {
    /// Create a new RPC data source.
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
        }
    }

    async fn post_rpc(
        &self,
        id: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, DataSourceError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == 429 {
            return Err(DataSourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(DataSourceError::HttpError {
                status: status.as_u16(),
                message: if status.is_server_error() {
                    "Server error".to_string()
                } else {
                    "Client error".to_string()
                },
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl LedgerDataSource for RpcDataSource {
    async fn fetch_signature_page(
        &self,
        account: &Mint,
        before: Option<&Signature>,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>, DataSourceError> {
        debug!(
            "Fetching signature page for account={}, before={:?}, limit={}",
            account,
            before.map(|s| s.short().to_string()),
            limit
        );

        let mut options = serde_json::json!({ "limit": limit });
        if let Some(cursor) = before {
            options["before"] = serde_json::Value::String(cursor.as_str().to_string());
        }

        let response = self
            .post_rpc(
                "token-sigs",
                "getSignaturesForAddress",
                serde_json::json!([account.as_str(), options]),
            )
            .await?;

        // An error envelope or empty result reads as an exhausted index.
        let entries = match response.get("result").and_then(|v| v.as_array()) {
            Some(arr) => arr,
            None => return Ok(Vec::new()),
        };

        let mut records = Vec::new();
        for entry in entries {
            match parse_signature_record(entry) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Failed to parse signature entry: {}", e);
                }
            }
        }

        Ok(records)
    }

    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<EnrichedTransaction>, DataSourceError> {
        debug!("Fetching transaction {}", signature.short());

        let response = self
            .post_rpc(
                "enhanced-tx",
                "getTransaction",
                serde_json::json!([
                    signature.as_str(),
                    {
                        "encoding": "jsonParsed",
                        "maxSupportedTransactionVersion": 0
                    }
                ]),
            )
            .await?;

        let result = match response.get("result") {
            Some(serde_json::Value::Null) | None => return Ok(None),
            Some(v) => v,
        };

        parse_transaction(result, signature).map(Some)
    }
}

fn parse_signature_record(entry: &serde_json::Value) -> Result<SignatureRecord, DataSourceError> {
    let signature = entry
        .get("signature")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError("Missing signature field".to_string()))?;

    let block_time = entry.get("blockTime").and_then(|v| v.as_i64()).map(TimeS::new);

    Ok(SignatureRecord::new(
        Signature::new(signature.to_string()),
        block_time,
    ))
}

fn parse_transaction(
    result: &serde_json::Value,
    requested: &Signature,
) -> Result<EnrichedTransaction, DataSourceError> {
    let block_time = result.get("blockTime").and_then(|v| v.as_i64()).map(TimeS::new);

    let message = result
        .get("transaction")
        .and_then(|t| t.get("message"))
        .ok_or_else(|| DataSourceError::ParseError("Missing transaction message".to_string()))?;

    let signature = result
        .get("transaction")
        .and_then(|t| t.get("signatures"))
        .and_then(|s| s.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_str())
        .map(|s| Signature::new(s.to_string()))
        .unwrap_or_else(|| requested.clone());

    let account_keys = message
        .get("accountKeys")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(parse_account_key).collect())
        .unwrap_or_default();

    // A transaction without meta carries no balance deltas; empty arrays let
    // the enricher classify it as not-a-swap.
    let meta = result.get("meta");

    let pre_balances = meta
        .and_then(|m| m.get("preBalances"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_u64()).collect())
        .unwrap_or_default();

    let post_balances = meta
        .and_then(|m| m.get("postBalances"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_u64()).collect())
        .unwrap_or_default();

    let pre_token_balances = parse_token_balances(meta.and_then(|m| m.get("preTokenBalances")));
    let post_token_balances = parse_token_balances(meta.and_then(|m| m.get("postTokenBalances")));

    Ok(EnrichedTransaction {
        signature,
        block_time,
        account_keys,
        pre_balances,
        post_balances,
        pre_token_balances,
        post_token_balances,
    })
}

/// Account keys arrive either as bare strings or as jsonParsed objects with a
/// `pubkey` field, depending on the node's encoding.
fn parse_account_key(value: &serde_json::Value) -> Option<Wallet> {
    match value {
        serde_json::Value::String(s) => Some(Wallet::new(s.clone())),
        serde_json::Value::Object(obj) => obj
            .get("pubkey")
            .and_then(|v| v.as_str())
            .map(|s| Wallet::new(s.to_string())),
        _ => None,
    }
}

fn parse_token_balances(value: Option<&serde_json::Value>) -> Vec<TokenBalance> {
    let entries = match value.and_then(|v| v.as_array()) {
        Some(arr) => arr,
        None => return Vec::new(),
    };

    let mut balances = Vec::new();
    for entry in entries {
        match parse_token_balance(entry) {
            Ok(balance) => balances.push(balance),
            Err(e) => {
                warn!("Failed to parse token balance: {}", e);
            }
        }
    }
    balances
}

fn parse_token_balance(entry: &serde_json::Value) -> Result<TokenBalance, DataSourceError> {
    let account_index = entry
        .get("accountIndex")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| DataSourceError::ParseError("Missing accountIndex field".to_string()))?
        as usize;

    let mint = entry
        .get("mint")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError("Missing mint field".to_string()))?;

    let owner = entry
        .get("owner")
        .and_then(|v| v.as_str())
        .map(|s| Wallet::new(s.to_string()));

    let ui_amount = parse_ui_amount(
        entry
            .get("uiTokenAmount")
            .ok_or_else(|| DataSourceError::ParseError("Missing uiTokenAmount field".to_string()))?,
    );

    Ok(TokenBalance {
        account_index,
        mint: Mint::new(mint.to_string()),
        owner,
        ui_amount,
    })
}

/// Prefer the numeric `uiAmount`, fall back to `uiAmountString`, then to the
/// raw amount scaled by `decimals`. Null amounts (empty accounts) read as 0.
fn parse_ui_amount(ui_token_amount: &serde_json::Value) -> f64 {
    if let Some(amount) = ui_token_amount.get("uiAmount").and_then(|v| v.as_f64()) {
        return amount;
    }

    if let Some(s) = ui_token_amount.get("uiAmountString").and_then(|v| v.as_str()) {
        if let Ok(amount) = s.parse::<f64>() {
            return amount;
        }
    }

    let raw = ui_token_amount
        .get("amount")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok());
    let decimals = ui_token_amount.get("decimals").and_then(|v| v.as_u64());

    match (raw, decimals) {
        (Some(raw), Some(decimals)) => raw / 10f64.powi(decimals as i32),
        _ => 0.0,
    }
}

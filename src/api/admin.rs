use super::AppState;
use crate::domain::{ExclusionEntry, Wallet};
use crate::error::AppError;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct BlocklistMutation {
    pub wallet: Option<String>,
    pub reason: Option<String>,
}

/// Wire shape of the blocklist: the wallet list in registry order plus a
/// wallet-to-reason map.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocklistDto {
    pub blocked_wallets: Vec<String>,
    pub reason: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    pub blocklist: BlocklistDto,
}

fn blocklist_dto(entries: Vec<ExclusionEntry>) -> BlocklistDto {
    let mut blocked_wallets = Vec::with_capacity(entries.len());
    let mut reason = BTreeMap::new();
    for entry in entries {
        blocked_wallets.push(entry.wallet.as_str().to_string());
        reason.insert(entry.wallet.as_str().to_string(), entry.reason);
    }
    BlocklistDto {
        blocked_wallets,
        reason,
    }
}

fn require_wallet(params: &BlocklistMutation) -> Result<Wallet, AppError> {
    match params.wallet.as_deref().map(str::trim) {
        Some(w) if !w.is_empty() => Ok(Wallet::new(w.to_string())),
        _ => Err(AppError::BadRequest("Wallet address is required".into())),
    }
}

pub async fn get_blocklist(
    State(state): State<AppState>,
) -> Result<Json<BlocklistDto>, AppError> {
    Ok(Json(blocklist_dto(state.exclusions.list())))
}

pub async fn add_to_blocklist(
    State(state): State<AppState>,
    Json(params): Json<BlocklistMutation>,
) -> Result<Json<MutationResponse>, AppError> {
    let wallet = require_wallet(&params)?;
    let reason = params
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    let entry = ExclusionEntry::new(wallet.clone(), reason);
    let inserted = state.repo.insert_exclusion(&entry).await?;
    if inserted {
        state.exclusions.add(entry);
        info!("Blocked wallet {}", wallet.short());
    }

    Ok(Json(MutationResponse {
        success: true,
        blocklist: blocklist_dto(state.exclusions.list()),
    }))
}

pub async fn remove_from_blocklist(
    State(state): State<AppState>,
    Json(params): Json<BlocklistMutation>,
) -> Result<Json<MutationResponse>, AppError> {
    let wallet = require_wallet(&params)?;

    let deleted = state.repo.delete_exclusion(&wallet).await?;
    state.exclusions.remove(&wallet);
    if deleted {
        info!("Unblocked wallet {}", wallet.short());
    }

    Ok(Json(MutationResponse {
        success: true,
        blocklist: blocklist_dto(state.exclusions.list()),
    }))
}

pub async fn clear_blocklist(
    State(state): State<AppState>,
) -> Result<Json<MutationResponse>, AppError> {
    state.repo.clear_exclusions().await?;
    state.exclusions.reset_to_defaults();
    info!("Blocklist reset to defaults");

    Ok(Json(MutationResponse {
        success: true,
        blocklist: blocklist_dto(state.exclusions.list()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclusions::ExclusionRegistry;

    #[test]
    fn test_blocklist_dto_keeps_registry_order() {
        let registry = ExclusionRegistry::new();
        registry.add(ExclusionEntry::new(
            Wallet::new("walletB".to_string()),
            Some("bot".to_string()),
        ));
        registry.add(ExclusionEntry::new(
            Wallet::new("walletA".to_string()),
            None,
        ));

        let listed: Vec<String> = registry
            .list()
            .into_iter()
            .map(|e| e.wallet.as_str().to_string())
            .collect();
        let dto = blocklist_dto(registry.list());
        assert_eq!(dto.blocked_wallets, listed);
        assert_eq!(dto.reason.get("walletB").map(String::as_str), Some("bot"));
        assert!(dto.reason.contains_key("walletA"));
    }

    #[test]
    fn test_require_wallet() {
        let ok = require_wallet(&BlocklistMutation {
            wallet: Some("  walletA ".to_string()),
            reason: None,
        })
        .unwrap();
        assert_eq!(ok.as_str(), "walletA");

        let missing = require_wallet(&BlocklistMutation {
            wallet: None,
            reason: None,
        });
        assert!(matches!(missing, Err(AppError::BadRequest(_))));

        let blank = require_wallet(&BlocklistMutation {
            wallet: Some("   ".to_string()),
            reason: None,
        });
        assert!(matches!(blank, Err(AppError::BadRequest(_))));
    }
}

//! Repository layer for database operations.

use crate::domain::{ExclusionEntry, SavedDraw, Wallet};
use crate::exclusions::{SEED_EXCLUSION_REASON, SEED_EXCLUSION_WALLET};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Cheap liveness probe for readiness checks.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert an exclusion idempotently.
    ///
    /// Returns `false` when the wallet was already excluded; the stored
    /// entry keeps its original reason and timestamp.
    pub async fn insert_exclusion(&self, entry: &ExclusionEntry) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO exclusions (wallet, reason, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(wallet) DO NOTHING
            "#,
        )
        .bind(entry.wallet.as_str())
        .bind(&entry.reason)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove an exclusion. Returns `false` when the wallet was not present.
    pub async fn delete_exclusion(&self, wallet: &Wallet) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exclusions WHERE wallet = ?")
            .bind(wallet.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop every exclusion and restore the seed entry, atomically.
    pub async fn clear_exclusions(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM exclusions")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO exclusions (wallet, reason, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(SEED_EXCLUSION_WALLET)
        .bind(SEED_EXCLUSION_REASON)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// All exclusions, oldest first.
    pub async fn list_exclusions(&self) -> Result<Vec<ExclusionEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT wallet, reason, created_at
            FROM exclusions
            ORDER BY created_at ASC, wallet ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let wallet: String = row.get("wallet");
                let created_at_str: String = row.get("created_at");
                let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|e| {
                        warn!(wallet = %wallet, error = %e, "Bad created_at in exclusions row, using epoch");
                        DateTime::UNIX_EPOCH
                    });

                ExclusionEntry {
                    wallet: Wallet::new(wallet),
                    reason: row.get("reason"),
                    created_at,
                }
            })
            .collect())
    }

    /// Save a draw, overwriting any previous draw with the same id.
    pub async fn insert_draw(&self, draw: &SavedDraw) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO draw_results (draw_id, created_at, settings, results)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(draw_id) DO UPDATE SET
                created_at = excluded.created_at,
                settings = excluded.settings,
                results = excluded.results
            "#,
        )
        .bind(draw.id)
        .bind(draw.timestamp.to_rfc3339())
        .bind(draw.settings.to_string())
        .bind(draw.results.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent draws first, at most `limit` of them.
    pub async fn list_draws(&self, limit: i64) -> Result<Vec<SavedDraw>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT draw_id, created_at, settings, results
            FROM draw_results
            ORDER BY created_at DESC, draw_id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_draw).collect())
    }

    /// Fetch one draw by id.
    pub async fn get_draw(&self, id: i64) -> Result<Option<SavedDraw>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT draw_id, created_at, settings, results
            FROM draw_results
            WHERE draw_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_draw))
    }
}

fn row_to_draw(row: &SqliteRow) -> SavedDraw {
    let id: i64 = row.get("draw_id");
    let created_at_str: String = row.get("created_at");
    let timestamp = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!(id, error = %e, "Bad created_at in draw_results row, using epoch");
            DateTime::UNIX_EPOCH
        });

    SavedDraw {
        id,
        timestamp,
        settings: parse_json_column(row, "settings", id),
        results: parse_json_column(row, "results", id),
    }
}

fn parse_json_column(row: &SqliteRow, column: &str, id: i64) -> serde_json::Value {
    let raw: String = row.get(column);
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(id, column, error = %e, "Bad JSON in draw_results row, using null");
        serde_json::Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use serde_json::json;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn entry(wallet: &str, reason: &str) -> ExclusionEntry {
        ExclusionEntry::new(
            Wallet::new(wallet.to_string()),
            Some(reason.to_string()),
        )
    }

    fn draw(id: i64) -> SavedDraw {
        SavedDraw {
            id,
            timestamp: Utc::now(),
            settings: json!({"tokenAddress": "mint", "minPrice": 50.0}),
            results: json!({"totalBuys": 3}),
        }
    }

    #[tokio::test]
    async fn test_seed_exclusion_present_after_init() {
        let (repo, _temp) = setup_test_db().await;

        let entries = repo.list_exclusions().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].wallet.as_str(), SEED_EXCLUSION_WALLET);
        assert_eq!(entries[0].reason, SEED_EXCLUSION_REASON);
    }

    #[tokio::test]
    async fn test_insert_and_list_exclusions() {
        let (repo, _temp) = setup_test_db().await;

        let inserted = repo
            .insert_exclusion(&entry("walletA", "Team wallet"))
            .await
            .unwrap();
        assert!(inserted);

        let entries = repo.list_exclusions().await.unwrap();
        assert_eq!(entries.len(), 2);
        let stored = entries
            .iter()
            .find(|e| e.wallet.as_str() == "walletA")
            .unwrap();
        assert_eq!(stored.reason, "Team wallet");
    }

    #[tokio::test]
    async fn test_insert_duplicate_exclusion_keeps_first_reason() {
        let (repo, _temp) = setup_test_db().await;

        assert!(repo
            .insert_exclusion(&entry("walletA", "first"))
            .await
            .unwrap());
        assert!(!repo
            .insert_exclusion(&entry("walletA", "second"))
            .await
            .unwrap());

        let entries = repo.list_exclusions().await.unwrap();
        let stored = entries
            .iter()
            .find(|e| e.wallet.as_str() == "walletA")
            .unwrap();
        assert_eq!(stored.reason, "first");
    }

    #[tokio::test]
    async fn test_delete_exclusion() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_exclusion(&entry("walletA", "reason"))
            .await
            .unwrap();

        assert!(repo
            .delete_exclusion(&Wallet::new("walletA".to_string()))
            .await
            .unwrap());
        assert!(!repo
            .delete_exclusion(&Wallet::new("walletA".to_string()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_clear_exclusions_restores_seed() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_exclusion(&entry("walletA", "reason"))
            .await
            .unwrap();
        repo.insert_exclusion(&entry("walletB", "reason"))
            .await
            .unwrap();

        repo.clear_exclusions().await.unwrap();

        let entries = repo.list_exclusions().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].wallet.as_str(), SEED_EXCLUSION_WALLET);
    }

    #[tokio::test]
    async fn test_exclusion_created_at_roundtrips() {
        let (repo, _temp) = setup_test_db().await;
        let original = entry("walletA", "reason");
        repo.insert_exclusion(&original).await.unwrap();

        let entries = repo.list_exclusions().await.unwrap();
        let stored = entries
            .iter()
            .find(|e| e.wallet.as_str() == "walletA")
            .unwrap();
        assert_eq!(stored.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_insert_and_get_draw() {
        let (repo, _temp) = setup_test_db().await;
        let saved = draw(42);

        repo.insert_draw(&saved).await.unwrap();

        let loaded = repo.get_draw(42).await.unwrap().unwrap();
        assert_eq!(loaded.settings, saved.settings);
        assert_eq!(loaded.results, saved.results);
    }

    #[tokio::test]
    async fn test_get_missing_draw_is_none() {
        let (repo, _temp) = setup_test_db().await;
        assert!(repo.get_draw(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_draw_overwrites_same_id() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_draw(&draw(42)).await.unwrap();

        let mut updated = draw(42);
        updated.results = json!({"totalBuys": 9});
        repo.insert_draw(&updated).await.unwrap();

        let loaded = repo.get_draw(42).await.unwrap().unwrap();
        assert_eq!(loaded.results, json!({"totalBuys": 9}));

        let all = repo.list_draws(10).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_draws_newest_first_with_limit() {
        let (repo, _temp) = setup_test_db().await;
        for (id, offset) in [(1, 30), (2, 20), (3, 10)] {
            let mut d = draw(id);
            d.timestamp = Utc::now() - chrono::Duration::seconds(offset);
            repo.insert_draw(&d).await.unwrap();
        }

        let draws = repo.list_draws(2).await.unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].id, 3);
        assert_eq!(draws[1].id, 2);
    }
}

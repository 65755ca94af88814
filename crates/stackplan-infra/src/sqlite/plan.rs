//! SQLite plan repository implementation.
//!
//! Implements `PlanRepository` from `stackplan-core`. Each account owns one
//! row; the plan document is stored as JSON text and parsed on read.

use chrono::Utc;
use sqlx::Row;
use stackplan_core::repository::plan::PlanRepository;
use stackplan_types::error::RepositoryError;
use stackplan_types::ids::AccountId;
use stackplan_types::plan::PlanDocument;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `PlanRepository`.
pub struct SqlitePlanRepository {
    pool: DatabasePool,
}

impl SqlitePlanRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn parse_document(raw: &str) -> Result<PlanDocument, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Query(format!("invalid plan document: {e}")))
}

impl PlanRepository for SqlitePlanRepository {
    async fn load_plan(&self, account: &AccountId) -> Result<Option<PlanDocument>, RepositoryError> {
        let row = sqlx::query("SELECT document FROM plans WHERE account_id = ?")
            .bind(account.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let raw: String = row
                    .try_get("document")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(parse_document(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn save_plan(
        &self,
        account: &AccountId,
        plan: &PlanDocument,
    ) -> Result<PlanDocument, RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let document = serde_json::to_string(plan)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize plan: {e}")))?;

        let row = sqlx::query(
            r#"INSERT INTO plans (account_id, document, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (account_id) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at
               RETURNING document"#,
        )
        .bind(account.as_str())
        .bind(&document)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let stored: String = row
            .try_get("document")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        tracing::debug!(account = %account, bytes = stored.len(), "plan row upserted");
        parse_document(&stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::{DatabasePool, database_url};
    use chrono::TimeZone;
    use stackplan_types::ids::ItemId;
    use stackplan_types::plan::{LegacyDay, PlanItem, StepItem};

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn step(id: &str, done: bool) -> PlanItem {
        PlanItem::Step(StepItem {
            id: ItemId::from(id),
            group_id: None,
            domain: "web".to_string(),
            subdomain: Some("frontend".to_string()),
            component: Some("framework".to_string()),
            step: "Framework: React".to_string(),
            done,
            meta: Default::default(),
            created_at: Some(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()),
        })
    }

    fn document(items: Vec<PlanItem>) -> PlanDocument {
        PlanDocument {
            title: "My plan".to_string(),
            items: Some(items),
            days: None,
            meta: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let repo = SqlitePlanRepository::new(test_pool().await);
        let loaded = repo.load_plan(&AccountId::new("nobody")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let repo = SqlitePlanRepository::new(test_pool().await);
        let account = AccountId::new("alice");
        let doc = document(vec![step("s1", false), step("s2", true)]);

        let stored = repo.save_plan(&account, &doc).await.unwrap();
        assert_eq!(stored, doc);

        let loaded = repo.load_plan(&account).await.unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_document() {
        let repo = SqlitePlanRepository::new(test_pool().await);
        let account = AccountId::new("alice");

        repo.save_plan(&account, &document(vec![step("s1", false)]))
            .await
            .unwrap();
        repo.save_plan(&account, &document(vec![]))
            .await
            .unwrap();

        let loaded = repo.load_plan(&account).await.unwrap().unwrap();
        assert_eq!(loaded.items, Some(vec![]));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM plans")
            .fetch_one(&repo.pool.reader)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_accounts_are_isolated() {
        let repo = SqlitePlanRepository::new(test_pool().await);
        repo.save_plan(&AccountId::new("alice"), &document(vec![step("a", false)]))
            .await
            .unwrap();

        assert!(repo.load_plan(&AccountId::new("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_legacy_document_loads() {
        let repo = SqlitePlanRepository::new(test_pool().await);
        let raw = r#"{"title":"Old","days":[{"date":"2024-03-01","items":["Read docs"]}],"meta":{}}"#;
        sqlx::query("INSERT INTO plans (account_id, document, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind("legacy")
            .bind(raw)
            .bind("2024-03-01T00:00:00Z")
            .bind("2024-03-01T00:00:00Z")
            .execute(&repo.pool.writer)
            .await
            .unwrap();

        let loaded = repo.load_plan(&AccountId::new("legacy")).await.unwrap().unwrap();
        assert!(loaded.items.is_none());
        assert_eq!(
            loaded.days,
            Some(vec![LegacyDay {
                date: Some("2024-03-01".to_string()),
                tasks: vec!["Read docs".to_string()],
                ..LegacyDay::default()
            }])
        );
        assert!(loaded.classify().is_legacy());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_query_error() {
        let repo = SqlitePlanRepository::new(test_pool().await);
        sqlx::query("INSERT INTO plans (account_id, document, created_at, updated_at) VALUES ('x', 'not json', '', '')")
            .execute(&repo.pool.writer)
            .await
            .unwrap();

        let err = repo.load_plan(&AccountId::new("x")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }
}

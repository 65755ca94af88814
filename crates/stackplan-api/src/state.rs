//! Application state wiring all services together.
//!
//! AppState holds the catalog, the config, and the plan store pinned to the
//! SQLite repository.

use anyhow::Context;
use stackplan_core::plan::store::{PlanStore, SyncConfig};
use stackplan_infra::catalog::load_catalog;
use stackplan_infra::config::{default_data_dir, load_global_config, resolve_path};
use stackplan_infra::sqlite::plan::SqlitePlanRepository;
use stackplan_infra::sqlite::pool::{DatabasePool, database_url};
use stackplan_types::catalog::Catalog;
use stackplan_types::config::GlobalConfig;
use stackplan_types::ids::AccountId;

/// Plan store pinned to the infra repository.
pub type ConcretePlanStore = PlanStore<SqlitePlanRepository>;

pub struct AppState {
    pub config: GlobalConfig,
    pub catalog: Catalog,
    pub plan_store: ConcretePlanStore,
}

impl AppState {
    /// Initialize the application state: load config and catalog, connect to DB.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = default_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;

        let catalog_path = config
            .catalog_path
            .as_deref()
            .map(|p| resolve_path(&data_dir, p));
        let catalog = load_catalog(catalog_path.as_deref())
            .await
            .context("Failed to load stack catalog")?;

        let db_pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("Failed to open plan database")?;
        let plan_store = PlanStore::new(
            SqlitePlanRepository::new(db_pool),
            SyncConfig::from_global(&config),
        );

        tracing::debug!(data_dir = %data_dir.display(), domains = catalog.domains.len(), "app state ready");

        Ok(Self {
            config,
            catalog,
            plan_store,
        })
    }

    /// Account from the command line, or the configured default.
    pub fn account(&self, flag: Option<&str>) -> AccountId {
        AccountId::new(flag.unwrap_or(&self.config.default_account))
    }

    /// Sign the plan store in to `account`, loading its plan.
    pub async fn sign_in(&self, account: AccountId) -> anyhow::Result<()> {
        let shown = account.to_string();
        self.plan_store
            .sign_in(account)
            .await
            .with_context(|| format!("Failed to load plan for '{shown}'"))
    }
}

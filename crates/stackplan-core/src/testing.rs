//! Shared fixtures for core tests: a small web catalog and an in-memory
//! plan repository with injectable latency and failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stackplan_types::catalog::{Catalog, Component, Domain, Multiplicity, ScoreVector, Subdomain, Tool};
use stackplan_types::error::RepositoryError;
use stackplan_types::ids::AccountId;
use stackplan_types::plan::PlanDocument;

use crate::repository::plan::PlanRepository;

fn tool(id: &str, name: &str, scores: [u8; 4]) -> Tool {
    Tool {
        id: id.to_string(),
        name: name.to_string(),
        tags: vec![id.to_string()],
        scores: ScoreVector {
            performance: scores[0],
            scalability: scores[1],
            learning: scores[2],
            demand: scores[3],
        },
    }
}

fn component(
    id: &str,
    title: &str,
    kind: Option<&str>,
    multiplicity: Multiplicity,
    tools: Vec<Tool>,
) -> Component {
    Component {
        id: id.to_string(),
        title: title.to_string(),
        kind: kind.map(str::to_string),
        multiplicity,
        tools,
    }
}

/// Web domain with a single-select framework, a multi-select styling slot,
/// a runtime, and a database engine.
pub fn web_catalog() -> Catalog {
    Catalog {
        domains: vec![Domain {
            id: "web".to_string(),
            title: "Web Development".to_string(),
            subdomains: vec![
                Subdomain {
                    id: "frontend".to_string(),
                    title: "Frontend".to_string(),
                    components: vec![
                        component(
                            "framework",
                            "Framework",
                            None,
                            Multiplicity::Single,
                            vec![
                                tool("react", "React", [8, 9, 7, 10]),
                                tool("vue", "Vue", [8, 8, 8, 8]),
                            ],
                        ),
                        component(
                            "styling",
                            "Styling",
                            None,
                            Multiplicity::Multi,
                            vec![
                                tool("tailwind", "Tailwind CSS", [9, 8, 8, 9]),
                                tool("sass", "Sass", [8, 7, 7, 7]),
                            ],
                        ),
                    ],
                },
                Subdomain {
                    id: "backend".to_string(),
                    title: "Backend".to_string(),
                    components: vec![component(
                        "runtime",
                        "Runtime",
                        None,
                        Multiplicity::Single,
                        vec![
                            tool("node", "Node.js", [8, 8, 7, 10]),
                            tool("deno", "Deno", [8, 7, 7, 5]),
                        ],
                    )],
                },
                Subdomain {
                    id: "database".to_string(),
                    title: "Database".to_string(),
                    components: vec![component(
                        "engine",
                        "DB Engine",
                        Some("db"),
                        Multiplicity::Single,
                        vec![
                            tool("postgres", "PostgreSQL", [9, 9, 6, 10]),
                            tool("mongodb", "MongoDB", [8, 9, 7, 9]),
                        ],
                    )],
                },
            ],
        }],
    }
}

/// In-memory [`PlanRepository`]. Clones share state.
#[derive(Clone, Default)]
pub struct MockPlanRepository {
    pub stored: Arc<Mutex<HashMap<AccountId, PlanDocument>>>,
    pub saves: Arc<Mutex<Vec<(AccountId, PlanDocument)>>>,
    pub load_delay: Duration,
    pub save_delay: Duration,
    pub fail_load: bool,
    pub fail_save: Arc<AtomicBool>,
    /// Title the "server" stamps on every stored document.
    pub normalized_title: Option<String>,
    pub active: Arc<AtomicUsize>,
    pub max_concurrent_saves: Arc<AtomicUsize>,
}

impl MockPlanRepository {
    pub fn with_plan(account: &AccountId, plan: PlanDocument) -> Self {
        let repo = Self::default();
        repo.stored.lock().unwrap().insert(account.clone(), plan);
        repo
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_save(&self) -> Option<(AccountId, PlanDocument)> {
        self.saves.lock().unwrap().last().cloned()
    }
}

impl PlanRepository for MockPlanRepository {
    async fn load_plan(&self, account: &AccountId) -> Result<Option<PlanDocument>, RepositoryError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        if self.fail_load {
            return Err(RepositoryError::Connection);
        }
        let stored = self.stored.lock().unwrap().get(account).cloned();
        Ok(stored)
    }

    async fn save_plan(
        &self,
        account: &AccountId,
        plan: &PlanDocument,
    ) -> Result<PlanDocument, RepositoryError> {
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_saves.fetch_max(running, Ordering::SeqCst);
        if !self.save_delay.is_zero() {
            tokio::time::sleep(self.save_delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        self.saves.lock().unwrap().push((account.clone(), plan.clone()));
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk I/O error".to_string()));
        }

        let mut stored = plan.clone();
        if let Some(title) = &self.normalized_title {
            stored.title = title.clone();
        }
        self.stored.lock().unwrap().insert(account.clone(), stored.clone());
        Ok(stored)
    }
}

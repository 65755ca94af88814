//! Debounced, optimistic plan store.
//!
//! Holds one account's plan at a time. Mutations apply to local state
//! immediately and arm a debounced write; the write always sends the latest
//! local state. At most one write is in flight; requests made meanwhile
//! collapse into a single follow-up.
//!
//! Results of loads and writes that complete after the account changed are
//! discarded (each session has an epoch number). A write response replaces
//! local state only when no mutation happened after its payload was taken.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stackplan_types::config::GlobalConfig;
use stackplan_types::error::PlanStoreError;
use stackplan_types::ids::{AccountId, ItemId};
use stackplan_types::plan::{ItemPlan, PlanItem, PlanProgress, StoredPlan};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::commit::CommitBundle;
use super::scheduler::{SavePhase, SaveScheduler};
use crate::repository::plan::PlanRepository;

/// Timing knobs for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Quiet period after the last mutation before a write is issued.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1_000),
        }
    }
}

impl SyncConfig {
    pub fn with_debounce(debounce: Duration) -> Self {
        Self { debounce }
    }

    pub fn from_global(config: &GlobalConfig) -> Self {
        Self::with_debounce(Duration::from_millis(config.save_debounce_ms))
    }
}

/// Result of an explicit save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The current state was written.
    Saved,
    /// Another write was in flight (or the plan is still loading); the
    /// current state will be written after it.
    Deferred,
}

/// Read-only snapshot of the store for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub account: Option<AccountId>,
    pub title: String,
    pub items: Vec<PlanItem>,
    pub progress: PlanProgress,
    pub loading: bool,
    pub saving: bool,
    /// A debounced write is armed.
    pub pending: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Items are derived from a legacy day plan not yet written back.
    pub legacy: bool,
}

#[derive(Default)]
struct State {
    account: Option<AccountId>,
    epoch: u64,
    plan: ItemPlan,
    /// Bumped on every local mutation that changed the plan.
    revision: u64,
    loading: bool,
    legacy: bool,
    last_saved_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    scheduler: SaveScheduler,
}

impl State {
    /// Start a new session for `account`, dropping everything local.
    fn reset(&mut self, account: Option<AccountId>) {
        self.epoch += 1;
        self.scheduler.reset();
        self.account = account;
        self.plan = ItemPlan::default();
        self.loading = false;
        self.legacy = false;
        self.last_saved_at = None;
        self.last_error = None;
    }
}

struct Inner<R> {
    repo: R,
    config: SyncConfig,
    state: Mutex<State>,
    shutdown: CancellationToken,
}

impl<R: PlanRepository> Inner<R> {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm (or re-arm) the debounce timer.
    fn schedule_save(self: &Arc<Self>, st: &mut State) {
        if st.account.is_none() || st.loading {
            return;
        }
        let (ticket, token) = st.scheduler.arm(&self.shutdown);
        debug!(ticket, revision = st.revision, "save debounce armed");
        let inner = Arc::clone(self);
        let debounce = self.config.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }
            let fired = inner.state().scheduler.fire(ticket);
            if fired {
                inner.drain().await;
            }
        });
    }

    fn spawn_follow_up(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.drain().await });
    }

    /// Write until no follow-up is requested. Errors are recorded in state.
    async fn drain(&self) {
        loop {
            let (_, follow_up) = self.write_once().await;
            if !follow_up {
                break;
            }
            debug!("writing follow-up save");
        }
    }

    /// Attempt one write of the current local state.
    ///
    /// Returns the outcome and whether a follow-up write was requested while
    /// this one was in flight.
    async fn write_once(&self) -> (Result<SaveOutcome, PlanStoreError>, bool) {
        let (account, epoch, revision, document) = {
            let mut st = self.state();
            let Some(account) = st.account.clone() else {
                return (Err(PlanStoreError::NotAuthenticated), false);
            };
            if st.loading {
                st.scheduler.disarm();
                debug!(%account, "plan still loading, deferring save");
                return (Ok(SaveOutcome::Deferred), false);
            }
            if !st.scheduler.begin() {
                debug!(%account, "save already in flight, deferring");
                return (Ok(SaveOutcome::Deferred), false);
            }
            (account, st.epoch, st.revision, st.plan.to_document())
        };

        debug!(%account, revision, "saving plan");
        let result = self.repo.save_plan(&account, &document).await;

        let mut st = self.state();
        if st.epoch != epoch {
            debug!(%account, "account changed during save, discarding response");
            let outcome = result.map(|_| SaveOutcome::Saved).map_err(PlanStoreError::from);
            return (outcome, false);
        }
        let follow_up = st.scheduler.finish();
        let outcome = match result {
            Ok(stored) => {
                st.last_saved_at = Some(Utc::now());
                st.last_error = None;
                st.legacy = false;
                if st.revision == revision {
                    st.plan = stored.classify().into_item_plan();
                } else {
                    debug!(%account, revision, current = st.revision, "local changes since save, keeping local state");
                }
                info!(%account, revision, "plan saved");
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                warn!(%account, error = %e, "failed to save plan");
                st.last_error = Some(e.to_string());
                Err(PlanStoreError::from(e))
            }
        };
        (outcome, follow_up)
    }
}

/// Per-account plan store with optimistic mutations and debounced writes.
///
/// Dropping the store cancels any armed debounce timer. A write already in
/// flight is allowed to finish.
pub struct PlanStore<R: PlanRepository> {
    inner: Arc<Inner<R>>,
}

impl<R: PlanRepository> PlanStore<R> {
    pub fn new(repo: R, config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                repo,
                config,
                state: Mutex::new(State::default()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> SyncConfig {
        self.inner.config
    }

    pub fn account(&self) -> Option<AccountId> {
        self.inner.state().account.clone()
    }

    /// Switch to `account` and load its plan once.
    ///
    /// A missing plan starts empty. A load failure leaves the empty default
    /// in place, records the error, and returns it. Signing in to the
    /// current account again is a no-op.
    pub async fn sign_in(&self, account: AccountId) -> Result<(), PlanStoreError> {
        let (epoch, base_revision) = {
            let mut st = self.inner.state();
            if st.account.as_ref() == Some(&account) {
                debug!(%account, "already signed in");
                return Ok(());
            }
            st.reset(Some(account.clone()));
            st.loading = true;
            (st.epoch, st.revision)
        };

        info!(%account, "loading plan");
        let result = self.inner.repo.load_plan(&account).await;

        let mut st = self.inner.state();
        if st.epoch != epoch {
            debug!(%account, "account changed during load, discarding result");
            return Ok(());
        }
        st.loading = false;

        let loaded = match result {
            Ok(Some(document)) => document.classify(),
            Ok(None) => {
                debug!(%account, "no stored plan, starting empty");
                StoredPlan::Items(ItemPlan::default())
            }
            Err(e) => {
                error!(%account, error = %e, "failed to load plan");
                st.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };
        st.legacy = loaded.is_legacy();
        let mut plan = loaded.into_item_plan();

        if st.revision != base_revision {
            // Entries committed while loading stay ahead of the stored ones.
            warn!(%account, "plan changed while loading, merging local entries");
            plan.prepend(std::mem::take(&mut st.plan.items));
            st.plan = plan;
            self.inner.schedule_save(&mut st);
        } else {
            st.plan = plan;
        }

        info!(%account, items = st.plan.items.len(), legacy = st.legacy, "plan loaded");
        Ok(())
    }

    /// Drop the account and reset to the empty plan without touching storage.
    pub fn sign_out(&self) {
        let mut st = self.inner.state();
        if let Some(account) = st.account.as_ref() {
            info!(%account, "signed out");
        }
        st.reset(None);
    }

    /// Flip `done` on a step. Returns false for unknown ids and stack reports.
    pub fn toggle_item(&self, id: &ItemId) -> bool {
        self.mutate("toggle_item", |plan| plan.toggle_item(id))
    }

    /// Remove one entry by id.
    pub fn remove_item(&self, id: &ItemId) -> bool {
        self.mutate("remove_item", |plan| plan.remove_item(id))
    }

    /// Remove a stack report and all of its steps in one mutation.
    pub fn remove_group(&self, group_id: &ItemId) -> usize {
        let mut removed = 0;
        self.mutate("remove_group", |plan| {
            removed = plan.remove_group(group_id);
            removed > 0
        });
        removed
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        let mut removed = 0;
        self.mutate("clear_all", |plan| {
            removed = plan.items.len();
            plan.clear();
            removed > 0
        });
        removed
    }

    /// Put a committed report and its steps at the front of the plan.
    pub fn merge_commit(&self, bundle: CommitBundle) -> ItemId {
        let group_id = bundle.group_id().clone();
        self.mutate("merge_commit", |plan| {
            plan.prepend(bundle.into_items());
            true
        });
        group_id
    }

    /// Write immediately, superseding an armed debounce timer.
    pub async fn save_now(&self) -> Result<SaveOutcome, PlanStoreError> {
        let (outcome, follow_up) = self.inner.write_once().await;
        if follow_up {
            self.inner.spawn_follow_up();
        }
        outcome
    }

    pub fn save_phase(&self) -> SavePhase {
        self.inner.state().scheduler.phase()
    }

    pub fn view(&self) -> PlanView {
        let st = self.inner.state();
        PlanView {
            account: st.account.clone(),
            title: st.plan.title.clone(),
            items: st.plan.items.clone(),
            progress: st.plan.progress(),
            loading: st.loading,
            saving: st.scheduler.is_saving(),
            pending: st.scheduler.is_pending(),
            last_saved_at: st.last_saved_at,
            last_error: st.last_error.clone(),
            legacy: st.legacy,
        }
    }

    /// Clone of the current local plan.
    pub fn plan(&self) -> ItemPlan {
        self.inner.state().plan.clone()
    }

    /// Cancel armed timers. Later mutations still apply locally but only
    /// reach storage through [`Self::save_now`].
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    fn mutate(&self, op: &'static str, apply: impl FnOnce(&mut ItemPlan) -> bool) -> bool {
        let mut st = self.inner.state();
        if !apply(&mut st.plan) {
            debug!(op, "mutation changed nothing");
            return false;
        }
        st.revision += 1;
        debug!(op, revision = st.revision, items = st.plan.items.len(), "plan mutated");
        self.inner.schedule_save(&mut st);
        true
    }
}

impl<R: PlanRepository> Drop for PlanStore<R> {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

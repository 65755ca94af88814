//! Plan repository trait.
//!
//! One plan document per account. Implementations live in stackplan-infra.

use stackplan_types::error::RepositoryError;
use stackplan_types::ids::AccountId;
use stackplan_types::plan::PlanDocument;

/// Trait for per-account plan persistence.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait PlanRepository: Send + Sync + 'static {
    /// Fetch the stored plan. Returns None if the account has never saved one.
    fn load_plan(
        &self,
        account: &AccountId,
    ) -> impl std::future::Future<Output = Result<Option<PlanDocument>, RepositoryError>> + Send;

    /// Replace the stored plan (upsert) and return the document as stored.
    fn save_plan(
        &self,
        account: &AccountId,
        plan: &PlanDocument,
    ) -> impl std::future::Future<Output = Result<PlanDocument, RepositoryError>> + Send;
}

//! Plan commit and the debounced plan store.

pub mod commit;
pub mod scheduler;
pub mod store;

pub use commit::{CommitBundle, commit};
pub use store::{PlanStore, PlanView, SaveOutcome, SyncConfig};

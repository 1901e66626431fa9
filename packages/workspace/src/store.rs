//! Lock store collaborator.

use crate::lock::{DraftLock, LockOutcome};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("Lock store unavailable: {0}")]
    Unavailable(String),
}

/// Backing store for draft leases.
///
/// Implementations must evaluate [`DraftLock::acquire`] and write its
/// result as one atomic conditional update.
#[async_trait]
pub trait LockStore: Send + Sync {
    async fn acquire_lock(&self, draft_id: &str, actor_id: &str) -> Result<LockOutcome, LockError>;

    async fn current_lock(&self, draft_id: &str) -> Result<Option<DraftLock>, LockError>;
}

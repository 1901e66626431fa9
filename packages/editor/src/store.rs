//! Persistence collaborator consumed by the editor.

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a save attempt that reached the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,

    /// The caller is not the current lock holder
    Conflict { holder: Option<String> },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// Transient failures of the backing store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Loads and saves persisted document text
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load_document_text(&self, document_id: &str) -> Result<String, StoreError>;

    /// Must return [`SaveOutcome::Conflict`] instead of overwriting when
    /// `actor_id` does not hold a valid lease on the document.
    async fn save_document_text(
        &self,
        document_id: &str,
        text: &str,
        actor_id: &str,
    ) -> Result<SaveOutcome, StoreError>;
}

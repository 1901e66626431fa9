//! Error types for the editor

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Draft is locked by {holder}")]
    ReadOnly { holder: String },

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Diagram error: {0}")]
    Diagram(#[from] crate::diagram::DiagramError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

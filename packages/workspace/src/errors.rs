use crate::store::LockError;
use folio_editor::{EditorError, StoreError};
use thiserror::Error;

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

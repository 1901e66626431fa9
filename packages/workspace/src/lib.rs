//! # Folio Workspace
//!
//! Draft-level coordination around editing sessions:
//!
//! ```text
//! DraftWorkspace::open(draft, actor)
//!   ├─ DocumentStore::load_document_text
//!   ├─ LockStore::acquire_lock ── Acquired → writable session
//!   │                          └─ Conflict → read-only session
//!   └─ save ── DocumentStore::save_document_text (checks + refreshes lease)
//! ```
//!
//! The lock is advisory for sessions and enforced by the store on save.

mod clock;
mod draft;
mod errors;
pub mod lock;
mod memory;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use draft::DraftWorkspace;
pub use errors::{WorkspaceError, WorkspaceResult};
pub use lock::{DraftLock, LockConfig, LockOutcome};
pub use memory::InMemoryDraftStore;
pub use store::{LockError, LockStore};

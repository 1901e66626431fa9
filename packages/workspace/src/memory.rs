//! In-process draft store.
//!
//! Text and lease live behind one mutex, so lock transitions and the
//! holder check on save are atomic with respect to each other.

use crate::clock::{Clock, SystemClock};
use crate::lock::{DraftLock, LockConfig, LockOutcome};
use crate::store::{LockError, LockStore};
use async_trait::async_trait;
use folio_editor::store::{DocumentStore, SaveOutcome, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct DraftRecord {
    text: Option<String>,
    lock: Option<DraftLock>,
}

pub struct InMemoryDraftStore {
    drafts: Mutex<HashMap<String, DraftRecord>>,
    clock: Arc<dyn Clock>,
    config: LockConfig,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), LockConfig::default())
    }

    pub fn with_clock(clock: Arc<dyn Clock>, config: LockConfig) -> Self {
        Self {
            drafts: Mutex::new(HashMap::new()),
            clock,
            config,
        }
    }

    /// Seed a draft's persisted text without any lock check
    pub fn insert_draft(&self, draft_id: impl Into<String>, text: impl Into<String>) {
        self.drafts().entry(draft_id.into()).or_default().text = Some(text.into());
    }

    /// Persisted text, if any
    pub fn draft_text(&self, draft_id: &str) -> Option<String> {
        self.drafts().get(draft_id).and_then(|r| r.text.clone())
    }

    fn drafts(&self) -> MutexGuard<'_, HashMap<String, DraftRecord>> {
        self.drafts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockStore for InMemoryDraftStore {
    async fn acquire_lock(&self, draft_id: &str, actor_id: &str) -> Result<LockOutcome, LockError> {
        let now = self.clock.now();
        let mut drafts = self.drafts();
        let record = drafts.entry(draft_id.to_string()).or_default();

        match DraftLock::acquire(record.lock.as_ref(), draft_id, actor_id, now, self.config.lease()) {
            Ok(lock) => {
                let expires_at = lock.expires_at;
                record.lock = Some(lock);
                info!(draft_id, actor_id, %expires_at, "Draft lock acquired");
                Ok(LockOutcome::Acquired { expires_at })
            }
            Err(holder) => {
                warn!(draft_id, actor_id, holder = %holder, "Draft is locked by another user");
                Ok(LockOutcome::Conflict { holder })
            }
        }
    }

    async fn current_lock(&self, draft_id: &str) -> Result<Option<DraftLock>, LockError> {
        Ok(self.drafts().get(draft_id).and_then(|r| r.lock.clone()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDraftStore {
    async fn load_document_text(&self, document_id: &str) -> Result<String, StoreError> {
        self.draft_text(document_id)
            .ok_or_else(|| StoreError::NotFound(document_id.to_string()))
    }

    /// Writes only for the valid lease holder, and refreshes that lease
    async fn save_document_text(
        &self,
        document_id: &str,
        text: &str,
        actor_id: &str,
    ) -> Result<SaveOutcome, StoreError> {
        let now = self.clock.now();
        let mut drafts = self.drafts();
        let record = drafts.entry(document_id.to_string()).or_default();

        match record.lock.as_mut() {
            Some(lock) if lock.is_held_by(actor_id, now) => {
                lock.refresh(now, self.config.lease());
                record.text = Some(text.to_string());
                Ok(SaveOutcome::Saved)
            }
            lock => {
                let holder = lock
                    .filter(|l| !l.is_expired(now))
                    .map(|l| l.holder_id.clone());
                warn!(
                    draft_id = document_id,
                    actor_id,
                    holder = holder.as_deref().unwrap_or("none"),
                    "Rejected save from non-holder"
                );
                Ok(SaveOutcome::Conflict { holder })
            }
        }
    }
}

//! Sessions gated by the draft lock.

use crate::errors::WorkspaceResult;
use crate::lock::LockOutcome;
use crate::store::LockStore;
use folio_editor::store::{DocumentStore, SaveOutcome};
use folio_editor::{
    spawn_autosave, AutosaveHandle, Document, EditingSession, EditorConfig, SessionAccess,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

pub struct DraftWorkspace<S> {
    store: Arc<S>,
    config: EditorConfig,
}

impl<S> DraftWorkspace<S>
where
    S: LockStore + DocumentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EditorConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: EditorConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Load a draft and try to lock it for `actor_id`.
    ///
    /// The session is writable when the lock was acquired and read-only,
    /// naming the holder, when someone else holds it.
    pub async fn open(&self, draft_id: &str, actor_id: &str) -> WorkspaceResult<EditingSession> {
        let text = self.store.load_document_text(draft_id).await?;
        let outcome = self.store.acquire_lock(draft_id, actor_id).await?;

        let mut session = EditingSession::open(
            format!("session-{}", Uuid::new_v4()),
            draft_id,
            &text,
            &self.config,
        );
        session.set_access(access_for(&outcome));

        info!(
            draft_id,
            actor_id,
            session_id = %session.id,
            read_only = session.is_read_only(),
            "Opened draft"
        );
        Ok(session)
    }

    /// Persist the session's current text on behalf of `actor_id`.
    ///
    /// A read-only session reports a conflict without calling the store.
    pub async fn save(
        &self,
        session: &mut EditingSession,
        actor_id: &str,
    ) -> WorkspaceResult<SaveOutcome> {
        if let SessionAccess::ReadOnly { holder } = session.access() {
            return Ok(SaveOutcome::Conflict {
                holder: Some(holder.clone()),
            });
        }

        let draft_id = session.document().id.clone();
        let text = session.text().to_string();
        let outcome = self
            .store
            .save_document_text(&draft_id, &text, actor_id)
            .await?;

        debug!(draft_id = %draft_id, saved = outcome.is_saved(), "Saved draft");
        Ok(outcome)
    }

    /// Retry or refresh the lock for `session`.
    ///
    /// On success the session is reloaded from the persisted text when the
    /// lease was last held by someone else, since they may have saved in
    /// the meantime. A refresh of the caller's own lease keeps local edits.
    pub async fn reacquire(
        &self,
        session: &mut EditingSession,
        actor_id: &str,
    ) -> WorkspaceResult<LockOutcome> {
        let draft_id = session.document().id.clone();
        let previous = self.store.current_lock(&draft_id).await?;
        let outcome = self.store.acquire_lock(&draft_id, actor_id).await?;

        let changed_hands = previous
            .as_ref()
            .is_some_and(|lock| lock.holder_id != actor_id);

        if outcome.is_acquired() && (session.is_read_only() || changed_hands) {
            let text = self.store.load_document_text(&draft_id).await?;
            let document =
                Document::from_source_with_options(draft_id.as_str(), &text, self.config.parse.clone());
            *session = EditingSession::with_config(session.id.clone(), document, &self.config);

            info!(
                draft_id = %draft_id,
                actor_id,
                previous_holder = previous.as_ref().map(|lock| lock.holder_id.as_str()),
                "Reloaded draft after lock change"
            );
        }
        session.set_access(access_for(&outcome));

        Ok(outcome)
    }

    /// Start autosaving a shared session at the configured interval
    pub async fn autosave(
        &self,
        session: Arc<Mutex<EditingSession>>,
        actor_id: &str,
    ) -> WorkspaceResult<AutosaveHandle> {
        self.config.validate()?;
        let store: Arc<dyn DocumentStore> = self.store.clone();
        let handle =
            spawn_autosave(session, store, actor_id, self.config.autosave_interval()).await?;
        Ok(handle)
    }
}

fn access_for(outcome: &LockOutcome) -> SessionAccess {
    match outcome {
        LockOutcome::Acquired { .. } => SessionAccess::Writable,
        LockOutcome::Conflict { holder } => SessionAccess::ReadOnly {
            holder: holder.clone(),
        },
    }
}

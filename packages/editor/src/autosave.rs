//! # Autosave
//!
//! On a fixed interval, serialize the session and compare it to the
//! last saved snapshot. Only a difference triggers a store call, so the
//! number of writes is bounded by the interval, not by keystrokes.
//!
//! ```text
//! idle → saving → saved
//!           ↘ failed | conflict
//! ```
//!
//! A failed save never touches the session; the blocks in memory stay
//! the source of truth and the next tick retries.

use crate::errors::{EditorError, EditorResult};
use crate::session::EditingSession;
use crate::store::{DocumentStore, SaveOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Visible save indicator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed {
        message: String,
    },
    Conflict {
        holder: Option<String>,
    },
}

pub struct Autosaver {
    document_id: String,
    actor_id: String,
    last_saved: String,
    status: watch::Sender<SaveStatus>,
}

impl Autosaver {
    /// `snapshot` is the text known to be persisted already
    pub fn new(
        document_id: impl Into<String>,
        actor_id: impl Into<String>,
        snapshot: impl Into<String>,
    ) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self {
            document_id: document_id.into(),
            actor_id: actor_id.into(),
            last_saved: snapshot.into(),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn last_saved(&self) -> &str {
        &self.last_saved
    }

    pub fn has_changes(&self, text: &str) -> bool {
        text != self.last_saved
    }

    /// Persist `text` if it differs from the last snapshot
    pub async fn save_if_changed(&mut self, text: &str, store: &dyn DocumentStore) -> SaveStatus {
        if !self.has_changes(text) {
            return self.status();
        }

        self.status.send_replace(SaveStatus::Saving);
        debug!(document_id = %self.document_id, bytes = text.len(), "Autosaving");

        let status = match store
            .save_document_text(&self.document_id, text, &self.actor_id)
            .await
        {
            Ok(SaveOutcome::Saved) => {
                self.last_saved = text.to_string();
                info!(document_id = %self.document_id, "Autosaved");
                SaveStatus::Saved
            }
            Ok(SaveOutcome::Conflict { holder }) => {
                warn!(
                    document_id = %self.document_id,
                    holder = holder.as_deref().unwrap_or("unknown"),
                    "Autosave rejected, draft is locked by another user"
                );
                SaveStatus::Conflict { holder }
            }
            Err(err) => {
                warn!(document_id = %self.document_id, error = %err, "Autosave failed");
                SaveStatus::Failed {
                    message: err.to_string(),
                }
            }
        };

        self.status.send_replace(status.clone());
        status
    }
}

/// Running autosave task. Dropping the handle stops it.
pub struct AutosaveHandle {
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Autosave `session` every `interval` on behalf of `actor_id`.
///
/// The session's text at spawn time counts as already persisted.
/// Read-only sessions are skipped. A zero interval is rejected.
pub async fn spawn_autosave(
    session: Arc<Mutex<EditingSession>>,
    store: Arc<dyn DocumentStore>,
    actor_id: impl Into<String>,
    interval: Duration,
) -> EditorResult<AutosaveHandle> {
    if interval.is_zero() {
        return Err(EditorError::InvalidConfig(
            "autosave interval must be greater than zero".to_string(),
        ));
    }

    let (document_id, snapshot) = {
        let mut session = session.lock().await;
        let text = session.text().to_string();
        (session.document().id.clone(), text)
    };

    let mut saver = Autosaver::new(document_id, actor_id, snapshot);
    let status = saver.subscribe();

    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let text = {
                let mut session = session.lock().await;
                if session.is_read_only() {
                    continue;
                }
                session.text().to_string()
            };

            saver.save_if_changed(&text, store.as_ref()).await;
        }
    });

    Ok(AutosaveHandle { status, task })
}

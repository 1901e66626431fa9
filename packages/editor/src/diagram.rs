//! # Diagram Render Adapter
//!
//! Policy around an external diagram renderer:
//! - re-render only after the source has been quiet for the debounce period
//! - every attempt gets a fresh id, renderers may keep per-attempt state
//! - failures show a fixed syntax error indicator and the attempt's
//!   partial artifact is cleaned up
//! - results of attempts superseded by a newer source are discarded

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Text shown in place of a diagram that failed to render
pub const SYNTAX_ERROR_INDICATOR: &str = "Syntax error in diagram";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagramError {
    #[error("Invalid diagram syntax: {0}")]
    Syntax(String),

    #[error("Diagram render failed: {0}")]
    Render(String),
}

/// External diagram rendering library
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    async fn validate(&self, source: &str) -> Result<(), DiagramError>;

    /// Render to an SVG artifact registered under `attempt_id`
    async fn render(&self, source: &str, attempt_id: &str) -> Result<String, DiagramError>;

    /// Remove whatever an attempt left behind
    fn cleanup(&self, attempt_id: &str);
}

/// What a diagram block currently displays
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiagramView {
    #[default]
    Empty,

    Rendered { attempt_id: String, svg: String },

    SyntaxError,
}

impl DiagramView {
    /// Text of the error indicator, if any
    pub fn error_text(&self) -> Option<&'static str> {
        matches!(self, DiagramView::SyntaxError).then_some(SYNTAX_ERROR_INDICATOR)
    }
}

/// A single render attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderAttempt {
    pub id: String,
    pub generation: u64,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// Render state of one diagram block
#[derive(Debug, Default)]
pub struct DiagramPreview {
    generation: u64,
    source: Option<String>,
    view: DiagramView,
}

impl DiagramPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &DiagramView {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record new content; attempts started before this become stale
    pub fn update(&mut self, source: impl Into<String>) {
        self.generation += 1;
        self.source = Some(source.into());
    }

    /// Start an attempt for the latest content
    pub fn begin(&self) -> Option<RenderAttempt> {
        let source = self.source.clone()?;
        Some(RenderAttempt {
            id: format!("diagram-{}", Uuid::new_v4()),
            generation: self.generation,
            source,
        })
    }

    /// Apply an attempt's result unless newer content arrived meanwhile
    pub fn complete(
        &mut self,
        attempt: &RenderAttempt,
        result: Result<String, DiagramError>,
    ) -> Completion {
        if attempt.generation != self.generation {
            debug!(attempt_id = %attempt.id, "Discarding superseded diagram render");
            return Completion::Stale;
        }

        self.view = match result {
            Ok(svg) => DiagramView::Rendered {
                attempt_id: attempt.id.clone(),
                svg,
            },
            Err(err) => {
                warn!(attempt_id = %attempt.id, error = %err, "Diagram render failed");
                DiagramView::SyntaxError
            }
        };

        Completion::Applied
    }
}

/// Validate then render; a failed attempt is cleaned up before returning
pub async fn render_attempt(
    renderer: &dyn DiagramRenderer,
    attempt: &RenderAttempt,
) -> Result<String, DiagramError> {
    let result = match renderer.validate(&attempt.source).await {
        Ok(()) => renderer.render(&attempt.source, &attempt.id).await,
        Err(err) => Err(err),
    };

    if result.is_err() {
        renderer.cleanup(&attempt.id);
    }

    result
}

/// Debounced live preview of one diagram block.
///
/// Dropping the handle stops the preview task. Renders still in flight
/// run to completion and are cleaned up.
pub struct DiagramPreviewHandle {
    updates: mpsc::UnboundedSender<String>,
    view: watch::Receiver<DiagramView>,
    task: JoinHandle<()>,
}

impl DiagramPreviewHandle {
    /// Feed the latest diagram source
    pub fn update(&self, source: impl Into<String>) {
        let _ = self.updates.send(source.into());
    }

    pub fn subscribe(&self) -> watch::Receiver<DiagramView> {
        self.view.clone()
    }

    pub fn view(&self) -> DiagramView {
        self.view.borrow().clone()
    }
}

impl Drop for DiagramPreviewHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start a preview task for one diagram block
pub fn spawn_diagram_preview(
    renderer: Arc<dyn DiagramRenderer>,
    debounce: Duration,
) -> DiagramPreviewHandle {
    let (updates, updates_rx) = mpsc::unbounded_channel();
    let (view_tx, view) = watch::channel(DiagramView::Empty);
    let task = tokio::spawn(run_preview(renderer, debounce, updates_rx, view_tx));

    DiagramPreviewHandle {
        updates,
        view,
        task,
    }
}

async fn run_preview(
    renderer: Arc<dyn DiagramRenderer>,
    debounce: Duration,
    mut updates: mpsc::UnboundedReceiver<String>,
    view_tx: watch::Sender<DiagramView>,
) {
    let mut preview = DiagramPreview::new();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(RenderAttempt, Result<String, DiagramError>)>();
    let mut scheduled = false;

    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(source) => {
                    preview.update(source);
                    timer.as_mut().reset(Instant::now() + debounce);
                    scheduled = true;
                }
                None => break,
            },
            _ = &mut timer, if scheduled => {
                scheduled = false;
                if let Some(attempt) = preview.begin() {
                    let renderer = Arc::clone(&renderer);
                    let done = done_tx.clone();
                    tokio::spawn(async move {
                        let result = render_attempt(renderer.as_ref(), &attempt).await;
                        let sent = done.send((attempt, result));
                        // Preview stopped while rendering; nobody will show this artifact
                        if let Err(mpsc::error::SendError((attempt, Ok(_)))) = sent {
                            debug!(attempt_id = %attempt.id, "Cleaning up render of a stopped preview");
                            renderer.cleanup(&attempt.id);
                        }
                    });
                }
            },
            Some((attempt, result)) = done_rx.recv() => {
                let succeeded = result.is_ok();
                match preview.complete(&attempt, result) {
                    Completion::Applied => {
                        view_tx.send_replace(preview.view().clone());
                    }
                    Completion::Stale if succeeded => renderer.cleanup(&attempt.id),
                    Completion::Stale => {}
                }
            },
        }
    }
}

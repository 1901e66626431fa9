//! # Folio Editor
//!
//! Editing engine for block documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: persisted text ⇄ blocks             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: sessions over a document            │
//! │  - id-addressed mutations with undo/redo    │
//! │  - post-effects keep the sequence valid     │
//! │  - keyboard and paste policy                │
//! │  - autosave and diagram preview drivers     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: persistence collaborator (external)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Blocks are the source of truth**: persisted text is derived
//! 2. **Never empty**: a session always has at least one block, and the
//!    last one is an editable text block
//! 3. **Failures stay local**: a failed save or render never rolls back edits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{EditingSession, EditorConfig};
//! use folio_parser::BlockData;
//!
//! let mut session = EditingSession::open("s1", "drafts/42", source, &EditorConfig::default());
//! session.insert_block(0, BlockData::code("rust", "fn main() {}"))?;
//! let text = session.text().to_string();
//! ```

pub mod autosave;
mod config;
pub mod diagram;
mod document;
mod errors;
pub mod keyboard;
mod mutations;
mod post_effects;
mod session;
pub mod store;
mod undo_stack;

pub use autosave::{spawn_autosave, AutosaveHandle, Autosaver, SaveStatus};
pub use config::EditorConfig;
pub use diagram::{
    spawn_diagram_preview, DiagramError, DiagramPreview, DiagramPreviewHandle, DiagramRenderer,
    DiagramView, SYNTAX_ERROR_INDICATOR,
};
pub use document::Document;
pub use errors::{EditorError, EditorResult};
pub use keyboard::{Key, KeyEvent, KeyOutcome, PasteOutcome};
pub use mutations::{BlockPatch, Mutation, MutationError, MutationResult};
pub use post_effects::{EnsureNonEmpty, EnsureTrailingText, PostEffect, PostEffectEngine};
pub use session::{EditingSession, SessionAccess};
pub use store::{DocumentStore, SaveOutcome, StoreError};
pub use undo_stack::{MutationBatch, UndoStack};

// Re-export block types for convenience
pub use folio_parser::ast::{Align, Block, BlockData, BlockId, BlockKind, IframeSettings, RichText};

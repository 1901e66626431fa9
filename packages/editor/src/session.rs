//! # Editing Session
//!
//! An EditingSession is one editor view's handle on a document: the
//! live block sequence, the focus pointer, undo history and access mode.
//!
//! Every structural operation becomes a [`Mutation`] batch that runs
//! through the post-effect engine, so the sequence is never empty and
//! always ends with a text block. Sessions are torn down by dropping
//! them; persistence is always an explicit save elsewhere.

use crate::keyboard::{self, KeyAction, KeyEvent, KeyOutcome, PasteOutcome};
use crate::mutations::{BlockPatch, Mutation, MutationError};
use crate::post_effects::PostEffectEngine;
use crate::undo_stack::UndoStack;
use crate::{Document, EditorConfig, EditorError, EditorResult};
use folio_parser::ast::{Block, BlockData, BlockId};
use tracing::debug;

/// Whether the session may mutate its document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAccess {
    Writable,

    /// Another actor holds the draft lock
    ReadOnly { holder: String },
}

#[derive(Debug)]
pub struct EditingSession {
    /// Unique session identifier
    pub id: String,

    document: Document,
    focus: Option<BlockId>,
    access: SessionAccess,
    undo: UndoStack,
    effects: PostEffectEngine,
}

impl EditingSession {
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self::with_config(id, document, &EditorConfig::default())
    }

    pub fn with_config(id: impl Into<String>, document: Document, config: &EditorConfig) -> Self {
        Self {
            id: id.into(),
            document,
            focus: None,
            access: SessionAccess::Writable,
            undo: UndoStack::with_max_levels(config.undo_levels),
            effects: PostEffectEngine::from_config(config),
        }
    }

    /// Parse `source` and open a writable session on it
    pub fn open(
        id: impl Into<String>,
        document_id: &str,
        source: &str,
        config: &EditorConfig,
    ) -> Self {
        let document = Document::from_source_with_options(document_id, source, config.parse.clone());
        Self::with_config(id, document, config)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn blocks(&self) -> &[Block] {
        self.document.blocks()
    }

    pub fn access(&self) -> &SessionAccess {
        &self.access
    }

    pub fn set_access(&mut self, access: SessionAccess) {
        self.access = access;
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.access, SessionAccess::ReadOnly { .. })
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focus
            .as_deref()
            .and_then(|id| self.document.index_of(id))
    }

    /// Move the focus pointer. No other side effect.
    pub fn set_focus(&mut self, block_id: Option<&str>) {
        self.focus = block_id.map(str::to_string);
    }

    /// Current persisted text
    pub fn text(&mut self) -> &str {
        self.document.text()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Insert a block after `after_index` (at the end when out of range)
    /// and focus it
    pub fn insert_block(&mut self, after_index: usize, data: BlockData) -> EditorResult<BlockId> {
        let index = after_index.saturating_add(1).min(self.document.len());
        let block_id = self.insert_blocks_at(index, vec![data], "Insert block")?;
        Ok(block_id.into_iter().next().unwrap_or_default())
    }

    /// Merge `patch` into the block at `index`, keeping its id and position
    pub fn update_block(&mut self, index: usize, patch: BlockPatch) -> EditorResult<()> {
        let block_id = self.block_id_at(index)?;
        self.commit("Update block", vec![Mutation::UpdateBlock { block_id, patch }])?;
        Ok(())
    }

    /// Remove the block at `index` and focus the block now at `index - 1`
    pub fn remove_block(&mut self, index: usize) -> EditorResult<Option<BlockId>> {
        let block_id = self.block_id_at(index)?;
        self.commit("Remove block", vec![Mutation::RemoveBlock { block_id }])?;

        let focus = self
            .document
            .get(index.saturating_sub(1))
            .map(|b| b.id.clone());
        self.focus = focus.clone();
        Ok(focus)
    }

    /// Structural key press on the block at `index`
    pub fn handle_key(&mut self, index: usize, event: KeyEvent) -> EditorResult<KeyOutcome> {
        let block = self
            .document
            .get(index)
            .ok_or(MutationError::IndexOutOfRange {
                index,
                len: self.document.len(),
            })?;

        let is_last_text = self.document.len() == 1 && block.is_text();

        match keyboard::key_action(block, event) {
            KeyAction::Remove => {
                if is_last_text {
                    return Ok(KeyOutcome::Ignored);
                }
                let focus = self.remove_block(index)?;
                Ok(KeyOutcome::Removed { focus })
            }
            KeyAction::InsertTextAfter => {
                let block_id = self.insert_block(index, BlockData::empty_text())?;
                Ok(KeyOutcome::Inserted { block_id })
            }
            KeyAction::Ignore => Ok(KeyOutcome::Ignored),
        }
    }

    /// Plain text pasted while the block at `index` has focus.
    ///
    /// A single paragraph pasted into a text block is left to the host.
    /// Anything else becomes new blocks after the target, so structured
    /// payloads are never corrupted.
    pub fn paste(&mut self, index: usize, text: &str) -> EditorResult<PasteOutcome> {
        let target = self
            .document
            .get(index)
            .ok_or(MutationError::IndexOutOfRange {
                index,
                len: self.document.len(),
            })?;

        let blocks = keyboard::paste_blocks(text, self.document.options());
        if blocks.is_empty() {
            return Ok(PasteOutcome::Ignored);
        }
        if target.is_text() && keyboard::is_inline_paste(&blocks) {
            return Ok(PasteOutcome::Inline);
        }

        let block_ids = self.insert_blocks_at(index + 1, blocks, "Paste")?;
        Ok(PasteOutcome::Inserted { block_ids })
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        self.ensure_writable()?;
        let target = match self.undo.undo(&mut self.document)? {
            Some(batch) => batch.primary_inverse().map(|m| m.block_id().to_string()),
            None => return Ok(false),
        };
        self.retarget_focus(target);
        Ok(true)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        self.ensure_writable()?;
        let target = match self.undo.redo(&mut self.document)? {
            Some(batch) => batch.primary().map(|m| m.block_id().to_string()),
            None => return Ok(false),
        };
        self.retarget_focus(target);
        Ok(true)
    }

    fn ensure_writable(&self) -> EditorResult<()> {
        match &self.access {
            SessionAccess::Writable => Ok(()),
            SessionAccess::ReadOnly { holder } => Err(EditorError::ReadOnly {
                holder: holder.clone(),
            }),
        }
    }

    fn block_id_at(&self, index: usize) -> Result<BlockId, MutationError> {
        self.document
            .get(index)
            .map(|b| b.id.clone())
            .ok_or(MutationError::IndexOutOfRange {
                index,
                len: self.document.len(),
            })
    }

    /// Insert consecutive blocks as one undo step, focusing the last one
    fn insert_blocks_at(
        &mut self,
        index: usize,
        blocks: Vec<BlockData>,
        label: &str,
    ) -> EditorResult<Vec<BlockId>> {
        self.ensure_writable()?;

        let mut mutations = Vec::with_capacity(blocks.len());
        let mut block_ids = Vec::with_capacity(blocks.len());
        for (offset, data) in blocks.into_iter().enumerate() {
            let block = Block::new(self.document.next_block_id(), data);
            block_ids.push(block.id.clone());
            mutations.push(Mutation::InsertBlock {
                index: index + offset,
                block,
            });
        }

        self.commit(label, mutations)?;
        self.focus = block_ids.last().cloned();
        Ok(block_ids)
    }

    /// Apply mutations with their post-effects as a single undo batch
    fn commit(&mut self, label: &str, mutations: Vec<Mutation>) -> EditorResult<()> {
        self.ensure_writable()?;

        self.undo.begin_batch();
        self.undo.set_batch_description(label);

        let mut result = Ok(());
        for mutation in mutations {
            if let Err(err) = self
                .effects
                .apply_with_effects(mutation, &mut self.document, &mut self.undo)
            {
                result = Err(err);
                break;
            }
        }

        self.undo.end_batch();

        debug!(
            session_id = %self.id,
            operation = label,
            version = self.document.version,
            blocks = self.document.len(),
            "Committed edit"
        );

        result.map_err(EditorError::from)
    }

    /// Focus `target` if it exists, else keep the current focus if it
    /// still exists, else the last block
    fn retarget_focus(&mut self, target: Option<String>) {
        let exists = |id: &Option<String>| {
            id.as_deref()
                .is_some_and(|id| self.document.find(id).is_some())
        };

        if exists(&target) {
            self.focus = target;
        } else if !exists(&self.focus) {
            self.focus = self.document.blocks().last().map(|b| b.id.clone());
        }
    }

    /// Description of the operation `undo` would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.undo.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.undo.redo_description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_parser::ast::{Align, BlockKind};

    fn session(source: &str) -> EditingSession {
        EditingSession::open("client-1", "drafts/1", source, &EditorConfig::default())
    }

    fn kinds(session: &EditingSession) -> Vec<BlockKind> {
        session.blocks().iter().map(Block::kind).collect()
    }

    #[test]
    fn test_session_creation() {
        let session = session("Hello");

        assert_eq!(session.id, "client-1");
        assert!(session.focus().is_none());
        assert!(!session.is_read_only());
        assert_eq!(session.blocks().len(), 1);
    }

    #[test]
    fn test_insert_focuses_new_block() {
        let mut session = session("Hello");
        let id = session
            .insert_block(0, BlockData::code("js", "x()"))
            .unwrap();

        assert_eq!(session.focus(), Some(id.as_str()));
        assert_eq!(session.focused_index(), Some(1));
        assert_eq!(
            kinds(&session),
            vec![BlockKind::Text, BlockKind::Code, BlockKind::Text]
        );
    }

    #[test]
    fn test_insert_out_of_range_appends() {
        let mut session = session("a\n\nb");
        let id = session.insert_block(42, BlockData::empty_text()).unwrap();
        assert_eq!(session.blocks().last().unwrap().id, id);
    }

    #[test]
    fn test_update_keeps_id_and_position() {
        let mut session = session("![](https://x.io/a.png)");
        let id = session.blocks()[0].id.clone();

        session
            .update_block(0, BlockPatch::default().with_align(Align::Right))
            .unwrap();

        assert_eq!(session.blocks()[0].id, id);
        match &session.blocks()[0].data {
            BlockData::Image { align, width, .. } => {
                assert_eq!(*align, Align::Right);
                assert_eq!(*width, 600);
            }
            other => panic!("Expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_remove_focuses_previous_block() {
        let mut session = session("a\n\nb\n\nc");
        let first = session.blocks()[0].id.clone();
        let second = session.blocks()[1].id.clone();

        let focus = session.remove_block(2).unwrap();
        assert_eq!(focus.as_deref(), Some(second.as_str()));

        let focus = session.remove_block(0).unwrap();
        assert_eq!(session.blocks()[0].id, second);
        assert_eq!(focus.as_deref(), Some(second.as_str()));
        assert_ne!(focus.as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_removing_everything_leaves_one_empty_text_block() {
        let mut session = session("a\n\n![](http://x)\n\n```\ncode\n```\n\nb");

        while session.blocks().iter().any(|b| !b.is_empty()) {
            session.remove_block(0).unwrap();
            assert!(!session.blocks().is_empty());
        }

        assert_eq!(session.blocks().len(), 1);
        assert!(session.blocks()[0].is_text());
        assert!(session.blocks()[0].is_empty());

        // Removing the placeholder itself substitutes a new one
        session.remove_block(0).unwrap();
        assert_eq!(session.blocks().len(), 1);
        assert_eq!(session.focus(), Some(session.blocks()[0].id.as_str()));
    }

    #[test]
    fn test_undo_restores_removed_block_and_focus() {
        let mut session = session("a\n\nb");
        let removed = session.blocks()[1].id.clone();

        session.remove_block(1).unwrap();
        assert_eq!(session.undo_description(), Some("Remove block"));
        assert!(session.undo().unwrap());
        assert_eq!(session.redo_description(), Some("Remove block"));

        assert_eq!(session.blocks()[1].id, removed);
        assert_eq!(session.focus(), Some(removed.as_str()));

        assert!(session.redo().unwrap());
        assert!(session.document().find(&removed).is_none());
        assert!(!session.redo().unwrap());
    }

    #[test]
    fn test_undo_reverts_post_effects_with_operation() {
        let mut session = session("a");
        session
            .insert_block(0, BlockData::mermaid("graph TD"))
            .unwrap();
        assert_eq!(session.blocks().len(), 3);

        session.undo().unwrap();
        assert_eq!(kinds(&session), vec![BlockKind::Text]);
    }

    #[test]
    fn test_read_only_session_rejects_mutations() {
        let mut session = session("a");
        session.set_access(SessionAccess::ReadOnly {
            holder: "alice".to_string(),
        });

        let err = session.insert_block(0, BlockData::empty_text()).unwrap_err();
        assert!(matches!(err, EditorError::ReadOnly { ref holder } if holder == "alice"));
        assert!(session.remove_block(0).is_err());
        assert_eq!(session.blocks().len(), 1);

        // Focus is not a mutation
        let id = session.blocks()[0].id.clone();
        session.set_focus(Some(&id));
        assert_eq!(session.focus(), Some(id.as_str()));
    }

    #[test]
    fn test_update_out_of_range() {
        let mut session = session("a");
        let err = session
            .update_block(5, BlockPatch::default().with_content("x"))
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::Mutation(MutationError::IndexOutOfRange { index: 5, len: 1 })
        ));
    }
}

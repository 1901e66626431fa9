//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! - Each mutation records its inverse before being applied
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the original mutations
//! - New mutations clear the redo stack
//! - A user operation and its post-effects form one batch

use crate::document::Document;
use crate::mutations::{Mutation, MutationError};

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// The inverse mutations (in reverse order for undo)
    pub inverses: Vec<Mutation>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
            inverses: vec![inverse],
            description: None,
        }
    }

    fn empty() -> Self {
        Self {
            mutations: Vec::new(),
            inverses: Vec::new(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The user-initiated mutation of the batch
    pub fn primary(&self) -> Option<&Mutation> {
        self.mutations.first()
    }

    /// Inverse of the primary mutation, applied last on undo
    pub fn primary_inverse(&self) -> Option<&Mutation> {
        self.inverses.last()
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<MutationBatch>,
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: &Mutation, doc: &mut Document) -> Result<(), MutationError> {
        let inverse = mutation.to_inverse(doc.blocks())?;

        doc.apply(mutation)?;

        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(mutation.clone());
            batch.inverses.insert(0, inverse);
        } else {
            self.push_batch(MutationBatch::single(mutation.clone(), inverse));
        }

        Ok(())
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(MutationBatch::empty());
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent batch, returning it when there was one.
    ///
    /// When any inverse no longer applies the document is left untouched
    /// and the batch stays on the undo stack.
    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<&MutationBatch>, MutationError> {
        let Some(batch) = self.undo_stack.last() else {
            return Ok(None);
        };
        apply_all(&batch.inverses, doc)?;

        if let Some(batch) = self.undo_stack.pop() {
            self.redo_stack.push(batch);
        }
        Ok(self.redo_stack.last())
    }

    /// Redo the most recently undone batch, returning it when there was one.
    /// Same all-or-nothing behavior as [`UndoStack::undo`].
    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<&MutationBatch>, MutationError> {
        let Some(batch) = self.redo_stack.last() else {
            return Ok(None);
        };
        apply_all(&batch.mutations, doc)?;

        if let Some(batch) = self.redo_stack.pop() {
            self.undo_stack.push(batch);
        }
        Ok(self.undo_stack.last())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

/// Dry-run `mutations` on a copy of the blocks, then apply them for real
fn apply_all(mutations: &[Mutation], doc: &mut Document) -> Result<(), MutationError> {
    let mut scratch = doc.blocks().to_vec();
    for mutation in mutations {
        mutation.apply(&mut scratch)?;
    }

    for mutation in mutations {
        doc.apply(mutation)?;
    }
    Ok(())
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::BlockPatch;
    use folio_parser::ast::{Block, BlockData};

    fn update(block_id: &str, markup: &str) -> Mutation {
        Mutation::UpdateBlock {
            block_id: block_id.to_string(),
            patch: BlockPatch::default().with_content(markup),
        }
    }

    fn first_markup(doc: &Document) -> String {
        match &doc.blocks()[0].data {
            BlockData::Text { content } => content.as_markup().to_string(),
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_apply_undo_redo() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let mut stack = UndoStack::new();
        let id = doc.blocks()[0].id.clone();

        stack.apply(&update(&id, "World"), &mut doc).unwrap();
        assert_eq!(first_markup(&doc), "World");
        assert!(stack.can_undo());

        assert!(stack.undo(&mut doc).unwrap().is_some());
        assert_eq!(first_markup(&doc), "Hello");
        assert_eq!(stack.redo_levels(), 1);

        assert!(stack.redo(&mut doc).unwrap().is_some());
        assert_eq!(first_markup(&doc), "World");
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_batched_mutations() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let mut stack = UndoStack::new();
        let id = doc.blocks()[0].id.clone();
        let new_id = doc.next_block_id();

        stack.begin_batch();
        stack.set_batch_description("Rewrite intro");
        stack.apply(&update(&id, "World"), &mut doc).unwrap();
        stack
            .apply(
                &Mutation::InsertBlock {
                    index: 1,
                    block: Block::new(new_id, BlockData::mermaid("graph TD")),
                },
                &mut doc,
            )
            .unwrap();
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Rewrite intro"));

        let batch = stack.undo(&mut doc).unwrap().unwrap();
        assert_eq!(batch.primary().unwrap().block_id(), id);
        assert_eq!(doc.len(), 1);
        assert_eq!(first_markup(&doc), "Hello");
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let mut stack = UndoStack::new();
        let id = doc.blocks()[0].id.clone();

        stack.apply(&update(&id, "World"), &mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        stack.apply(&update(&id, "Everyone"), &mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let mut stack = UndoStack::with_max_levels(2);
        let id = doc.blocks()[0].id.clone();

        for i in 0..3 {
            stack.apply(&update(&id, &format!("Text {}", i)), &mut doc).unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_failed_mutation_is_not_recorded() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let mut stack = UndoStack::new();

        assert!(stack.apply(&update("missing", "x"), &mut doc).is_err());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_undo_is_all_or_nothing() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let mut stack = UndoStack::new();
        let id = doc.blocks()[0].id.clone();
        let new_id = doc.next_block_id();

        stack.begin_batch();
        stack.apply(&update(&id, "World"), &mut doc).unwrap();
        stack
            .apply(
                &Mutation::InsertBlock {
                    index: 1,
                    block: Block::new(new_id.clone(), BlockData::mermaid("graph TD")),
                },
                &mut doc,
            )
            .unwrap();
        stack.end_batch();

        // Removing the first block outside the stack breaks its inverse;
        // the inverse of the insert would still apply on its own.
        doc.apply(&Mutation::RemoveBlock { block_id: id.clone() }).unwrap();
        let before = doc.blocks().to_vec();

        assert!(matches!(
            stack.undo(&mut doc),
            Err(MutationError::BlockNotFound(_))
        ));
        assert_eq!(doc.blocks(), before.as_slice());
        assert_eq!(doc.blocks()[0].id, new_id);
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_failed_redo_keeps_batch() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let mut stack = UndoStack::new();
        let id = doc.blocks()[0].id.clone();

        stack.begin_batch();
        stack.set_batch_description("Rewrite");
        stack.apply(&update(&id, "World"), &mut doc).unwrap();
        stack.end_batch();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_description(), Some("Rewrite"));

        doc.apply(&Mutation::RemoveBlock { block_id: id }).unwrap();
        assert!(stack.redo(&mut doc).is_err());
        assert_eq!(stack.redo_levels(), 1);
        assert_eq!(stack.redo_description(), Some("Rewrite"));
        assert!(doc.is_empty());
    }
}

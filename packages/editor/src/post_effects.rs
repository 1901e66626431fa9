//! # Post-Effect System
//!
//! Mutations trigger follow-up mutations that keep the block sequence
//! well-formed:
//! - Removing the last block → insert an empty text block
//! - Ending the sequence with a non-text block → append an empty text block
//!
//! Effects run in registration order, each one seeing the document after
//! the previous effect's mutations were applied.

use crate::document::Document;
use crate::mutations::{Mutation, MutationError};
use crate::undo_stack::UndoStack;
use crate::EditorConfig;
use folio_parser::ast::{Block, BlockData};

/// Post-effect that can be triggered by a mutation
pub trait PostEffect: std::fmt::Debug + Send + Sync {
    /// Analyze the mutation and generate secondary mutations if needed.
    ///
    /// `doc` is mutable only so that new blocks can draw fresh ids.
    fn analyze(&self, mutation: &Mutation, doc: &mut Document) -> Vec<Mutation>;
}

fn empty_text(doc: &mut Document, index: usize) -> Mutation {
    Mutation::InsertBlock {
        index,
        block: Block::new(doc.next_block_id(), BlockData::empty_text()),
    }
}

/// The sequence is never left empty
#[derive(Debug)]
pub struct EnsureNonEmpty;

impl PostEffect for EnsureNonEmpty {
    fn analyze(&self, mutation: &Mutation, doc: &mut Document) -> Vec<Mutation> {
        match mutation {
            Mutation::RemoveBlock { .. } if doc.is_empty() => vec![empty_text(doc, 0)],
            _ => vec![],
        }
    }
}

/// A caret-reachable text block always ends the sequence
#[derive(Debug)]
pub struct EnsureTrailingText;

impl PostEffect for EnsureTrailingText {
    fn analyze(&self, mutation: &Mutation, doc: &mut Document) -> Vec<Mutation> {
        if matches!(mutation, Mutation::UpdateBlock { .. }) {
            return vec![];
        }

        match doc.blocks().last() {
            Some(last) if !last.is_text() => {
                let index = doc.len();
                vec![empty_text(doc, index)]
            }
            _ => vec![],
        }
    }
}

/// Post-effect engine that applies all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(EnsureNonEmpty), Box::new(EnsureTrailingText)],
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        let mut effects: Vec<Box<dyn PostEffect>> = vec![Box::new(EnsureNonEmpty)];
        if config.ensure_trailing_text {
            effects.push(Box::new(EnsureTrailingText));
        }
        Self { effects }
    }

    /// Apply a mutation and its post-effects, recording all of them for undo
    pub fn apply_with_effects(
        &self,
        mutation: Mutation,
        doc: &mut Document,
        undo: &mut UndoStack,
    ) -> Result<Vec<Mutation>, MutationError> {
        undo.apply(&mutation, doc)?;
        let mut applied_mutations = vec![mutation];

        for effect in &self.effects {
            let secondary = effect.analyze(&applied_mutations[0], doc);
            for secondary_mutation in secondary {
                undo.apply(&secondary_mutation, doc)?;
                applied_mutations.push(secondary_mutation);
            }
        }

        Ok(applied_mutations)
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

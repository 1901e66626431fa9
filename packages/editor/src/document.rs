//! # Document Handle
//!
//! A Document owns the live block sequence of one draft or article,
//! plus the persisted text derived from it.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Edit → Serialize → Save
//!   ↓      ↓       ↓        ↓         ↓
//! Text  Blocks Mutations   Text     Store
//! ```
//!
//! The text cache is recomputed lazily; `is_dirty` reports whether the
//! blocks changed since it was last computed.

use crate::mutations::{Mutation, MutationError, MutationResult};
use folio_parser::ast::{Block, BlockId};
use folio_parser::{BlockIds, ParseOptions, Parser, Serializer};
use tracing::debug;

/// Editable block document
#[derive(Debug)]
pub struct Document {
    /// Document identifier (draft or article id)
    pub id: String,

    /// Current version number (increments on each applied mutation)
    pub version: u64,

    blocks: Vec<Block>,
    ids: BlockIds,
    options: ParseOptions,
    text: String,
    dirty: bool,
}

impl Document {
    /// Create document from persisted text
    pub fn from_source(id: impl Into<String>, source: &str) -> Self {
        Self::from_source_with_options(id, source, ParseOptions::default())
    }

    pub fn from_source_with_options(
        id: impl Into<String>,
        source: &str,
        options: ParseOptions,
    ) -> Self {
        let id = id.into();
        let mut parser = Parser::new(BlockIds::for_document(&id)).with_options(options.clone());
        let blocks = parser.parse_document(source);
        let text = Serializer::with_options(options.clone()).serialize(&blocks);

        debug!(document_id = %id, blocks = blocks.len(), "Loaded document");

        Self {
            id,
            version: 0,
            blocks,
            ids: parser.into_ids(),
            options,
            text,
            dirty: false,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn find(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    pub fn index_of(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == block_id)
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Fresh block id, never one already present in the sequence
    pub fn next_block_id(&mut self) -> BlockId {
        let blocks = &self.blocks;
        self.ids
            .next_unused(|id| blocks.iter().any(|block| block.id == id))
    }

    /// Apply a mutation
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationResult, MutationError> {
        mutation.apply(&mut self.blocks)?;

        self.version += 1;
        self.dirty = true;

        debug!(
            document_id = %self.id,
            version = self.version,
            block_id = mutation.block_id(),
            "Applied mutation"
        );

        Ok(MutationResult {
            version: self.version,
        })
    }

    /// Check if the blocks changed since the text was last derived
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persisted text of the current blocks
    pub fn text(&mut self) -> &str {
        if self.dirty {
            self.text = self.serialize();
            self.dirty = false;
        }
        &self.text
    }

    /// Serialize without touching the cache
    pub fn serialize(&self) -> String {
        Serializer::with_options(self.options.clone()).serialize(&self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_parser::ast::BlockData;

    #[test]
    fn test_create_document() {
        let doc = Document::from_source("drafts/1", "Hello\n\n![](https://x.io/a.png)");

        assert_eq!(doc.version, 0);
        assert!(!doc.is_dirty());
        assert_eq!(doc.len(), 3);
        assert!(doc.get(2).unwrap().is_text());
    }

    #[test]
    fn test_version_and_dirty_flag() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let id = doc.next_block_id();

        let result = doc
            .apply(&Mutation::InsertBlock {
                index: 1,
                block: Block::new(id, BlockData::code("js", "x()")),
            })
            .unwrap();

        assert_eq!(result.version, 1);
        assert!(doc.is_dirty());
        assert_eq!(doc.text(), "Hello\n\n```js\nx()\n```");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_failed_mutation_keeps_version() {
        let mut doc = Document::from_source("drafts/1", "Hello");
        let result = doc.apply(&Mutation::RemoveBlock {
            block_id: "missing".to_string(),
        });

        assert!(result.is_err());
        assert_eq!(doc.version, 0);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_next_block_id_is_fresh() {
        let mut doc = Document::from_source("drafts/1", "a\n\nb");
        let existing: Vec<String> = doc.blocks().iter().map(|b| b.id.clone()).collect();

        for _ in 0..5 {
            let id = doc.next_block_id();
            assert!(!existing.contains(&id));
        }
    }
}

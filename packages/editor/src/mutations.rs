//! # Block Mutations
//!
//! Structural operations on a block sequence, addressed by block id.
//!
//! ## Mutation Semantics
//!
//! ### InsertBlock
//! - Inserts at `index`, clamped to the end of the sequence
//! - Fails if the block id is already taken
//!
//! ### UpdateBlock
//! - Merges the patch into the block, keeping its id, kind and position
//! - Fails if a patched field does not exist on the block's kind
//!
//! ### RemoveBlock
//! - Removes the block; refilling an emptied sequence is a post-effect

use folio_parser::ast::{Align, Block, BlockData, BlockId, BlockKind, IframeSettings, RichText};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Id-addressed operations on a block sequence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    InsertBlock { index: usize, block: Block },

    UpdateBlock { block_id: BlockId, patch: BlockPatch },

    RemoveBlock { block_id: BlockId },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Block id already in use: {0}")]
    DuplicateId(String),

    #[error("Index {index} out of range for {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Field '{field}' does not apply to {kind} blocks")]
    FieldNotApplicable { field: &'static str, kind: BlockKind },
}

/// Partial block payload. Only `Some` fields are merged.
///
/// `content` is the rich markup of a text block, or the raw source of
/// a code or diagram block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<IframeSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl BlockPatch {
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn with_settings(mut self, settings: IframeSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Patch that restores every field of `data`
    pub fn capture(data: &BlockData) -> Self {
        match data {
            BlockData::Text { content } => Self::default().with_content(content.as_markup()),
            BlockData::Image { src, width, align } => Self::default()
                .with_src(src.clone())
                .with_width(*width)
                .with_align(*align),
            BlockData::Iframe {
                src,
                width,
                height,
                align,
                settings,
            } => Self::default()
                .with_src(src.clone())
                .with_width(*width)
                .with_height(*height)
                .with_align(*align)
                .with_settings(*settings),
            BlockData::Code { language, content } => Self::default()
                .with_content(content.clone())
                .with_language(language.clone()),
            BlockData::Mermaid { content } => Self::default().with_content(content.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn set_fields(&self) -> Vec<&'static str> {
        [
            ("content", self.content.is_some()),
            ("src", self.src.is_some()),
            ("width", self.width.is_some()),
            ("height", self.height.is_some()),
            ("align", self.align.is_some()),
            ("settings", self.settings.is_some()),
            ("language", self.language.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.then_some(field))
        .collect()
    }

    /// Fail if any set field is missing from blocks of `kind`
    pub fn check(&self, kind: BlockKind) -> Result<(), MutationError> {
        let allowed: &[&str] = match kind {
            BlockKind::Text | BlockKind::Mermaid => &["content"],
            BlockKind::Image => &["src", "width", "align"],
            BlockKind::Iframe => &["src", "width", "height", "align", "settings"],
            BlockKind::Code => &["content", "language"],
        };

        match self.set_fields().into_iter().find(|f| !allowed.contains(f)) {
            Some(field) => Err(MutationError::FieldNotApplicable { field, kind }),
            None => Ok(()),
        }
    }

    fn merge_into(&self, data: &mut BlockData) {
        match data {
            BlockData::Text { content } => {
                if let Some(markup) = &self.content {
                    *content = RichText::new(markup.clone());
                }
            }
            BlockData::Image { src, width, align } => {
                merge(src, &self.src);
                merge(width, &self.width);
                merge(align, &self.align);
            }
            BlockData::Iframe {
                src,
                width,
                height,
                align,
                settings,
            } => {
                merge(src, &self.src);
                merge(width, &self.width);
                merge(height, &self.height);
                merge(align, &self.align);
                merge(settings, &self.settings);
            }
            BlockData::Code { language, content } => {
                merge(language, &self.language);
                merge(content, &self.content);
            }
            BlockData::Mermaid { content } => merge(content, &self.content),
        }
    }
}

fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

fn position(blocks: &[Block], block_id: &str) -> Result<usize, MutationError> {
    blocks
        .iter()
        .position(|b| b.id == block_id)
        .ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))
}

impl Mutation {
    /// Id of the block this mutation targets
    pub fn block_id(&self) -> &str {
        match self {
            Mutation::InsertBlock { block, .. } => &block.id,
            Mutation::UpdateBlock { block_id, .. } | Mutation::RemoveBlock { block_id } => block_id,
        }
    }

    /// Apply mutation to the sequence with validation
    pub fn apply(&self, blocks: &mut Vec<Block>) -> Result<(), MutationError> {
        self.validate(blocks)?;

        match self {
            Mutation::InsertBlock { index, block } => {
                let index = (*index).min(blocks.len());
                blocks.insert(index, block.clone());
            }
            Mutation::UpdateBlock { block_id, patch } => {
                let index = position(blocks, block_id)?;
                patch.merge_into(&mut blocks[index].data);
            }
            Mutation::RemoveBlock { block_id } => {
                let index = position(blocks, block_id)?;
                blocks.remove(index);
            }
        }

        Ok(())
    }

    /// Validate without applying
    pub fn validate(&self, blocks: &[Block]) -> Result<(), MutationError> {
        match self {
            Mutation::InsertBlock { block, .. } => {
                if blocks.iter().any(|b| b.id == block.id) {
                    return Err(MutationError::DuplicateId(block.id.clone()));
                }
                Ok(())
            }
            Mutation::UpdateBlock { block_id, patch } => {
                let index = position(blocks, block_id)?;
                patch.check(blocks[index].kind())
            }
            Mutation::RemoveBlock { block_id } => position(blocks, block_id).map(|_| ()),
        }
    }

    /// Mutation that undoes this one, computed against the state before applying
    pub fn to_inverse(&self, blocks: &[Block]) -> Result<Mutation, MutationError> {
        self.validate(blocks)?;

        match self {
            Mutation::InsertBlock { block, .. } => Ok(Mutation::RemoveBlock {
                block_id: block.id.clone(),
            }),
            Mutation::UpdateBlock { block_id, .. } => {
                let index = position(blocks, block_id)?;
                Ok(Mutation::UpdateBlock {
                    block_id: block_id.clone(),
                    patch: BlockPatch::capture(&blocks[index].data),
                })
            }
            Mutation::RemoveBlock { block_id } => {
                let index = position(blocks, block_id)?;
                Ok(Mutation::InsertBlock {
                    index,
                    block: blocks[index].clone(),
                })
            }
        }
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,
}

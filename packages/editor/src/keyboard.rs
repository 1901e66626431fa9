//! Keyboard and paste policy for blocks.
//!
//! The host forwards only structural keys here; caret movement and
//! in-block text editing stay with the host surface.

use folio_parser::ast::{Block, BlockData, BlockId};
use folio_parser::{BlockIds, ParseOptions, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,

    /// The whole block is selected rather than a caret inside it
    pub selected: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            selected: false,
        }
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// What the session should do with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Remove,
    InsertTextAfter,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Removed { focus: Option<BlockId> },
    Inserted { block_id: BlockId },
    Ignored,
}

/// Decide the action for a key press on `block`.
///
/// Text blocks are removed only when empty; merging into a neighbour is
/// not supported. Non-text blocks are removed when empty or selected,
/// and Enter opens a new text block after them.
pub fn key_action(block: &Block, event: KeyEvent) -> KeyAction {
    match (&block.data, event.key) {
        (BlockData::Text { .. }, Key::Backspace | Key::Delete) if block.is_empty() => {
            KeyAction::Remove
        }
        (BlockData::Text { .. }, _) => KeyAction::Ignore,
        (_, Key::Backspace | Key::Delete) if block.is_empty() || event.selected => {
            KeyAction::Remove
        }
        (_, Key::Enter) => KeyAction::InsertTextAfter,
        _ => KeyAction::Ignore,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// The host should absorb the text into the focused text block
    Inline,

    /// New blocks were inserted after the target
    Inserted { block_ids: Vec<BlockId> },

    Ignored,
}

/// Blocks a pasted payload turns into, without ids.
///
/// The trailing empty text block the parser guarantees is dropped.
pub fn paste_blocks(text: &str, options: &ParseOptions) -> Vec<BlockData> {
    let mut parser = Parser::new(BlockIds::scratch()).with_options(options.clone());
    let mut blocks: Vec<BlockData> = parser
        .parse_document(text)
        .into_iter()
        .map(|b| b.data)
        .collect();

    if blocks.last().is_some_and(BlockData::is_empty) {
        blocks.pop();
    }

    blocks
}

/// Plain single-paragraph text can be absorbed by a text block
pub fn is_inline_paste(blocks: &[BlockData]) -> bool {
    matches!(blocks, [BlockData::Text { .. }])
}

use crate::ast::*;
use crate::inline;
use crate::options::{ParseOptions, FENCE};
use std::fmt::Write;

/// Serializer converts blocks back to the persisted document format.
///
/// Blocks that carry nothing worth persisting (blank text, media with
/// no source) are skipped. Blocks are separated by one blank line, which
/// is also what the parser uses to split paragraphs.
pub struct Serializer {
    options: ParseOptions,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Serialize an ordered block list to document source
    pub fn serialize(&self, blocks: &[Block]) -> String {
        blocks
            .iter()
            .filter_map(|block| self.serialize_block(block))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Serialize a single block, or `None` when it would persist nothing
    pub fn serialize_block(&self, block: &Block) -> Option<String> {
        let mut output = String::new();

        match &block.data {
            BlockData::Text { content } => {
                let markup = inline::encode(content);
                if markup.trim().is_empty() {
                    return None;
                }
                output.push_str(&markup);
            }
            BlockData::Image { src, width, align } => {
                if src.is_empty() {
                    return None;
                }
                let _ = write!(output, "![{}|{}]({})", width, align, src);
            }
            BlockData::Iframe {
                src,
                width,
                height,
                align,
                settings,
            } => {
                if src.is_empty() {
                    return None;
                }
                let _ = write!(output, "::iframe[{}x{}|{}", width, height, align);
                if !settings.is_default() {
                    output.push('|');
                    output.push_str(&settings.to_keywords());
                }
                let _ = write!(output, "]({})", src);
            }
            BlockData::Code { language, content } => {
                self.serialize_fence(language, content, &mut output);
            }
            BlockData::Mermaid { content } => {
                let language = self.options.diagram_language.as_str();
                self.serialize_fence(language, content, &mut output);
            }
        }

        Some(output)
    }

    fn serialize_fence(&self, language: &str, content: &str, output: &mut String) {
        output.push_str(FENCE);
        output.push_str(language);
        output.push('\n');
        output.push_str(content);
        output.push('\n');
        output.push_str(FENCE);
    }
}

/// Serialize blocks with default options
pub fn serialize_document(blocks: &[Block]) -> String {
    Serializer::new().serialize(blocks)
}

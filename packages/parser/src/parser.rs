use crate::ast::*;
use crate::error::ParseError;
use crate::ids::BlockIds;
use crate::inline;
use crate::options::ParseOptions;
use crate::tokenizer::{classify, is_fence, Line};
use tracing::{debug, warn};

/// Fence opened but not yet closed
#[derive(Debug)]
struct OpenFence {
    indent: String,
    language: String,
    lines: Vec<String>,
}

impl OpenFence {
    fn push(&mut self, line: &str) {
        let stripped = line.strip_prefix(self.indent.as_str()).unwrap_or(line);
        self.lines.push(stripped.to_string());
    }
}

/// Block parser for the persisted document format.
///
/// Parsing is total: malformed reference lines degrade to text and
/// invalid payload fragments fall back to defaults.
pub struct Parser {
    options: ParseOptions,
    ids: BlockIds,
}

impl Parser {
    pub fn new(ids: BlockIds) -> Self {
        Self {
            options: ParseOptions::default(),
            ids,
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Hand back the id sequence so later inserts continue it
    pub fn into_ids(self) -> BlockIds {
        self.ids
    }

    /// Parse a complete document.
    ///
    /// The result is never empty and always ends with a text block.
    pub fn parse_document(&mut self, source: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut text_lines: Vec<String> = Vec::new();
        let mut fence: Option<OpenFence> = None;

        for line in source.lines() {
            if let Some(open) = fence.as_mut() {
                if is_fence(line) {
                    if let Some(open) = fence.take() {
                        blocks.push(self.close_fence(open));
                    }
                } else {
                    open.push(line);
                }
                continue;
            }

            match classify(line) {
                Line::Fence { indent, info } => {
                    self.flush_text(&mut text_lines, &mut blocks);
                    fence = Some(OpenFence {
                        indent: indent.to_string(),
                        language: info.to_string(),
                        lines: Vec::new(),
                    });
                }
                Line::ImageRef { payload, src } => {
                    self.flush_text(&mut text_lines, &mut blocks);
                    let data = self.image(payload, src);
                    blocks.push(self.block(data));
                }
                Line::IframeRef { payload, src } => {
                    self.flush_text(&mut text_lines, &mut blocks);
                    let data = self.iframe(payload, src);
                    blocks.push(self.block(data));
                }
                Line::Blank => self.flush_text(&mut text_lines, &mut blocks),
                Line::Text(text) => text_lines.push(text.to_string()),
            }
        }

        if let Some(open) = fence.take() {
            warn!(
                language = %open.language,
                lines = open.lines.len(),
                "Unterminated fence, keeping its content as a final block"
            );
            blocks.push(self.close_fence(open));
        }

        self.flush_text(&mut text_lines, &mut blocks);

        if !blocks.last().is_some_and(Block::is_text) {
            let trailing = self.block(BlockData::empty_text());
            blocks.push(trailing);
        }

        blocks
    }

    fn block(&mut self, data: BlockData) -> Block {
        Block::new(self.ids.next(), data)
    }

    fn flush_text(&mut self, lines: &mut Vec<String>, blocks: &mut Vec<Block>) {
        if lines.is_empty() {
            return;
        }

        let markup = lines.join("\n");
        lines.clear();

        let content = inline::decode(&markup);
        if content.is_blank() {
            return;
        }

        let block = self.block(BlockData::Text { content });
        blocks.push(block);
    }

    fn close_fence(&mut self, fence: OpenFence) -> Block {
        let content = fence.lines.join("\n");
        let data = if fence.language == self.options.diagram_language {
            BlockData::Mermaid { content }
        } else {
            let language = if fence.language.is_empty() {
                self.options.default_code_language.clone()
            } else {
                fence.language
            };
            BlockData::Code { language, content }
        };
        self.block(data)
    }

    /// `width|align`, or just `align` when the first segment is not all digits.
    /// A width too large for `u32` falls back to the default.
    fn image(&self, payload: &str, src: &str) -> BlockData {
        let mut segments = payload.split('|').map(str::trim);
        let first = segments.next().unwrap_or_default();

        let numeric = !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit());
        let (width, align) = if numeric {
            let width = parse_dimension(first, self.options.default_image_width);
            (width, segments.next())
        } else {
            (self.options.default_image_width, Some(first))
        };

        BlockData::Image {
            src: src.to_string(),
            width,
            align: parse_align(align),
        }
    }

    /// `WIDTHxHEIGHT|align|permissions`
    fn iframe(&self, payload: &str, src: &str) -> BlockData {
        let mut segments = payload.split('|').map(str::trim);
        let dimensions = segments.next().unwrap_or_default();
        let (width, height) = dimensions.split_once(['x', 'X']).unwrap_or((dimensions, ""));

        let width = parse_dimension(width, self.options.default_iframe_width);
        let height = parse_dimension(height, self.options.default_iframe_height);
        let align = parse_align(segments.next());

        let settings = match segments.next() {
            Some(keywords) => keywords.parse::<IframeSettings>().unwrap_or_else(|err| {
                debug!(error = %err, "Falling back to default iframe settings");
                IframeSettings::default()
            }),
            None => IframeSettings::default(),
        };

        BlockData::Iframe {
            src: src.to_string(),
            width,
            height,
            align,
            settings,
        }
    }
}

fn parse_align(segment: Option<&str>) -> Align {
    match segment.filter(|s| !s.is_empty()) {
        Some(text) => text.parse().unwrap_or_else(|err| {
            debug!(error = %err, "Falling back to default alignment");
            Align::default()
        }),
        None => Align::default(),
    }
}

fn parse_dimension(text: &str, default: u32) -> u32 {
    let text = text.trim();
    if text.is_empty() {
        return default;
    }

    text.parse::<u32>()
        .map_err(|_| ParseError::invalid_dimension(text))
        .unwrap_or_else(|err| {
            debug!(error = %err, default, "Falling back to default dimension");
            default
        })
}

/// Parse a document with a generator seeded from `document_id`
pub fn parse_with_path(source: &str, document_id: &str) -> Vec<Block> {
    Parser::new(BlockIds::for_document(document_id)).parse_document(source)
}

/// Parse a document with default options
pub fn parse_document(source: &str) -> Vec<Block> {
    parse_with_path(source, "untitled")
}

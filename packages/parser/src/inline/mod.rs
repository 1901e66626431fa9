//! # Inline Markup Codec
//!
//! Converts between the persisted inline markup (a markdown-like subset)
//! and [`RichText`], the sanitized markup an editor surface works with.
//!
//! ```text
//! # Title                    <h1>Title</h1>
//! > quoted **bold**    ⇄     <blockquote>quoted <strong>bold</strong></blockquote>
//! - one                      <ul><li>one</li><li>two</li></ul>
//! - two
//! ```
//!
//! The two directions are inverses on the supported grammar only.
//! Block-level markers are recognized per line before inline spans, and
//! `*italic*` is matched after `**bold**`.

mod lexer;
mod tree;

pub use lexer::{tokenize, MarkupToken};
pub use tree::{parse_markup, MarkupNode};

use crate::ast::RichText;
use regex::Regex;
use std::sync::LazyLock;

static NATIVE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(h[1-6]|p|div|br|strong|b|em|i|u|s|del|strike|code|a|ul|ol|li|blockquote|span)\b[^>]*>",
    )
    .expect("native tag pattern")
});
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").expect("heading pattern"));
static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s?(.*)$").expect("quote pattern"));
static UNORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+(.*)$").expect("unordered item pattern"));
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+(.*)$").expect("ordered item pattern"));
static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("code span pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("link pattern"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern"));
static UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").expect("underline pattern"));
static STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~(.+?)~~").expect("strike pattern"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+?)\*").expect("italic pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Leaf recognized at the start of a markup line
enum LineLeaf<'a> {
    Heading(usize, &'a str),
    Quote(&'a str),
    Item(ListKind, &'a str),
    Plain(&'a str),
}

fn classify_line(line: &str) -> LineLeaf<'_> {
    if let Some(caps) = HEADING.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len());
        return LineLeaf::Heading(level, caps.get(2).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = QUOTE.captures(line) {
        return LineLeaf::Quote(caps.get(1).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = UNORDERED_ITEM.captures(line) {
        return LineLeaf::Item(ListKind::Unordered, caps.get(1).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = ORDERED_ITEM.captures(line) {
        return LineLeaf::Item(ListKind::Ordered, caps.get(1).map_or("", |m| m.as_str()));
    }
    LineLeaf::Plain(line)
}

/// Accumulates decoded output; consecutive list items share one list.
struct DecodeWriter {
    out: String,
    list: Option<(ListKind, Vec<String>)>,
    after_inline: bool,
}

impl DecodeWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            list: None,
            after_inline: false,
        }
    }

    fn item(&mut self, kind: ListKind, html: String) {
        match &mut self.list {
            Some((current, items)) if *current == kind => items.push(html),
            _ => {
                self.flush_list();
                self.list = Some((kind, vec![html]));
            }
        }
    }

    fn leaf(&mut self, tag: &str, html: &str) {
        self.flush_list();
        self.out.push_str(&format!("<{tag}>{html}</{tag}>"));
        self.after_inline = false;
    }

    fn plain(&mut self, html: &str) {
        self.flush_list();
        if self.after_inline {
            self.out.push_str("<br>");
        }
        self.out.push_str(html);
        self.after_inline = true;
    }

    fn flush_list(&mut self) {
        if let Some((kind, items)) = self.list.take() {
            let tag = kind.tag();
            self.out.push_str(&format!("<{tag}>"));
            for item in items {
                self.out.push_str(&format!("<li>{item}</li>"));
            }
            self.out.push_str(&format!("</{tag}>"));
            self.after_inline = false;
        }
    }

    fn finish(mut self) -> String {
        self.flush_list();
        self.out
    }
}

/// Decode persisted inline markup into rich content.
///
/// Input that already carries native rich tags is returned unchanged,
/// so decoding a decoded value never double-encodes.
pub fn decode(markup: &str) -> RichText {
    if NATIVE_TAG.is_match(markup) {
        return RichText::new(markup);
    }

    let mut writer = DecodeWriter::new();

    for raw in markup.lines() {
        match classify_line(raw.trim()) {
            LineLeaf::Heading(level, rest) => writer.leaf(&format!("h{level}"), &render_inline(rest)),
            LineLeaf::Quote(rest) => writer.leaf("blockquote", &render_inline(rest)),
            LineLeaf::Item(kind, rest) => writer.item(kind, render_inline(rest)),
            LineLeaf::Plain(text) => writer.plain(&render_inline(text)),
        }
    }

    RichText::new(writer.finish())
}

/// Inline spans of one line. Code spans are opaque.
fn render_inline(text: &str) -> String {
    let mut out = String::new();
    let mut last = 0;

    for caps in CODE_SPAN.captures_iter(text) {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&render_spans(&text[last..whole.start()]));
        out.push_str("<code>");
        out.push_str(&escape(code.as_str()));
        out.push_str("</code>");
        last = whole.end();
    }

    out.push_str(&render_spans(&text[last..]));
    out
}

/// Links are matched first; their targets are never scanned for emphasis.
fn render_spans(text: &str) -> String {
    let escaped = escape(text);
    let mut out = String::new();
    let mut last = 0;

    for caps in LINK.captures_iter(&escaped) {
        let (Some(whole), Some(label), Some(href)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push_str(&render_emphasis(&escaped[last..whole.start()]));
        out.push_str(&format!(
            r#"<a href="{}">{}</a>"#,
            href.as_str(),
            render_emphasis(label.as_str())
        ));
        last = whole.end();
    }

    out.push_str(&render_emphasis(&escaped[last..]));
    out
}

fn render_emphasis(text: &str) -> String {
    let bold = BOLD.replace_all(text, "<strong>${1}</strong>");
    let underline = UNDERLINE.replace_all(&bold, "<u>${1}</u>");
    let strike = STRIKE.replace_all(&underline, "<s>${1}</s>");
    ITALIC.replace_all(&strike, "<em>${1}</em>").into_owned()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Collects encoded lines. Empty lines are dropped on finish.
struct EncodeWriter {
    lines: Vec<String>,
    current: String,
}

impl EncodeWriter {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: String::new(),
        }
    }

    fn push_inline(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line);
    }

    fn block_line(&mut self, line: String) {
        self.break_line();
        self.lines.push(line);
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Encode rich content back to persisted inline markup.
///
/// Rich "empty lines" (`<br>`, empty paragraphs) collapse to nothing, so
/// blank content encodes to an empty string.
pub fn encode(content: &RichText) -> String {
    let mut writer = EncodeWriter::new();
    for node in parse_markup(content.as_markup()) {
        encode_node(&node, &mut writer);
    }
    writer.finish()
}

fn encode_node(node: &MarkupNode, w: &mut EncodeWriter) {
    let (tag, children) = match node {
        MarkupNode::Text(text) => {
            for (i, part) in text.split('\n').enumerate() {
                if i > 0 {
                    w.break_line();
                }
                w.push_inline(part);
            }
            return;
        }
        MarkupNode::Element { tag, children, .. } => (tag.as_str(), children),
    };

    match tag {
        "br" => w.break_line(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1).min(3);
            let body = encode_inline_children(children);
            if !body.trim().is_empty() {
                w.block_line(format!("{} {}", "#".repeat(level), body.trim()));
            }
        }
        "blockquote" => {
            let body = encode_inline_children(children);
            if !body.trim().is_empty() {
                w.block_line(format!("> {}", body.trim()));
            }
        }
        "ul" | "ol" => {
            let items = children.iter().filter_map(|child| match child {
                MarkupNode::Element { tag, children, .. } if tag == "li" => {
                    Some(encode_inline_children(children))
                }
                _ => None,
            });
            let mut number = 0;
            for item in items {
                if item.trim().is_empty() {
                    continue;
                }
                number += 1;
                let marker = if tag == "ol" {
                    format!("{number}.")
                } else {
                    "-".to_string()
                };
                w.block_line(format!("{} {}", marker, item.trim()));
            }
        }
        "li" => {
            let body = encode_inline_children(children);
            if !body.trim().is_empty() {
                w.block_line(format!("- {}", body.trim()));
            }
        }
        "p" | "div" => {
            w.break_line();
            for child in children {
                encode_node(child, w);
            }
            w.break_line();
        }
        _ => w.push_inline(&encode_inline(node)),
    }
}

fn encode_inline_children(children: &[MarkupNode]) -> String {
    children.iter().map(encode_inline).collect()
}

fn encode_inline(node: &MarkupNode) -> String {
    let (tag, href, children) = match node {
        MarkupNode::Text(text) => return text.replace('\n', " "),
        MarkupNode::Element {
            tag,
            href,
            children,
        } => (tag.as_str(), href, children),
    };

    let wrap = |marker: &str| {
        let inner = encode_inline_children(children);
        if inner.trim().is_empty() {
            inner
        } else {
            format!("{marker}{inner}{marker}")
        }
    };

    match tag {
        "strong" | "b" => wrap("**"),
        "em" | "i" => wrap("*"),
        "u" => wrap("__"),
        "s" | "del" | "strike" => wrap("~~"),
        "code" => {
            let code = node.plain_text();
            if code.is_empty() {
                code
            } else {
                format!("`{code}`")
            }
        }
        "a" => {
            let text = encode_inline_children(children);
            match href {
                Some(href) if !href.is_empty() && !text.trim().is_empty() => {
                    format!("[{text}]({href})")
                }
                _ => text,
            }
        }
        "br" => " ".to_string(),
        _ => encode_inline_children(children),
    }
}

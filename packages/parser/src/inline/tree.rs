use super::lexer::{decode_entity, tag_name, tokenize, MarkupToken};
use regex::Regex;
use std::sync::LazyLock;

static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("href pattern")
});

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "wbr"];

/// Node of parsed rich-text markup
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Text(String),
    Element {
        tag: String,
        href: Option<String>,
        children: Vec<MarkupNode>,
    },
}

impl MarkupNode {
    /// Concatenated text of the subtree
    pub fn plain_text(&self) -> String {
        match self {
            MarkupNode::Text(text) => text.clone(),
            MarkupNode::Element { tag, children, .. } if tag == "br" && children.is_empty() => {
                " ".to_string()
            }
            MarkupNode::Element { children, .. } => {
                children.iter().map(MarkupNode::plain_text).collect()
            }
        }
    }
}

struct Frame {
    tag: String,
    href: Option<String>,
    children: Vec<MarkupNode>,
}

/// Stack-based tree builder. Unmatched close tags are dropped and
/// unclosed elements are closed at the end of input.
struct TreeBuilder {
    root: Vec<MarkupNode>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut Vec<MarkupNode> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    fn text(&mut self, text: &str) {
        let children = self.current();
        if let Some(MarkupNode::Text(previous)) = children.last_mut() {
            previous.push_str(text);
        } else {
            children.push(MarkupNode::Text(text.to_string()));
        }
    }

    fn open(&mut self, raw: &str) {
        let tag = tag_name(raw);
        let href = HREF.captures(raw).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| unescape(m.as_str()))
        });

        if raw.ends_with("/>") || VOID_TAGS.contains(&tag.as_str()) {
            self.current().push(MarkupNode::Element {
                tag,
                href,
                children: Vec::new(),
            });
        } else {
            self.stack.push(Frame {
                tag,
                href,
                children: Vec::new(),
            });
        }
    }

    fn close(&mut self, raw: &str) {
        let tag = tag_name(raw);
        if !self.stack.iter().any(|frame| frame.tag == tag) {
            return;
        }

        while let Some(frame) = self.stack.pop() {
            let done = frame.tag == tag;
            self.attach(frame);
            if done {
                break;
            }
        }
    }

    fn attach(&mut self, frame: Frame) {
        let node = MarkupNode::Element {
            tag: frame.tag,
            href: frame.href,
            children: frame.children,
        };
        self.current().push(node);
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while let Some(frame) = self.stack.pop() {
            self.attach(frame);
        }
        self.root
    }
}

/// Parse markup into a forest of nodes
pub fn parse_markup(source: &str) -> Vec<MarkupNode> {
    let mut builder = TreeBuilder::new();

    for token in tokenize(source) {
        match token {
            MarkupToken::OpenTag(raw) => builder.open(raw),
            MarkupToken::CloseTag(raw) => builder.close(raw),
            MarkupToken::Entity(raw) => builder.text(&decode_entity(raw)),
            MarkupToken::Text(text) => builder.text(text),
        }
    }

    builder.finish()
}

/// Decode every character reference in a text run
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        match token {
            MarkupToken::Entity(raw) => out.push_str(&decode_entity(raw)),
            MarkupToken::Text(raw) | MarkupToken::OpenTag(raw) | MarkupToken::CloseTag(raw) => {
                out.push_str(raw)
            }
        }
    }
    out
}

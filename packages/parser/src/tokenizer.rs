//! Line classification for the block parser.
//!
//! Each line outside a fence is matched against an ordered list of
//! classifiers: fence > image reference > iframe reference > blank.
//! Anything left over is text.

use crate::options::FENCE;
use regex::Regex;
use std::sync::LazyLock;

static IMAGE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)\s]+)\)$").expect("image reference pattern"));
static IFRAME_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^::iframe\[([^\]]*)\]\(([^)\s]+)\)$").expect("iframe reference pattern")
});

/// Shape of one physical line of the persisted document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'src> {
    /// Fence delimiter; `indent` is the leading whitespace, `info` the tag after it
    Fence { indent: &'src str, info: &'src str },

    /// `![payload](src)`
    ImageRef { payload: &'src str, src: &'src str },

    /// `::iframe[payload](src)`
    IframeRef { payload: &'src str, src: &'src str },

    Blank,

    /// Any other line, trimmed
    Text(&'src str),
}

type Classifier = for<'a> fn(&'a str) -> Option<Line<'a>>;

const CLASSIFIERS: [Classifier; 4] = [fence, image_ref, iframe_ref, blank];

/// Classify a line outside of a fence
pub fn classify(line: &str) -> Line<'_> {
    CLASSIFIERS
        .iter()
        .find_map(|classifier| classifier(line))
        .unwrap_or_else(|| Line::Text(line.trim()))
}

/// True when the line opens or closes a fence
pub fn is_fence(line: &str) -> bool {
    line.trim().starts_with(FENCE)
}

fn fence(line: &str) -> Option<Line<'_>> {
    let trimmed = line.trim_start();
    let info = trimmed.strip_prefix(FENCE)?;
    Some(Line::Fence {
        indent: &line[..line.len() - trimmed.len()],
        info: info.trim(),
    })
}

fn image_ref(line: &str) -> Option<Line<'_>> {
    let caps = IMAGE_REF.captures(line.trim())?;
    Some(Line::ImageRef {
        payload: caps.get(1)?.as_str(),
        src: caps.get(2)?.as_str(),
    })
}

fn iframe_ref(line: &str) -> Option<Line<'_>> {
    let caps = IFRAME_REF.captures(line.trim())?;
    Some(Line::IframeRef {
        payload: caps.get(1)?.as_str(),
        src: caps.get(2)?.as_str(),
    })
}

fn blank(line: &str) -> Option<Line<'_>> {
    line.trim().is_empty().then_some(Line::Blank)
}

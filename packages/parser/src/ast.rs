use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a block, unique within one document
pub type BlockId = String;

/// Horizontal placement of media blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Align {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            _ => Err(ParseError::invalid_align(s)),
        }
    }
}

/// Permissions granted to an embedded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IframeSettings {
    pub autoplay: bool,
    pub fullscreen: bool,
    pub sensors: bool,
    pub picture_in_picture: bool,
}

impl Default for IframeSettings {
    fn default() -> Self {
        Self {
            autoplay: false,
            fullscreen: true,
            sensors: false,
            picture_in_picture: true,
        }
    }
}

impl IframeSettings {
    /// Keyword used when every permission is disabled
    pub const NONE: &'static str = "none";

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Comma separated list of enabled permissions, as written in the document
    pub fn to_keywords(&self) -> String {
        let enabled: Vec<&str> = [
            (self.autoplay, "autoplay"),
            (self.fullscreen, "fullscreen"),
            (self.sensors, "sensors"),
            (self.picture_in_picture, "pip"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();

        if enabled.is_empty() {
            Self::NONE.to_string()
        } else {
            enabled.join(",")
        }
    }
}

impl fmt::Display for IframeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_keywords())
    }
}

impl FromStr for IframeSettings {
    type Err = ParseError;

    /// Listed permissions are enabled, everything else is disabled.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut settings = IframeSettings {
            autoplay: false,
            fullscreen: false,
            sensors: false,
            picture_in_picture: false,
        };

        for keyword in s.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            match keyword.to_ascii_lowercase().as_str() {
                "autoplay" => settings.autoplay = true,
                "fullscreen" => settings.fullscreen = true,
                "sensors" => settings.sensors = true,
                "pip" | "picture-in-picture" => settings.picture_in_picture = true,
                "none" => {}
                _ => return Err(ParseError::unknown_permission(keyword)),
            }
        }

        Ok(settings)
    }
}

/// Rich inline content of a text block.
///
/// Holds sanitized markup (a small HTML subset) produced by
/// [`crate::inline::decode`]. Use [`crate::inline::encode`] to get the
/// persisted markup back.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(String);

impl RichText {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_markup(&self) -> &str {
        &self.0
    }

    /// True when the content encodes to nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty() || crate::inline::encode(self).trim().is_empty()
    }
}

impl From<&str> for RichText {
    fn from(markup: &str) -> Self {
        Self::new(markup)
    }
}

/// Discriminant of a block, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
    Iframe,
    Code,
    Mermaid,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Iframe => "iframe",
            BlockKind::Code => "code",
            BlockKind::Mermaid => "mermaid",
        };
        f.write_str(name)
    }
}

/// Payload of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockData {
    /// Paragraph of rich inline content
    Text { content: RichText },

    /// Image reference. `src` is empty only while the picker is unconfirmed.
    Image { src: String, width: u32, align: Align },

    /// Embedded frame
    Iframe {
        src: String,
        width: u32,
        height: u32,
        align: Align,
        settings: IframeSettings,
    },

    /// Fenced code, content kept verbatim
    Code { language: String, content: String },

    /// Diagram source
    Mermaid { content: String },
}

impl BlockData {
    pub fn empty_text() -> Self {
        BlockData::Text {
            content: RichText::empty(),
        }
    }

    pub fn text(content: impl Into<RichText>) -> Self {
        BlockData::Text {
            content: content.into(),
        }
    }

    pub fn code(language: impl Into<String>, content: impl Into<String>) -> Self {
        BlockData::Code {
            language: language.into(),
            content: content.into(),
        }
    }

    pub fn mermaid(content: impl Into<String>) -> Self {
        BlockData::Mermaid {
            content: content.into(),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            BlockData::Text { .. } => BlockKind::Text,
            BlockData::Image { .. } => BlockKind::Image,
            BlockData::Iframe { .. } => BlockKind::Iframe,
            BlockData::Code { .. } => BlockKind::Code,
            BlockData::Mermaid { .. } => BlockKind::Mermaid,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, BlockData::Text { .. })
    }

    /// True when the block carries no user content
    pub fn is_empty(&self) -> bool {
        match self {
            BlockData::Text { content } => content.is_blank(),
            BlockData::Image { src, .. } | BlockData::Iframe { src, .. } => src.trim().is_empty(),
            BlockData::Code { content, .. } | BlockData::Mermaid { content } => {
                content.trim().is_empty()
            }
        }
    }
}

/// One structural unit of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,

    #[serde(flatten)]
    pub data: BlockData,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, data: BlockData) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.data.kind()
    }

    pub fn is_text(&self) -> bool {
        self.data.is_text()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

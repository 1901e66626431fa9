//! Block-structured rich-text document model.
//!
//! A persisted document is flat markdown-like text. [`parse_document`]
//! segments it into typed [`Block`]s and [`serialize_document`] renders
//! blocks back. Inline content of text blocks goes through the
//! [`inline`] codec.

pub mod ast;
pub mod error;
pub mod ids;
pub mod inline;
pub mod options;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

#[cfg(test)]
mod tests_comprehensive;
#[cfg(test)]
mod tests_roundtrip;

pub use ast::{Align, Block, BlockData, BlockId, BlockKind, IframeSettings, RichText};
pub use error::{ParseError, ParseResult};
pub use ids::{document_prefix, BlockIds};
pub use options::ParseOptions;
pub use parser::{parse_document, parse_with_path, Parser};
pub use serializer::{serialize_document, Serializer};

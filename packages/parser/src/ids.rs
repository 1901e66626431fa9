//! Block ids.
//!
//! Ids are `<prefix>-<n>`, where the prefix is the CRC32 of the
//! normalized document id. Reparsing the same document yields the same
//! ids; two documents never share a prefix in practice.

use crate::ast::BlockId;

/// Id prefix for blocks of `document_id`.
///
/// `folio://drafts/42`, `drafts/42` and `drafts/42/` share a prefix.
pub fn document_prefix(document_id: &str) -> String {
    let normalized = document_id.trim();
    let normalized = normalized.strip_prefix("folio://").unwrap_or(normalized);
    let normalized = normalized.trim_end_matches('/');
    format!("{:08x}", crc32fast::hash(normalized.as_bytes()))
}

/// Hands out block ids for one document
#[derive(Debug, Clone)]
pub struct BlockIds {
    prefix: String,
    issued: u32,
}

impl BlockIds {
    pub fn for_document(document_id: &str) -> Self {
        Self::with_prefix(document_prefix(document_id))
    }

    /// Ids that are thrown away, e.g. when only payloads are wanted
    pub fn scratch() -> Self {
        Self::with_prefix("scratch")
    }

    fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: 0,
        }
    }

    pub fn next(&mut self) -> BlockId {
        self.issued += 1;
        format!("{}-{}", self.prefix, self.issued)
    }

    /// Next id for which `taken` is false
    pub fn next_unused(&mut self, taken: impl Fn(&str) -> bool) -> BlockId {
        loop {
            let id = self.next();
            if !taken(&id) {
                return id;
            }
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn issued(&self) -> u32 {
        self.issued
    }
}

pub mod check;
pub mod fmt;
pub mod init;
pub mod parse;

pub use check::{check, CheckArgs};
pub use fmt::{fmt, FmtArgs};
pub use init::{init, InitArgs};
pub use parse::{parse, ParseArgs};

use crate::config::Config;
use folio_parser::{Block, BlockIds, Parser};
use std::path::{Path, PathBuf};

/// Resolve a user supplied path against the working directory
pub(crate) fn resolve(cwd: &str, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(cwd).join(path)
    }
}

/// Parse a document, seeding block ids from its path
pub(crate) fn parse_source(source: &str, path: &Path, config: &Config) -> Vec<Block> {
    let mut parser = Parser::new(BlockIds::for_document(&path.display().to_string()))
        .with_options(config.parse.clone());
    parser.parse_document(source)
}

use crate::commands::{parse_source, resolve};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_parser::{Block, BlockData};
use std::fs;

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Document to parse
    pub file: String,

    /// Print the blocks as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse(args: ParseArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = resolve(cwd, &args.file);
    let source =
        fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;

    let blocks = parse_source(&source, &path, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    println!(
        "{} {} ({} blocks)",
        "📄".bright_blue(),
        path.display(),
        blocks.len()
    );
    for (index, block) in blocks.iter().enumerate() {
        println!(
            "  {:>3} {:<8} {}",
            index,
            block.kind().to_string().bright_white(),
            summarize(block).dimmed()
        );
    }

    Ok(())
}

const PREVIEW_CHARS: usize = 60;

/// One-line payload summary
pub fn summarize(block: &Block) -> String {
    match &block.data {
        BlockData::Text { content } => preview(content.as_markup()),
        BlockData::Image { src, width, align } => format!("{}px {} {}", width, align, src),
        BlockData::Iframe {
            src,
            width,
            height,
            align,
            settings,
        } => {
            let mut summary = format!("{}x{} {} {}", width, height, align, src);
            if !settings.is_default() {
                summary.push_str(&format!(" [{}]", settings.to_keywords()));
            }
            summary
        }
        BlockData::Code { language, content } => {
            format!("{}, {} lines", language, content.lines().count())
        }
        BlockData::Mermaid { content } => format!("{} lines", content.lines().count()),
    }
}

fn preview(markup: &str) -> String {
    let flat = markup.replace('\n', " ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

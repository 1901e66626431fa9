use crate::commands::{parse_source, resolve};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use folio_parser::Serializer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// File or directory to check (defaults to the configured source directory)
    pub path: Option<String>,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let root = match &args.path {
        Some(path) => resolve(cwd, path),
        None => config.get_src_dir(cwd),
    };

    if !root.exists() {
        return Err(anyhow!("Path does not exist: {}", root.display()));
    }

    println!("{}", "🔍 Checking documents...".bright_blue().bold());

    let files = find_documents(&root, &config.extension);
    if files.is_empty() {
        println!("{}", format!("⚠️  No .{} files found", config.extension).yellow());
        return Ok(());
    }

    let mut failures = 0;
    for file in &files {
        let relative_path = file.strip_prefix(&root).unwrap_or(file);
        let result = fs::read_to_string(file)
            .map_err(|e| e.to_string())
            .and_then(|source| verify_round_trip(&source, file, &config));

        match result {
            Ok(()) => println!("  {} {}", "✓".green(), relative_path.display()),
            Err(reason) => {
                failures += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    reason.red()
                );
            }
        }
    }

    println!();
    if failures == 0 {
        println!("{} {} files round-trip cleanly", "✅".green(), files.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} files do not round-trip", failures, files.len()))
    }
}

fn find_documents(root: &Path, extension: &str) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some(extension))
        .collect();

    files.sort();
    files
}

/// Parse, serialize and reparse `source`; the block payloads must
/// survive and the serialized text must be stable
pub fn verify_round_trip(source: &str, path: &Path, config: &Config) -> Result<(), String> {
    let serializer = Serializer::with_options(config.parse.clone());

    let blocks = parse_source(source, path, config);
    let text = serializer.serialize(&blocks);
    let reparsed = parse_source(&text, path, config);

    if let Some(index) = (0..blocks.len().max(reparsed.len()))
        .find(|&i| blocks.get(i).map(|b| &b.data) != reparsed.get(i).map(|b| &b.data))
    {
        debug!(path = %path.display(), index, "Block payload changed on reparse");
        return Err(format!("block {} changes after a round trip", index));
    }

    if serializer.serialize(&reparsed) != text {
        return Err("serialized text is not stable".to_string());
    }

    Ok(())
}

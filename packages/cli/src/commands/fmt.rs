use crate::commands::{parse_source, resolve};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_parser::Serializer;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct FmtArgs {
    /// Document to format
    pub file: String,

    /// Rewrite the file in place instead of printing
    #[arg(short, long)]
    pub write: bool,
}

pub fn fmt(args: FmtArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = resolve(cwd, &args.file);
    let source =
        fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;

    let formatted = format_source(&source, &path, &config);

    if !args.write {
        println!("{}", formatted);
        return Ok(());
    }

    if formatted == source {
        println!("  {} {} already formatted", "✓".green(), path.display());
    } else {
        fs::write(&path, &formatted)?;
        println!("  {} Formatted {}", "✓".green(), path.display());
    }

    Ok(())
}

/// Canonical text of a document
pub fn format_source(source: &str, path: &Path, config: &Config) -> String {
    let blocks = parse_source(source, path, config);
    Serializer::with_options(config.parse.clone()).serialize(&blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_normalizes_references() {
        let config = Config::default();
        let formatted = format_source(
            "Intro\n\n\n\n![](https://x.io/a.png)\n::iframe[640x360](https://v.io/1)\n",
            Path::new("post.md"),
            &config,
        );

        assert_eq!(
            formatted,
            "Intro\n\n![600|center](https://x.io/a.png)\n\n::iframe[640x360|center](https://v.io/1)"
        );
    }

    #[test]
    fn test_format_is_idempotent() {
        let config = Config::default();
        let path = Path::new("post.md");
        let once = format_source("# Title\n- a\n- b\n\n```\ncode\n```", path, &config);
        let twice = format_source(&once, path, &config);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_write_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("post.md");
        fs::write(&file, "![](https://x.io/a.png)").unwrap();

        let args = FmtArgs {
            file: "post.md".to_string(),
            write: true,
        };
        fmt(args, dir.path().to_str().unwrap()).unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "![600|center](https://x.io/a.png)"
        );
    }
}

/// Round-trip and structural guarantees of parse/serialize
use crate::inline::decode;
use crate::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Payloads without ids, minus the trailing empty text block
fn payloads(blocks: &[Block]) -> Vec<BlockData> {
    let mut data: Vec<BlockData> = blocks.iter().map(|b| b.data.clone()).collect();
    if data.last().is_some_and(|d| d.is_text() && d.is_empty()) {
        data.pop();
    }
    data
}

fn reparse(blocks: &[Block]) -> Vec<Block> {
    parse_document(&serialize_document(blocks))
}

fn sample_blocks() -> Vec<Block> {
    let data = vec![
        BlockData::Text {
            content: decode("# Getting started"),
        },
        BlockData::Text {
            content: decode("Some **bold**, *italic* and `code`.\nSecond line with [a link](https://x.io)"),
        },
        BlockData::Image {
            src: "https://cdn.x.io/a.png".to_string(),
            width: 420,
            align: Align::Left,
        },
        BlockData::Text {
            content: decode("- one\n- two\n- three"),
        },
        BlockData::Iframe {
            src: "https://video.io/embed/9".to_string(),
            width: 640,
            height: 360,
            align: Align::Right,
            settings: IframeSettings {
                autoplay: true,
                fullscreen: true,
                sensors: false,
                picture_in_picture: false,
            },
        },
        BlockData::code("rust", "fn main() {\n    println!(\"hi\");\n\n}"),
        BlockData::mermaid("graph TD\n  A-->B"),
        BlockData::Text {
            content: decode("> closing thought"),
        },
    ];

    data.into_iter()
        .enumerate()
        .map(|(i, d)| Block::new(format!("b{i}"), d))
        .collect()
}

#[test]
fn test_roundtrip_constructed_sequence() {
    let blocks = sample_blocks();
    let reparsed = reparse(&blocks);

    assert_eq!(payloads(&reparsed), payloads(&blocks));
    assert!(reparsed.last().is_some_and(Block::is_text));
}

#[test]
fn test_roundtrip_is_stable_after_first_parse() {
    let source = "Intro paragraph\n\n![](https://x.io/a.png)\n\n```\nraw\n```\n\n::iframe[100x50](https://v.io)";
    let first = parse_document(source);
    let second = reparse(&first);
    let third = reparse(&second);

    assert_eq!(payloads(&first), payloads(&second));
    assert_eq!(serialize_document(&second), serialize_document(&third));
}

#[test]
fn test_adjacent_text_blocks_stay_separate() {
    let blocks = vec![
        Block::new("a", BlockData::text("first")),
        Block::new("b", BlockData::text("second")),
    ];
    let reparsed = reparse(&blocks);
    assert_eq!(payloads(&reparsed), payloads(&blocks));
}

#[test]
fn test_last_block_is_always_text() {
    let documents = [
        "",
        "   \n\n  ",
        "plain",
        "![](http://x)",
        "::iframe[1x1](http://x)",
        "```\ncode\n```",
        "```mermaid\ngraph TD",
        "text\n\n```js\nopen forever",
    ];

    for source in documents {
        let blocks = parse_document(source);
        assert!(!blocks.is_empty(), "source: {source:?}");
        assert!(
            blocks.last().is_some_and(Block::is_text),
            "source: {source:?}"
        );
    }
}

#[test]
fn test_fence_content_is_opaque() {
    let source = "```md\n![300|left](http://x)\n::iframe[1x1](http://y)\n# not a heading\n```";
    let blocks = parse_document(source);

    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[0].data,
        BlockData::code(
            "md",
            "![300|left](http://x)\n::iframe[1x1](http://y)\n# not a heading"
        )
    );
}

#[test]
fn test_image_defaults_and_explicit_values() {
    let blocks = parse_document("![](http://x)");
    assert_eq!(
        blocks[0].data,
        BlockData::Image {
            src: "http://x".to_string(),
            width: 600,
            align: Align::Center,
        }
    );

    let blocks = parse_document("![300|left](http://x)");
    assert_eq!(
        blocks[0].data,
        BlockData::Image {
            src: "http://x".to_string(),
            width: 300,
            align: Align::Left,
        }
    );
}

#[test]
fn test_code_content_preserved_byte_for_byte() {
    let source = "  ```python\n  def f():\n\n      return 1\n    # deeper\n  ```";
    let blocks = parse_document(source);

    assert_eq!(
        blocks[0].data,
        BlockData::code("python", "def f():\n\n    return 1\n  # deeper")
    );

    // Lines indented less than the fence are kept as-is
    let blocks = parse_document("    ```\n  shallow\n    ```");
    assert_eq!(blocks[0].data, BlockData::code("text", "  shallow"));
}

#[test]
fn test_code_with_trailing_blank_lines_roundtrips() {
    let blocks = vec![Block::new("c", BlockData::code("sh", "echo hi\n\n"))];
    assert_eq!(payloads(&reparse(&blocks)), payloads(&blocks));

    let blocks = vec![Block::new("c", BlockData::code("sh", ""))];
    assert_eq!(payloads(&reparse(&blocks)), payloads(&blocks));
}

#[test]
fn test_placeholder_image_is_dropped() {
    let blocks = vec![
        Block::new("t", BlockData::text("before")),
        Block::new(
            "i",
            BlockData::Image {
                src: String::new(),
                width: 600,
                align: Align::Center,
            },
        ),
        Block::new("u", BlockData::text("after")),
    ];

    let serialized = serialize_document(&blocks);
    assert_eq!(serialized, "before\n\nafter");

    let reparsed = parse_document(&serialized);
    assert!(reparsed.iter().all(|b| b.kind() != BlockKind::Image));
}

#[test]
fn test_empty_text_blocks_do_not_resurrect() {
    let blocks = vec![
        Block::new("a", BlockData::text("<p><br></p>")),
        Block::new("b", BlockData::text("kept")),
        Block::new("c", BlockData::text("<br><br>")),
    ];
    let reparsed = reparse(&blocks);
    assert_eq!(reparsed.len(), 1);
    assert_eq!(reparsed[0].data, BlockData::text("kept"));
}

const WORDS: &[&str] = &[
    "alpha",
    "beta",
    "**bold**",
    "*it*",
    "__under__",
    "~~gone~~",
    "`x*y`",
    "[docs](https://x.io/a__b__c)",
    "[star](https://x.io/a*b*c)",
    "[tilde](https://x.io/~~t~~)",
    "a&b",
    "1 < 2",
];
const LINE_PREFIXES: &[&str] = &["", "# ", "## ", "> ", "- ", "1. "];
const ALIGNS: &[&str] = &["left", "center", "right"];
const CODE_LINES: &[&str] = &["let a = 1;", "    nested()", "", "a ** b", "// done"];

fn random_text(rng: &mut StdRng) -> String {
    let lines = rng.gen_range(1..=3);
    (0..lines)
        .map(|_| {
            let prefix = LINE_PREFIXES.choose(rng).copied().unwrap_or_default();
            let count = rng.gen_range(1..=4);
            let words: Vec<&str> = (0..count)
                .filter_map(|_| WORDS.choose(rng).copied())
                .collect();
            format!("{prefix}{}", words.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn random_fence(rng: &mut StdRng, language: &str) -> String {
    let mut lines = vec!["first".to_string()];
    for _ in 0..rng.gen_range(0..3) {
        lines.push(CODE_LINES.choose(rng).copied().unwrap_or_default().to_string());
    }
    lines.push("last".to_string());
    format!("```{language}\n{}\n```", lines.join("\n"))
}

fn random_document(rng: &mut StdRng) -> String {
    let mut chunks = Vec::new();
    for n in 0..rng.gen_range(1..=8) {
        let chunk = match rng.gen_range(0..5) {
            0 => {
                let align = ALIGNS.choose(rng).copied().unwrap_or_default();
                if rng.gen_bool(0.3) {
                    format!("![](https://img.io/{n}.png)")
                } else {
                    format!("![{}|{align}](https://img.io/{n}.png)", rng.gen_range(1..2000))
                }
            }
            1 => {
                let align = ALIGNS.choose(rng).copied().unwrap_or_default();
                let permissions = if rng.gen_bool(0.5) { "|autoplay" } else { "" };
                format!(
                    "::iframe[{}x{}|{align}{permissions}](https://v.io/{n})",
                    rng.gen_range(1..2000),
                    rng.gen_range(1..2000)
                )
            }
            2 => {
                let language = ["", "rust", "js"].choose(rng).copied().unwrap_or_default();
                random_fence(rng, language)
            }
            3 => random_fence(rng, "mermaid"),
            _ => random_text(rng),
        };
        chunks.push(chunk);
    }
    chunks.join("\n\n")
}

#[test]
fn test_generated_documents_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let source = random_document(&mut rng);
        let first = parse_document(&source);
        let serialized = serialize_document(&first);
        let second = parse_document(&serialized);

        assert_eq!(payloads(&second), payloads(&first), "source:\n{source}");
        assert_eq!(serialize_document(&second), serialized, "source:\n{source}");
    }
}

#[test]
fn test_link_targets_with_emphasis_markers_roundtrip() {
    let source = "see [docs](https://x.io/a__b__c) and [star](https://x.io/a*b*c)\n\n![](https://img.io/a.png)";
    let first = parse_document(source);
    let serialized = serialize_document(&first);

    assert!(serialized.starts_with("see [docs](https://x.io/a__b__c) and [star](https://x.io/a*b*c)"));
    assert_eq!(payloads(&parse_document(&serialized)), payloads(&first));
}

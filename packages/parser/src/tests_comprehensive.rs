/// Whole-document parsing of a realistic article
use crate::inline::encode;
use crate::*;

const ARTICLE: &str = r#"# Shipping a block editor

We rewrote the editor around **typed blocks**.
Each block owns its own payload.

![720|left](https://cdn.example.com/editor.png)

## How it fits together

- parser
- serializer
- session

```mermaid
graph LR
  Text --> Parser
  Parser --> Blocks
```

    ```rust
    let blocks = parse_document(source);

    assert!(!blocks.is_empty());
    ```

::iframe[800x450|center|autoplay,fullscreen](https://video.example.com/embed/42)

::iframe[bad](https://video.example.com/embed/43)

> Thanks for reading
"#;

fn text_of(block: &Block) -> String {
    match &block.data {
        BlockData::Text { content } => encode(content),
        other => panic!("Expected text block, got {:?}", other),
    }
}

#[test]
fn test_article_block_kinds() {
    let blocks = parse_document(ARTICLE);
    let kinds: Vec<BlockKind> = blocks.iter().map(Block::kind).collect();

    assert_eq!(
        kinds,
        vec![
            BlockKind::Text,
            BlockKind::Text,
            BlockKind::Image,
            BlockKind::Text,
            BlockKind::Text,
            BlockKind::Mermaid,
            BlockKind::Code,
            BlockKind::Iframe,
            BlockKind::Iframe,
            BlockKind::Text,
        ]
    );
}

#[test]
fn test_article_payloads() {
    let blocks = parse_document(ARTICLE);

    assert_eq!(text_of(&blocks[0]), "# Shipping a block editor");
    assert_eq!(
        text_of(&blocks[1]),
        "We rewrote the editor around **typed blocks**.\nEach block owns its own payload."
    );
    assert_eq!(text_of(&blocks[4]), "- parser\n- serializer\n- session");

    assert_eq!(
        blocks[5].data,
        BlockData::mermaid("graph LR\n  Text --> Parser\n  Parser --> Blocks")
    );
    assert_eq!(
        blocks[6].data,
        BlockData::code(
            "rust",
            "let blocks = parse_document(source);\n\nassert!(!blocks.is_empty());"
        )
    );

    match &blocks[7].data {
        BlockData::Iframe {
            width,
            height,
            settings,
            ..
        } => {
            assert_eq!((*width, *height), (800, 450));
            assert!(settings.autoplay && settings.fullscreen);
            assert!(!settings.sensors && !settings.picture_in_picture);
        }
        other => panic!("Expected iframe, got {:?}", other),
    }

    match &blocks[8].data {
        BlockData::Iframe { width, height, .. } => assert_eq!((*width, *height), (560, 315)),
        other => panic!("Expected iframe, got {:?}", other),
    }

    assert_eq!(text_of(&blocks[9]), "> Thanks for reading");
}

#[test]
fn test_article_roundtrip_is_canonical() {
    let blocks = parse_document(ARTICLE);
    let canonical = serialize_document(&blocks);
    let again = serialize_document(&parse_document(&canonical));

    assert_eq!(canonical, again);
    assert!(canonical.contains("![720|left](https://cdn.example.com/editor.png)"));
    assert!(canonical.contains(
        "::iframe[800x450|center|autoplay,fullscreen](https://video.example.com/embed/42)"
    ));
    assert!(canonical.contains("::iframe[560x315|center](https://video.example.com/embed/43)"));
}

#[test]
fn test_malformed_references_degrade_to_text() {
    let blocks = parse_document("![broken](not closed\n\n::iframe[1x1]");
    assert!(blocks.iter().all(Block::is_text));
    assert_eq!(blocks.len(), 2);
}

#[test]
fn test_blocks_serialize_to_json() {
    let blocks = parse_with_path("![](https://x.io/a.png)", "drafts/1");
    let json = serde_json::to_value(&blocks[0]).unwrap();

    assert_eq!(json["type"], "image");
    assert_eq!(json["src"], "https://x.io/a.png");
    assert_eq!(json["width"], 600);
    assert_eq!(json["align"], "center");
    assert_eq!(json["id"], format!("{}-1", document_prefix("drafts/1")));

    let back: Block = serde_json::from_value(json).unwrap();
    assert_eq!(back, blocks[0]);
}

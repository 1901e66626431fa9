use logos::Logos;

/// Tokens of the rich-text markup subset
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum MarkupToken<'src> {
    // Opening or self-closing tag, e.g. `<a href="x">` or `<br/>`
    #[regex(r"<[a-zA-Z][a-zA-Z0-9]*([ \t\r\n/][^>]*)?>", |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*[ \t\r\n]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    // Named or numeric character reference
    #[regex(r"&#?[a-zA-Z0-9]+;", |lex| lex.slice())]
    Entity(&'src str),

    #[regex(r"[^<&]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokenize markup. Stray `<` or `&` come back as text.
pub fn tokenize(source: &str) -> Vec<MarkupToken<'_>> {
    let mut lexer = MarkupToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => tokens.push(MarkupToken::Text(lexer.slice())),
        }
    }

    tokens
}

/// Lowercased tag name of an open or close tag
pub fn tag_name(raw: &str) -> String {
    raw.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Decode a character reference; unknown names are kept literally
pub fn decode_entity(raw: &str) -> String {
    let body = &raw[1..raw.len() - 1];
    let decoded = match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => body
            .strip_prefix("#x")
            .or_else(|| body.strip_prefix("#X"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .or_else(|| body.strip_prefix('#').and_then(|dec| dec.parse().ok()))
            .and_then(char::from_u32),
    };

    decoded.map(String::from).unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_tags_and_text() {
        let tokens = tokenize(r#"a <strong>b</strong> <a href="x">c</a><br/>"#);
        assert_eq!(
            tokens,
            vec![
                MarkupToken::Text("a "),
                MarkupToken::OpenTag("<strong>"),
                MarkupToken::Text("b"),
                MarkupToken::CloseTag("</strong>"),
                MarkupToken::Text(" "),
                MarkupToken::OpenTag(r#"<a href="x">"#),
                MarkupToken::Text("c"),
                MarkupToken::CloseTag("</a>"),
                MarkupToken::OpenTag("<br/>"),
            ]
        );
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let tokens = tokenize("1 < 2");
        let text: String = tokens
            .iter()
            .map(|t| match t {
                MarkupToken::Text(s) => *s,
                _ => panic!("unexpected token {:?}", t),
            })
            .collect();
        assert_eq!(text, "1 < 2");
    }

    #[test]
    fn test_tag_name_and_entities() {
        assert_eq!(tag_name("<STRONG>"), "strong");
        assert_eq!(tag_name("</a >"), "a");
        assert_eq!(tag_name(r#"<a href="x">"#), "a");
        assert_eq!(decode_entity("&amp;"), "&");
        assert_eq!(decode_entity("&#65;"), "A");
        assert_eq!(decode_entity("&#x41;"), "A");
        assert_eq!(decode_entity("&bogus;"), "&bogus;");
    }
}

/*
 * scanner.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template scanner.
//!
//! Splits template source into a flat token list in a single left-to-right
//! scan. A `{{...}}` span only becomes a marker token when its content is a
//! valid variable path, a recognized block opener, or a recognized block
//! closer. Everything else, including `{{{triple}}}` braces, unknown
//! directives, and unterminated `{{`, becomes a [`TokenKind::Malformed`]
//! token that renders as its source text.

use std::path::Path;

use crate::ast::{BlockKind, Span, Token, TokenKind, VariableRef};

const OPEN: &str = "{{";
pub(crate) const CLOSE: &str = "}}";

/// A compiled template ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Scanned tokens, in source order.
    pub(crate) tokens: Vec<Token>,

    /// Original source; literal tokens and pass-through markers slice it.
    pub(crate) source: String,
}

impl Template {
    /// Compile a template from source text.
    ///
    /// Compilation cannot fail: malformed markers become
    /// [`TokenKind::Malformed`] tokens and render as their source text.
    pub fn compile(source: impl Into<String>) -> Self {
        let source = source.into();
        let tokens = scan(&source);
        Self { tokens, source }
    }

    /// Compile a template from a file.
    pub fn compile_from_file(path: &Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::compile(source))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The distinct context paths this template refers to, in order of first
    /// appearance. Loop-item paths (`this`, `this.field`) are excluded since
    /// they address loop items rather than the context.
    pub fn references(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for var in self.tokens.iter().filter_map(Token::reference) {
            if var.is_loop_item() {
                continue;
            }
            let dotted = var.dotted();
            if !seen.contains(&dotted) {
                seen.push(dotted);
            }
        }
        seen
    }
}

/// Scan template source into tokens.
pub fn scan(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(rel) = source[pos..].find(OPEN) {
        let open = pos + rel;
        let inner_start = open + OPEN.len();
        let bare_open = Token::malformed(Span::new(open, inner_start));

        let Some(close_rel) = source[inner_start..].find(CLOSE) else {
            // No closing braces anywhere after this point
            push(&mut tokens, &mut literal_start, bare_open);
            break;
        };
        let inner_end = inner_start + close_rel;
        let inner = &source[inner_start..inner_end];

        if inner.contains(OPEN) {
            // A later `{{` owns these closing braces
            push(&mut tokens, &mut literal_start, bare_open);
            pos = inner_start;
            continue;
        }

        let end = inner_end + CLOSE.len();
        let span = Span::new(open, end);
        let token = match classify(inner, span) {
            Some(kind) => Token { kind, span },
            None => Token::malformed(span),
        };
        push(&mut tokens, &mut literal_start, token);
        pos = end;
    }

    if literal_start < source.len() {
        tokens.push(Token::literal(Span::new(literal_start, source.len())));
    }

    tokens
}

/// Flush pending literal text before `token`, then push it.
fn push(tokens: &mut Vec<Token>, literal_start: &mut usize, token: Token) {
    if *literal_start < token.span.start {
        tokens.push(Token::literal(Span::new(*literal_start, token.span.start)));
    }
    *literal_start = token.span.end;
    tokens.push(token);
}

/// Classify the text between `{{` and `}}`.
fn classify(inner: &str, span: Span) -> Option<TokenKind> {
    let trimmed = inner.trim();

    if let Some(rest) = trimmed.strip_prefix('#') {
        let (keyword, target) = rest.split_once(char::is_whitespace)?;
        let kind = BlockKind::from_keyword(keyword)?;
        let path = parse_path(target.trim())?;
        return Some(TokenKind::Open(kind, VariableRef::new(path, span)));
    }

    if let Some(rest) = trimmed.strip_prefix('/') {
        return BlockKind::from_keyword(rest.trim()).map(TokenKind::Close);
    }

    parse_path(trimmed).map(|path| TokenKind::Variable(VariableRef::new(path, span)))
}

/// Parse a dotted identifier chain such as `company.name`.
fn parse_path(text: &str) -> Option<Vec<String>> {
    if text.is_empty() {
        return None;
    }
    text.split('.')
        .map(|segment| is_identifier(segment).then(|| segment.to_string()))
        .collect()
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).into_iter().map(|t| t.kind).collect()
    }

    fn path(tokens: &[Token], index: usize) -> String {
        tokens[index].reference().map(VariableRef::dotted).unwrap_or_default()
    }

    #[test]
    fn test_plain_text() {
        let tokens = scan("Hello, world!");
        assert_eq!(tokens, vec![Token::literal(Span::new(0, 13))]);
    }

    #[test]
    fn test_empty_source() {
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_variable_between_literals() {
        let source = "Hi {{ company.name }}!";
        let tokens = scan(source);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].span.slice(source), "Hi ");
        assert_eq!(tokens[1].span.slice(source), "{{ company.name }}");
        assert_eq!(path(&tokens, 1), "company.name");
        assert_eq!(tokens[2].span.slice(source), "!");
    }

    #[test]
    fn test_blocks() {
        let source = "{{#if paid}}x{{/if}}{{#each items}}{{this.n}}{{/each}}";
        let tokens = scan(source);
        assert!(matches!(tokens[0].kind, TokenKind::Open(BlockKind::If, _)));
        assert_eq!(path(&tokens, 0), "paid");
        assert_eq!(tokens[2].kind, TokenKind::Close(BlockKind::If));
        assert!(matches!(tokens[3].kind, TokenKind::Open(BlockKind::Each, _)));
        assert_eq!(path(&tokens, 4), "this.n");
        assert_eq!(tokens[5].kind, TokenKind::Close(BlockKind::Each));
    }

    #[test]
    fn test_unknown_directives_are_malformed() {
        use TokenKind::{Literal, Malformed};
        assert_eq!(kinds("{{#unless x}}a{{/unless}}"), vec![Malformed, Literal, Malformed]);
        assert_eq!(kinds("{{#if}}"), vec![Malformed]);
        assert_eq!(kinds("{{#if a b}}"), vec![Malformed]);
        assert_eq!(kinds("{{> partial}}"), vec![Malformed]);
        assert_eq!(kinds("{{upper name}}"), vec![Malformed]);
    }

    #[test]
    fn test_triple_braces_are_one_malformed_run() {
        let source = "{{{name}}}";
        let tokens = scan(source);
        assert_eq!(
            tokens,
            vec![Token::malformed(Span::new(0, 9)), Token::literal(Span::new(9, 10))]
        );
    }

    #[test]
    fn test_malformed_paths() {
        assert_eq!(kinds("{{a..b}}"), vec![TokenKind::Malformed]);
        assert_eq!(kinds("{{.a}}"), vec![TokenKind::Malformed]);
        assert_eq!(kinds("{{1abc}}"), vec![TokenKind::Malformed]);
        assert_eq!(kinds("{{}}"), vec![TokenKind::Malformed]);
        assert_eq!(kinds("{{company name}}"), vec![TokenKind::Malformed]);
    }

    #[test]
    fn test_unterminated_open_braces() {
        let source = "total {{amount";
        let tokens = scan(source);
        assert_eq!(
            tokens,
            vec![
                Token::literal(Span::new(0, 6)),
                Token::malformed(Span::new(6, 8)),
                Token::literal(Span::new(8, source.len())),
            ]
        );
    }

    #[test]
    fn test_marker_after_stray_braces() {
        let source = "{{ {{a}}";
        let tokens = scan(source);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], Token::malformed(Span::new(0, 2)));
        assert_eq!(tokens[1].span.slice(source), " ");
        assert_eq!(path(&tokens, 2), "a");
    }

    #[test]
    fn test_tokens_cover_source() {
        let source = "a {{x}} {{#if y}} {{bad one}} {{/if}} {{ tail";
        let tokens = scan(source);
        let rebuilt: String = tokens.iter().map(|t| t.span.slice(source)).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_identifier_characters() {
        assert!(matches!(
            kinds("{{tax-id}}").as_slice(),
            [TokenKind::Variable(_)]
        ));
        assert!(matches!(
            kinds("{{$meta._id}}").as_slice(),
            [TokenKind::Variable(_)]
        ));
    }

    #[test]
    fn test_references_dedup_and_skip_loop_items() {
        let template = Template::compile(
            "{{company.name}} {{#if paid}}{{company.name}}{{/if}}\
             {{#each items}}{{this.qty}}{{this}}{{/each}}",
        );
        assert_eq!(
            template.references(),
            vec!["company.name".to_string(), "paid".into(), "items".into()]
        );
    }

    #[test]
    fn test_template_and_context_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Template>();
        assert_send_sync::<crate::TemplateContext>();
        assert_send_sync::<crate::TemplateValue>();
    }
}

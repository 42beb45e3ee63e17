/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template token types.
//!
//! A template scans into a flat list of tokens. Blocks are not a tree: the
//! pairing of openers and closers happens during evaluation, one pass per
//! block kind, so the token list mirrors the source text one-to-one.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// A byte range into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The source text this span covers.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range()]
    }

    /// 1-based line and column (in characters) of the span start.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let before = &source[..self.start.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

/// The two recognized block keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// `{{#if path}}...{{/if}}`
    If,
    /// `{{#each path}}...{{/each}}`
    Each,
}

impl BlockKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::Each => "each",
        }
    }

    pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "if" => Some(BlockKind::If),
            "each" => Some(BlockKind::Each),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A reference to a context location, e.g. `company.name`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    /// Path components (e.g., `["company", "name"]`).
    pub path: Vec<String>,
    /// Span of the whole marker that carries this reference.
    pub span: Span,
}

impl VariableRef {
    pub fn new(path: Vec<String>, span: Span) -> Self {
        Self { path, span }
    }

    /// Path components as string slices, for context lookups.
    pub fn segments(&self) -> Vec<&str> {
        self.path.iter().map(String::as_str).collect()
    }

    /// Whether this reference addresses the current loop item (`this` or
    /// `this.field`).
    pub fn is_loop_item(&self) -> bool {
        self.path.first().is_some_and(|first| first == "this")
    }

    /// The dotted form of the path.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// What a token is.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Literal text, output as-is.
    Literal,

    /// Text that looked like a marker but did not parse as one, output
    /// as-is: a `{{...}}` run, or a bare `{{` with no closing braces of its
    /// own.
    Malformed,

    /// Variable interpolation: `{{path}}`
    Variable(VariableRef),

    /// Block opener: `{{#if path}}` or `{{#each path}}`
    Open(BlockKind, VariableRef),

    /// Block closer: `{{/if}}` or `{{/each}}`
    Close(BlockKind),
}

/// A scanned token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn literal(span: Span) -> Self {
        Self {
            kind: TokenKind::Literal,
            span,
        }
    }

    pub fn malformed(span: Span) -> Self {
        Self {
            kind: TokenKind::Malformed,
            span,
        }
    }

    /// The variable reference this token carries, if any.
    pub fn reference(&self) -> Option<&VariableRef> {
        match &self.kind {
            TokenKind::Variable(var) | TokenKind::Open(_, var) => Some(var),
            TokenKind::Literal | TokenKind::Malformed | TokenKind::Close(_) => None,
        }
    }
}

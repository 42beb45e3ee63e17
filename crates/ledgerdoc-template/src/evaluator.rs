/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template evaluation engine.
//!
//! Evaluation runs three passes over the token list, in this order:
//!
//! 1. substitute every `{{path}}` that resolves against the context,
//! 2. resolve `{{#if}}...{{/if}}` blocks,
//! 3. expand `{{#each}}...{{/each}}` blocks.
//!
//! Block pairing is non-greedy: an opener is closed by the first closer of
//! the same kind after it, and blocks do not nest. Loop pairing sees the
//! output of the conditional pass, so a conditional that swallows a loop
//! marker changes how loops pair. Loop bodies only receive `{{this}}` and
//! `{{this.field}}` substitution; any other marker in them was either
//! already substituted by pass 1 or passes through.
//!
//! Passes operate on tokens, never on substituted text, so a context value
//! that happens to contain `{{...}}` is emitted verbatim.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::ast::{BlockKind, Span, Token, TokenKind, VariableRef};
use crate::context::{TemplateContext, TemplateValue};
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollector, Severity};
use crate::error::{TemplateError, TemplateResult};
use crate::options::{EscapePolicy, ProcessOptions};
use crate::scanner::{CLOSE, Template};

impl Template {
    /// Render this template with the given context.
    ///
    /// Unresolved and malformed markers pass through as literal text.
    pub fn render(&self, context: &TemplateContext) -> String {
        self.render_with(context, &ProcessOptions::default()).output
    }

    /// Render this template, collecting a diagnostic for every marker that
    /// was passed through.
    pub fn render_with(&self, context: &TemplateContext, options: &ProcessOptions) -> Rendered {
        let mut evaluator = Evaluator {
            source: &self.source,
            context,
            escape: options.escape,
            diagnostics: DiagnosticCollector::new(options.strict),
        };

        let pieces = evaluator.substitute(&self.tokens);
        let pieces = evaluator.resolve_conditionals(pieces);
        let pieces = evaluator.expand_loops(pieces);
        let output = evaluator.finish(pieces);

        let diagnostics = evaluator.diagnostics.into_diagnostics();
        debug!(
            tokens = self.tokens.len(),
            diagnostics = diagnostics.len(),
            "rendered template"
        );
        Rendered {
            output,
            diagnostics,
        }
    }

    /// Render this template, refusing the document if any marker had to be
    /// passed through.
    pub fn render_strict(
        &self,
        context: &TemplateContext,
        options: &ProcessOptions,
    ) -> TemplateResult<String> {
        self.render_with(context, &options.with_strict_mode(true))
            .into_result()
    }
}

/// Output of a render together with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// The output, or [`TemplateError::Strict`] when strict-mode errors were
    /// recorded.
    pub fn into_result(self) -> TemplateResult<String> {
        let errors: Vec<&Diagnostic> = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        match errors.first() {
            None => Ok(self.output),
            Some(first) => Err(TemplateError::Strict {
                count: errors.len(),
                first: first.message.clone(),
            }),
        }
    }
}

/// Outcome of resolving one placeholder against the context.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'t> {
    /// The placeholder resolved; this is its (possibly escaped) text.
    Resolved(String),
    /// The placeholder did not resolve; this is the original marker text.
    Unresolved(&'t str),
}

impl<'t> Resolution<'t> {
    /// Build the outcome from a context lookup.
    pub fn of(value: Option<&TemplateValue>, raw: &'t str, escape: EscapePolicy) -> Self {
        match value {
            Some(value) => Resolution::Resolved(escape.apply(&value.render()).into_owned()),
            None => Resolution::Unresolved(raw),
        }
    }
}

/// Intermediate stream between passes.
#[derive(Debug, Clone)]
enum Piece<'t> {
    /// Final text: template literals, substituted values, and markers that
    /// were demoted to text.
    Text(Cow<'t, str>),
    /// A placeholder that did not resolve in pass 1. Loop bodies may still
    /// resolve it if it addresses the loop item.
    Unresolved(&'t VariableRef, &'t str),
    /// A placeholder that resolved to a mapping; renders empty.
    MapInText(&'t VariableRef),
    /// Text that looked like a marker; renders as its source.
    Malformed(Span),
    Open(BlockKind, &'t VariableRef, &'t str),
    Close(BlockKind, Span),
}

/// Body of a block after pairing.
enum Block<'t> {
    /// Closer found; body excludes both markers.
    Closed(Vec<Piece<'t>>),
    /// Input ended before a closer; body is everything after the opener.
    Unterminated(Vec<Piece<'t>>),
}

/// Collect pieces up to the first closer of `kind`.
fn take_block<'t>(pieces: &mut impl Iterator<Item = Piece<'t>>, kind: BlockKind) -> Block<'t> {
    let mut body = Vec::new();
    for piece in pieces {
        if matches!(piece, Piece::Close(k, _) if k == kind) {
            return Block::Closed(body);
        }
        body.push(piece);
    }
    Block::Unterminated(body)
}

struct Evaluator<'t, 'c> {
    source: &'t str,
    context: &'c TemplateContext,
    escape: EscapePolicy,
    diagnostics: DiagnosticCollector,
}

impl<'t> Evaluator<'t, '_> {
    /// Pass 1: substitute placeholders that resolve against the context.
    fn substitute(&mut self, tokens: &'t [Token]) -> Vec<Piece<'t>> {
        let mut pieces = Vec::with_capacity(tokens.len());
        for token in tokens {
            let raw = token.span.slice(self.source);
            let piece = match &token.kind {
                TokenKind::Literal => Piece::Text(Cow::Borrowed(raw)),
                TokenKind::Malformed => Piece::Malformed(token.span),
                TokenKind::Variable(var) => self.resolve(var, raw),
                TokenKind::Open(kind, var) => Piece::Open(*kind, var, raw),
                TokenKind::Close(kind) => Piece::Close(*kind, token.span),
            };
            pieces.push(piece);
        }
        pieces
    }

    /// Diagnostics wait for `finish`, so markers inside dropped blocks stay
    /// silent.
    fn resolve(&self, var: &'t VariableRef, raw: &'t str) -> Piece<'t> {
        let value = self.context.get_path(&var.segments());
        if value.is_some_and(TemplateValue::is_map) {
            return Piece::MapInText(var);
        }
        match Resolution::of(value, raw, self.escape) {
            Resolution::Resolved(text) => Piece::Text(Cow::Owned(text)),
            Resolution::Unresolved(raw) => Piece::Unresolved(var, raw),
        }
    }

    /// Pass 2: keep or drop conditional blocks.
    fn resolve_conditionals(&mut self, pieces: Vec<Piece<'t>>) -> Vec<Piece<'t>> {
        let mut out = Vec::with_capacity(pieces.len());
        let mut pieces = pieces.into_iter();

        while let Some(piece) = pieces.next() {
            match piece {
                Piece::Open(BlockKind::If, var, raw) => match take_block(&mut pieces, BlockKind::If) {
                    Block::Closed(body) => {
                        if self.is_truthy(var) {
                            self.push_body(&mut out, body, BlockKind::If);
                        } else {
                            trace!(condition = %var.dotted(), "dropped conditional block");
                        }
                    }
                    Block::Unterminated(body) => {
                        self.report_unterminated(BlockKind::If, var);
                        out.push(Piece::Text(Cow::Borrowed(raw)));
                        self.push_body(&mut out, body, BlockKind::If);
                    }
                },
                Piece::Close(BlockKind::If, span) => {
                    out.push(self.stray_close(BlockKind::If, span));
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Pass 3: expand loops over list values.
    fn expand_loops(&mut self, pieces: Vec<Piece<'t>>) -> Vec<Piece<'t>> {
        let mut out = Vec::with_capacity(pieces.len());
        let mut pieces = pieces.into_iter();

        while let Some(piece) = pieces.next() {
            match piece {
                Piece::Open(BlockKind::Each, var, raw) => {
                    match take_block(&mut pieces, BlockKind::Each) {
                        Block::Closed(body) => self.expand_loop(&mut out, var, &body),
                        Block::Unterminated(body) => {
                            self.report_unterminated(BlockKind::Each, var);
                            out.push(Piece::Text(Cow::Borrowed(raw)));
                            self.push_body(&mut out, body, BlockKind::Each);
                        }
                    }
                }
                Piece::Close(BlockKind::Each, span) => {
                    out.push(self.stray_close(BlockKind::Each, span));
                }
                other => out.push(other),
            }
        }
        out
    }

    fn expand_loop(&mut self, out: &mut Vec<Piece<'t>>, var: &VariableRef, body: &[Piece<'t>]) {
        let context = self.context;
        let items = match context.get_path(&var.segments()) {
            Some(TemplateValue::List(items)) => items,
            other => {
                let message = match other {
                    None => format!("`{}` does not resolve; loop rendered empty", var.dotted()),
                    Some(value) => format!(
                        "`{}` is a {}, not a list; loop rendered empty",
                        var.dotted(),
                        value.kind_name()
                    ),
                };
                self.diagnostics
                    .report(DiagnosticCode::NotAList, message, var.span);
                return;
            }
        };

        trace!(target_path = %var.dotted(), items = items.len(), "expanding loop");
        for item in items {
            for piece in body {
                let rendered = match piece {
                    Piece::Unresolved(inner, _) if inner.is_loop_item() => {
                        Piece::Text(Cow::Owned(self.render_loop_item(inner, item)))
                    }
                    Piece::Open(kind, inner, raw) => {
                        self.report_nested(*kind, inner);
                        Piece::Text(Cow::Borrowed(*raw))
                    }
                    other => other.clone(),
                };
                out.push(rendered);
            }
        }
    }

    /// `{{this}}` is the item itself; `{{this.field}}` walks into it, and an
    /// absent field renders empty.
    fn render_loop_item(&mut self, var: &VariableRef, item: &TemplateValue) -> String {
        let segments = var.segments();
        match item.get_path(&segments[1..]) {
            Some(value) => {
                if value.is_map() {
                    self.report_map_in_text(var);
                }
                self.escape.apply(&value.render()).into_owned()
            }
            None => String::new(),
        }
    }

    /// Emit the body of a kept or unterminated block. Openers of the same
    /// kind inside it do not start a new block.
    fn push_body(&mut self, out: &mut Vec<Piece<'t>>, body: Vec<Piece<'t>>, kind: BlockKind) {
        for piece in body {
            match piece {
                Piece::Open(k, var, raw) if k == kind => {
                    self.report_nested(kind, var);
                    out.push(Piece::Text(Cow::Borrowed(raw)));
                }
                other => out.push(other),
            }
        }
    }

    fn is_truthy(&self, var: &VariableRef) -> bool {
        self.context
            .get_path(&var.segments())
            .is_some_and(TemplateValue::is_truthy)
    }

    /// Flatten the remaining pieces, passing unresolved markers through.
    fn finish(&mut self, pieces: Vec<Piece<'t>>) -> String {
        let mut output = String::with_capacity(self.source.len());
        for piece in pieces {
            match piece {
                Piece::Text(text) => output.push_str(&text),
                Piece::Unresolved(var, raw) => {
                    self.diagnostics.report_once(
                        DiagnosticCode::UnresolvedReference,
                        format!("`{}` is not in the context; left as text", var.dotted()),
                        var.span,
                    );
                    output.push_str(raw);
                }
                Piece::MapInText(var) => self.report_map_in_text(var),
                Piece::Malformed(span) => {
                    let text = span.slice(self.source);
                    let message = if text.ends_with(CLOSE) {
                        format!("`{text}` is not a recognized marker; left as text")
                    } else {
                        "`{{` is never closed; left as text".to_string()
                    };
                    self.diagnostics
                        .report_once(DiagnosticCode::MalformedMarker, message, span);
                    output.push_str(text);
                }
                Piece::Open(_, _, raw) => output.push_str(raw),
                Piece::Close(_, span) => output.push_str(span.slice(self.source)),
            }
        }
        output
    }

    fn report_map_in_text(&mut self, var: &VariableRef) {
        self.diagnostics.report_once(
            DiagnosticCode::MapInText,
            format!("`{}` is a mapping; rendered empty", var.dotted()),
            var.span,
        );
    }

    fn report_unterminated(&mut self, kind: BlockKind, var: &VariableRef) {
        self.diagnostics.report_once(
            DiagnosticCode::UnmatchedOpen,
            format!("`{{{{#{kind} {}}}}}` has no `{{{{/{kind}}}}}`; left as text", var.dotted()),
            var.span,
        );
    }

    fn report_nested(&mut self, kind: BlockKind, var: &VariableRef) {
        self.diagnostics.report_once(
            DiagnosticCode::UnmatchedOpen,
            format!(
                "nested `{{{{#{kind} {}}}}}` is not supported; left as text",
                var.dotted()
            ),
            var.span,
        );
    }

    /// A closer with no opener is demoted to text.
    fn stray_close(&mut self, kind: BlockKind, span: Span) -> Piece<'t> {
        self.diagnostics.report(
            DiagnosticCode::StrayClose,
            format!("`{{{{/{kind}}}}}` has no opening block; left as text"),
            span,
        );
        Piece::Text(Cow::Borrowed(span.slice(self.source)))
    }
}

/*
 * diagnostics.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Diagnostics for markers that were passed through during rendering.
//!
//! Rendering never fails, so diagnostics are the only record that a
//! template and its context disagreed. They never change the output.

use std::fmt;

use serde::Serialize;

use crate::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Stable identifiers for each pass-through event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Placeholder path did not resolve; marker left as literal text.
    #[serde(rename = "T001")]
    UnresolvedReference,
    /// Block opener without a matching closer, or nested opener.
    #[serde(rename = "T002")]
    UnmatchedOpen,
    /// Block closer without an opener.
    #[serde(rename = "T003")]
    StrayClose,
    /// `#each` target is not a list.
    #[serde(rename = "T004")]
    NotAList,
    /// Mapping value placed in text position.
    #[serde(rename = "T005")]
    MapInText,
    /// `{{...}}` that is not a recognized marker, or a `{{` never closed.
    #[serde(rename = "T006")]
    MalformedMarker,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnresolvedReference => "T001",
            DiagnosticCode::UnmatchedOpen => "T002",
            DiagnosticCode::StrayClose => "T003",
            DiagnosticCode::NotAList => "T004",
            DiagnosticCode::MapInText => "T005",
            DiagnosticCode::MalformedMarker => "T006",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    /// Format as `line:col [code] message` against the template source.
    pub fn to_text(&self, source: &str) -> String {
        let (line, col) = self.span.line_col(source);
        format!("{}:{} [{}] {}", line, col, self.code, self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (bytes {}..{})",
            self.code, self.message, self.span.start, self.span.end
        )
    }
}

/// Collector for diagnostics during one render.
///
/// In strict mode every diagnostic is recorded as an error instead of a
/// warning.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    strict: bool,
}

impl DiagnosticCollector {
    pub fn new(strict: bool) -> Self {
        Self {
            diagnostics: Vec::new(),
            strict,
        }
    }

    /// Record a pass-through event.
    pub fn report(&mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        let severity = if self.strict {
            Severity::Error
        } else {
            Severity::Warning
        };
        self.diagnostics.push(Diagnostic {
            severity,
            code,
            message: message.into(),
            span,
        });
    }

    /// Record an event unless one with the same code was already recorded
    /// for this span. Loop bodies render once per item and would otherwise
    /// repeat every diagnostic.
    pub fn report_once(&mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        if !self
            .diagnostics
            .iter()
            .any(|d| d.code == code && d.span == span)
        {
            self.report(code, message, span);
        }
    }

    /// Check if any errors were collected (warnings don't count).
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the collector and return the diagnostics, sorted by source
    /// position.
    pub fn into_diagnostics(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.span.start);
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

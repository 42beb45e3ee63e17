/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Placeholder template processor for ledgerdoc documents.
//!
//! Invoice, receipt and report templates are plain HTML with a small set of
//! double-brace markers:
//!
//! - Variable interpolation: `{{company.name}}`
//! - Conditionals: `{{#if sale.paid}}...{{/if}}`
//! - Loops: `{{#each items}}{{this.name}}: {{this.qty}}{{/each}}`
//!
//! Nothing else is recognized. Markers that cannot be resolved are left in
//! the output as literal text instead of raising an error, so a template and
//! context that disagree still produce a document. Every such event is
//! reported as a [`Diagnostic`] for callers that want to surface it.
//!
//! # Example
//!
//! ```
//! use ledgerdoc_template::{Template, TemplateContext, TemplateValue};
//!
//! let template = Template::compile("Hi {{company.name}}");
//!
//! let mut ctx = TemplateContext::new();
//! ctx.insert(
//!     "company",
//!     TemplateValue::map([("name", TemplateValue::from("Acme"))]),
//! );
//!
//! assert_eq!(template.render(&ctx), "Hi Acme");
//! ```

pub mod ast;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod options;
pub mod scanner;

pub use ast::{BlockKind, Span, Token, TokenKind, VariableRef};
pub use context::{TemplateContext, TemplateValue};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollector, Severity};
pub use error::{TemplateError, TemplateResult};
pub use evaluator::{Rendered, Resolution};
pub use options::{EscapePolicy, ProcessOptions};
pub use scanner::Template;

/// Process `template` against `context` in one call.
///
/// This never fails: unresolved or malformed markers pass through unchanged.
pub fn process(template: &str, context: &TemplateContext) -> String {
    Template::compile(template).render(context)
}

/// Process `template` and collect diagnostics for every marker that was
/// passed through.
pub fn process_with(
    template: &str,
    context: &TemplateContext,
    options: &ProcessOptions,
) -> Rendered {
    Template::compile(template).render_with(context, options)
}

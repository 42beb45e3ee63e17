/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template operations.
//!
//! Rendering itself never fails. These errors come from building a context
//! out of foreign data and from strict-mode rendering.

use thiserror::Error;

/// Errors that can occur around template rendering.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The root of a context must be a keyed mapping.
    #[error("Context root must be a mapping, found {found}")]
    ContextNotMap { found: &'static str },

    /// Strict rendering refused a document that had pass-through markers.
    #[error("Template has {count} unresolved marker(s); first: {first}")]
    Strict { count: usize, first: String },
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

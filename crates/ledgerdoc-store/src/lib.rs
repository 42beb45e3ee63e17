/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stored document templates for ledgerdoc.
//!
//! Templates are created in the editor and saved by the settings store as
//! JSON blobs (see [`TemplateDefinition`]). This crate reads them through the
//! [`TemplateRepository`] trait, so the template processor never depends on
//! where or how templates are stored, and assembles a processed template into
//! a standalone HTML page ([`document::render_document`]).

pub mod definition;
pub mod document;
pub mod error;
pub mod repository;

pub use definition::TemplateDefinition;
pub use document::{RenderedDocument, render_document};
pub use error::{StoreError, StoreResult};
pub use repository::{
    DirectoryRepository, JsonFileRepository, MemoryRepository, TemplateRepository, open,
};

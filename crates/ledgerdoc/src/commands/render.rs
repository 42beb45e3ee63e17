/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! Render command implementation.
//!
//! Processes a stored template against a JSON context and writes either the
//! standalone page or, with `--fragment`, the processed body alone.
//! Diagnostics are logged as warnings; in strict mode they fail the command
//! and nothing is written.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ledgerdoc_store::render_document;
use ledgerdoc_template::ProcessOptions;
use tracing::{info, warn};

use super::{Selector, load_context, load_template};

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    /// Template store file or directory
    pub store: PathBuf,
    pub selector: Selector,
    /// Context JSON file
    pub context: PathBuf,
    /// Output file path; `None` or `-` writes to stdout
    pub output: Option<String>,
    /// Emit the body without the page shell
    pub fragment: bool,
    pub options: ProcessOptions,
}

/// Execute the render command
pub fn execute(args: &RenderArgs) -> Result<()> {
    let definition = load_template(&args.store, &args.selector)?;
    let context = load_context(&args.context)?;

    let document = render_document(&definition, &context, &args.options);
    for diagnostic in &document.diagnostics {
        warn!(
            "{}:{}",
            definition.id,
            diagnostic.to_text(&definition.html_content)
        );
    }

    let fragment = args.fragment.then(|| document.body.clone());
    let page = document
        .into_result()
        .with_context(|| format!("Template '{}' did not render cleanly", definition.id))?;
    let text = fragment.unwrap_or(page);

    match args.output.as_deref() {
        None | Some("-") => print!("{text}"),
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("Failed to write {path}"))?;
            info!("Wrote {} ({})", path, definition.name);
        }
    }
    Ok(())
}

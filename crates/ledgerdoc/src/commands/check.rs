/*
 * check.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Check command implementation.
//!
//! Renders the template against a context and prints every diagnostic as
//! `<id>:<line>:<column> [<code>] <message>`. The command fails when any
//! diagnostic was produced, so it can gate template edits in scripts.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use ledgerdoc_store::render_document;
use ledgerdoc_template::ProcessOptions;
use tracing::info;

use super::{Selector, load_context, load_template};

/// Arguments for the check command
#[derive(Debug)]
pub struct CheckArgs {
    pub store: PathBuf,
    pub selector: Selector,
    pub context: PathBuf,
}

/// Execute the check command
pub fn execute(args: &CheckArgs) -> Result<ExitCode> {
    let definition = load_template(&args.store, &args.selector)?;
    let context = load_context(&args.context)?;

    let document = render_document(&definition, &context, &ProcessOptions::default());
    for diagnostic in &document.diagnostics {
        println!(
            "{}:{}",
            definition.id,
            diagnostic.to_text(&definition.html_content)
        );
    }

    if document.diagnostics.is_empty() {
        info!("{}: no problems found", definition.id);
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

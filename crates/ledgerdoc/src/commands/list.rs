/*
 * list.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! List command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use ledgerdoc_store::TemplateDefinition;

/// Execute the list command
pub fn execute(store: &Path) -> Result<()> {
    let repository = ledgerdoc_store::open(store)
        .with_context(|| format!("Failed to open template store {}", store.display()))?;
    let templates = repository.list()?;
    print!("{}", format_listing(&templates));
    Ok(())
}

/// One line per template: id, type, active marker, name.
fn format_listing(templates: &[TemplateDefinition]) -> String {
    let id_width = templates.iter().map(|t| t.id.len()).max().unwrap_or(0);
    let kind_width = templates.iter().map(|t| t.kind.len()).max().unwrap_or(0);

    let mut out = String::new();
    for template in templates {
        let marker = if template.is_active { '*' } else { ' ' };
        let line = format!(
            "{:id_width$}  {:kind_width$}  {} {}",
            template.id, template.kind, marker, template.name
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

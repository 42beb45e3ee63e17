//! Command implementations for the ledgerdoc CLI
//!
//! Each command module handles the CLI interface and delegates to
//! ledgerdoc-store and ledgerdoc-template for the actual work.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ledgerdoc_store::{TemplateDefinition, TemplateRepository};
use ledgerdoc_template::TemplateContext;

pub mod check;
pub mod list;
pub mod render;

/// Which stored template to use.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct Selector {
    /// Template id
    #[arg(long)]
    pub id: Option<String>,

    /// Template display name
    #[arg(long)]
    pub name: Option<String>,

    /// Use the active template of this document type (invoice, receipt, report, ...)
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,
}

impl Selector {
    pub fn select(&self, repository: &dyn TemplateRepository) -> Result<TemplateDefinition> {
        let found = match (&self.id, &self.name, &self.kind) {
            (Some(id), _, _) => repository.get(id)?,
            (_, Some(name), _) => repository.find_by_name(name)?,
            (_, _, Some(kind)) => repository.active_for(kind)?,
            (None, None, None) => anyhow::bail!("One of --id, --name or --type is required"),
        };
        Ok(found)
    }
}

/// Open the store and pick the selected template.
pub fn load_template(store: &Path, selector: &Selector) -> Result<TemplateDefinition> {
    let repository = ledgerdoc_store::open(store)
        .with_context(|| format!("Failed to open template store {}", store.display()))?;
    selector.select(repository.as_ref())
}

/// Read a render context from a JSON file.
pub fn load_context(path: &Path) -> Result<TemplateContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse context {}", path.display()))?;
    TemplateContext::from_json(value)
        .with_context(|| format!("Invalid context {}", path.display()))
}

/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Project configuration file discovery
 */

//! Project configuration.
//!
//! An optional `ledgerdoc.toml` in the working directory or any parent
//! supplies defaults for command-line flags:
//!
//! ```toml
//! store = "templates.json"
//! escape_html = false
//! strict = false
//! ```
//!
//! A relative `store` is resolved against the directory holding the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ledgerdoc_template::{EscapePolicy, ProcessOptions};
use serde::Deserialize;
use tracing::debug;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "ledgerdoc.toml";

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default template store.
    pub store: Option<PathBuf>,

    /// Escape substituted values by default.
    pub escape_html: bool,

    /// Enable strict mode by default.
    pub strict: bool,
}

impl Config {
    /// Search for `ledgerdoc.toml` in `start_dir` and its parents.
    ///
    /// Returns the default configuration when no file is found.
    pub fn discover(start_dir: &Path) -> Result<Self> {
        let mut current = Some(start_dir);
        while let Some(dir) = current {
            let path = dir.join(CONFIG_FILE);
            if path.is_file() {
                return Self::load(&path);
            }
            current = dir.parent();
        }
        Ok(Self::default())
    }

    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Some(dir) = path.parent() {
            config.store = config
                .store
                .map(|store| if store.is_relative() { dir.join(store) } else { store });
        }
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// The store to open: the flag if given, otherwise the configured one.
    pub fn store_path(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        flag.or_else(|| self.store.clone()).with_context(|| {
            format!("No template store given; pass --store or set `store` in {CONFIG_FILE}")
        })
    }

    /// Processing options with command-line switches layered over the file.
    pub fn options(&self, escape_html: bool, strict: bool) -> ProcessOptions {
        let escape = if escape_html || self.escape_html {
            EscapePolicy::Html
        } else {
            EscapePolicy::Raw
        };
        ProcessOptions::new()
            .with_escape(escape)
            .with_strict_mode(strict || self.strict)
    }
}

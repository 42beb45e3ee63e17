/*
 * repository.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template repositories.
//!
//! The set of saved templates is an injected collaborator rather than a
//! global. Implementations exist for an in-memory collection, the settings
//! store's JSON export (one file holding an array), and a directory with one
//! JSON file per template.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::definition::TemplateDefinition;
use crate::error::{StoreError, StoreResult};

/// Trait for looking up stored templates.
pub trait TemplateRepository {
    /// Load a template by id.
    fn get(&self, id: &str) -> StoreResult<TemplateDefinition>;

    /// All stored templates, in a stable order.
    fn list(&self) -> StoreResult<Vec<TemplateDefinition>>;

    /// Load a template by its display name.
    fn find_by_name(&self, name: &str) -> StoreResult<TemplateDefinition> {
        self.list()?
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| StoreError::NotFound {
                key: name.to_string(),
            })
    }

    /// The first active template of a document kind, which is what a sale
    /// or report screen prints with.
    fn active_for(&self, kind: &str) -> StoreResult<TemplateDefinition> {
        self.list()?
            .into_iter()
            .find(|t| t.is_active && t.kind == kind)
            .ok_or_else(|| StoreError::NoActive {
                kind: kind.to_string(),
            })
    }
}

/// Repository backed by an in-memory collection, in insertion order.
///
/// Useful for testing and for templates bundled into the application.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    templates: Vec<TemplateDefinition>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with the given templates, rejecting duplicate ids.
    pub fn with_templates(
        templates: impl IntoIterator<Item = TemplateDefinition>,
    ) -> StoreResult<Self> {
        let mut repo = Self::new();
        for template in templates {
            repo.insert(template)?;
        }
        Ok(repo)
    }

    /// Add a new template.
    pub fn insert(&mut self, template: TemplateDefinition) -> StoreResult<()> {
        if self.templates.iter().any(|t| t.id == template.id) {
            return Err(StoreError::Duplicate { id: template.id });
        }
        self.templates.push(template);
        Ok(())
    }

    /// Add a template or replace the one with the same id in place.
    pub fn upsert(&mut self, template: TemplateDefinition) {
        match self.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateRepository for MemoryRepository {
    fn get(&self, id: &str) -> StoreResult<TemplateDefinition> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { key: id.to_string() })
    }

    fn list(&self) -> StoreResult<Vec<TemplateDefinition>> {
        Ok(self.templates.clone())
    }
}

/// Repository loaded from a single JSON file holding an array of templates.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
    inner: MemoryRepository,
}

impl JsonFileRepository {
    /// Read and parse the collection file.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let templates: Vec<TemplateDefinition> =
            serde_json::from_str(&content).map_err(|e| StoreError::json(&path, e))?;
        debug!(path = %path.display(), count = templates.len(), "loaded template collection");

        let inner = MemoryRepository::with_templates(templates)?;
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateRepository for JsonFileRepository {
    fn get(&self, id: &str) -> StoreResult<TemplateDefinition> {
        self.inner.get(id)
    }

    fn list(&self) -> StoreResult<Vec<TemplateDefinition>> {
        self.inner.list()
    }
}

/// Repository with one `*.json` template per file in a directory.
///
/// The directory is read on every call, so edits made by the template
/// editor are visible without reopening. Templates are listed in file-name
/// order.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    dir: PathBuf,
}

impl DirectoryRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a template to `<id>.json`, replacing any previous version.
    ///
    /// Ids that are empty or would leave the directory are rejected.
    pub fn save(&self, template: &TemplateDefinition) -> StoreResult<PathBuf> {
        let path = self.file_for(&template.id).ok_or_else(|| StoreError::InvalidId {
            id: template.id.clone(),
        })?;
        let json = serde_json::to_string_pretty(template).map_err(|e| StoreError::json(&path, e))?;
        std::fs::write(&path, json).map_err(|e| StoreError::io(&path, e))?;
        debug!(path = %path.display(), "saved template");
        Ok(path)
    }

    /// `<id>.json` inside the directory, or `None` when the id is not a
    /// plain file name.
    fn file_for(&self, id: &str) -> Option<PathBuf> {
        let plain = !id.is_empty()
            && !id.contains("..")
            && !id.contains(['/', '\\', '\0'])
            && Path::new(id).is_relative();
        plain.then(|| self.dir.join(format!("{id}.json")))
    }

    fn template_files(&self) -> StoreResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read(path: &Path) -> StoreResult<TemplateDefinition> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::json(path, e))
    }
}

impl TemplateRepository for DirectoryRepository {
    fn get(&self, id: &str) -> StoreResult<TemplateDefinition> {
        // Files are normally named after the id; fall back to a scan for
        // stores written by other tools.
        if let Some(direct) = self.file_for(id).filter(|path| path.is_file()) {
            let template = Self::read(&direct)?;
            if template.id == id {
                return Ok(template);
            }
        }
        self.list()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound { key: id.to_string() })
    }

    fn list(&self) -> StoreResult<Vec<TemplateDefinition>> {
        let mut templates: Vec<TemplateDefinition> = Vec::new();
        for path in self.template_files()? {
            let template = Self::read(&path)?;
            if templates.iter().any(|t| t.id == template.id) {
                return Err(StoreError::Duplicate { id: template.id });
            }
            templates.push(template);
        }
        debug!(dir = %self.dir.display(), count = templates.len(), "listed template directory");
        Ok(templates)
    }
}

/// Open a store at `path`: a directory becomes a [`DirectoryRepository`],
/// anything else is read as a [`JsonFileRepository`].
pub fn open(path: &Path) -> StoreResult<Box<dyn TemplateRepository>> {
    if path.is_dir() {
        Ok(Box::new(DirectoryRepository::new(path)))
    } else {
        Ok(Box::new(JsonFileRepository::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<TemplateDefinition> {
        vec![
            TemplateDefinition::new("inv-a", "Classic invoice", "A").with_kind("invoice"),
            TemplateDefinition::new("inv-b", "Modern invoice", "B")
                .with_kind("invoice")
                .with_active(true),
            TemplateDefinition::new("rep-1", "Daily report", "R")
                .with_kind("report")
                .with_active(true),
        ]
    }

    #[test]
    fn test_memory_get_and_list() {
        let repo = MemoryRepository::with_templates(sample()).unwrap();
        assert_eq!(repo.get("inv-b").unwrap().name, "Modern invoice");
        let ids: Vec<String> = repo.list().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["inv-a", "inv-b", "rep-1"]);
    }

    #[test]
    fn test_memory_not_found() {
        let repo = MemoryRepository::new();
        assert!(matches!(
            repo.get("missing"),
            Err(StoreError::NotFound { key }) if key == "missing"
        ));
    }

    #[test]
    fn test_memory_rejects_duplicates() {
        let mut repo = MemoryRepository::with_templates(sample()).unwrap();
        let err = repo
            .insert(TemplateDefinition::new("inv-a", "Again", ""))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { id } if id == "inv-a"));
    }

    #[test]
    fn test_memory_upsert_replaces_in_place() {
        let mut repo = MemoryRepository::with_templates(sample()).unwrap();
        repo.upsert(TemplateDefinition::new("inv-a", "Renamed", "A2"));
        assert_eq!(repo.len(), 3);
        assert_eq!(repo.list().unwrap()[0].name, "Renamed");
    }

    #[test]
    fn test_find_by_name_and_active_for() {
        let repo = MemoryRepository::with_templates(sample()).unwrap();
        assert_eq!(repo.find_by_name("Daily report").unwrap().id, "rep-1");
        assert_eq!(repo.active_for("invoice").unwrap().id, "inv-b");
        assert!(matches!(
            repo.active_for("receipt"),
            Err(StoreError::NoActive { kind }) if kind == "receipt"
        ));
    }

    #[test]
    fn test_directory_save_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DirectoryRepository::new(dir.path());
        for template in sample() {
            repo.save(&template).unwrap();
        }

        assert_eq!(repo.get("rep-1").unwrap().kind, "report");
        let names: Vec<String> = repo.list().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Classic invoice", "Modern invoice", "Daily report"]);
    }

    #[test]
    fn test_directory_get_scans_when_file_name_differs() {
        let dir = tempfile::tempdir().unwrap();
        let template = TemplateDefinition::new("odd-id", "Odd", "x");
        std::fs::write(
            dir.path().join("exported.json"),
            serde_json::to_string(&template).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let repo = DirectoryRepository::new(dir.path());
        assert_eq!(repo.get("odd-id").unwrap().name, "Odd");
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_directory_rejects_escaping_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");
        std::fs::create_dir(&store).unwrap();
        let repo = DirectoryRepository::new(&store);

        for id in ["../escaped", "a/b", "a\\b", "..", ""] {
            let err = repo.save(&TemplateDefinition::new(id, "Bad", "x")).unwrap_err();
            assert!(matches!(err, StoreError::InvalidId { .. }), "id: {id:?}");
        }
        assert!(!dir.path().join("escaped.json").exists());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_directory_get_with_escaping_id_only_scans() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");
        std::fs::create_dir(&store).unwrap();
        let outside = TemplateDefinition::new("../outside", "Outside", "x");
        std::fs::write(
            dir.path().join("outside.json"),
            serde_json::to_string(&outside).unwrap(),
        )
        .unwrap();

        let repo = DirectoryRepository::new(&store);
        assert!(matches!(
            repo.get("../outside"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_directory_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let repo = DirectoryRepository::new(dir.path());
        assert!(matches!(repo.list(), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_open_dispatches_on_path_kind() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("templates.json");
        std::fs::write(&file, serde_json::to_string(&sample()).unwrap()).unwrap();

        let from_file = open(&file).unwrap();
        assert_eq!(from_file.list().unwrap().len(), 3);

        let from_dir = open(dir.path()).unwrap();
        // The collection file is an array, not a single template
        assert!(matches!(from_dir.list(), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_json_file_missing() {
        let err = JsonFileRepository::open("/nonexistent/templates.json").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}

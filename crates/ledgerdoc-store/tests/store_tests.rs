/*
 * store_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for ledgerdoc-store against an exported template collection.
 */

use ledgerdoc_store::{
    DirectoryRepository, JsonFileRepository, TemplateRepository, render_document,
};
use ledgerdoc_template::{DiagnosticCode, ProcessOptions, TemplateContext};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;

fn fixture_path(name: &str) -> std::path::PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("test-fixtures").join(name)
}

fn collection() -> JsonFileRepository {
    JsonFileRepository::open(fixture_path("templates.json")).expect("fixture collection loads")
}

fn sale_context() -> TemplateContext {
    TemplateContext::from_json(json!({
        "company": { "name": "Acme Stores" },
        "sale": {
            "number": "S-7",
            "items": [
                { "name": "Paper", "total": 10 },
                { "name": "Toner", "total": 47.5 },
            ],
        },
    }))
    .unwrap()
}

#[test]
fn test_collection_lists_in_file_order() {
    let ids: Vec<String> = collection().list().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["invoice-classic", "invoice-compact", "report-daily"]);
}

#[test]
fn test_active_invoice_renders_with_settings() {
    let repo = collection();
    let definition = repo.active_for("invoice").unwrap();
    assert_eq!(definition.id, "invoice-classic");

    let doc = render_document(&definition, &sale_context(), &ProcessOptions::default());
    assert_eq!(
        doc.body,
        "<h1>Acme Stores</h1>\n<p>Invoice S-7</p>\n\
         <table><tr><td>Paper</td><td>10 EGP</td></tr><tr><td>Toner</td><td>47.5 EGP</td></tr></table>\n\
         <footer>Thank you for your business</footer>"
    );
    assert!(doc.html.contains("<style>\ntable { width: 100%; }\n</style>"));
    assert!(doc.diagnostics.is_empty());
}

#[test]
fn test_report_with_missing_rows() {
    let repo = collection();
    let definition = repo.active_for("report").unwrap();
    let ctx = TemplateContext::from_json(json!({ "report": { "title": "Branches" } })).unwrap();

    let doc = render_document(&definition, &ctx, &ProcessOptions::default());
    assert_eq!(doc.body, "<h2>Branches</h2>");
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].code, DiagnosticCode::NotAList);
}

#[test]
fn test_collection_round_trips_through_directory() {
    let dir = tempfile::tempdir().unwrap();
    let target = DirectoryRepository::new(dir.path());
    for definition in collection().list().unwrap() {
        target.save(&definition).unwrap();
    }

    assert_eq!(target.list().unwrap(), collection().list().unwrap());
    assert_eq!(
        target.find_by_name("Compact invoice").unwrap().html_content,
        "{{company.name}} #{{sale.number}}"
    );
}

/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Standalone page assembly for stored templates.
 */

//! Standalone page assembly.
//!
//! A stored template is processed against the caller's context, then placed
//! into an HTML page shell together with its CSS. The shell is itself a
//! template rendered by the same processor:
//!
//! - `{{title}}` - the template name, HTML-escaped
//! - `{{css}}` - the template's `cssStyles`, unprocessed
//! - `{{body}}` - the processed template body
//!
//! The resulting page is what the print window and the PDF rasterizer load.

use ledgerdoc_template::options::escape_html;
use ledgerdoc_template::{Diagnostic, ProcessOptions, Rendered, Template, TemplateContext};
use tracing::debug;

use crate::definition::TemplateDefinition;
use crate::error::StoreResult;
use crate::repository::TemplateRepository;

/// Page shell for standalone documents.
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{title}}</title>
{{#if css}}<style>
{{css}}
</style>
{{/if}}</head>
<body>
{{body}}
</body>
</html>
"#;

/// A processed template in both standalone and fragment form.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    /// The full standalone page.
    pub html: String,
    /// The processed template body alone, for embedding in a preview pane.
    pub body: String,
    /// Diagnostics from processing the body.
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderedDocument {
    /// The page, or an error when strict-mode diagnostics were recorded.
    pub fn into_result(self) -> StoreResult<String> {
        let html = self.html;
        Rendered {
            output: self.body,
            diagnostics: self.diagnostics,
        }
        .into_result()?;
        Ok(html)
    }
}

/// Process a stored template and assemble the standalone page.
///
/// The definition's `settings` are exposed under `settings.*` unless the
/// caller's context already has a `settings` entry.
pub fn render_document(
    definition: &TemplateDefinition,
    context: &TemplateContext,
    options: &ProcessOptions,
) -> RenderedDocument {
    let rendered = if context.contains_key("settings") {
        definition.compile().render_with(context, options)
    } else {
        let mut context = context.clone();
        context.insert("settings", definition.settings_value());
        definition.compile().render_with(&context, options)
    };

    let mut page = TemplateContext::new();
    page.insert("title", escape_html(&definition.name).into_owned());
    page.insert("css", definition.css_styles.as_str());
    page.insert("body", rendered.output.as_str());
    let html = Template::compile(PAGE_TEMPLATE).render(&page);

    debug!(
        id = %definition.id,
        diagnostics = rendered.diagnostics.len(),
        "rendered document"
    );
    RenderedDocument {
        html,
        body: rendered.output,
        diagnostics: rendered.diagnostics,
    }
}

/// Look up a template by id and render it.
pub fn render_by_id(
    repository: &dyn TemplateRepository,
    id: &str,
    context: &TemplateContext,
    options: &ProcessOptions,
) -> StoreResult<RenderedDocument> {
    let definition = repository.get(id)?;
    Ok(render_document(&definition, context, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::repository::MemoryRepository;
    use ledgerdoc_template::{EscapePolicy, TemplateError, TemplateValue};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn invoice() -> TemplateDefinition {
        TemplateDefinition::new(
            "inv",
            "Invoice <A&B>",
            "{{#if settings.showLogo}}[logo]{{/if}}<h1>{{company.name}}</h1>",
        )
        .with_css("h1 { color: navy; }")
        .with_setting("showLogo", json!(true))
    }

    fn company(name: &str) -> TemplateContext {
        let mut ctx = TemplateContext::new();
        ctx.insert("company", TemplateValue::map([("name", name)]));
        ctx
    }

    #[test]
    fn test_page_shell() {
        let doc = render_document(&invoice(), &company("Acme"), &ProcessOptions::default());

        assert_eq!(doc.body, "[logo]<h1>Acme</h1>");
        assert_eq!(
            doc.html,
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Invoice &lt;A&amp;B&gt;</title>
<style>
h1 { color: navy; }
</style>
</head>
<body>
[logo]<h1>Acme</h1>
</body>
</html>
"#
        );
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn test_no_style_block_without_css() {
        let def = TemplateDefinition::new("r", "Receipt", "ok");
        let doc = render_document(&def, &TemplateContext::new(), &ProcessOptions::default());
        assert!(!doc.html.contains("<style>"));
        assert!(doc.html.contains("<body>\nok\n</body>"));
    }

    #[test]
    fn test_caller_settings_take_precedence() {
        let mut ctx = company("Acme");
        ctx.insert("settings", TemplateValue::map([("showLogo", false)]));
        let doc = render_document(&invoice(), &ctx, &ProcessOptions::default());
        assert_eq!(doc.body, "<h1>Acme</h1>");
    }

    #[test]
    fn test_css_and_body_are_not_reprocessed() {
        let def = TemplateDefinition::new("x", "X", "{{literal}}")
            .with_css("/* {{company.name}} */");
        let mut ctx = company("Acme");
        ctx.insert("literal", "{{company.name}}");
        let doc = render_document(&def, &ctx, &ProcessOptions::default());
        assert!(doc.html.contains("/* {{company.name}} */"));
        assert!(doc.html.contains("<body>\n{{company.name}}\n</body>"));
    }

    #[test]
    fn test_escape_policy_reaches_body() {
        let options = ProcessOptions::new().with_escape(EscapePolicy::Html);
        let doc = render_document(&invoice(), &company("<b>Acme</b>"), &options);
        assert_eq!(doc.body, "[logo]<h1>&lt;b&gt;Acme&lt;/b&gt;</h1>");
    }

    #[test]
    fn test_strict_document() {
        let strict = ProcessOptions::new().with_strict_mode(true);
        let doc = render_document(&invoice(), &TemplateContext::new(), &strict);
        assert!(matches!(
            doc.into_result(),
            Err(StoreError::Template(TemplateError::Strict { count: 1, .. }))
        ));

        let doc = render_document(&invoice(), &company("Acme"), &strict);
        assert!(doc.into_result().unwrap().contains("<h1>Acme</h1>"));
    }

    #[test]
    fn test_render_by_id() {
        let repo = MemoryRepository::with_templates([invoice()]).unwrap();
        let doc = render_by_id(&repo, "inv", &company("Acme"), &ProcessOptions::default()).unwrap();
        assert_eq!(doc.body, "[logo]<h1>Acme</h1>");
        assert!(matches!(
            render_by_id(&repo, "nope", &company("Acme"), &ProcessOptions::default()),
            Err(StoreError::NotFound { .. })
        ));
    }
}

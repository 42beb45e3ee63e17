/*
 * definition.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The stored template format.

use ledgerdoc_template::{Template, TemplateValue};
use serde::{Deserialize, Serialize};

/// A template as saved by the settings store.
///
/// ```json
/// {
///   "id": "inv-1",
///   "name": "Standard invoice",
///   "type": "invoice",
///   "htmlContent": "<h1>{{company.name}}</h1>",
///   "cssStyles": "h1 { color: navy; }",
///   "isActive": true,
///   "settings": { "showLogo": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    pub id: String,

    pub name: String,

    /// Document kind (`invoice`, `receipt`, `report`, ...). Not interpreted
    /// by the processor; used to pick the active template for a screen.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// The template body.
    pub html_content: String,

    /// Passed through unprocessed into the page's `<style>` block.
    #[serde(default)]
    pub css_styles: String,

    #[serde(default)]
    pub is_active: bool,

    /// Arbitrary settings, exposed to the template under `settings.*`.
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl TemplateDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        html_content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: String::new(),
            html_content: html_content.into(),
            css_styles: String::new(),
            is_active: false,
            settings: serde_json::Map::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css_styles = css.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Compile the template body.
    pub fn compile(&self) -> Template {
        Template::compile(self.html_content.as_str())
    }

    /// The settings as a template value.
    pub fn settings_value(&self) -> TemplateValue {
        TemplateValue::from(serde_json::Value::Object(self.settings.clone()))
    }
}

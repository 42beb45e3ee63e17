/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render options.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// How substituted context values are written into the output.
///
/// Only values coming from the context are affected; literal template text
/// is never touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapePolicy {
    /// Insert values verbatim.
    #[default]
    Raw,
    /// Escape `& < > " '` so values cannot inject markup.
    Html,
}

impl EscapePolicy {
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            EscapePolicy::Raw => Cow::Borrowed(value),
            EscapePolicy::Html => escape_html(value),
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    pub escape: EscapePolicy,
    /// Record diagnostics as errors, so [`crate::Rendered::into_result`]
    /// refuses the document.
    pub strict: bool,
}

impl ProcessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_escape(mut self, escape: EscapePolicy) -> Self {
        self.escape = escape;
        self
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_borrows_clean_input() {
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_raw_policy_is_identity() {
        assert_eq!(EscapePolicy::Raw.apply("<b>"), "<b>");
        assert_eq!(EscapePolicy::Html.apply("<b>"), "&lt;b&gt;");
    }
}

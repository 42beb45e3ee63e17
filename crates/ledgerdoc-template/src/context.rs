/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template value and context types.
//!
//! A context is a tree of plain values built fresh for every render call
//! from live application data (company settings, a sale, a report payload).
//! The root is always a keyed mapping; placeholder paths walk mapping keys
//! from there.

use std::collections::HashMap;

use crate::error::{TemplateError, TemplateResult};

/// A value that can be used in template evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    /// A null/missing value.
    Null,

    /// A boolean value.
    Bool(bool),

    /// A numeric value.
    Number(f64),

    /// A string value.
    String(String),

    /// An ordered list of values.
    List(Vec<TemplateValue>),

    /// A map of string keys to values.
    Map(HashMap<String, TemplateValue>),
}

impl TemplateValue {
    /// Build a map value from key/value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<TemplateValue>,
    {
        TemplateValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list value.
    pub fn list<V: Into<TemplateValue>>(items: impl IntoIterator<Item = V>) -> Self {
        TemplateValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Check if this value is "truthy" for conditional evaluation.
    ///
    /// Truthiness is loose:
    /// - `false`, null, `0`, `NaN`, and the empty string are falsy
    /// - everything else is truthy, including empty lists and maps
    pub fn is_truthy(&self) -> bool {
        match self {
            TemplateValue::Null => false,
            TemplateValue::Bool(b) => *b,
            TemplateValue::Number(n) => *n != 0.0 && !n.is_nan(),
            TemplateValue::String(s) => !s.is_empty(),
            TemplateValue::List(_) | TemplateValue::Map(_) => true,
        }
    }

    /// Get a nested field by path.
    ///
    /// Each segment descends one mapping key. Lists are not indexed, so
    /// `get_path(&["items", "0"])` on a list does not resolve.
    pub fn get_path(&self, path: &[&str]) -> Option<&TemplateValue> {
        if path.is_empty() {
            return Some(self);
        }

        match self {
            TemplateValue::Map(m) => m.get(path[0]).and_then(|v| v.get_path(&path[1..])),
            _ => None,
        }
    }

    /// Render this value as text for output.
    ///
    /// - String: returned as-is
    /// - Number: decimal text (`3`, `2.5`, `NaN`, `Infinity`), exponent form
    ///   outside `[1e-6, 1e21)` (`1e+21`)
    /// - Bool: `"true"` or `"false"`
    /// - List: items rendered and joined with `,`
    /// - Map, Null: empty
    pub fn render(&self) -> String {
        match self {
            TemplateValue::Null | TemplateValue::Map(_) => String::new(),
            TemplateValue::Bool(b) => b.to_string(),
            TemplateValue::Number(n) => format_number(*n),
            TemplateValue::String(s) => s.clone(),
            TemplateValue::List(items) => items
                .iter()
                .map(TemplateValue::render)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, TemplateValue::Map(_))
    }

    /// Short name of the value's kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TemplateValue::Null => "null",
            TemplateValue::Bool(_) => "boolean",
            TemplateValue::Number(_) => "number",
            TemplateValue::String(_) => "string",
            TemplateValue::List(_) => "list",
            TemplateValue::Map(_) => "mapping",
        }
    }
}

/// Format a number the way printed documents expect: integral values have
/// no fractional part, `-0` prints as `0`, and magnitudes from `1e21` up or
/// below `1e-6` use exponent form (`1e+21`, `1.5e-7`).
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exp = format!("{n:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        };
    }
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl Default for TemplateValue {
    fn default() -> Self {
        TemplateValue::Null
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        TemplateValue::String(s)
    }
}

impl From<bool> for TemplateValue {
    fn from(b: bool) -> Self {
        TemplateValue::Bool(b)
    }
}

impl From<f64> for TemplateValue {
    fn from(n: f64) -> Self {
        TemplateValue::Number(n)
    }
}

impl From<i64> for TemplateValue {
    fn from(n: i64) -> Self {
        TemplateValue::Number(n as f64)
    }
}

impl From<i32> for TemplateValue {
    fn from(n: i32) -> Self {
        TemplateValue::Number(f64::from(n))
    }
}

impl<V: Into<TemplateValue>> From<Vec<V>> for TemplateValue {
    fn from(items: Vec<V>) -> Self {
        TemplateValue::list(items)
    }
}

impl<V: Into<TemplateValue>> From<Option<V>> for TemplateValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(TemplateValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for TemplateValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => TemplateValue::Null,
            serde_json::Value::Bool(b) => TemplateValue::Bool(b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map_or(TemplateValue::Null, TemplateValue::Number),
            serde_json::Value::String(s) => TemplateValue::String(s),
            serde_json::Value::Array(items) => {
                TemplateValue::List(items.into_iter().map(TemplateValue::from).collect())
            }
            serde_json::Value::Object(entries) => TemplateValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, TemplateValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// The root mapping a template is rendered against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    variables: HashMap<String, TemplateValue>,
}

impl TemplateContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON document whose root is an object.
    pub fn from_json(value: serde_json::Value) -> TemplateResult<Self> {
        match TemplateValue::from(value) {
            TemplateValue::Map(variables) => Ok(Self { variables }),
            other => Err(TemplateError::ContextNotMap {
                found: other.kind_name(),
            }),
        }
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TemplateValue>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Get a top-level variable.
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.variables.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// Get a variable by path (e.g., `["company", "name"]`).
    pub fn get_path(&self, path: &[&str]) -> Option<&TemplateValue> {
        if path.is_empty() {
            return None;
        }

        self.get(path[0]).and_then(|v| v.get_path(&path[1..]))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<K: Into<String>, V: Into<TemplateValue>> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            variables: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

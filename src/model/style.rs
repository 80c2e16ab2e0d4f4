//! Style table: raw style definitions plus their resolved formatting.

use super::TextStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of the document default style; every chain ends here.
pub const DEFAULT_STYLE_ID: &str = "default";

/// Identifier of a character shape.
pub fn char_shape_id(index: u32) -> String {
    format!("char:{index}")
}

/// Identifier of a named style.
pub fn named_style_id(index: u32) -> String {
    format!("style:{index}")
}

/// Attribute overrides declared by one style definition. `None` inherits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverrides {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub superscript: Option<bool>,
    pub subscript: Option<bool>,
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
    pub background_color: Option<String>,
}

impl StyleOverrides {
    /// Apply these overrides on top of `base`.
    pub fn apply_to(&self, base: &mut TextStyle) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        set(&mut base.bold, &self.bold);
        set(&mut base.italic, &self.italic);
        set(&mut base.underline, &self.underline);
        set(&mut base.strikethrough, &self.strikethrough);
        set(&mut base.superscript, &self.superscript);
        set(&mut base.subscript, &self.subscript);
        set(&mut base.font_name, &self.font_name);
        set(&mut base.font_size, &self.font_size);
        if self.color.is_some() {
            base.color = self.color.clone();
        }
        if self.background_color.is_some() {
            base.background_color = self.background_color.clone();
        }
    }
}

/// One style definition as read from the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Display name (named styles only)
    pub name: Option<String>,

    /// Parent style identifier
    pub parent: Option<String>,

    pub overrides: StyleOverrides,
}

/// Mapping from style identifier to definition, plus the resolved
/// formatting of every definition once the resolver has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleTable {
    pub definitions: BTreeMap<String, StyleDefinition>,
    pub resolved: BTreeMap<String, TextStyle>,
}

impl StyleTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition.
    pub fn define(&mut self, id: impl Into<String>, definition: StyleDefinition) {
        self.definitions.insert(id.into(), definition);
    }

    /// Raw definition by identifier.
    pub fn definition(&self, id: &str) -> Option<&StyleDefinition> {
        self.definitions.get(id)
    }

    /// Resolved formatting by identifier.
    pub fn resolved(&self, id: &str) -> Option<&TextStyle> {
        self.resolved.get(id)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the table has no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

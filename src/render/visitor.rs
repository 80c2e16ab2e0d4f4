//! Hooks into Markdown rendering.
//!
//! A [`DocumentVisitor`] sees each block before the Markdown renderer emits
//! it and may keep, replace or drop it. Headings and list items reach the
//! visitor as what they render as, not as the paragraphs they are stored as.
//!
//! # Example
//!
//! ```
//! use unhwp::render::visitor::{DocumentVisitor, VisitorAction};
//! use unhwp::model::Table;
//!
//! struct CustomTableVisitor;
//!
//! impl DocumentVisitor for CustomTableVisitor {
//!     fn visit_table(&mut self, _table: &Table, _rows: &[Vec<String>]) -> VisitorAction {
//!         VisitorAction::Replace("<!-- table omitted -->\n\n".to_string())
//!     }
//! }
//! ```

use crate::model::{Paragraph, Table};

/// Action returned by visitor methods to control rendering behavior.
#[derive(Debug, Clone, Default)]
pub enum VisitorAction {
    /// Continue with default rendering.
    #[default]
    Continue,

    /// Replace the element with custom output.
    Replace(String),

    /// Skip this element entirely (produce no output).
    Skip,
}

impl VisitorAction {
    /// Check if this action indicates the element should be skipped.
    pub fn should_skip(&self) -> bool {
        matches!(self, VisitorAction::Skip)
    }

    /// Check if this action provides replacement content.
    pub fn is_replace(&self) -> bool {
        matches!(self, VisitorAction::Replace(_))
    }

    /// Get replacement content if available.
    pub fn replacement(&self) -> Option<&str> {
        match self {
            VisitorAction::Replace(s) => Some(s),
            _ => None,
        }
    }
}

/// Trait for visiting document elements during Markdown rendering.
///
/// All methods return `VisitorAction::Continue` by default.
pub trait DocumentVisitor: Send + Sync {
    /// Called before rendering a body paragraph.
    fn visit_paragraph(&mut self, para: &Paragraph) -> VisitorAction {
        let _ = para;
        VisitorAction::Continue
    }

    /// Called before rendering a top-level table.
    ///
    /// `rows` holds the plain text of each cell, row by row.
    fn visit_table(&mut self, table: &Table, rows: &[Vec<String>]) -> VisitorAction {
        let _ = (table, rows);
        VisitorAction::Continue
    }

    /// Called before rendering an image.
    fn visit_image(&mut self, id: &str, alt: Option<&str>) -> VisitorAction {
        let _ = (id, alt);
        VisitorAction::Continue
    }

    /// Called before rendering a heading with its plain text and level (1-6).
    fn visit_heading(&mut self, text: &str, level: u8) -> VisitorAction {
        let _ = (text, level);
        VisitorAction::Continue
    }

    /// Called before rendering a list item.
    fn visit_list_item(&mut self, para: &Paragraph, level: u8, ordered: bool) -> VisitorAction {
        let _ = (para, level, ordered);
        VisitorAction::Continue
    }

    /// Called when a section starts; `index` is zero-based.
    fn on_section_start(&mut self, index: usize) {
        let _ = index;
    }

    /// Called when a section ends.
    fn on_section_end(&mut self, index: usize) {
        let _ = index;
    }
}

/// Default visitor that performs no customization.
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitor;

impl DefaultVisitor {
    /// Create a new default visitor.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentVisitor for DefaultVisitor {}

/// Visitor that skips all images.
#[derive(Debug, Clone, Default)]
pub struct SkipImagesVisitor;

impl DocumentVisitor for SkipImagesVisitor {
    fn visit_image(&mut self, _id: &str, _alt: Option<&str>) -> VisitorAction {
        VisitorAction::Skip
    }
}

/// Visitor that renders tables as pipe-separated lines of text.
#[derive(Debug, Clone, Default)]
pub struct SimpleTableVisitor;

impl DocumentVisitor for SimpleTableVisitor {
    fn visit_table(&mut self, _table: &Table, rows: &[Vec<String>]) -> VisitorAction {
        let mut output = String::new();
        for row in rows {
            output.push_str(&row.join(" | "));
            output.push('\n');
        }
        output.push('\n');
        VisitorAction::Replace(output)
    }
}

/// Visitor that limits heading depth.
#[derive(Debug, Clone)]
pub struct MaxHeadingDepthVisitor {
    max_level: u8,
}

impl MaxHeadingDepthVisitor {
    /// Create a visitor that limits headings to the specified max level.
    pub fn new(max_level: u8) -> Self {
        Self {
            max_level: max_level.clamp(1, 6),
        }
    }
}

impl DocumentVisitor for MaxHeadingDepthVisitor {
    fn visit_heading(&mut self, text: &str, level: u8) -> VisitorAction {
        let effective_level = level.min(self.max_level);
        let prefix = "#".repeat(effective_level as usize);
        VisitorAction::Replace(format!("{} {}\n\n", prefix, text))
    }
}

/// Composite visitor that chains multiple visitors.
///
/// Visitors are called in order. The first visitor that returns
/// a non-Continue action determines the result.
pub struct CompositeVisitor {
    visitors: Vec<Box<dyn DocumentVisitor>>,
}

impl CompositeVisitor {
    /// Create a new composite visitor.
    pub fn new() -> Self {
        Self {
            visitors: Vec::new(),
        }
    }

    /// Add a visitor to the chain.
    pub fn with_visitor<V: DocumentVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitors.push(Box::new(visitor));
        self
    }

    fn first_action(
        &mut self,
        mut visit: impl FnMut(&mut dyn DocumentVisitor) -> VisitorAction,
    ) -> VisitorAction {
        for visitor in &mut self.visitors {
            let action = visit(visitor.as_mut());
            if !matches!(action, VisitorAction::Continue) {
                return action;
            }
        }
        VisitorAction::Continue
    }
}

impl Default for CompositeVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentVisitor for CompositeVisitor {
    fn visit_paragraph(&mut self, para: &Paragraph) -> VisitorAction {
        self.first_action(|v| v.visit_paragraph(para))
    }

    fn visit_table(&mut self, table: &Table, rows: &[Vec<String>]) -> VisitorAction {
        self.first_action(|v| v.visit_table(table, rows))
    }

    fn visit_image(&mut self, id: &str, alt: Option<&str>) -> VisitorAction {
        self.first_action(|v| v.visit_image(id, alt))
    }

    fn visit_heading(&mut self, text: &str, level: u8) -> VisitorAction {
        self.first_action(|v| v.visit_heading(text, level))
    }

    fn visit_list_item(&mut self, para: &Paragraph, level: u8, ordered: bool) -> VisitorAction {
        self.first_action(|v| v.visit_list_item(para, level, ordered))
    }

    fn on_section_start(&mut self, index: usize) {
        for visitor in &mut self.visitors {
            visitor.on_section_start(index);
        }
    }

    fn on_section_end(&mut self, index: usize) {
        for visitor in &mut self.visitors {
            visitor.on_section_end(index);
        }
    }
}

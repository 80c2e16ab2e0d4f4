//! Paragraph and text-level types.

use serde::{Deserialize, Serialize};

/// Font used when neither the run nor its style names one.
pub const DEFAULT_FONT: &str = "함초롬바탕";

/// Font size used when neither the run nor its style gives one.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// A paragraph of styled runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Runs in reading order
    pub runs: Vec<Run>,

    /// Paragraph layout
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with one plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(Run::new(text));
        p
    }

    /// Create a heading paragraph.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        let mut p = Self::with_text(text);
        p.style.heading_level = Some(level.clamp(1, 6));
        p
    }

    /// Append a run, merging it into the previous run when both share a style.
    pub fn push_run(&mut self, run: Run) {
        if run.text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.style_id == run.style_id && last.style == run.style => {
                last.text.push_str(&run.text)
            }
            _ => self.runs.push(run),
        }
    }

    /// Append a run as-is.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph carries no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        self.style.heading_level.is_some()
    }

    /// Get the heading level (1-6) or None.
    pub fn heading_level(&self) -> Option<u8> {
        self.style.heading_level
    }

    /// Check if this is a list item.
    pub fn is_list_item(&self) -> bool {
        self.style.list_info.is_some()
    }
}

/// The smallest span of text sharing one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Style table identifier the run references
    pub style_id: String,

    /// Concrete formatting, filled in by style resolution
    pub style: TextStyle,
}

impl Run {
    /// Create a run referencing the document default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_id: super::style::DEFAULT_STYLE_ID.to_string(),
            style: TextStyle::default(),
        }
    }

    /// Create a run referencing a style.
    pub fn styled(text: impl Into<String>, style_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_id: style_id.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        let mut run = Self::new(text);
        run.style.bold = true;
        run
    }

    /// Create an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        let mut run = Self::new(text);
        run.style.italic = true;
        run
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Fully resolved character formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    pub subscript: bool,

    /// Font family name
    pub font_name: String,

    /// Font size in points
    pub font_size: f32,

    /// Text color (`#RRGGBB`)
    pub color: Option<String>,

    /// Shading color (`#RRGGBB`)
    pub background_color: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            superscript: false,
            subscript: false,
            font_name: DEFAULT_FONT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: None,
            background_color: None,
        }
    }
}

impl TextStyle {
    /// Check if any emphasis is applied.
    pub fn has_styling(&self) -> bool {
        self.bold
            || self.italic
            || self.underline
            || self.strikethrough
            || self.superscript
            || self.subscript
    }
}

/// Paragraph layout properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Heading level (1-6) or None for a body paragraph
    pub heading_level: Option<u8>,

    /// Horizontal alignment
    pub alignment: Alignment,

    /// List membership
    pub list_info: Option<ListInfo>,

    /// Name of the paragraph's named style, e.g. "바탕글"
    pub style_name: Option<String>,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// CSS `text-align` value.
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Information about a list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListInfo {
    /// Ordered or unordered
    pub style: ListStyle,

    /// Nesting level (0 = top level)
    pub level: u8,

    /// Item number for ordered lists
    pub item_number: Option<u32>,
}

impl ListInfo {
    /// Create a bulleted list item.
    pub fn bullet(level: u8) -> Self {
        Self {
            style: ListStyle::Unordered,
            level,
            item_number: None,
        }
    }

    /// Create a numbered list item.
    pub fn numbered(level: u8, number: u32) -> Self {
        Self {
            style: ListStyle::Ordered,
            level,
            item_number: Some(number),
        }
    }

    /// Whether this is an ordered list item.
    pub fn is_ordered(&self) -> bool {
        self.style == ListStyle::Ordered
    }
}

/// List style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    Unordered,
}

//! Sections and the block arena entries they reference.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// Index of a block in [`Document::blocks`](super::Document::blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub usize);

/// A body section: an ordered sequence of top-level blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Zero-based position in the source
    pub index: usize,

    /// Top-level blocks in reading order
    pub blocks: Vec<BlockId>,
}

impl Section {
    /// Create an empty section.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            blocks: Vec::new(),
        }
    }

    /// Check if the section has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of top-level blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// A content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// An image reference
    Image(Image),
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image(_))
    }
}

/// An image placed in the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Key into [`Document::resources`](super::Document::resources)
    pub resource_id: String,

    /// Width in points
    pub width: Option<f32>,

    /// Height in points
    pub height: Option<f32>,

    /// Alternative text
    pub alt_text: Option<String>,
}

impl Image {
    /// Create an image referencing a resource.
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            width: None,
            height: None,
            alt_text: None,
        }
    }

    /// Set dimensions in points.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

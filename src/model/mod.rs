//! Document model types.
//!
//! This module defines the format-independent representation that both the
//! HWP 5 and the HWPX paths build, and that every renderer consumes. Blocks
//! are stored in an arena owned by [`Document`]; sections and table cells
//! hold [`BlockId`]s, so nested tables need no owning pointers.

mod document;
mod paragraph;
mod resource;
mod section;
mod style;
mod table;

pub use document::{Document, Metadata};
pub use paragraph::{
    Alignment, ListInfo, ListStyle, Paragraph, ParagraphStyle, Run, TextStyle, DEFAULT_FONT,
    DEFAULT_FONT_SIZE,
};
pub use resource::{Resource, ResourceType};
pub use section::{Block, BlockId, Image, Section};
pub use style::{
    char_shape_id, named_style_id, StyleDefinition, StyleOverrides, StyleTable, DEFAULT_STYLE_ID,
};
pub use table::{Table, TableCell, MAX_GRID_SLOTS};

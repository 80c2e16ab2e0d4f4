//! Document-level types.

use super::{Block, BlockId, Paragraph, Resource, Section, StyleTable};
use crate::detect::SourceFormat;
use crate::error::Result;
use crate::render::{self, JsonFormat, RenderOptions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed HWP or HWPX document.
///
/// Blocks live in one flat arena; sections and table cells refer to them by
/// [`BlockId`]. Once returned from the parser a document is only read, so a
/// shared `&Document` can be rendered from several threads at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Body sections in source order
    pub sections: Vec<Section>,

    /// Block arena
    pub blocks: Vec<Block>,

    /// Style definitions and their resolved formatting
    pub styles: StyleTable,

    /// Embedded resources keyed by binary item id
    pub resources: BTreeMap<String, Resource>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block in the arena and return its id.
    pub fn add_block(&mut self, block: Block) -> BlockId {
        self.blocks.push(block);
        BlockId(self.blocks.len() - 1)
    }

    /// Store a block and append it to the last section, creating one if the
    /// document has none.
    pub fn push_block(&mut self, block: Block) -> BlockId {
        let id = self.add_block(block);
        if self.sections.is_empty() {
            self.sections.push(Section::new(0));
        }
        if let Some(section) = self.sections.last_mut() {
            section.blocks.push(id);
        }
        id
    }

    /// Get a block by id.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0)
    }

    /// Add a resource to the document.
    pub fn add_resource(&mut self, id: impl Into<String>, resource: Resource) {
        self.resources.insert(id.into(), resource);
    }

    /// Get a resource by ID.
    pub fn get_resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Get the number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Check if the document has no content blocks.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(Section::is_empty)
    }

    /// All paragraphs in the arena, including those inside table cells.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Number of paragraphs, including those inside table cells.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Number of tables, including nested ones.
    pub fn table_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_table()).count()
    }

    /// Number of image blocks.
    pub fn image_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_image()).count()
    }

    /// Number of characters across all runs.
    pub fn char_count(&self) -> usize {
        self.paragraphs()
            .flat_map(|p| &p.runs)
            .map(|r| r.text.chars().count())
            .sum()
    }

    /// Plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        render::to_text(self, &RenderOptions::default())
    }

    /// Plain text content of the entire document.
    pub fn get_text(&self) -> String {
        self.plain_text()
    }

    /// Render to Markdown with default options.
    pub fn to_markdown(&self) -> String {
        render::to_markdown(self, &RenderOptions::default())
    }

    /// Render to a standalone HTML page with default options.
    pub fn to_html(&self) -> String {
        render::to_html(self, &RenderOptions::default())
    }

    /// Serialize the whole document graph as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        render::to_json(self, JsonFormat::Pretty)
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Container variant the document was read from
    pub format: Option<SourceFormat>,

    /// Format version that wrote the document (e.g., "5.1.0.1")
    pub version: String,

    /// Body streams were compressed
    pub compressed: bool,

    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Vec<String>,
    pub comments: Option<String>,

    /// Last editor
    pub last_saved_by: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Preview text stored by the authoring application
    pub preview_text: Option<String>,

    /// Total number of sections in the source
    pub section_count: u32,
}

impl Metadata {
    /// Create metadata for a format and version.
    pub fn with_format(format: SourceFormat, version: impl Into<String>) -> Self {
        Self {
            format: Some(format),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(ref title) = self.title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        if let Some(ref author) = self.author {
            lines.push(format!("author: \"{}\"", escape_yaml(author)));
        }
        if let Some(ref subject) = self.subject {
            lines.push(format!("subject: \"{}\"", escape_yaml(subject)));
        }
        if !self.keywords.is_empty() {
            let keywords: Vec<String> = self
                .keywords
                .iter()
                .map(|k| format!("\"{}\"", escape_yaml(k)))
                .collect();
            lines.push(format!("keywords: [{}]", keywords.join(", ")));
        }
        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        if let Some(ref modified) = self.modified {
            lines.push(format!("modified: {}", modified.to_rfc3339()));
        }
        if let Some(format) = self.format {
            lines.push(format!("format: {}", format.extension()));
        }
        if !self.version.is_empty() {
            lines.push(format!("version: \"{}\"", self.version));
        }
        lines.push(format!("sections: {}", self.section_count));

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

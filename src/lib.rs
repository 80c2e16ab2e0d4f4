//! # unhwp
//!
//! High-performance HWP/HWPX document extraction library for Rust.
//!
//! This library reads documents written by the Hangul word processor, both
//! the legacy HWP 5 compound-file format and the zipped-XML HWPX format, and
//! converts them to Markdown, HTML, plain text, and JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unhwp::{parse_file, render};
//!
//! fn main() -> unhwp::Result<()> {
//!     let doc = parse_file("report.hwp")?;
//!
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&doc, &options);
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Both container formats**: HWP 5 binary records and HWPX OWPML parts
//! - **Multiple output formats**: Markdown, HTML, plain text, JSON
//! - **Structure preservation**: Headings, lists, tables (merged and nested), images
//! - **Resolved styles**: Every run carries concrete formatting
//! - **Parallel rendering**: One parsed document renders to every format at once
//! - **Cleanup pipeline**: Text normalization for downstream processing

pub mod container;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use container::{DocumentFlags, FormatVersion};
pub use convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, HwpConverter,
    OutputFormat,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_hwp, SourceFormat};
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, BlockId, Document, Image, ListInfo, Metadata, Paragraph, ParagraphStyle,
    Resource, ResourceType, Run, Section, StyleTable, Table, TableCell, TextStyle,
};
pub use parser::{HwpParser, ParseOptions, SectionSelection};
pub use render::{
    CleanupOptions, CleanupPreset, JsonFormat, RenderOptions, RenderedOutputs, TableFallback,
};

use std::io::Read;
use std::path::Path;

/// Parse an HWP or HWPX document from bytes.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("report.hwpx").unwrap();
/// let doc = unhwp::parse(&data).unwrap();
/// println!("Sections: {}", doc.section_count());
/// ```
pub fn parse(data: &[u8]) -> Result<Document> {
    HwpParser::from_bytes(data)?.parse()
}

/// Parse an HWP or HWPX document from bytes with custom options.
pub fn parse_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    HwpParser::from_bytes_with_options(data, options)?.parse()
}

/// Parse an HWP or HWPX file.
///
/// # Example
///
/// ```no_run
/// use unhwp::parse_file;
///
/// let doc = parse_file("report.hwp").unwrap();
/// println!("Paragraphs: {}", doc.paragraph_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    HwpParser::open(path)?.parse()
}

/// Parse an HWP or HWPX file with custom options.
///
/// # Example
///
/// ```no_run
/// use unhwp::{parse_file_with_options, ParseOptions, SectionSelection};
///
/// let options = ParseOptions::new()
///     .text_only()
///     .with_sections(SectionSelection::Range(1..=2));
/// let doc = parse_file_with_options("report.hwp", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    HwpParser::open_with_options(path, options)?.parse()
}

/// Parse a document from a reader.
///
/// # Example
///
/// ```no_run
/// use unhwp::parse_reader;
/// use std::fs::File;
///
/// let file = File::open("report.hwpx").unwrap();
/// let doc = parse_reader(file).unwrap();
/// ```
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    HwpParser::from_reader(reader)?.parse()
}

/// Parse a document from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Document> {
    HwpParser::from_reader_with_options(reader, options)?.parse()
}

/// Extract plain text from a file.
///
/// # Example
///
/// ```no_run
/// let text = unhwp::extract_text("report.hwp").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(parse_file(path)?.plain_text())
}

/// Convert a file to Markdown.
///
/// # Example
///
/// ```no_run
/// let markdown = unhwp::to_markdown("report.hwp").unwrap();
/// std::fs::write("report.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    to_markdown_with_options(path, &RenderOptions::default())
}

/// Convert a file to Markdown with custom options.
///
/// # Example
///
/// ```no_run
/// use unhwp::{to_markdown_with_options, RenderOptions, CleanupPreset};
///
/// let options = RenderOptions::new()
///     .with_frontmatter(true)
///     .with_cleanup_preset(CleanupPreset::Standard);
/// let markdown = to_markdown_with_options("report.hwpx", &options).unwrap();
/// ```
pub fn to_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_markdown(&doc, options))
}

/// Convert a file to HTML.
pub fn to_html<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_html(&doc, options))
}

/// Convert a file to plain text.
///
/// # Example
///
/// ```no_run
/// use unhwp::{to_text, RenderOptions, CleanupPreset};
///
/// let options = RenderOptions::new().with_cleanup_preset(CleanupPreset::Standard);
/// let text = to_text("report.hwp", &options).unwrap();
/// ```
pub fn to_text<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_text(&doc, options))
}

/// Convert a file to JSON.
///
/// # Example
///
/// ```no_run
/// use unhwp::{to_json, JsonFormat};
///
/// let json = to_json("report.hwp", JsonFormat::Pretty).unwrap();
/// std::fs::write("report.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for parsing and converting HWP documents.
///
/// # Example
///
/// ```no_run
/// use unhwp::Unhwp;
///
/// let markdown = Unhwp::new()
///     .with_images(true)
///     .with_image_prefix("./images/")
///     .with_frontmatter()
///     .parse("report.hwp")?
///     .to_markdown();
/// # Ok::<(), unhwp::Error>(())
/// ```
pub struct Unhwp {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Unhwp {
    /// Create a new Unhwp builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Extract text and structure only, skipping embedded binaries.
    pub fn text_only(mut self) -> Self {
        self.parse_options = self.parse_options.text_only();
        self
    }

    /// Enable or disable image loading.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.parse_options = self.parse_options.with_resources(extract);
        self
    }

    /// Set the prefix used for image links.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_image_prefix(prefix);
        self
    }

    /// Enable frontmatter in Markdown output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Set table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.render_options = self.render_options.with_table_fallback(fallback);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.render_options = self.render_options.with_cleanup_preset(preset);
        self
    }

    /// Limit parsing to the selected sections.
    pub fn with_sections(mut self, sections: SectionSelection) -> Self {
        self.parse_options = self.parse_options.with_sections(sections.clone());
        self.render_options = self.render_options.with_sections(sections);
        self
    }

    /// Reject inputs larger than `limit` bytes.
    pub fn with_max_input_bytes(mut self, limit: u64) -> Self {
        self.parse_options = self.parse_options.with_max_input_bytes(limit);
        self
    }

    /// Parse a file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<UnhwpResult> {
        let document = parse_file_with_options(path, self.parse_options)?;
        Ok(UnhwpResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Parse a document from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<UnhwpResult> {
        let document = parse_with_options(data, self.parse_options)?;
        Ok(UnhwpResult {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Unhwp {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a document with [`Unhwp`].
pub struct UnhwpResult {
    /// The parsed document
    pub document: Document,
    render_options: RenderOptions,
}

impl UnhwpResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> String {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to HTML.
    pub fn to_html(&self) -> String {
        render::to_html(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> String {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Render every format in parallel.
    pub fn render_all(&self) -> Result<RenderedOutputs> {
        render::render_all(&self.document, &self.render_options)
    }

    /// Document metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.document.metadata
    }

    pub fn section_count(&self) -> usize {
        self.document.section_count()
    }

    pub fn paragraph_count(&self) -> usize {
        self.document.paragraph_count()
    }

    pub fn table_count(&self) -> usize {
        self.document.table_count()
    }

    pub fn image_count(&self) -> usize {
        self.document.image_count()
    }

    pub fn char_count(&self) -> usize {
        self.document.char_count()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

//! Built-in converter for both HWP containers.

use crate::detect::SourceFormat;
use crate::error::Result;
use crate::model::Document;
use crate::parser::HwpParser;
use crate::render::{self, JsonFormat};
use std::path::Path;

use super::{ConvertOptions, ConvertResult, DocumentConverter, OutputFormat};

/// Converts HWP 5 compound files and HWPX packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HwpConverter;

impl HwpConverter {
    pub fn new() -> Self {
        Self
    }

    fn render(&self, doc: Document, options: &ConvertOptions) -> Result<ConvertResult> {
        let format = options.output_format;
        let render_options = &options.render;

        let (content, stats) = match format {
            OutputFormat::Markdown if options.collect_stats => {
                let rendered = render::to_markdown_with_stats(&doc, render_options);
                (rendered.content, Some(rendered.stats))
            }
            OutputFormat::Markdown => (render::to_markdown(&doc, render_options), None),
            OutputFormat::Html => (render::to_html(&doc, render_options), None),
            OutputFormat::Text => (render::to_text(&doc, render_options), None),
            OutputFormat::Json => (render::to_json(&doc, JsonFormat::Pretty)?, None),
        };

        let mut result = ConvertResult::new(format, content, doc.metadata);
        result.stats = stats;
        Ok(result)
    }
}

impl DocumentConverter for HwpConverter {
    fn name(&self) -> &str {
        "hwp"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["hwp", "hwpx"]
    }

    fn source_formats(&self) -> &[SourceFormat] {
        &[SourceFormat::Hwp5, SourceFormat::Hwpx]
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let doc = HwpParser::open_with_options(path, options.parse.clone())?.parse()?;
        self.render(doc, options)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let doc = HwpParser::from_bytes_with_options(bytes, options.parse.clone())?.parse()?;
        self.render(doc, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Paragraph};

    #[test]
    fn test_claims_both_containers() {
        let converter = HwpConverter::new();
        assert!(converter.supports_extension("HWP"));
        assert!(converter.supports_extension("hwpx"));
        assert!(!converter.supports_extension("docx"));
        assert_eq!(converter.source_formats().len(), 2);
    }

    #[test]
    fn test_render_formats() {
        let mut doc = Document::new();
        doc.push_block(Block::Paragraph(Paragraph::with_text("본문")));
        let converter = HwpConverter::new();

        let html = converter
            .render(doc.clone(), &ConvertOptions::new().with_format(OutputFormat::Html))
            .unwrap();
        assert_eq!(html.mime_type(), "text/html");
        assert!(html.content.contains("<p>본문</p>"));

        let md = converter
            .render(doc, &ConvertOptions::new().with_stats(true))
            .unwrap();
        assert_eq!(md.content, "본문");
        assert_eq!(md.stats.map(|s| s.paragraph_count), Some(1));
    }
}

//! Rendering module for converting documents to various output formats.
//!
//! Markdown, HTML and plain text share one traversal ([`traverse::walk`]);
//! JSON serializes the document graph directly.

mod cleanup;
mod html;
mod json;
mod markdown;
mod options;
mod result;
pub mod streaming;
mod text;
pub mod traverse;
pub mod visitor;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use html::to_html;
pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::{RenderOptions, TableFallback};
pub use result::{Counted, ExtractionStats, RenderResult};
pub use streaming::{collect_content, RenderEvent, StreamingRenderer};
pub use text::to_text;
pub use visitor::{CompositeVisitor, DefaultVisitor, DocumentVisitor, VisitorAction};

use crate::error::Result;
use crate::model::Document;

/// Every output format rendered from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutputs {
    pub markdown: String,
    pub html: String,
    pub text: String,
    pub json: String,
}

/// Render Markdown, HTML, text and JSON in parallel from one shared document.
pub fn render_all(doc: &Document, options: &RenderOptions) -> Result<RenderedOutputs> {
    let ((markdown, html), (text, json)) = rayon::join(
        || rayon::join(|| to_markdown(doc, options), || to_html(doc, options)),
        || rayon::join(|| to_text(doc, options), || to_json(doc, JsonFormat::Pretty)),
    );

    Ok(RenderedOutputs {
        markdown,
        html,
        text,
        json: json?,
    })
}

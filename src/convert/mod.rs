//! Pluggable conversion front door.
//!
//! A [`ConverterRegistry`] routes an input to the [`DocumentConverter`] that
//! claims it: first by file extension, then by sniffing the container
//! signature when the extension is missing or unknown. The built-in
//! [`HwpConverter`] claims `.hwp`, `.hwpx` and both container signatures.
//!
//! # Example
//!
//! ```no_run
//! use unhwp::convert::{ConvertOptions, ConverterRegistry, OutputFormat};
//! use std::path::Path;
//!
//! fn main() -> unhwp::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let options = ConvertOptions::new().with_format(OutputFormat::Html);
//!     let result = registry.convert(Path::new("report.hwpx"), &options)?;
//!     println!("{} ({})", result.content, result.mime_type());
//!     Ok(())
//! }
//! ```

mod hwp;

pub use hwp::HwpConverter;

use crate::detect::{self, SourceFormat};
use crate::error::{Error, Result};
use crate::model::Metadata;
use crate::parser::ParseOptions;
use crate::render::{ExtractionStats, RenderOptions};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Everything a conversion needs: how to parse, how to render, and into what.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub parse: ParseOptions,
    pub render: RenderOptions,
    /// Collect [`ExtractionStats`]; only Markdown output fills them.
    pub collect_stats: bool,
    pub output_format: OutputFormat,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Target format of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    #[default]
    Markdown,
    /// Standalone page unless the render options ask for a fragment
    Html,
    Text,
    /// Pretty-printed document model
    Json,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "text/markdown",
            OutputFormat::Html => "text/html",
            OutputFormat::Text => "text/plain",
            OutputFormat::Json => "application/json",
        }
    }

    /// Conventional file extension for the output.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

/// Rendered content together with the source metadata.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    pub content: String,
    pub format: OutputFormat,
    pub metadata: Metadata,
    pub stats: Option<ExtractionStats>,
}

impl ConvertResult {
    pub fn new(format: OutputFormat, content: String, metadata: Metadata) -> Self {
        Self {
            content,
            format,
            metadata,
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: ExtractionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// A converter for one family of input documents.
pub trait DocumentConverter: Send + Sync {
    /// Registry key; matched case-insensitively.
    fn name(&self) -> &str;

    /// Lowercase extensions without the leading dot, e.g. `["hwp"]`.
    fn supported_extensions(&self) -> &[&str];

    /// Container signatures this converter reads when the extension is
    /// missing or unknown.
    fn source_formats(&self) -> &[SourceFormat] {
        &[]
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult>;

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        options.parse.check_input_size(std::fs::metadata(path)?.len())?;
        self.convert_bytes(&std::fs::read(path)?, options)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Registered converters, indexed by extension and by name.
///
/// A later registration claiming the same extension or name replaces the
/// earlier one for that key.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn DocumentConverter>>,
    by_extension: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding [`HwpConverter`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HwpConverter::new()));
        registry
    }

    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        let slot = self.converters.len();
        for ext in converter.supported_extensions() {
            self.by_extension.insert(ext.to_ascii_lowercase(), slot);
        }
        self.by_name.insert(converter.name().to_ascii_lowercase(), slot);
        self.converters.push(converter);
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.lookup(&self.by_extension, ext)
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.lookup(&self.by_name, name)
    }

    /// The most recently registered converter reading `format`.
    pub fn get_by_source_format(&self, format: SourceFormat) -> Option<Arc<dyn DocumentConverter>> {
        self.converters
            .iter()
            .rev()
            .find(|c| c.source_formats().contains(&format))
            .cloned()
    }

    fn lookup(&self, index: &HashMap<String, usize>, key: &str) -> Option<Arc<dyn DocumentConverter>> {
        index
            .get(&key.to_ascii_lowercase())
            .map(|&slot| Arc::clone(&self.converters[slot]))
    }

    pub fn supports(&self, ext: &str) -> bool {
        self.by_extension.contains_key(&ext.to_ascii_lowercase())
    }

    /// Every registered extension, in no particular order.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.by_extension.keys().map(String::as_str).collect()
    }

    /// Convert a file, picking the converter by extension and falling back
    /// to the file's container signature.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let by_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext));

        let converter = match by_extension {
            Some(converter) => converter,
            None => {
                let format = detect::detect_format_from_path(path)?;
                log::debug!("{}: routing by {} signature", path.display(), format);
                self.get_by_source_format(format)
                    .ok_or_else(|| Error::Format(format!("no converter reads {}", format)))?
            }
        };

        converter.convert(path, options)
    }

    /// Convert bytes with the converter registered for `ext`.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::Format(format!("no converter for extension: {}", ext)))?;
        converter.convert_bytes(bytes, options)
    }

    /// Convert bytes with the converter that reads their container signature.
    pub fn convert_sniffed(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let format = detect::detect_format_from_bytes(bytes)?;
        let converter = self
            .get_by_source_format(format)
            .ok_or_else(|| Error::Format(format!("no converter reads {}", format)))?;
        converter.convert_bytes(bytes, options)
    }
}

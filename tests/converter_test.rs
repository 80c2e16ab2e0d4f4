//! Integration tests for the converter module.

mod common;

use common::{hwpx_package, write_temp, HwpxParagraph};
use std::path::Path;
use std::sync::Arc;
use unhwp::convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, HwpConverter, OutputFormat,
};
use unhwp::error::Result;
use unhwp::ParseOptions;

/// Mock converter for testing.
struct MockConverter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockConverter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl DocumentConverter for MockConverter {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn convert(&self, _path: &Path, _options: &ConvertOptions) -> Result<ConvertResult> {
        Ok(ConvertResult::new(
            OutputFormat::Text,
            format!("Converted by {}", self.name),
            Default::default(),
        ))
    }

    fn convert_bytes(&self, _bytes: &[u8], _options: &ConvertOptions) -> Result<ConvertResult> {
        Ok(ConvertResult::new(
            OutputFormat::Text,
            format!("Converted bytes by {}", self.name),
            Default::default(),
        ))
    }
}

fn sample() -> Vec<u8> {
    hwpx_package(&[vec![
        HwpxParagraph::heading("개요", 1),
        HwpxParagraph::plain("본문 내용"),
    ]])
}

#[test]
fn test_convert_options_builder() {
    let options = ConvertOptions::new()
        .with_parse_options(ParseOptions::new().with_max_input_bytes(4096))
        .with_stats(true)
        .with_format(OutputFormat::Text);

    assert_eq!(options.parse.max_input_bytes, Some(4096));
    assert!(options.collect_stats);
    assert_eq!(options.output_format, OutputFormat::Text);
}

#[test]
fn test_converter_registry_new() {
    let registry = ConverterRegistry::new();

    assert!(!registry.supports("hwp"));
    assert!(!registry.supports("hwpx"));
}

#[test]
fn test_converter_registry_with_defaults() {
    let registry = ConverterRegistry::with_defaults();

    assert!(registry.supports("hwp"));
    assert!(registry.supports("HWPX")); // Case insensitive
    assert!(!registry.supports("docx"));
}

#[test]
fn test_converter_registry_register() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockConverter::new(vec!["txt", "text"], "text")));

    assert!(registry.supports("txt"));
    assert!(registry.supports("text"));
    assert!(registry.supports("TXT"));
}

#[test]
fn test_converter_registry_get_by_name() {
    let registry = ConverterRegistry::with_defaults();

    assert!(registry.get_by_name("hwp").is_some());
    assert!(registry.get_by_name("HWP").is_some());
    assert!(registry.get_by_name("unknown").is_none());
}

#[test]
fn test_converter_registry_multiple_converters() {
    let mut registry = ConverterRegistry::new();

    registry.register(Arc::new(HwpConverter::new()));
    registry.register(Arc::new(MockConverter::new(vec!["doc", "docx"], "word")));

    assert!(registry.supports("hwp"));
    assert!(registry.supports("hwpx"));
    assert!(registry.supports("docx"));

    let converter = registry.get_by_name("word");
    assert!(converter.unwrap().supports_extension("docx"));
}

#[test]
fn test_supported_extensions() {
    let registry = ConverterRegistry::with_defaults();
    let mut extensions = registry.supported_extensions();
    extensions.sort_unstable();

    assert_eq!(extensions, vec!["hwp", "hwpx"]);
}

#[test]
fn test_convert_bytes_to_markdown() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry
        .convert_bytes(&sample(), "hwpx", &ConvertOptions::default())
        .unwrap();

    assert_eq!(result.content, "# 개요\n\n본문 내용");
    assert_eq!(result.mime_type(), "text/markdown");
    assert!(result.stats.is_none());
}

#[test]
fn test_convert_bytes_each_format() {
    let registry = ConverterRegistry::with_defaults();
    let data = sample();

    let html = registry
        .convert_bytes(&data, "hwpx", &ConvertOptions::new().with_format(OutputFormat::Html))
        .unwrap();
    assert_eq!(html.mime_type(), "text/html");
    assert!(html.content.starts_with("<!DOCTYPE html>"));
    assert!(html.content.contains("<h1>개요</h1>"));

    let text = registry
        .convert_bytes(&data, "hwpx", &ConvertOptions::new().with_format(OutputFormat::Text))
        .unwrap();
    assert_eq!(text.content, "개요\n본문 내용");

    let json = registry
        .convert_bytes(&data, "hwpx", &ConvertOptions::new().with_format(OutputFormat::Json))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json.content).unwrap();
    assert_eq!(value["metadata"]["format"], "hwpx");
}

#[test]
fn test_convert_file_with_stats() {
    let file = write_temp(&sample(), "hwpx");
    let registry = ConverterRegistry::with_defaults();

    let result = registry
        .convert(file.path(), &ConvertOptions::new().with_stats(true))
        .unwrap();
    let stats = result.stats.unwrap();
    assert_eq!(stats.section_count, 1);
    assert_eq!(stats.heading_count, 1);
    assert_eq!(stats.paragraph_count, 1);
}

#[test]
fn test_convert_result_methods() {
    let result = ConvertResult::new(OutputFormat::Markdown, "# Hello".to_string(), Default::default());

    assert_eq!(result.content, "# Hello");
    assert_eq!(result.content_len(), 7);
    assert!(result.stats.is_none());
    assert_eq!(result.mime_type(), "text/markdown");
}

#[test]
fn test_output_format_default() {
    assert_eq!(OutputFormat::default(), OutputFormat::Markdown);
}

#[test]
fn test_mock_converter() {
    let converter = MockConverter::new(vec!["mock"], "mock-converter");

    let result = converter
        .convert(Path::new("test.mock"), &ConvertOptions::default())
        .unwrap();
    assert!(result.content.contains("mock-converter"));
}

#[test]
fn test_registry_convert_missing_file_without_extension() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert(Path::new("noextension"), &ConvertOptions::default());
    assert!(matches!(result, Err(unhwp::Error::Io(_))));
}

#[test]
fn test_registry_sniffs_unknown_extension() {
    let file = write_temp(&sample(), "bin");
    let registry = ConverterRegistry::with_defaults();

    let result = registry
        .convert(file.path(), &ConvertOptions::new().with_format(OutputFormat::Text))
        .unwrap();
    assert_eq!(result.content, "개요\n본문 내용");
}

#[test]
fn test_later_registration_wins() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(Arc::new(MockConverter::new(vec!["hwp"], "legacy")));

    let converter = registry.get_by_extension("hwp").unwrap();
    assert_eq!(converter.name(), "legacy");
    assert_eq!(registry.get_by_extension("hwpx").unwrap().name(), "hwp");
}

#[test]
fn test_registry_convert_bytes_unsupported() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert_bytes(b"test", "xyz", &ConvertOptions::default());
    assert!(result.is_err());
}

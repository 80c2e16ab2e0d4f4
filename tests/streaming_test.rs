//! Integration tests for streaming renderer.

mod common;

use common::{HwpxPackage, HwpxParagraph};
use unhwp::model::Document;
use unhwp::render::streaming::{collect_content, RenderEvent, StreamingRenderer};
use unhwp::render::RenderOptions;
use unhwp::SectionSelection;

fn create_sample_document() -> Document {
    let data = HwpxPackage::new()
        .title("Test Document")
        .author("Test Author")
        .section(vec![
            HwpxParagraph::heading("Introduction", 1),
            HwpxParagraph::plain("This is the introduction."),
        ])
        .section(vec![
            HwpxParagraph::heading("Chapter 1", 1),
            HwpxParagraph::bullet("first point"),
            HwpxParagraph::bullet("second point"),
        ])
        .section(vec![HwpxParagraph::plain("Conclusion text.")])
        .build();
    unhwp::parse(&data).unwrap()
}

#[test]
fn test_streaming_renderer_basic() {
    let doc = create_sample_document();
    let events: Vec<_> = StreamingRenderer::new(&doc, RenderOptions::default()).collect();

    assert!(matches!(
        events.first(),
        Some(RenderEvent::DocumentStart { section_count: 3, .. })
    ));
    assert!(matches!(events.last(), Some(RenderEvent::DocumentEnd)));
}

#[test]
fn test_streaming_renderer_section_events() {
    let doc = create_sample_document();
    let events: Vec<_> = StreamingRenderer::new(&doc, RenderOptions::default()).collect();

    let starts: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            RenderEvent::SectionStart { index } => Some(*index),
            _ => None,
        })
        .collect();
    let ends = events
        .iter()
        .filter(|e| matches!(e, RenderEvent::SectionEnd { .. }))
        .count();

    assert_eq!(starts, vec![0, 1, 2]);
    assert_eq!(ends, 3);
}

#[test]
fn test_streaming_matches_batch_markdown() {
    let doc = create_sample_document();
    let options = RenderOptions::default();

    let streamed = collect_content(StreamingRenderer::new(&doc, options.clone()));
    assert_eq!(streamed, unhwp::render::to_markdown(&doc, &options));
    assert!(streamed.contains("- first point\n- second point"));
}

#[test]
fn test_streaming_renderer_with_frontmatter() {
    let doc = create_sample_document();
    let options = RenderOptions::default().with_frontmatter(true);
    let events: Vec<_> = StreamingRenderer::new(&doc, options).collect();

    let Some(RenderEvent::Frontmatter(content)) = events.first() else {
        panic!("expected frontmatter first");
    };
    assert!(content.contains("title: \"Test Document\""));
    assert!(content.contains("author: \"Test Author\""));
}

#[test]
fn test_streaming_renderer_section_selection() {
    let doc = create_sample_document();
    let options = RenderOptions::default().with_sections(SectionSelection::Range(1..=2));

    let starts = StreamingRenderer::new(&doc, options.clone())
        .filter(|e| matches!(e, RenderEvent::SectionStart { .. }))
        .count();
    assert_eq!(starts, 2);

    let content = collect_content(StreamingRenderer::new(&doc, options));
    assert!(content.contains("Introduction"));
    assert!(content.contains("Chapter 1"));
    assert!(!content.contains("Conclusion text"));
}

#[test]
fn test_event_helpers() {
    let block = RenderEvent::Block("text".to_string());
    assert!(block.has_content());
    assert_eq!(block.content(), Some("text"));

    assert!(RenderEvent::DocumentEnd.is_document_boundary());
    assert!(RenderEvent::SectionStart { index: 0 }.is_section_boundary());
    assert!(RenderEvent::SectionEnd { index: 0 }.content().is_none());
}

#[test]
fn test_renderer_is_done_after_exhaustion() {
    let doc = create_sample_document();
    let mut renderer = StreamingRenderer::new(&doc, RenderOptions::default());
    assert_eq!(renderer.section_count(), 3);

    while renderer.next().is_some() {}
    assert!(renderer.is_done());
    assert!(renderer.next().is_none());
}

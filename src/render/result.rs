//! Rendered output paired with what the renderer saw along the way.

use crate::model::Metadata;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Markdown together with the source metadata and rendering statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    pub content: String,
    pub metadata: Metadata,
    pub stats: ExtractionStats,
}

impl RenderResult {
    pub fn new(content: String, metadata: Metadata, stats: ExtractionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }

    /// Content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Kinds of block the renderer counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counted {
    Section,
    Paragraph,
    Heading,
    ListItem,
    /// Nested tables count individually
    Table,
    Image,
}

/// Counts of what a render pass emitted.
///
/// Blocks skipped by a visitor or by section selection are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub section_count: u32,
    /// Body paragraphs; headings and list items are counted separately
    pub paragraph_count: u32,
    pub heading_count: u32,
    pub list_item_count: u32,
    pub table_count: u32,
    pub image_count: u32,
    /// Whitespace-separated tokens of the output
    pub word_count: u32,
    /// Non-whitespace characters of the output
    pub char_count: u32,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, item: Counted) {
        let counter = match item {
            Counted::Section => &mut self.section_count,
            Counted::Paragraph => &mut self.paragraph_count,
            Counted::Heading => &mut self.heading_count,
            Counted::ListItem => &mut self.list_item_count,
            Counted::Table => &mut self.table_count,
            Counted::Image => &mut self.image_count,
        };
        *counter += 1;
    }

    /// Add the word and character counts of `text`.
    pub fn count_text(&mut self, text: &str) {
        for word in text.split_whitespace() {
            self.word_count += 1;
            self.char_count += word.chars().count() as u32;
        }
    }
}

impl AddAssign<&ExtractionStats> for ExtractionStats {
    fn add_assign(&mut self, other: &ExtractionStats) {
        self.section_count += other.section_count;
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.list_item_count += other.list_item_count;
        self.table_count += other.table_count;
        self.image_count += other.image_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_text_mixed_scripts() {
        let mut stats = ExtractionStats::new();
        stats.count_text("한글 문서 변환 test.");

        assert_eq!(stats.word_count, 4);
        assert_eq!(stats.char_count, 11);
    }

    #[test]
    fn test_record_and_sum() {
        let mut first = ExtractionStats::new();
        first.record(Counted::Section);
        first.record(Counted::Paragraph);
        first.record(Counted::Paragraph);

        let mut second = ExtractionStats::new();
        second.record(Counted::Section);
        second.record(Counted::Image);

        first += &second;
        assert_eq!(first.section_count, 2);
        assert_eq!(first.paragraph_count, 2);
        assert_eq!(first.image_count, 1);
        assert_eq!(first.table_count, 0);
    }
}

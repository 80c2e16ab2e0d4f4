//! Streaming Markdown renderer for processing large documents incrementally.
//!
//! The streaming renderer yields rendering events one at a time, section by
//! section, instead of building the whole output string.
//!
//! # Example
//!
//! ```no_run
//! use unhwp::{parse_file, render::{StreamingRenderer, RenderEvent}};
//!
//! fn main() -> unhwp::Result<()> {
//!     let doc = parse_file("report.hwp")?;
//!     let renderer = StreamingRenderer::new(&doc, Default::default());
//!
//!     for event in renderer {
//!         match event {
//!             RenderEvent::Block(content) => print!("{}", content),
//!             RenderEvent::SectionStart { index } => eprintln!("section {}", index + 1),
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use crate::model::{Document, Metadata};

use super::{MarkdownRenderer, RenderOptions};

/// Events emitted during streaming rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// YAML frontmatter (if enabled).
    Frontmatter(String),

    /// Document rendering has started.
    DocumentStart {
        /// Document metadata
        metadata: Metadata,
        /// Number of sections in the document
        section_count: u32,
    },

    /// A section is starting.
    SectionStart {
        /// Zero-based section index
        index: usize,
    },

    /// A block of rendered Markdown.
    Block(String),

    /// A section has finished rendering.
    SectionEnd {
        /// Zero-based section index
        index: usize,
    },

    /// Document rendering has completed.
    DocumentEnd,
}

impl RenderEvent {
    /// Check if this is a content-bearing event.
    pub fn has_content(&self) -> bool {
        matches!(self, RenderEvent::Block(_) | RenderEvent::Frontmatter(_))
    }

    /// Get the content if this is a content event.
    pub fn content(&self) -> Option<&str> {
        match self {
            RenderEvent::Block(s) | RenderEvent::Frontmatter(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is a document boundary event.
    pub fn is_document_boundary(&self) -> bool {
        matches!(
            self,
            RenderEvent::DocumentStart { .. } | RenderEvent::DocumentEnd
        )
    }

    /// Check if this is a section boundary event.
    pub fn is_section_boundary(&self) -> bool {
        matches!(
            self,
            RenderEvent::SectionStart { .. } | RenderEvent::SectionEnd { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Initial,
    Frontmatter,
    DocumentStarted,
    InSection {
        position: usize,
        block_index: usize,
    },
    /// Flushing an open list before the section ends
    SectionTail { position: usize },
    ClosingSection { position: usize },
    BetweenSections { next: usize },
    SectionsComplete,
    Done,
}

/// Streaming renderer that yields rendering events as an iterator.
pub struct StreamingRenderer<'a> {
    doc: &'a Document,
    options: RenderOptions,
    renderer: MarkdownRenderer,
    state: StreamState,
}

impl<'a> StreamingRenderer<'a> {
    /// Create a new streaming renderer.
    pub fn new(doc: &'a Document, options: RenderOptions) -> Self {
        Self {
            doc,
            renderer: MarkdownRenderer::new(options.clone()),
            options,
            state: StreamState::Initial,
        }
    }

    /// Get the number of sections in the document.
    pub fn section_count(&self) -> usize {
        self.doc.section_count()
    }

    /// Check if rendering is complete.
    pub fn is_done(&self) -> bool {
        self.state == StreamState::Done
    }

    /// Find the next section that should be rendered.
    fn find_next_section(&self, start: usize) -> Option<usize> {
        (start..self.doc.sections.len())
            .find(|&i| self.options.section_selection.includes_index(self.doc.sections[i].index))
    }

    fn document_start(&self) -> RenderEvent {
        RenderEvent::DocumentStart {
            metadata: self.doc.metadata.clone(),
            section_count: self.doc.section_count() as u32,
        }
    }

    fn enter_section(&mut self, position: usize) -> RenderEvent {
        self.state = StreamState::InSection {
            position,
            block_index: 0,
        };
        RenderEvent::SectionStart {
            index: self.doc.sections[position].index,
        }
    }
}

impl<'a> Iterator for StreamingRenderer<'a> {
    type Item = RenderEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                StreamState::Initial => {
                    if self.options.include_frontmatter {
                        self.state = StreamState::Frontmatter;
                        return Some(RenderEvent::Frontmatter(format!(
                            "{}\n",
                            self.doc.metadata.to_yaml_frontmatter()
                        )));
                    }
                    self.state = StreamState::DocumentStarted;
                    return Some(self.document_start());
                }

                StreamState::Frontmatter => {
                    self.state = StreamState::DocumentStarted;
                    return Some(self.document_start());
                }

                StreamState::DocumentStarted => match self.find_next_section(0) {
                    Some(position) => return Some(self.enter_section(position)),
                    None => self.state = StreamState::SectionsComplete,
                },

                StreamState::InSection {
                    position,
                    block_index,
                } => {
                    let section = &self.doc.sections[position];
                    match section.blocks.get(block_index) {
                        Some(&id) => {
                            self.state = StreamState::InSection {
                                position,
                                block_index: block_index + 1,
                            };
                            let content = self.renderer.render_block(self.doc, id);
                            if !content.is_empty() {
                                return Some(RenderEvent::Block(content));
                            }
                        }
                        None => self.state = StreamState::SectionTail { position },
                    }
                }

                StreamState::SectionTail { position } => {
                    self.state = StreamState::ClosingSection { position };
                    let tail = self.renderer.finish();
                    if !tail.is_empty() {
                        return Some(RenderEvent::Block(tail));
                    }
                }

                StreamState::ClosingSection { position } => {
                    self.state = StreamState::BetweenSections { next: position + 1 };
                    return Some(RenderEvent::SectionEnd {
                        index: self.doc.sections[position].index,
                    });
                }

                StreamState::BetweenSections { next } => match self.find_next_section(next) {
                    Some(position) => return Some(self.enter_section(position)),
                    None => self.state = StreamState::SectionsComplete,
                },

                StreamState::SectionsComplete => {
                    self.state = StreamState::Done;
                    return Some(RenderEvent::DocumentEnd);
                }

                StreamState::Done => return None,
            }
        }
    }
}

/// Collect all content from a streaming renderer into a single string.
pub fn collect_content(renderer: StreamingRenderer<'_>) -> String {
    let mut output = String::new();
    for event in renderer {
        if let Some(content) = event.content() {
            output.push_str(content);
        }
    }
    output.trim().to_string()
}

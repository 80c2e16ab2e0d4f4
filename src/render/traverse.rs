//! Shared traversal contract for the text-producing renderers.
//!
//! [`walk`] owns the one exhaustive match over [`Block`]; renderers only
//! implement the [`Emitter`] callbacks. Table cells own block ids, so an
//! emitter that renders nested content calls [`walk_blocks`] on itself.

use crate::model::{Block, BlockId, Document, Image, Paragraph, Run, Section, Table};
use crate::parser::SectionSelection;

/// Whether the walk descends into a paragraph's runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Children,
    Skip,
}

/// Callbacks driven by [`walk`].
pub trait Emitter {
    fn start_document(&mut self, doc: &Document) {
        let _ = doc;
    }

    fn end_document(&mut self, doc: &Document) {
        let _ = doc;
    }

    fn start_section(&mut self, section: &Section) {
        let _ = section;
    }

    fn end_section(&mut self, section: &Section) {
        let _ = section;
    }

    /// Called before the paragraph's runs; [`Visit::Skip`] suppresses the
    /// runs and [`Emitter::end_paragraph`].
    fn start_paragraph(&mut self, paragraph: &Paragraph) -> Visit;

    fn run(&mut self, run: &Run);

    fn end_paragraph(&mut self, paragraph: &Paragraph);

    fn table(&mut self, doc: &Document, table: &Table);

    fn image(&mut self, doc: &Document, image: &Image);
}

/// Walk the selected sections of a document.
pub fn walk<E: Emitter>(doc: &Document, selection: &SectionSelection, emitter: &mut E) {
    emitter.start_document(doc);
    for section in &doc.sections {
        if !selection.includes_index(section.index) {
            continue;
        }
        emitter.start_section(section);
        walk_blocks(doc, &section.blocks, emitter);
        emitter.end_section(section);
    }
    emitter.end_document(doc);
}

/// Walk a sequence of blocks (a section body or a table cell).
pub fn walk_blocks<E: Emitter>(doc: &Document, blocks: &[BlockId], emitter: &mut E) {
    for id in blocks {
        walk_block(doc, *id, emitter);
    }
}

/// Dispatch one block.
pub fn walk_block<E: Emitter>(doc: &Document, id: BlockId, emitter: &mut E) {
    match doc.block(id) {
        Some(Block::Paragraph(paragraph)) => {
            if emitter.start_paragraph(paragraph) == Visit::Children {
                for run in &paragraph.runs {
                    emitter.run(run);
                }
                emitter.end_paragraph(paragraph);
            }
        }
        Some(Block::Table(table)) => emitter.table(doc, table),
        Some(Block::Image(image)) => emitter.image(doc, image),
        None => log::warn!("block {} is not in the arena", id.0),
    }
}

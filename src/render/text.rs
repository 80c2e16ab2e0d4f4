//! Plain text rendering.

use crate::model::{Document, Image, Paragraph, Run, Section, Table, TableCell};

use super::traverse::{walk, walk_blocks, Emitter, Visit};
use super::{CleanupPipeline, RenderOptions};

/// Convert a document to plain text.
///
/// Paragraphs end with a newline, table rows become tab-separated lines and
/// images are omitted. Only source text reaches the output.
pub fn to_text(doc: &Document, options: &RenderOptions) -> String {
    let mut emitter = TextEmitter::default();
    walk(doc, &options.section_selection, &mut emitter);
    let mut output = emitter.output;

    if let Some(ref cleanup_options) = options.cleanup {
        let pipeline = CleanupPipeline::new(cleanup_options.clone());
        output = pipeline.process(&output);
    }

    output.trim().to_string()
}

/// Plain text of a table cell with whitespace collapsed to single spaces.
pub(crate) fn cell_text(doc: &Document, cell: &TableCell) -> String {
    let mut emitter = TextEmitter::default();
    walk_blocks(doc, &cell.blocks, &mut emitter);
    emitter.output.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain text of every row of a table, cells in column order.
pub(crate) fn table_rows(doc: &Document, table: &Table) -> Vec<Vec<String>> {
    table
        .rows_of_cells()
        .into_iter()
        .map(|row| row.into_iter().map(|cell| cell_text(doc, cell)).collect())
        .collect()
}

#[derive(Default)]
struct TextEmitter {
    output: String,
    sections: usize,
}

impl TextEmitter {
    fn ensure_blank_line(&mut self) {
        if self.output.is_empty() {
            return;
        }
        while !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }
}

impl Emitter for TextEmitter {
    fn start_section(&mut self, _section: &Section) {
        if self.sections > 0 {
            self.ensure_blank_line();
        }
        self.sections += 1;
    }

    fn start_paragraph(&mut self, paragraph: &Paragraph) -> Visit {
        if paragraph.is_empty() {
            Visit::Skip
        } else {
            Visit::Children
        }
    }

    fn run(&mut self, run: &Run) {
        self.output.push_str(&run.text);
    }

    fn end_paragraph(&mut self, _paragraph: &Paragraph) {
        self.output.push('\n');
    }

    fn table(&mut self, doc: &Document, table: &Table) {
        if let Some(caption) = &table.caption {
            self.output.push_str(caption);
            self.output.push('\n');
        }
        for row in table_rows(doc, table) {
            self.output.push_str(&row.join("\t"));
            self.output.push('\n');
        }
    }

    fn image(&mut self, _doc: &Document, _image: &Image) {}
}

//! Markdown rendering.

use std::collections::VecDeque;

use crate::model::{BlockId, Document, Image, ListInfo, Paragraph, Run, Section, Table, TableCell};

use super::text::table_rows;
use super::traverse::{walk, walk_block, walk_blocks, Emitter, Visit};
use super::visitor::{DocumentVisitor, VisitorAction};
use super::result::Counted;
use super::{CleanupPipeline, ExtractionStats, RenderOptions, RenderResult, TableFallback};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> RenderResult {
    let mut options = options.clone();
    options.collect_stats = true;
    MarkdownRenderer::new(options).render_with_stats(doc)
}

/// Markdown renderer.
///
/// Nested tables are replaced by a `[Table N]` placeholder inside their cell
/// and written after the enclosing top-level table as `Table N:` followed by
/// the table itself, breadth-first. `N` counts nested tables across the
/// whole document.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
    visitor: Option<Box<dyn DocumentVisitor>>,
    output: String,
    in_list: bool,
    nested: NestedTables,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
            visitor: None,
            output: String::new(),
            in_list: false,
            nested: NestedTables::default(),
        }
    }

    /// Attach a visitor that can replace or skip elements.
    pub fn with_visitor<V: DocumentVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitor = Some(Box::new(visitor));
        self
    }

    /// Render a document to Markdown.
    pub fn render(mut self, doc: &Document) -> String {
        self.render_internal(doc)
    }

    /// Render a document to Markdown with extraction statistics.
    pub fn render_with_stats(mut self, doc: &Document) -> RenderResult {
        self.options.collect_stats = true;
        let content = self.render_internal(doc);
        self.stats.count_text(&content);
        RenderResult::new(content, doc.metadata.clone(), self.stats)
    }

    /// Render one block and return the Markdown it produced.
    ///
    /// List state carries over between calls, so consecutive list items
    /// render as one list.
    pub fn render_block(&mut self, doc: &Document, id: BlockId) -> String {
        walk_block(doc, id, self);
        std::mem::take(&mut self.output)
    }

    /// Close an open list and return any trailing output.
    pub fn finish(&mut self) -> String {
        self.close_list();
        std::mem::take(&mut self.output)
    }

    /// Statistics collected so far.
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    fn render_internal(&mut self, doc: &Document) -> String {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
            output.push('\n');
        }

        let selection = self.options.section_selection.clone();
        walk(doc, &selection, self);
        output.push_str(&self.output);
        self.output.clear();

        if let Some(ref cleanup_options) = self.options.cleanup {
            let pipeline = CleanupPipeline::new(cleanup_options.clone());
            output = pipeline.process(&output);
        }

        output.trim().to_string()
    }

    fn close_list(&mut self) {
        if self.in_list {
            self.output.push('\n');
            self.in_list = false;
        }
    }

    fn visit(&mut self, visit: impl FnOnce(&mut dyn DocumentVisitor) -> VisitorAction) -> bool {
        let action = match self.visitor.as_mut() {
            Some(visitor) => visit(visitor.as_mut()),
            None => VisitorAction::Continue,
        };
        match action {
            VisitorAction::Continue => true,
            VisitorAction::Replace(content) => {
                self.output.push_str(&content);
                false
            }
            VisitorAction::Skip => false,
        }
    }

    fn write_table(&mut self, doc: &Document, table: &Table) {
        if self.options.collect_stats {
            self.stats.record(Counted::Table);
        }

        if table.is_empty() || table.rows == 0 || table.cols == 0 {
            self.output
                .push_str(&format!("[Table: {}x{}]\n\n", table.rows, table.cols));
            return;
        }

        let mode = if !table.has_merged_cells() {
            TableMode::Pipe
        } else {
            match self.options.table_fallback {
                TableFallback::Html => TableMode::Html,
                TableFallback::Markdown => TableMode::Pipe,
                TableFallback::Ascii => TableMode::Ascii,
            }
        };

        let text = match mode {
            TableMode::Pipe => self.pipe_table(doc, table),
            TableMode::Html => self.html_table(doc, table),
            TableMode::Ascii => self.ascii_table(doc, table),
        };
        self.output.push_str(&text);

        if let Some(caption) = &table.caption {
            let caption = self.escape(caption);
            self.output.push_str(&format!("*{}*\n\n", caption.trim()));
        }
    }

    fn cell(&mut self, doc: &Document, cell: &TableCell, mode: CellMode) -> String {
        let mut writer = CellWriter {
            options: &self.options,
            nested: &mut self.nested,
            mode,
            parts: Vec::new(),
            current: String::new(),
        };
        walk_blocks(doc, &cell.blocks, &mut writer);
        let separator = if mode == CellMode::Html { "<br>" } else { " " };
        writer.parts.join(separator)
    }

    /// Content of every grid slot. Slots covered by a span stay empty.
    fn grid_text(&mut self, doc: &Document, table: &Table, mode: CellMode) -> Vec<Vec<String>> {
        let mut grid = Vec::new();
        for row in table.anchor_grid() {
            let mut texts = Vec::with_capacity(row.len());
            for slot in row {
                texts.push(slot.map_or_else(String::new, |cell| self.cell(doc, cell, mode)));
            }
            grid.push(texts);
        }
        grid
    }

    fn pipe_table(&mut self, doc: &Document, table: &Table) -> String {
        let grid = self.grid_text(doc, table, CellMode::Markdown);
        let mut output = String::new();
        for (i, row) in grid.iter().enumerate() {
            output.push('|');
            for cell in row {
                output.push_str(&format!(" {} |", cell.trim()));
            }
            output.push('\n');
            if i == 0 {
                output.push('|');
                output.push_str(&" --- |".repeat(row.len()));
                output.push('\n');
            }
        }
        output.push('\n');
        output
    }

    fn html_table(&mut self, doc: &Document, table: &Table) -> String {
        let mut output = String::from("<table>\n");
        for row in table.rows_of_cells() {
            output.push_str("<tr>");
            for cell in row {
                let mut attrs = String::new();
                if cell.row_span > 1 {
                    attrs.push_str(&format!(" rowspan=\"{}\"", cell.row_span));
                }
                if cell.col_span > 1 {
                    attrs.push_str(&format!(" colspan=\"{}\"", cell.col_span));
                }
                let content = self.cell(doc, cell, CellMode::Html);
                output.push_str(&format!("<td{}>{}</td>", attrs, content));
            }
            output.push_str("</tr>\n");
        }
        output.push_str("</table>\n\n");
        output
    }

    fn ascii_table(&mut self, doc: &Document, table: &Table) -> String {
        let grid = self.grid_text(doc, table, CellMode::Plain);
        let mut widths = vec![1usize; grid.first().map_or(0, Vec::len)];
        for row in &grid {
            for (c, text) in row.iter().enumerate() {
                widths[c] = widths[c].max(text.chars().count());
            }
        }

        let border: String = widths
            .iter()
            .map(|w| format!("+{}", "-".repeat(w + 2)))
            .collect::<String>()
            + "+\n";

        let mut output = String::from("```\n");
        output.push_str(&border);
        for row in &grid {
            for (c, text) in row.iter().enumerate() {
                let pad = widths[c] - text.chars().count();
                output.push_str(&format!("| {}{} ", text, " ".repeat(pad)));
            }
            output.push_str("|\n");
            output.push_str(&border);
        }
        output.push_str("```\n\n");
        output
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

impl Emitter for MarkdownRenderer {
    fn start_section(&mut self, section: &Section) {
        self.close_list();
        if self.options.collect_stats {
            self.stats.record(Counted::Section);
        }
        if let Some(visitor) = self.visitor.as_mut() {
            visitor.on_section_start(section.index);
        }
    }

    fn end_section(&mut self, section: &Section) {
        self.close_list();
        if let Some(visitor) = self.visitor.as_mut() {
            visitor.on_section_end(section.index);
        }
    }

    fn start_paragraph(&mut self, paragraph: &Paragraph) -> Visit {
        if paragraph.is_empty() {
            return Visit::Skip;
        }

        if let Some(list) = &paragraph.style.list_info {
            if !self.visit(|v| v.visit_list_item(paragraph, list.level, list.is_ordered())) {
                return Visit::Skip;
            }
            if self.options.collect_stats {
                self.stats.record(Counted::ListItem);
            }
            self.in_list = true;
            let marker = list_marker(list, self.options.list_marker);
            self.output
                .push_str(&format!("{}{} ", "  ".repeat(list.level as usize), marker));
            return Visit::Children;
        }

        self.close_list();

        if let Some(level) = paragraph.heading_level() {
            let text = paragraph.plain_text();
            if !self.visit(|v| v.visit_heading(text.trim(), level)) {
                return Visit::Skip;
            }
            if self.options.collect_stats {
                self.stats.record(Counted::Heading);
            }
            let level = level.clamp(1, self.options.max_heading_level.clamp(1, 6));
            self.output.push_str(&"#".repeat(level as usize));
            self.output.push(' ');
            return Visit::Children;
        }

        if !self.visit(|v| v.visit_paragraph(paragraph)) {
            return Visit::Skip;
        }
        if self.options.collect_stats {
            self.stats.record(Counted::Paragraph);
        }
        Visit::Children
    }

    fn run(&mut self, run: &Run) {
        let line_break = if self.options.preserve_line_breaks {
            "  \n"
        } else {
            " "
        };
        let text = styled_run(run, self.options.escape_special_chars, line_break);
        self.output.push_str(&text);
    }

    fn end_paragraph(&mut self, paragraph: &Paragraph) {
        if paragraph.is_list_item() {
            self.output.push('\n');
        } else {
            self.output.push_str("\n\n");
        }
    }

    fn table(&mut self, doc: &Document, table: &Table) {
        self.close_list();

        let rows = table_rows(doc, table);
        if !self.visit(|v| v.visit_table(table, &rows)) {
            return;
        }

        self.write_table(doc, table);
        while let Some((number, nested)) = self.nested.queue.pop_front() {
            self.output.push_str(&format!("Table {}:\n\n", number));
            self.write_table(doc, &nested);
        }
    }

    fn image(&mut self, doc: &Document, image: &Image) {
        self.close_list();
        let alt = image.alt_text.as_deref();
        if !self.visit(|v| v.visit_image(&image.resource_id, alt)) {
            return;
        }
        if self.options.collect_stats {
            self.stats.record(Counted::Image);
        }
        let markdown = image_markdown(doc, image, &self.options);
        self.output.push_str(&markdown);
        self.output.push_str("\n\n");
    }
}

/// How a table is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableMode {
    Pipe,
    Html,
    Ascii,
}

/// How cell content is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellMode {
    Markdown,
    Html,
    Plain,
}

/// Nested tables waiting to be written after their top-level table.
#[derive(Default)]
struct NestedTables {
    count: usize,
    queue: VecDeque<(usize, Table)>,
}

impl NestedTables {
    fn push(&mut self, table: &Table) -> usize {
        self.count += 1;
        self.queue.push_back((self.count, table.clone()));
        self.count
    }
}

/// Collects the inline content of one table cell.
struct CellWriter<'r> {
    options: &'r RenderOptions,
    nested: &'r mut NestedTables,
    mode: CellMode,
    parts: Vec<String>,
    current: String,
}

impl Emitter for CellWriter<'_> {
    fn start_paragraph(&mut self, paragraph: &Paragraph) -> Visit {
        if paragraph.is_empty() {
            Visit::Skip
        } else {
            Visit::Children
        }
    }

    fn run(&mut self, run: &Run) {
        let text = match self.mode {
            CellMode::Markdown => {
                let escape = self.options.escape_special_chars;
                let text = styled_run(run, escape, " ");
                if escape {
                    text
                } else {
                    text.replace('|', "\\|")
                }
            }
            CellMode::Html => html_escape::encode_text(&run.text).replace('\n', "<br>"),
            CellMode::Plain => run.text.clone(),
        };
        self.current.push_str(&text);
    }

    fn end_paragraph(&mut self, _paragraph: &Paragraph) {
        let text = std::mem::take(&mut self.current);
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            self.parts.push(text);
        }
    }

    fn table(&mut self, _doc: &Document, table: &Table) {
        let number = self.nested.push(table);
        self.parts.push(format!("[Table {}]", number));
    }

    fn image(&mut self, doc: &Document, image: &Image) {
        let text = match self.mode {
            CellMode::Markdown => image_markdown(doc, image, self.options),
            CellMode::Html => format!(
                "<img src=\"{}\" alt=\"{}\">",
                html_escape::encode_double_quoted_attribute(&image_source(
                    doc,
                    image,
                    self.options
                )),
                html_escape::encode_double_quoted_attribute(
                    image.alt_text.as_deref().unwrap_or("")
                )
            ),
            CellMode::Plain => match image.alt_text.as_deref() {
                Some(alt) if !alt.trim().is_empty() => format!("[Image: {}]", alt.trim()),
                _ => "[Image]".to_string(),
            },
        };
        self.parts.push(text);
    }
}

/// Marker for a list item: the configured bullet or `N.`.
fn list_marker(list: &ListInfo, bullet: char) -> String {
    if list.is_ordered() {
        format!("{}.", list.item_number.unwrap_or(1))
    } else {
        bullet.to_string()
    }
}

/// Escape a run and wrap it in emphasis markers, keeping leading and
/// trailing whitespace outside the markers.
fn styled_run(run: &Run, escape: bool, line_break: &str) -> String {
    let text = if escape {
        escape_markdown(&run.text)
    } else {
        run.text.clone()
    };
    let text = text.replace('\n', line_break);

    let style = &run.style;
    if !style.has_styling() {
        return text;
    }

    let core = text.trim();
    if core.is_empty() {
        return text;
    }
    let start = text.len() - text.trim_start().len();
    let end = start + core.len();

    let mut result = core.to_string();
    if style.strikethrough {
        result = format!("~~{}~~", result);
    }
    if style.italic {
        result = format!("*{}*", result);
    }
    if style.bold {
        result = format!("**{}**", result);
    }
    if style.superscript {
        result = format!("<sup>{}</sup>", result);
    }
    if style.subscript {
        result = format!("<sub>{}</sub>", result);
    }
    if style.underline {
        result = format!("<u>{}</u>", result);
    }

    format!("{}{}{}", &text[..start], result, &text[end..])
}

/// Link target for an image: a data URI or the prefixed output filename.
pub(crate) fn image_source(doc: &Document, image: &Image, options: &RenderOptions) -> String {
    match doc.get_resource(&image.resource_id) {
        Some(resource) if options.embed_images => resource.data_uri(),
        Some(resource) => format!(
            "{}{}",
            options.image_path_prefix,
            resource.suggested_filename(&image.resource_id)
        ),
        None => format!("{}{}", options.image_path_prefix, image.resource_id),
    }
}

fn image_markdown(doc: &Document, image: &Image, options: &RenderOptions) -> String {
    let alt = image
        .alt_text
        .as_deref()
        .map(|alt| alt.replace(['[', ']'], ""))
        .unwrap_or_default();
    format!("![{}]({})", alt, image_source(doc, image, options))
}

/// Escape special Markdown characters.
/// Only characters that could be misinterpreted as Markdown syntax are
/// escaped, which keeps extracted text readable.
pub(crate) fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

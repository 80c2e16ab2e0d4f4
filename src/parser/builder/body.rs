//! Body sections: paragraphs, runs, tables, pictures and text boxes.

use super::header::HeaderInfo;
use super::mapping::{classify, prop_u32, NodeKind};
use crate::container::{inflate, Container};
use crate::model::{
    char_shape_id, named_style_id, Block, BlockId, Document, Image, Paragraph, Resource,
    ResourceType, Run, Section, Table, TableCell, DEFAULT_STYLE_ID,
};
use crate::parser::record::OBJECT_MARKER;
use crate::parser::tree::{SourceTree, TreeNode};

/// HWPUNIT per point (7200 per inch, 72 points per inch).
const HWPUNIT_PER_POINT: f32 = 100.0;

/// Deepest object nesting built as structure. Deeper objects keep their text.
pub(crate) const MAX_NESTING: usize = 64;

/// Paragraph references the resolver turns into layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParagraphRef {
    pub block: BlockId,
    pub para_shape: Option<u32>,
    pub style: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Refs {
    para_shape: Option<u32>,
    style: Option<u32>,
}

/// Walks section trees and fills the document arena.
pub(crate) struct BodyBuilder<'a> {
    header: &'a HeaderInfo,
    container: &'a Container,
    load_assets: bool,
    document: Document,
    paragraphs: Vec<ParagraphRef>,
    depth: usize,
}

impl<'a> BodyBuilder<'a> {
    pub(crate) fn new(header: &'a HeaderInfo, container: &'a Container, load_assets: bool) -> Self {
        Self {
            header,
            container,
            load_assets,
            document: Document::new(),
            paragraphs: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn finish(self) -> (Document, Vec<ParagraphRef>) {
        (self.document, self.paragraphs)
    }

    /// Append one section.
    pub(crate) fn section<T: SourceTree>(&mut self, index: usize, tree: &T) {
        let mut blocks = Vec::new();
        for root in tree.roots() {
            self.section_node(root, &mut blocks);
        }
        log::debug!("{}: {} top-level block(s)", tree.part(), blocks.len());
        self.document.sections.push(Section { index, blocks });
    }

    fn section_node<N: TreeNode>(&mut self, node: &N, out: &mut Vec<BlockId>) {
        match classify(node) {
            NodeKind::Section => {
                for child in node.children() {
                    self.section_node(child, out);
                }
            }
            NodeKind::Paragraph => self.paragraph(node, out),
            NodeKind::Unknown => log::trace!("skipping unknown node {:?}", node.label()),
            _ => {}
        }
    }

    fn paragraph<N: TreeNode>(&mut self, node: &N, out: &mut Vec<BlockId>) {
        let refs = Refs {
            para_shape: node.attr_u32("paraPrIDRef"),
            style: node.attr_u32("styleIDRef"),
        };
        let mut current = Paragraph::new();

        match node
            .children()
            .iter()
            .find(|c| classify(*c) == NodeKind::ParaText)
        {
            Some(text) => self.record_content(node, text, refs, &mut current, out),
            None => {
                for child in node.children() {
                    match classify(child) {
                        NodeKind::Run => self.run(child, refs, &mut current, out),
                        NodeKind::Unknown => {
                            log::trace!("skipping unknown paragraph child {:?}", child.label())
                        }
                        _ => {}
                    }
                }
            }
        }
        self.flush(&mut current, refs, out);
    }

    /// Style a run falls back to when it names no char shape.
    fn paragraph_style_id(&self, refs: Refs) -> String {
        match refs.style {
            Some(style) if self.header.named_styles.contains_key(&style) => named_style_id(style),
            _ => DEFAULT_STYLE_ID.to_string(),
        }
    }

    /// Element path: `<run charPrIDRef><t>..</t><tbl/>..</run>`.
    fn run<N: TreeNode>(
        &mut self,
        node: &N,
        refs: Refs,
        current: &mut Paragraph,
        out: &mut Vec<BlockId>,
    ) {
        let style_id = node
            .attr_u32("charPrIDRef")
            .map(char_shape_id)
            .unwrap_or_else(|| self.paragraph_style_id(refs));

        for child in node.children() {
            match classify(child) {
                NodeKind::Text => {
                    let mut text = String::new();
                    text_content(child, &mut text);
                    current.push_run(Run::styled(text, style_id.clone()));
                }
                NodeKind::Tab => current.push_run(Run::styled("\t", style_id.clone())),
                NodeKind::LineBreak => current.push_run(Run::styled("\n", style_id.clone())),
                NodeKind::Table | NodeKind::Picture | NodeKind::Shape => {
                    self.flush(current, refs, out);
                    self.object(child, out);
                }
                NodeKind::Unknown => log::trace!("skipping unknown run child {:?}", child.label()),
                _ => {}
            }
        }
    }

    /// Record path: decoded `PARA_TEXT`, a char-shape position table and the
    /// paragraph's controls. Each object marker consumes the next control.
    fn record_content<N: TreeNode>(
        &mut self,
        node: &N,
        text: &N,
        refs: Refs,
        current: &mut Paragraph,
        out: &mut Vec<BlockId>,
    ) {
        let runs = node
            .children()
            .iter()
            .find(|c| classify(*c) == NodeKind::CharShapeRuns)
            .and_then(|c| c.attr("runs"))
            .map(parse_runs)
            .unwrap_or_default();
        let mut controls = node
            .children()
            .iter()
            .filter(|c| classify(*c) == NodeKind::Control);

        let mut style_id = self.paragraph_style_id(refs);
        let mut next_run = 0;
        let mut buffer = String::new();

        for (index, ch) in text.text().unwrap_or_default().chars().enumerate() {
            while next_run < runs.len() && runs[next_run].0 <= index {
                let shape = char_shape_id(runs[next_run].1);
                if shape != style_id {
                    current.push_run(Run::styled(std::mem::take(&mut buffer), style_id));
                    style_id = shape;
                }
                next_run += 1;
            }

            if ch != OBJECT_MARKER {
                buffer.push(ch);
                continue;
            }
            let Some(control) = controls.next() else {
                continue;
            };
            if matches!(control.attr("ctrlId"), Some("tbl " | "gso ")) {
                current.push_run(Run::styled(std::mem::take(&mut buffer), style_id.clone()));
                self.flush(current, refs, out);
                self.object(control, out);
            }
        }
        current.push_run(Run::styled(buffer, style_id));
    }

    /// Close the current paragraph. Paragraphs without visible text are dropped.
    fn flush(&mut self, current: &mut Paragraph, refs: Refs, out: &mut Vec<BlockId>) {
        let paragraph = std::mem::take(current);
        if paragraph.is_empty() {
            return;
        }
        let block = self.document.add_block(Block::Paragraph(paragraph));
        self.paragraphs.push(ParagraphRef {
            block,
            para_shape: refs.para_shape,
            style: refs.style,
        });
        out.push(block);
    }

    /// Inline object: table, picture or drawing object.
    fn object<N: TreeNode>(&mut self, node: &N, out: &mut Vec<BlockId>) {
        if self.depth >= MAX_NESTING {
            log::warn!("objects nest deeper than {MAX_NESTING} levels, keeping text only");
            let mut text = String::new();
            flat_text(node, &mut text);
            let mut paragraph = Paragraph::new();
            paragraph.push_run(Run::styled(text, DEFAULT_STYLE_ID));
            let refs = Refs {
                para_shape: None,
                style: None,
            };
            self.flush(&mut paragraph, refs, out);
            return;
        }

        self.depth += 1;
        self.nested_object(node, out);
        self.depth -= 1;
    }

    fn nested_object<N: TreeNode>(&mut self, node: &N, out: &mut Vec<BlockId>) {
        match classify(node) {
            NodeKind::Table => out.push(self.table(node)),
            NodeKind::Picture => out.extend(self.picture(node)),
            NodeKind::Shape => self.text_box(node, out),
            NodeKind::Control => match node.attr("ctrlId") {
                Some("tbl ") => out.push(self.table(node)),
                Some("gso ") => {
                    if node.find_descendant(&is_image::<N>).is_some() {
                        out.extend(self.picture(node));
                    } else {
                        self.text_box(node, out);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn table<N: TreeNode>(&mut self, node: &N) -> BlockId {
        let props = if node.attr("rowCnt").is_some() {
            Some(node)
        } else {
            node.children()
                .iter()
                .find(|c| classify(*c) == NodeKind::TableProps)
        };
        let declared_rows = props.and_then(|p| p.attr_u32("rowCnt")).unwrap_or(0);
        let declared_cols = props.and_then(|p| p.attr_u32("colCnt")).unwrap_or(0);

        let mut table = Table::default();
        let mut seen_props = node.attr("rowCnt").is_some();
        let mut row_index = 0;
        let mut next_col = 0;

        for child in node.children() {
            match classify(child) {
                NodeKind::TableProps => seen_props = true,
                NodeKind::Caption => table.caption = caption_text(child),
                NodeKind::SubList if !seen_props => table.caption = caption_text(child),
                NodeKind::SubList | NodeKind::Cell => {
                    let cell = self.cell(child, 0, &mut next_col);
                    table.add_cell(cell);
                }
                NodeKind::Row => {
                    let mut col = 0;
                    for cell in child.children() {
                        if classify(cell) == NodeKind::Cell {
                            let cell = self.cell(cell, row_index, &mut col);
                            table.add_cell(cell);
                        }
                    }
                    row_index += 1;
                }
                _ => {}
            }
        }

        (table.rows, table.cols) = if table.is_empty() {
            (declared_rows, declared_cols)
        } else {
            table.extent()
        };
        if (table.rows, table.cols) != (declared_rows, declared_cols) {
            log::debug!(
                "table declares {declared_rows}x{declared_cols}, cells reach {}x{}",
                table.rows,
                table.cols
            );
        }

        self.document.add_block(Block::Table(table))
    }

    fn cell<N: TreeNode>(&mut self, node: &N, fallback_row: u32, next_col: &mut u32) -> TableCell {
        let row = prop_u32(node, "cellAddr", "rowAddr", "rowAddr").unwrap_or(fallback_row);
        let col = prop_u32(node, "cellAddr", "colAddr", "colAddr").unwrap_or(*next_col);
        let row_span = prop_u32(node, "cellSpan", "rowSpan", "rowSpan").unwrap_or(1);
        let col_span = prop_u32(node, "cellSpan", "colSpan", "colSpan").unwrap_or(1);
        let mut cell = TableCell::new(row, col).span(row_span, col_span);
        *next_col = col.saturating_add(cell.col_span);

        self.list(node, &mut cell.blocks);
        cell
    }

    /// Paragraphs of a list (cell, text box), following nested sub-lists.
    fn list<N: TreeNode>(&mut self, node: &N, out: &mut Vec<BlockId>) {
        for child in node.children() {
            match classify(child) {
                NodeKind::Paragraph => self.paragraph(child, out),
                NodeKind::SubList => self.list(child, out),
                _ => {}
            }
        }
    }

    fn picture<N: TreeNode>(&mut self, node: &N) -> Option<BlockId> {
        let image = node.find_descendant(&is_image::<N>)?;
        let Some(item) = image.attr("binaryItemIDRef") else {
            log::warn!("picture without a binary item reference");
            return None;
        };
        let resource_id = self.resource(item);

        let mut block = Image::new(resource_id);
        if let Some((width, height)) = object_size(node) {
            block = block.with_size(width, height);
        }
        block.alt_text = node.child("shapeComment").and_then(|c| {
            let mut text = String::new();
            c.collect_text(&mut text);
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        });
        Some(self.document.add_block(Block::Image(block)))
    }

    /// Drawing object: pictures it groups and paragraphs of its text box.
    fn text_box<N: TreeNode>(&mut self, node: &N, out: &mut Vec<BlockId>) {
        for child in node.children() {
            match classify(child) {
                NodeKind::SubList => self.list(child, out),
                NodeKind::Picture => out.extend(self.picture(child)),
                NodeKind::Paragraph | NodeKind::Table => {}
                _ => self.text_box(child, out),
            }
        }
    }

    /// Resolve a picture's binary item to a resource key, loading the
    /// resource on first use.
    fn resource(&mut self, item: &str) -> String {
        let (key, compressed) = match self.header.bin_items.get(item) {
            Some(bin) => (bin.asset_key.clone(), bin.compressed),
            None => (item.to_string(), None),
        };
        if self.document.resources.contains_key(&key) {
            return key;
        }

        let Some(asset) = self.container.asset(&key) else {
            if self.load_assets {
                log::warn!("image references missing binary item {key}");
            }
            return key;
        };

        let data = if compressed.unwrap_or(asset.compressed) {
            match inflate(&asset.path, &asset.data) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("{e}; keeping stored bytes");
                    asset.data.clone()
                }
            }
        } else {
            asset.data.clone()
        };

        let mut resource = Resource::from_bytes(data, Some(&asset.path));
        if resource.resource_type == ResourceType::Other {
            if let Some(media_type) = &asset.media_type {
                resource.mime_type = media_type.clone();
                if media_type.starts_with("image/") {
                    resource.resource_type = ResourceType::Image;
                }
            }
        }
        self.document.add_resource(key.clone(), resource);
        key
    }
}

fn is_image<N: TreeNode>(node: &N) -> bool {
    classify(node) == NodeKind::Image
}

/// Character data of a `<t>` element with its inline markers.
fn text_content<N: TreeNode>(node: &N, out: &mut String) {
    for child in node.children() {
        match classify(child) {
            NodeKind::Chars => out.push_str(child.text().unwrap_or_default()),
            NodeKind::Tab => out.push('\t'),
            NodeKind::LineBreak => out.push('\n'),
            NodeKind::Space => out.push(' '),
            _ => {}
        }
    }
}

/// Character data under `node`, one space between text nodes.
fn flat_text<N: TreeNode>(node: &N, out: &mut String) {
    if let Some(text) = node.text() {
        let text: String = text
            .chars()
            .filter(|&c| c != OBJECT_MARKER && !c.is_control())
            .collect();
        let text = text.trim();
        if !text.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
    }
    for child in node.children() {
        flat_text(child, out);
    }
}

/// Plain caption text, `None` when blank.
fn caption_text<N: TreeNode>(node: &N) -> Option<String> {
    let mut raw = String::new();
    node.collect_text(&mut raw);
    let text: String = raw
        .chars()
        .filter(|&c| c != OBJECT_MARKER && !c.is_control())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Object size in points: flat `width`/`height`, else `<sz>` or `<curSz>`.
fn object_size<N: TreeNode>(node: &N) -> Option<(f32, f32)> {
    let from = |n: &N| Some((n.attr_u32("width")?, n.attr_u32("height")?));
    from(node)
        .or_else(|| node.child("sz").and_then(from))
        .or_else(|| node.child("curSz").and_then(from))
        .filter(|(w, h)| *w > 0 && *h > 0)
        .map(|(w, h)| (w as f32 / HWPUNIT_PER_POINT, h as f32 / HWPUNIT_PER_POINT))
}

/// Parse `"index:shape,index:shape"`.
fn parse_runs(value: &str) -> Vec<(usize, u32)> {
    value
        .split(',')
        .filter_map(|pair| {
            let (index, shape) = pair.split_once(':')?;
            Some((index.trim().parse().ok()?, shape.trim().parse().ok()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runs() {
        assert_eq!(parse_runs("0:3,12:7"), vec![(0, 3), (12, 7)]);
        assert_eq!(parse_runs(""), vec![]);
        assert_eq!(parse_runs("x:1,2:2"), vec![(2, 2)]);
    }
}

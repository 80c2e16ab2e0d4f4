//! Binary record decoder for HWP 5 streams.
//!
//! A stream is a flat sequence of records. Each record starts with a packed
//! little-endian header:
//!
//! ```text
//! bits  0..10  tag id
//! bits 10..20  level (nesting depth)
//! bits 20..32  payload size; 0xFFF means a u32 size follows
//! ```
//!
//! Records are nested by level, list headers adopt the paragraphs that make
//! up their list, and the payloads of known tags are decoded into attributes
//! named after the OWPML vocabulary so that the model builder can treat both
//! source formats alike. Unknown tags keep their raw payload.

use super::tree::{Attributes, Label, SourceTree, TreeNode};
use crate::container::{le_u16, le_u32};
use crate::error::{Error, Result};

/// Record tag ids.
pub mod tags {
    const BEGIN: u16 = 0x010;

    pub const DOCUMENT_PROPERTIES: u16 = BEGIN;
    pub const ID_MAPPINGS: u16 = BEGIN + 1;
    pub const BIN_DATA: u16 = BEGIN + 2;
    pub const FACE_NAME: u16 = BEGIN + 3;
    pub const BORDER_FILL: u16 = BEGIN + 4;
    pub const CHAR_SHAPE: u16 = BEGIN + 5;
    pub const TAB_DEF: u16 = BEGIN + 6;
    pub const NUMBERING: u16 = BEGIN + 7;
    pub const BULLET: u16 = BEGIN + 8;
    pub const PARA_SHAPE: u16 = BEGIN + 9;
    pub const STYLE: u16 = BEGIN + 10;

    pub const PARA_HEADER: u16 = BEGIN + 50;
    pub const PARA_TEXT: u16 = BEGIN + 51;
    pub const PARA_CHAR_SHAPE: u16 = BEGIN + 52;
    pub const PARA_LINE_SEG: u16 = BEGIN + 53;
    pub const PARA_RANGE_TAG: u16 = BEGIN + 54;
    pub const CTRL_HEADER: u16 = BEGIN + 55;
    pub const LIST_HEADER: u16 = BEGIN + 56;
    pub const PAGE_DEF: u16 = BEGIN + 57;
    pub const FOOTNOTE_SHAPE: u16 = BEGIN + 58;
    pub const PAGE_BORDER_FILL: u16 = BEGIN + 59;
    pub const SHAPE_COMPONENT: u16 = BEGIN + 60;
    pub const TABLE: u16 = BEGIN + 61;
    pub const SHAPE_COMPONENT_LINE: u16 = BEGIN + 62;
    pub const SHAPE_COMPONENT_RECTANGLE: u16 = BEGIN + 63;
    pub const SHAPE_COMPONENT_ELLIPSE: u16 = BEGIN + 64;
    pub const SHAPE_COMPONENT_ARC: u16 = BEGIN + 65;
    pub const SHAPE_COMPONENT_POLYGON: u16 = BEGIN + 66;
    pub const SHAPE_COMPONENT_CURVE: u16 = BEGIN + 67;
    pub const SHAPE_COMPONENT_OLE: u16 = BEGIN + 68;
    pub const SHAPE_COMPONENT_PICTURE: u16 = BEGIN + 69;
    pub const SHAPE_COMPONENT_CONTAINER: u16 = BEGIN + 70;
    pub const CTRL_DATA: u16 = BEGIN + 71;
    pub const EQEDIT: u16 = BEGIN + 72;
}

use tags::*;

/// Replacement for an extended control (table, drawing object, field, ...)
/// inside decoded paragraph text. The n-th marker corresponds to the n-th
/// `CTRL_HEADER` child of the paragraph.
pub const OBJECT_MARKER: char = '\u{FFFC}';

const EXTENDED_SIZE: u32 = 0xFFF;
/// Width, in UTF-16 units, of inline and extended controls in `PARA_TEXT`.
const CONTROL_WIDTH: usize = 8;

const FACE_LANGUAGES: [&str; 7] = [
    "HANGUL", "LATIN", "HANJA", "JAPANESE", "OTHER", "SYMBOL", "USER",
];

/// A decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub tag: u16,
    pub level: u16,
    /// Byte offset of the record header within its part.
    pub offset: usize,
    pub attributes: Attributes,
    /// Decoded text (`PARA_TEXT` only).
    pub text: Option<String>,
    /// Raw payload, kept for every record.
    pub payload: Vec<u8>,
    pub children: Vec<Record>,
}

impl Record {
    fn new(tag: u16, level: u16, offset: usize, payload: Vec<u8>) -> Self {
        Self {
            tag,
            level,
            offset,
            attributes: Attributes::new(),
            text: None,
            payload,
            children: Vec::new(),
        }
    }

    /// Number of records in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Record::count).sum::<usize>()
    }
}

impl TreeNode for Record {
    fn label(&self) -> Label<'_> {
        Label::Tag(self.tag)
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Record tree decoded from one stream.
#[derive(Debug, Clone)]
pub struct RecordTree {
    part: String,
    roots: Vec<Record>,
}

impl RecordTree {
    /// Decode a (decompressed) stream.
    pub fn decode(part: &str, data: &[u8]) -> Result<Self> {
        let flat = read_records(part, data)?;
        let count = flat.len();
        let mut roots = nest(flat);
        adopt_list_paragraphs(&mut roots);

        let mut context = DecodeContext::default();
        for root in &mut roots {
            decode_node(part, root, &mut context)?;
        }
        log::debug!("{part}: decoded {count} record(s), {} top-level", roots.len());

        Ok(Self {
            part: part.to_string(),
            roots,
        })
    }

    /// Total number of records.
    pub fn record_count(&self) -> usize {
        self.roots.iter().map(Record::count).sum()
    }
}

impl SourceTree for RecordTree {
    type Node = Record;

    fn part(&self) -> &str {
        &self.part
    }

    fn roots(&self) -> &[Record] {
        &self.roots
    }
}

/// Split a stream into records, validating every declared size.
fn read_records(part: &str, data: &[u8]) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let header = le_u32(data, pos)
            .ok_or_else(|| Error::malformed(part, pos, "record header cut short"))?;
        let tag = (header & 0x3FF) as u16;
        let level = ((header >> 10) & 0x3FF) as u16;
        let mut size = header >> 20;
        let mut body = pos + 4;

        if size == EXTENDED_SIZE {
            size = le_u32(data, body)
                .ok_or_else(|| Error::malformed(part, pos, "extended size cut short"))?;
            body += 4;
        }

        let end = body
            .checked_add(size as usize)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::malformed(
                    part,
                    pos,
                    format!(
                        "tag 0x{tag:03X} declares {size} bytes but {} remain",
                        data.len() - body
                    ),
                )
            })?;

        records.push(Record::new(tag, level, pos, data[body..end].to_vec()));
        pos = end;
    }

    Ok(records)
}

/// Build the level hierarchy: a record becomes a child of the nearest
/// preceding record with a smaller level.
fn nest(flat: Vec<Record>) -> Vec<Record> {
    let mut roots = Vec::new();
    let mut stack: Vec<Record> = Vec::new();

    fn close(stack: &mut Vec<Record>, roots: &mut Vec<Record>) {
        if let Some(done) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.children.push(done),
                None => roots.push(done),
            }
        }
    }

    for record in flat {
        while stack.last().is_some_and(|top| top.level >= record.level) {
            close(&mut stack, &mut roots);
        }
        stack.push(record);
    }
    while !stack.is_empty() {
        close(&mut stack, &mut roots);
    }
    roots
}

/// Move the paragraphs of each list (table cell, text box, caption, ...)
/// under their `LIST_HEADER`. The header declares how many paragraphs the
/// list holds; zero means every consecutive paragraph.
fn adopt_list_paragraphs(records: &mut Vec<Record>) {
    let mut i = 0;
    while i < records.len() {
        if records[i].tag == LIST_HEADER {
            let declared = le_u16(&records[i].payload, 0).unwrap_or(0) as usize;
            let mut end = i + 1;
            while end < records.len()
                && records[end].tag == PARA_HEADER
                && (declared == 0 || end - i <= declared)
            {
                end += 1;
            }
            let adopted: Vec<Record> = records.drain(i + 1..end).collect();
            records[i].children.extend(adopted);
        }
        i += 1;
    }
    for record in records.iter_mut() {
        adopt_list_paragraphs(&mut record.children);
    }
}

/// Ordinal counters for `DocInfo` tables; ids are assigned by position.
#[derive(Default)]
struct DecodeContext {
    face_groups: Option<[u32; 7]>,
    faces: u32,
    bin_items: u32,
    char_shapes: u32,
    para_shapes: u32,
    styles: u32,
}

impl DecodeContext {
    /// Language group and in-group id of the next face name.
    fn next_face(&mut self) -> (&'static str, u32) {
        let index = self.faces;
        self.faces += 1;
        let Some(groups) = self.face_groups else {
            return (FACE_LANGUAGES[0], index);
        };
        let mut start = 0;
        for (lang, count) in FACE_LANGUAGES.iter().zip(groups) {
            if index < start + count {
                return (lang, index - start);
            }
            start += count;
        }
        (FACE_LANGUAGES[FACE_LANGUAGES.len() - 1], index - start)
    }
}

fn next_id(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}

fn decode_node(part: &str, record: &mut Record, context: &mut DecodeContext) -> Result<()> {
    decode_attributes(record, context);
    if record.tag == PARA_HEADER {
        decode_paragraph_text(part, record)?;
    }
    for child in &mut record.children {
        decode_node(part, child, context)?;
    }
    Ok(())
}

/// Sequential little-endian payload reader. Reads past the end yield `None`,
/// so records written by older versions simply decode fewer attributes.
struct Payload<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Payload<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn u8(&mut self) -> Option<u8> {
        let value = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(value)
    }

    fn u16(&mut self) -> Option<u16> {
        let value = le_u16(self.data, self.pos)?;
        self.pos += 2;
        Some(value)
    }

    fn u32(&mut self) -> Option<u32> {
        let value = le_u32(self.data, self.pos)?;
        self.pos += 4;
        Some(value)
    }

    fn i32(&mut self) -> Option<i32> {
        self.u32().map(|v| v as i32)
    }

    /// Length-prefixed UTF-16 string.
    fn wide_string(&mut self) -> Option<String> {
        let len = self.u16()? as usize;
        let bytes = self.data.get(self.pos..self.pos + len * 2)?;
        self.pos += len * 2;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        Some(String::from_utf16_lossy(&units))
    }
}

fn flag(value: u32, bit: u32) -> &'static str {
    if value & (1 << bit) != 0 {
        "1"
    } else {
        "0"
    }
}

/// `COLORREF` (`0x00BBGGRR`) to `#RRGGBB`.
fn color(value: u32) -> String {
    if value == 0xFFFF_FFFF {
        return "none".to_string();
    }
    let [r, g, b, _] = value.to_le_bytes();
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Four-character control id, e.g. `tbl ` or `gso `.
fn control_id(value: u32) -> String {
    value.to_be_bytes().iter().map(|&b| b as char).collect()
}

fn decode_attributes(record: &mut Record, context: &mut DecodeContext) {
    let payload = std::mem::take(&mut record.payload);
    let attrs = &mut record.attributes;
    let mut p = Payload::new(&payload);

    match record.tag {
        DOCUMENT_PROPERTIES => {
            if let Some(sections) = p.u16() {
                attrs.insert("secCnt", sections);
            }
        }
        ID_MAPPINGS => {
            let mut groups = [0u32; 7];
            // Slot 0 counts binary items; the seven font groups follow.
            let _ = p.i32();
            for slot in groups.iter_mut() {
                *slot = p.i32().unwrap_or(0).max(0) as u32;
            }
            context.face_groups = Some(groups);
        }
        BIN_DATA => decode_bin_data(&mut p, attrs, next_id(&mut context.bin_items) + 1),
        FACE_NAME => {
            let (lang, id) = context.next_face();
            attrs.insert("lang", lang);
            attrs.insert("id", id);
            let _properties = p.u8();
            if let Some(face) = p.wide_string() {
                attrs.insert("face", face);
            }
        }
        CHAR_SHAPE => {
            attrs.insert("id", next_id(&mut context.char_shapes));
            decode_char_shape(&payload, attrs);
        }
        PARA_SHAPE => {
            attrs.insert("id", next_id(&mut context.para_shapes));
            decode_para_shape(&payload, attrs);
        }
        STYLE => {
            attrs.insert("id", next_id(&mut context.styles));
            decode_style(&mut p, attrs);
        }
        PARA_HEADER => {
            if let Some(chars) = p.u32() {
                attrs.insert("charCount", chars & 0x7FFF_FFFF);
            }
            let _control_mask = p.u32();
            if let Some(shape) = p.u16() {
                attrs.insert("paraPrIDRef", shape);
            }
            if let Some(style) = p.u8() {
                attrs.insert("styleIDRef", style);
            }
        }
        CTRL_HEADER => {
            if let Some(id) = p.u32() {
                let id = control_id(id);
                if matches!(id.as_str(), "tbl " | "gso " | "eqed") {
                    let mut object = Payload::at(&payload, 16);
                    if let (Some(width), Some(height)) = (object.u32(), object.u32()) {
                        attrs.insert("width", width);
                        attrs.insert("height", height);
                    }
                }
                attrs.insert("ctrlId", id);
            }
        }
        TABLE => {
            let _properties = p.u32();
            if let (Some(rows), Some(cols)) = (p.u16(), p.u16()) {
                attrs.insert("rowCnt", rows);
                attrs.insert("colCnt", cols);
            }
        }
        LIST_HEADER => {
            if let Some(count) = p.u16() {
                attrs.insert("paraCount", count);
            }
            let mut cell = Payload::at(&payload, 8);
            if let (Some(col), Some(row), Some(col_span), Some(row_span)) =
                (cell.u16(), cell.u16(), cell.u16(), cell.u16())
            {
                attrs.insert("colAddr", col);
                attrs.insert("rowAddr", row);
                attrs.insert("colSpan", col_span);
                attrs.insert("rowSpan", row_span);
            }
            if let (Some(width), Some(height)) = (cell.u32(), cell.u32()) {
                attrs.insert("width", width);
                attrs.insert("height", height);
            }
        }
        SHAPE_COMPONENT_PICTURE => {
            if let Some(item) = Payload::at(&payload, 71).u16() {
                attrs.insert("binaryItemIDRef", item);
            }
        }
        _ => {}
    }

    record.payload = payload;
}

fn decode_bin_data(p: &mut Payload<'_>, attrs: &mut Attributes, ordinal: u32) {
    attrs.insert("id", ordinal);
    let Some(properties) = p.u16() else {
        return;
    };
    let compress = match (properties >> 4) & 0x3 {
        1 => "COMPRESS",
        2 => "NONE",
        _ => "DEFAULT",
    };
    attrs.insert("compress", compress);

    match properties & 0xF {
        0 => {
            attrs.insert("type", "LINK");
            let _absolute = p.wide_string();
            if let Some(relative) = p.wide_string() {
                attrs.insert("href", relative);
            }
        }
        kind => {
            let storage = kind == 2;
            attrs.insert("type", if storage { "STORAGE" } else { "EMBEDDING" });
            if let Some(stream_id) = p.u16() {
                let format = if storage {
                    "OLE".to_string()
                } else {
                    p.wide_string().unwrap_or_default()
                };
                attrs.insert("binaryItemId", stream_id);
                attrs.insert("href", format!("BinData/BIN{stream_id:04X}.{format}"));
                attrs.insert("format", format.to_ascii_lowercase());
            }
        }
    }
}

fn decode_char_shape(payload: &[u8], attrs: &mut Attributes) {
    if let Some(hangul_face) = le_u16(payload, 0) {
        attrs.insert("fontRef", hangul_face);
    }
    let mut p = Payload::at(payload, 42);
    let (Some(height), Some(properties)) = (p.i32(), p.u32()) else {
        return;
    };
    attrs.insert("height", height);
    attrs.insert("italic", flag(properties, 0));
    attrs.insert("bold", flag(properties, 1));
    let underline = match (properties >> 2) & 0x3 {
        0 => "NONE",
        3 => "TOP",
        _ => "BOTTOM",
    };
    attrs.insert("underline", underline);
    let strike = if (properties >> 18) & 0x7 != 0 {
        "SOLID"
    } else {
        "NONE"
    };
    attrs.insert("strikeout", strike);
    attrs.insert("supscript", flag(properties, 15));
    attrs.insert("subscript", flag(properties, 16));

    let mut colors = Payload::at(payload, 52);
    if let Some(text) = colors.u32() {
        attrs.insert("textColor", color(text));
    }
    let _underline_color = colors.u32();
    if let Some(shade) = colors.u32() {
        attrs.insert("shadeColor", color(shade));
    }
}

fn decode_para_shape(payload: &[u8], attrs: &mut Attributes) {
    let Some(properties) = le_u32(payload, 0) else {
        return;
    };
    let align = match (properties >> 2) & 0x7 {
        1 => "LEFT",
        2 => "RIGHT",
        3 => "CENTER",
        4 => "DISTRIBUTE",
        5 => "DISTRIBUTE_SPACE",
        _ => "JUSTIFY",
    };
    attrs.insert("align", align);
    let heading = match (properties >> 23) & 0x3 {
        1 => "OUTLINE",
        2 => "NUMBER",
        3 => "BULLET",
        _ => "NONE",
    };
    attrs.insert("headingType", heading);
    attrs.insert("level", (properties >> 25) & 0x7);
    if let Some(numbering) = le_u16(payload, 30) {
        attrs.insert("headingIdRef", numbering);
    }
}

fn decode_style(p: &mut Payload<'_>, attrs: &mut Attributes) {
    if let Some(name) = p.wide_string() {
        attrs.insert("name", name);
    }
    if let Some(english) = p.wide_string() {
        attrs.insert("engName", english);
    }
    let Some(properties) = p.u8() else {
        return;
    };
    attrs.insert("type", if properties & 0x7 == 1 { "CHAR" } else { "PARA" });
    if let Some(next) = p.u8() {
        attrs.insert("nextStyleIDRef", next);
    }
    let _lang = p.u16();
    if let (Some(para), Some(chars)) = (p.u16(), p.u16()) {
        attrs.insert("paraPrIDRef", para);
        attrs.insert("charPrIDRef", chars);
    }
}

/// Decode the paragraph's `PARA_TEXT` child and rewrite the positions of
/// its `PARA_CHAR_SHAPE` child into character indices of the decoded text.
fn decode_paragraph_text(part: &str, paragraph: &mut Record) -> Result<()> {
    let mut positions = Vec::new();
    if let Some(text) = paragraph.children.iter_mut().find(|c| c.tag == PARA_TEXT) {
        let (decoded, raw_positions) = decode_text(part, text.offset, &text.payload)?;
        text.text = Some(decoded);
        positions = raw_positions;
    }

    if let Some(shapes) = paragraph
        .children
        .iter_mut()
        .find(|c| c.tag == PARA_CHAR_SHAPE)
    {
        let runs: Vec<String> = shapes
            .payload
            .chunks_exact(8)
            .map(|pair| {
                let raw = u32::from_le_bytes([pair[0], pair[1], pair[2], pair[3]]);
                let shape = u32::from_le_bytes([pair[4], pair[5], pair[6], pair[7]]);
                let index = positions.partition_point(|&p| p < raw);
                format!("{index}:{shape}")
            })
            .collect();
        shapes.attributes.insert("runs", runs.join(","));
    }
    Ok(())
}

/// Extended controls own a `CTRL_HEADER`.
fn is_extended_control(unit: u16) -> bool {
    matches!(unit, 1..=3 | 11 | 12 | 14..=18 | 21..=23)
}

/// Inline controls carry data but no `CTRL_HEADER`.
fn is_inline_control(unit: u16) -> bool {
    matches!(unit, 4..=8 | 19 | 20)
}

/// Decode `PARA_TEXT` into a string plus the raw UTF-16 position of every
/// emitted character.
fn decode_text(part: &str, offset: usize, payload: &[u8]) -> Result<(String, Vec<u32>)> {
    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();

    let mut text = String::with_capacity(units.len());
    let mut positions = Vec::with_capacity(units.len());
    let mut i = 0;

    let mut emit = |c: char, at: usize, text: &mut String| {
        text.push(c);
        positions.push(at as u32);
    };

    while i < units.len() {
        let unit = units[i];
        let width = if unit == 9 || is_extended_control(unit) || is_inline_control(unit) {
            if i + CONTROL_WIDTH > units.len() {
                return Err(Error::malformed(
                    part,
                    offset,
                    format!("control 0x{unit:02X} at unit {i} cut short"),
                ));
            }
            CONTROL_WIDTH
        } else {
            1
        };

        match unit {
            9 => emit('\t', i, &mut text),
            10 => emit('\n', i, &mut text),
            13 => {}
            24 => emit('-', i, &mut text),
            30 | 31 => emit(' ', i, &mut text),
            u if is_extended_control(u) => emit(OBJECT_MARKER, i, &mut text),
            u if u < 0x20 => {}
            0xD800..=0xDBFF => {
                let low = units.get(i + 1).copied().filter(|u| (0xDC00..=0xDFFF).contains(u));
                if let Some(low) = low {
                    let code = 0x10000 + (((unit as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
                    emit(char::from_u32(code).unwrap_or('\u{FFFD}'), i, &mut text);
                    i += 2;
                    continue;
                }
                emit('\u{FFFD}', i, &mut text);
            }
            u => emit(char::from_u32(u as u32).unwrap_or('\u{FFFD}'), i, &mut text),
        }
        i += width;
    }

    Ok((text, positions))
}

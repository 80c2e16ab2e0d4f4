//! Builders for small synthetic HWPX packages and HWP 5 compound files.
//!
//! Shared by the unit tests, the integration tests (through
//! `tests/common/mod.rs`) and the benchmarks, so it only depends on
//! third-party crates and never on `crate::` items.

#![allow(dead_code)]

use std::io::{Cursor, Write};

const NS_HEAD: &str = "http://www.hancom.co.kr/hwpml/2011/head";
const NS_SECTION: &str = "http://www.hancom.co.kr/hwpml/2011/section";
const NS_PARAGRAPH: &str = "http://www.hancom.co.kr/hwpml/2011/paragraph";
const NS_CORE: &str = "http://www.hancom.co.kr/hwpml/2011/core";

/// Char shape ids declared by the fixture header.
pub const PLAIN: u32 = 0;
pub const BOLD: u32 = 1;
pub const ITALIC: u32 = 2;

/// Para shape ids declared by the fixture header.
const PARA_BODY: u32 = 0;
const PARA_OUTLINE: u32 = 1;
const PARA_BULLET: u32 = 4;
const PARA_NUMBER: u32 = 5;

const HWPX_HEADER: &str = r##"<hh:fontfaces>
  <hh:fontface lang="HANGUL"><hh:font id="0" face="함초롬바탕"/></hh:fontface>
</hh:fontfaces>
<hh:charProperties>
  <hh:charPr id="0" height="1000" textColor="#000000" shadeColor="none"><hh:fontRef hangul="0"/></hh:charPr>
  <hh:charPr id="1" height="1000" textColor="#000000" shadeColor="none"><hh:fontRef hangul="0"/><hh:bold/></hh:charPr>
  <hh:charPr id="2" height="1000" textColor="#000000" shadeColor="none"><hh:fontRef hangul="0"/><hh:italic/></hh:charPr>
</hh:charProperties>
<hh:paraProperties>
  <hh:paraPr id="0"><hh:align horizontal="LEFT"/></hh:paraPr>
  <hh:paraPr id="1"><hh:align horizontal="LEFT"/><hh:heading type="OUTLINE" level="0"/></hh:paraPr>
  <hh:paraPr id="2"><hh:align horizontal="LEFT"/><hh:heading type="OUTLINE" level="1"/></hh:paraPr>
  <hh:paraPr id="3"><hh:align horizontal="LEFT"/><hh:heading type="OUTLINE" level="2"/></hh:paraPr>
  <hh:paraPr id="4"><hh:align horizontal="LEFT"/><hh:heading type="BULLET" level="0"/></hh:paraPr>
  <hh:paraPr id="5"><hh:align horizontal="LEFT"/><hh:heading type="NUMBER" level="0"/></hh:paraPr>
</hh:paraProperties>
<hh:styles>
  <hh:style id="0" type="PARA" name="바탕글" paraPrIDRef="0" charPrIDRef="0"/>
</hh:styles>"##;

/// One body paragraph (or object) of an HWPX section, as section XML.
#[derive(Debug, Clone)]
pub struct HwpxParagraph {
    xml: String,
}

impl HwpxParagraph {
    /// Paragraph with one unformatted run.
    pub fn plain(text: &str) -> Self {
        Self::runs(&[(text, PLAIN)])
    }

    /// Paragraph with one bold run.
    pub fn bold(text: &str) -> Self {
        Self::runs(&[(text, BOLD)])
    }

    /// Body paragraph made of `(text, char shape)` runs.
    pub fn runs(runs: &[(&str, u32)]) -> Self {
        Self::with_shape(PARA_BODY, runs)
    }

    /// Outline heading, `level` 1 to 3.
    pub fn heading(text: &str, level: u32) -> Self {
        Self::with_shape(PARA_OUTLINE + level.clamp(1, 3) - 1, &[(text, PLAIN)])
    }

    /// Bulleted list item.
    pub fn bullet(text: &str) -> Self {
        Self::with_shape(PARA_BULLET, &[(text, PLAIN)])
    }

    /// Numbered list item.
    pub fn numbered(text: &str) -> Self {
        Self::with_shape(PARA_NUMBER, &[(text, PLAIN)])
    }

    /// Table of plain cells, row by row.
    pub fn table(rows: &[&[&str]]) -> Self {
        Self::table_with_caption(rows, None)
    }

    /// Table of plain cells with a caption.
    pub fn table_with_caption(rows: &[&[&str]], caption: Option<&str>) -> Self {
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut xml = format!(
            r#"<hp:p paraPrIDRef="0" styleIDRef="0"><hp:run charPrIDRef="0"><hp:tbl rowCnt="{}" colCnt="{cols}">"#,
            rows.len()
        );
        if let Some(caption) = caption {
            xml.push_str(&format!(
                "<hp:caption><hp:subList>{}</hp:subList></hp:caption>",
                Self::plain(caption).xml
            ));
        }
        for (r, row) in rows.iter().enumerate() {
            xml.push_str("<hp:tr>");
            for (c, text) in row.iter().enumerate() {
                xml.push_str(&format!(
                    r#"<hp:tc><hp:subList>{}</hp:subList><hp:cellAddr colAddr="{c}" rowAddr="{r}"/><hp:cellSpan colSpan="1" rowSpan="1"/></hp:tc>"#,
                    Self::plain(text).xml
                ));
            }
            xml.push_str("</hp:tr>");
        }
        xml.push_str("</hp:tbl></hp:run></hp:p>");
        Self { xml }
    }

    /// Picture referring to a binary item, sized 72x36pt.
    pub fn image(item: &str, alt: Option<&str>) -> Self {
        let comment = alt
            .map(|alt| format!("<hp:shapeComment>{}</hp:shapeComment>", escape(alt)))
            .unwrap_or_default();
        Self {
            xml: format!(
                r#"<hp:p paraPrIDRef="0" styleIDRef="0"><hp:run charPrIDRef="0"><hp:pic><hp:sz width="7200" height="3600"/><hc:img binaryItemIDRef="{item}"/>{comment}</hp:pic></hp:run></hp:p>"#
            ),
        }
    }

    /// Paragraph holding `depth` tables, each inside the only cell of the
    /// one before, with `text` in the innermost cell.
    pub fn nested_tables(depth: usize, text: &str) -> Self {
        let open = r#"<hp:p><hp:run><hp:tbl rowCnt="1" colCnt="1"><hp:tr><hp:tc><hp:subList>"#;
        let close = "</hp:subList></hp:tc></hp:tr></hp:tbl></hp:run></hp:p>";
        let inner = Self::plain(text).xml;
        Self {
            xml: format!("{}{inner}{}", open.repeat(depth), close.repeat(depth)),
        }
    }

    /// Arbitrary section XML using the `hp`/`hc` prefixes.
    pub fn raw(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }

    fn with_shape(para_shape: u32, runs: &[(&str, u32)]) -> Self {
        let mut xml = format!(r#"<hp:p paraPrIDRef="{para_shape}" styleIDRef="0">"#);
        for (text, shape) in runs {
            xml.push_str(&format!(
                r#"<hp:run charPrIDRef="{shape}"><hp:t>{}</hp:t></hp:run>"#,
                escape(text)
            ));
        }
        xml.push_str("</hp:p>");
        Self { xml }
    }
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Builder for an HWPX zip package.
#[derive(Debug, Clone, Default)]
pub struct HwpxPackage {
    title: Option<String>,
    author: Option<String>,
    sections: Vec<Vec<HwpxParagraph>>,
    images: Vec<(String, String, Vec<u8>)>,
    encrypted: bool,
    mimetype: Option<String>,
    major: Option<u32>,
    without_header: bool,
}

impl HwpxPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn section(mut self, paragraphs: Vec<HwpxParagraph>) -> Self {
        self.sections.push(paragraphs);
        self
    }

    /// Embed a binary item stored as `BinData/{id}.{extension}`.
    pub fn image(mut self, id: &str, extension: &str, data: &[u8]) -> Self {
        self.images
            .push((id.to_string(), extension.to_string(), data.to_vec()));
        self
    }

    /// Mark the package as password protected in its manifest.
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Replace the `mimetype` entry.
    pub fn mimetype(mut self, mimetype: &str) -> Self {
        self.mimetype = Some(mimetype.to_string());
        self
    }

    /// Major version written to `version.xml`.
    pub fn major_version(mut self, major: u32) -> Self {
        self.major = Some(major);
        self
    }

    /// Leave out `Contents/header.xml`.
    pub fn without_header(mut self) -> Self {
        self.without_header = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mimetype = self.mimetype.as_deref().unwrap_or("application/hwp+zip");
        let major = self.major.unwrap_or(5);
        let mut files: Vec<(String, Vec<u8>)> = vec![
            ("mimetype".into(), mimetype.as_bytes().to_vec()),
            (
                "version.xml".into(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><hv:HCFVersion xmlns:hv="http://www.hancom.co.kr/hwpml/2011/version" major="{major}" minor="1" micro="1" buildNumber="0"/>"#
                )
                .into_bytes(),
            ),
            ("Contents/content.hpf".into(), self.content_hpf().into_bytes()),
        ];
        if !self.without_header {
            files.push((
                "Contents/header.xml".into(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><hh:head xmlns:hh="{NS_HEAD}"><hh:refList>{HWPX_HEADER}</hh:refList></hh:head>"#
                )
                .into_bytes(),
            ));
        }
        if self.encrypted {
            files.push((
                "META-INF/manifest.xml".into(),
                br#"<manifest><file-entry full-path="Contents/section0.xml"><encryption-data/></file-entry></manifest>"#.to_vec(),
            ));
        }
        for (index, paragraphs) in self.sections.iter().enumerate() {
            let body: String = paragraphs.iter().map(|p| p.xml.as_str()).collect();
            files.push((
                format!("Contents/section{index}.xml"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><hs:sec xmlns:hs="{NS_SECTION}" xmlns:hp="{NS_PARAGRAPH}" xmlns:hc="{NS_CORE}">{body}</hs:sec>"#
                )
                .into_bytes(),
            ));
        }
        for (id, extension, data) in &self.images {
            files.push((format!("BinData/{id}.{extension}"), data.clone()));
        }

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            let options = if name == "mimetype" {
                zip::write::SimpleFileOptions::default()
                    .compression_method(zip::CompressionMethod::Stored)
            } else {
                zip::write::SimpleFileOptions::default()
            };
            writer.start_file(name, options).unwrap();
            writer.write_all(&data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn content_hpf(&self) -> String {
        let mut metadata = String::new();
        if let Some(title) = &self.title {
            metadata.push_str(&format!("<opf:title>{}</opf:title>", escape(title)));
        }
        if let Some(author) = &self.author {
            metadata.push_str(&format!(
                r#"<opf:meta name="creator" content="text">{}</opf:meta>"#,
                escape(author)
            ));
        }

        let mut items = String::from(
            r#"<opf:item id="header" href="Contents/header.xml" media-type="application/xml"/>"#,
        );
        let mut spine = String::from(r#"<opf:itemref idref="header"/>"#);
        for index in 0..self.sections.len() {
            items.push_str(&format!(
                r#"<opf:item id="section{index}" href="Contents/section{index}.xml" media-type="application/xml"/>"#
            ));
            spine.push_str(&format!(r#"<opf:itemref idref="section{index}"/>"#));
        }
        for (id, extension, _) in &self.images {
            items.push_str(&format!(
                r#"<opf:item id="{id}" href="BinData/{id}.{extension}" media-type="image/{extension}"/>"#
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><opf:package xmlns:opf="http://www.idpf.org/2007/opf/"><opf:metadata>{metadata}</opf:metadata><opf:manifest>{items}</opf:manifest><opf:spine>{spine}</opf:spine></opf:package>"#
        )
    }
}

/// HWPX package with one section per entry of `sections`.
pub fn hwpx_package(sections: &[Vec<HwpxParagraph>]) -> Vec<u8> {
    sections
        .iter()
        .fold(HwpxPackage::new(), |package, section| {
            package.section(section.clone())
        })
        .build()
}

mod tags {
    const BEGIN: u16 = 0x10;
    pub const ID_MAPPINGS: u16 = BEGIN + 1;
    pub const FACE_NAME: u16 = BEGIN + 3;
    pub const CHAR_SHAPE: u16 = BEGIN + 5;
    pub const PARA_SHAPE: u16 = BEGIN + 9;
    pub const STYLE: u16 = BEGIN + 10;
    pub const PARA_HEADER: u16 = BEGIN + 50;
    pub const PARA_TEXT: u16 = BEGIN + 51;
    pub const PARA_CHAR_SHAPE: u16 = BEGIN + 52;
}

/// One HWP 5 body paragraph: runs of `(text, char shape)`.
#[derive(Debug, Clone)]
pub struct Hwp5Paragraph {
    runs: Vec<(String, u32)>,
    para_shape: u16,
}

impl Hwp5Paragraph {
    pub fn plain(text: &str) -> Self {
        Self::runs(&[(text, PLAIN)])
    }

    pub fn bold(text: &str) -> Self {
        Self::runs(&[(text, BOLD)])
    }

    pub fn runs(runs: &[(&str, u32)]) -> Self {
        Self {
            runs: runs.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
            para_shape: PARA_BODY as u16,
        }
    }

    /// Level 1 outline heading.
    pub fn heading(text: &str) -> Self {
        Self {
            runs: vec![(text.to_string(), PLAIN)],
            para_shape: PARA_OUTLINE as u16,
        }
    }
}

/// Builder for an HWP 5 compound file.
#[derive(Debug, Clone, Default)]
pub struct Hwp5File {
    compressed: bool,
    encrypted: bool,
    sections: Vec<Vec<Hwp5Paragraph>>,
}

impl Hwp5File {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deflate the `DocInfo` and `BodyText` streams.
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    /// Set the password flag in the file header.
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn section(mut self, paragraphs: Vec<Hwp5Paragraph>) -> Self {
        self.sections.push(paragraphs);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut file = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        write_stream(&mut file, "/FileHeader", &self.file_header());
        write_stream(&mut file, "/DocInfo", &self.pack(doc_info()));

        file.create_storage("/BodyText").unwrap();
        for (index, paragraphs) in self.sections.iter().enumerate() {
            let body: Vec<u8> = paragraphs.iter().flat_map(paragraph_records).collect();
            write_stream(
                &mut file,
                &format!("/BodyText/Section{index}"),
                &self.pack(body),
            );
        }
        file.flush().unwrap();
        file.into_inner().into_inner()
    }

    fn file_header(&self) -> Vec<u8> {
        let mut data = vec![0u8; 256];
        let signature = b"HWP Document File";
        data[..signature.len()].copy_from_slice(signature);
        data[32..36].copy_from_slice(&0x0501_0000u32.to_le_bytes());
        let flags = u32::from(self.compressed) | (u32::from(self.encrypted) << 1);
        data[36..40].copy_from_slice(&flags.to_le_bytes());
        data
    }

    fn pack(&self, data: Vec<u8>) -> Vec<u8> {
        if !self.compressed {
            return data;
        }
        let mut encoder =
            flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&data).unwrap();
        encoder.finish().unwrap()
    }
}

fn write_stream<F>(file: &mut cfb::CompoundFile<F>, path: &str, data: &[u8])
where
    F: std::io::Read + std::io::Write + std::io::Seek,
{
    let mut stream = file.create_stream(path).unwrap();
    stream.write_all(data).unwrap();
    stream.flush().unwrap();
}

/// Encode one record, switching to the extended size form when needed.
pub fn record(tag: u16, level: u16, payload: &[u8]) -> Vec<u8> {
    let size = payload.len() as u32;
    let inline = size.min(0xFFF);
    let header = u32::from(tag) | (u32::from(level) << 10) | (inline << 20);
    let mut out = header.to_le_bytes().to_vec();
    if inline == 0xFFF {
        out.extend_from_slice(&size.to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn wide_string(text: &str) -> Vec<u8> {
    let mut out = (text.encode_utf16().count() as u16).to_le_bytes().to_vec();
    out.extend(utf16(text));
    out
}

fn doc_info() -> Vec<u8> {
    let mut data = Vec::new();

    // One binary item slot, then one Hangul font and none in the other groups.
    let mut mappings = 0i32.to_le_bytes().to_vec();
    mappings.extend_from_slice(&1i32.to_le_bytes());
    mappings.extend(std::iter::repeat(0u8).take(6 * 4));
    data.extend(record(tags::ID_MAPPINGS, 0, &mappings));

    let mut face = vec![0u8];
    face.extend(wide_string("함초롬바탕"));
    data.extend(record(tags::FACE_NAME, 1, &face));

    for properties in [0u32, 1 << 1, 1] {
        let mut shape = vec![0u8; 64];
        shape[42..46].copy_from_slice(&1000i32.to_le_bytes());
        shape[46..50].copy_from_slice(&properties.to_le_bytes());
        shape[60..64].copy_from_slice(&u32::MAX.to_le_bytes());
        data.extend(record(tags::CHAR_SHAPE, 1, &shape));
    }

    // Body (left aligned), then outline level 0.
    for properties in [1u32 << 2, (1 << 2) | (1 << 23)] {
        let mut shape = vec![0u8; 54];
        shape[..4].copy_from_slice(&properties.to_le_bytes());
        data.extend(record(tags::PARA_SHAPE, 1, &shape));
    }

    let mut style = wide_string("바탕글");
    style.extend(wide_string("Normal"));
    style.extend_from_slice(&[0, 0]);
    style.extend_from_slice(&0u16.to_le_bytes());
    style.extend_from_slice(&0u16.to_le_bytes());
    style.extend_from_slice(&0u16.to_le_bytes());
    data.extend(record(tags::STYLE, 1, &style));

    data
}

fn paragraph_records(paragraph: &Hwp5Paragraph) -> Vec<u8> {
    let mut text = Vec::new();
    let mut shapes = Vec::new();
    let mut position = 0u32;
    for (run, shape) in &paragraph.runs {
        shapes.extend_from_slice(&position.to_le_bytes());
        shapes.extend_from_slice(&shape.to_le_bytes());
        let units = utf16(run);
        position += (units.len() / 2) as u32;
        text.extend(units);
    }
    text.extend_from_slice(&13u16.to_le_bytes());

    let mut header = (position + 1).to_le_bytes().to_vec();
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&paragraph.para_shape.to_le_bytes());
    header.push(0);

    let mut out = record(tags::PARA_HEADER, 0, &header);
    out.extend(record(tags::PARA_TEXT, 1, &text));
    out.extend(record(tags::PARA_CHAR_SHAPE, 1, &shapes));
    out
}

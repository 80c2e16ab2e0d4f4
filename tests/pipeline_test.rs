//! End-to-end tests: container bytes in, rendered formats out.

mod common;

use common::{
    hwpx_package, write_temp, Hwp5File, Hwp5Paragraph, HwpxPackage, HwpxParagraph, BOLD, ITALIC,
    PLAIN,
};
use unhwp::render::{self, RenderOptions};
use unhwp::{Block, Document, Error, JsonFormat, ParseOptions, SectionSelection, SourceFormat};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn bold_hello_hwpx() -> Vec<u8> {
    hwpx_package(&[vec![HwpxParagraph::bold("Hello")]])
}

fn bold_hello_hwp5() -> Hwp5File {
    Hwp5File::new().section(vec![Hwp5Paragraph::bold("Hello")])
}

fn assert_bold_hello(doc: &Document) {
    assert_eq!(doc.to_markdown(), "**Hello**");
    assert_eq!(doc.get_text(), "Hello");
    assert!(doc
        .to_html()
        .contains("<p><span style=\"font-weight:bold\">Hello</span></p>"));
}

#[test]
fn test_bold_hello_hwpx() {
    let doc = unhwp::parse(&bold_hello_hwpx()).unwrap();
    assert_eq!(doc.metadata.format, Some(SourceFormat::Hwpx));
    assert_bold_hello(&doc);
}

#[test]
fn test_bold_hello_hwp5() {
    let doc = unhwp::parse(&bold_hello_hwp5().build()).unwrap();
    assert_eq!(doc.metadata.format, Some(SourceFormat::Hwp5));
    assert_eq!(doc.metadata.version, "5.1.0.0");
    assert!(!doc.metadata.compressed);
    assert_bold_hello(&doc);
}

#[test]
fn test_bold_hello_hwp5_compressed() {
    let doc = unhwp::parse(&bold_hello_hwp5().compressed().build()).unwrap();
    assert!(doc.metadata.compressed);
    assert_bold_hello(&doc);
}

#[test]
fn test_runs_resolve_concrete_styles() {
    let data = hwpx_package(&[vec![HwpxParagraph::runs(&[
        ("plain ", PLAIN),
        ("bold", BOLD),
        (" and ", PLAIN),
        ("italic", ITALIC),
    ])]]);
    let doc = unhwp::parse(&data).unwrap();

    let paragraph = doc.paragraphs().next().unwrap();
    assert_eq!(paragraph.runs.len(), 4);
    for run in &paragraph.runs {
        assert_eq!(run.style.font_name, "함초롬바탕");
        assert_eq!(run.style.font_size, 10.0);
    }
    assert!(paragraph.runs[1].style.bold);
    assert!(paragraph.runs[3].style.italic);
    assert_eq!(doc.to_markdown(), "plain **bold** and *italic*");
}

#[test]
fn test_hwp5_heading_and_runs() {
    let data = Hwp5File::new()
        .section(vec![
            Hwp5Paragraph::heading("제목"),
            Hwp5Paragraph::runs(&[("보통 ", PLAIN), ("굵게", BOLD)]),
        ])
        .compressed()
        .build();
    let doc = unhwp::parse(&data).unwrap();

    assert_eq!(doc.to_markdown(), "# 제목\n\n보통 **굵게**");
    assert_eq!(doc.plain_text(), "제목\n보통 굵게");
}

#[test]
fn test_metadata_from_package() {
    let data = HwpxPackage::new()
        .title("분기 보고서")
        .author("홍길동")
        .section(vec![HwpxParagraph::plain("본문")])
        .build();
    let doc = unhwp::parse(&data).unwrap();

    assert_eq!(doc.metadata.title.as_deref(), Some("분기 보고서"));
    assert_eq!(doc.metadata.author.as_deref(), Some("홍길동"));
    assert_eq!(doc.metadata.version, "5.1.1.0");
    assert_eq!(doc.metadata.section_count, 1);

    let options = RenderOptions::default().with_frontmatter(true);
    let markdown = render::to_markdown(&doc, &options);
    assert!(markdown.starts_with("---\ntitle: \"분기 보고서\"\n"));
    assert!(markdown.ends_with("본문"));

    let html = render::to_html(&doc, &RenderOptions::default());
    assert!(html.contains("<title>분기 보고서</title>"));
}

#[test]
fn test_table_renders_in_every_format() {
    let data = hwpx_package(&[vec![HwpxParagraph::table_with_caption(
        &[&["a", "b"], &["c", "d"]],
        Some("표 1"),
    )]]);
    let doc = unhwp::parse(&data).unwrap();
    assert_eq!(doc.table_count(), 1);

    let options = RenderOptions::default();
    assert_eq!(
        render::to_markdown(&doc, &options),
        "| a | b |\n| --- | --- |\n| c | d |\n\n*표 1*"
    );
    assert_eq!(render::to_text(&doc, &options), "표 1\na\tb\nc\td");

    let html = render::to_html(&doc, &options);
    assert!(html.contains("<caption>표 1</caption>"));
    assert!(html.contains("<td><p>a</p></td>"));
}

#[test]
fn test_lists_and_headings() {
    let data = hwpx_package(&[vec![
        HwpxParagraph::heading("목록", 2),
        HwpxParagraph::bullet("사과"),
        HwpxParagraph::bullet("배"),
        HwpxParagraph::numbered("하나"),
        HwpxParagraph::numbered("둘"),
    ]]);
    let doc = unhwp::parse(&data).unwrap();

    let markdown = doc.to_markdown();
    assert!(markdown.starts_with("## 목록\n\n- 사과\n- 배\n"));
    assert!(markdown.ends_with("1. 하나\n2. 둘"));

    let html = render::to_html(&doc, &RenderOptions::default().with_html_fragment(true));
    assert!(html.contains("<ul>"));
    assert!(html.contains("<ol>"));
}

#[test]
fn test_embedded_image_resource() {
    let data = HwpxPackage::new()
        .section(vec![HwpxParagraph::image("image1", Some("로고"))])
        .image("image1", "png", PNG)
        .build();
    let doc = unhwp::parse(&data).unwrap();

    let resource = doc.get_resource("image1").unwrap();
    assert_eq!(resource.mime_type, "image/png");
    assert_eq!(resource.data, PNG);

    let Some(Block::Image(image)) = doc.block(doc.sections[0].blocks[0]) else {
        panic!("expected image block");
    };
    assert_eq!(image.alt_text.as_deref(), Some("로고"));

    let linked = render::to_markdown(&doc, &RenderOptions::default().with_image_prefix("img/"));
    assert_eq!(linked, "![로고](img/image1.png)");

    let embedded = render::to_markdown(&doc, &RenderOptions::default().with_embedded_images(true));
    assert!(embedded.starts_with("![로고](data:image/png;base64,"));
}

#[test]
fn test_text_only_skips_resources() {
    let data = HwpxPackage::new()
        .section(vec![HwpxParagraph::image("image1", None)])
        .image("image1", "png", PNG)
        .build();
    let doc = unhwp::parse_with_options(&data, ParseOptions::new().text_only()).unwrap();

    assert!(doc.resources.is_empty());
    assert_eq!(doc.image_count(), 1);
}

#[test]
fn test_section_selection() {
    let data = hwpx_package(&[
        vec![HwpxParagraph::plain("첫째")],
        vec![HwpxParagraph::plain("둘째")],
        vec![HwpxParagraph::plain("셋째")],
    ]);

    let options = ParseOptions::new().with_sections(SectionSelection::Indices(vec![2]));
    let doc = unhwp::parse_with_options(&data, options).unwrap();
    assert_eq!(doc.section_count(), 1);
    assert_eq!(doc.sections[0].index, 1);
    assert_eq!(doc.plain_text(), "둘째");

    let options = ParseOptions::new().with_sections(SectionSelection::Range(5..=6));
    let err = unhwp::parse_with_options(&data, options).unwrap_err();
    assert!(matches!(err, Error::InvalidSectionRange(_)));
}

#[test]
fn test_encrypted_documents_rejected() {
    let hwpx = HwpxPackage::new()
        .section(vec![HwpxParagraph::plain("비밀")])
        .encrypted()
        .build();
    assert!(matches!(unhwp::parse(&hwpx), Err(Error::Encrypted)));

    let hwp = bold_hello_hwp5().encrypted().build();
    assert!(matches!(unhwp::parse(&hwp), Err(Error::Encrypted)));
}

#[test]
fn test_truncated_containers() {
    let hwpx = bold_hello_hwpx();
    let err = unhwp::parse(&hwpx[..hwpx.len() / 2]).unwrap_err();
    assert!(matches!(err, Error::Truncated { .. }), "got {err:?}");

    let hwp = bold_hello_hwp5().build();
    let err = unhwp::parse(&hwp[..hwp.len() / 2]).unwrap_err();
    assert!(matches!(err, Error::Truncated { .. }), "got {err:?}");
}

#[test]
fn test_package_checks() {
    let section = vec![HwpxParagraph::plain("본문")];

    let wrong_mimetype = HwpxPackage::new()
        .section(section.clone())
        .mimetype("application/zip")
        .build();
    let err = unhwp::parse(&wrong_mimetype).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "got {err:?}");

    let old_version = HwpxPackage::new()
        .section(section.clone())
        .major_version(4)
        .build();
    let err = unhwp::parse(&old_version).unwrap_err();
    assert!(matches!(err, Error::UnsupportedVersion(_)), "got {err:?}");

    let headerless = HwpxPackage::new().section(section).without_header().build();
    let err = unhwp::parse(&headerless).unwrap_err();
    assert!(
        matches!(err, Error::Structural(ref detail) if detail.contains("Contents/header.xml")),
        "got {err:?}"
    );
}

fn one_cell_table(table_attrs: &str, cell_addr: &str, cell_span: &str) -> HwpxParagraph {
    HwpxParagraph::raw(format!(
        r#"<hp:p><hp:run><hp:tbl {table_attrs}><hp:tr><hp:tc><hp:subList><hp:p><hp:run><hp:t>셀</hp:t></hp:run></hp:p></hp:subList><hp:cellAddr {cell_addr}/><hp:cellSpan {cell_span}/></hp:tc></hp:tr></hp:tbl></hp:run></hp:p>"#
    ))
}

#[test]
fn test_cell_address_at_u32_max() {
    let data = hwpx_package(&[vec![one_cell_table(
        r#"rowCnt="1" colCnt="1""#,
        r#"colAddr="4294967295" rowAddr="0""#,
        r#"colSpan="2" rowSpan="1""#,
    )]]);
    let doc = unhwp::parse(&data).unwrap();

    assert_eq!(doc.get_text(), "셀");
    assert!(doc.to_markdown().contains("<td colspan=\"2\">셀</td>"));
}

#[test]
fn test_declared_table_size_is_not_trusted() {
    let data = hwpx_package(&[vec![one_cell_table(
        r#"rowCnt="4000000000" colCnt="4000000000""#,
        r#"colAddr="0" rowAddr="0""#,
        r#"colSpan="1" rowSpan="1""#,
    )]]);
    let doc = unhwp::parse(&data).unwrap();

    let table = doc.sections[0]
        .blocks
        .iter()
        .find_map(|id| match doc.block(*id) {
            Some(Block::Table(table)) => Some(table),
            _ => None,
        })
        .unwrap();
    assert_eq!((table.rows, table.cols), (1, 1));
    assert_eq!(doc.get_text(), "셀");
    assert_eq!(doc.to_markdown(), "| 셀 |\n| --- |");
}

#[test]
fn test_table_nesting_past_limit_keeps_text() {
    let data = hwpx_package(&[vec![HwpxParagraph::nested_tables(70, "가장 안쪽")]]);
    let doc = unhwp::parse(&data).unwrap();

    let mut depth = 0;
    let mut blocks = doc.sections[0].blocks.clone();
    loop {
        match doc.block(blocks[0]) {
            Some(Block::Table(table)) => {
                depth += 1;
                blocks = table.cells[0].blocks.clone();
            }
            Some(Block::Paragraph(paragraph)) => {
                assert_eq!(paragraph.plain_text(), "가장 안쪽");
                break;
            }
            other => panic!("unexpected block {other:?}"),
        }
    }
    assert_eq!(depth, 64);
    assert!(doc.get_text().contains("가장 안쪽"));
}

#[test]
fn test_deeply_nested_tables_rejected() {
    let data = hwpx_package(&[vec![HwpxParagraph::nested_tables(10_000, "가장 안쪽")]]);
    let err = unhwp::parse(&data).unwrap_err();
    assert!(
        matches!(err, Error::Structural(ref detail) if detail.contains("Contents/section0.xml")),
        "got {err:?}"
    );
}

#[test]
fn test_json_round_trip() {
    let data = hwpx_package(&[vec![
        HwpxParagraph::heading("제목", 1),
        HwpxParagraph::table(&[&["a"]]),
    ]]);
    let doc = unhwp::parse(&data).unwrap();

    let json = render::to_json(&doc, JsonFormat::Compact).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_render_all_matches_individual_renders() {
    let data = hwpx_package(&[vec![
        HwpxParagraph::heading("제목", 1),
        HwpxParagraph::bold("Hello"),
        HwpxParagraph::table(&[&["a", "b"]]),
    ]]);
    let doc = unhwp::parse(&data).unwrap();
    let options = RenderOptions::default();

    let outputs = render::render_all(&doc, &options).unwrap();
    assert_eq!(outputs.markdown, render::to_markdown(&doc, &options));
    assert_eq!(outputs.html, render::to_html(&doc, &options));
    assert_eq!(outputs.text, render::to_text(&doc, &options));
    assert_eq!(outputs.json, render::to_json(&doc, JsonFormat::Pretty).unwrap());
}

#[test]
fn test_file_entry_points() {
    let file = write_temp(&bold_hello_hwp5().compressed().build(), "hwp");

    assert_eq!(unhwp::extract_text(file.path()).unwrap(), "Hello");
    assert_eq!(unhwp::to_markdown(file.path()).unwrap(), "**Hello**");
    assert!(unhwp::to_html(file.path(), &RenderOptions::default())
        .unwrap()
        .contains("Hello"));

    let json = unhwp::to_json(file.path(), JsonFormat::Pretty).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["format"], "hwp5");

    let result = unhwp::Unhwp::new().parse(file.path()).unwrap();
    assert_eq!(result.paragraph_count(), 1);
    assert_eq!(result.char_count(), 5);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = unhwp::parse_file("/nonexistent/report.hwp").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_detection() {
    assert_eq!(
        unhwp::detect_format_from_bytes(&bold_hello_hwpx()).unwrap(),
        SourceFormat::Hwpx
    );
    assert_eq!(
        unhwp::detect_format_from_bytes(&bold_hello_hwp5().build()).unwrap(),
        SourceFormat::Hwp5
    );
    assert!(matches!(
        unhwp::detect_format_from_bytes(b"%PDF-1.7"),
        Err(Error::Format(_))
    ));
}

//! Mapping table from source labels to model node kinds.
//!
//! Records are matched by tag id, elements by local name once their
//! namespace has been confirmed to be one of the OWPML namespaces. Both
//! decoders name attributes with the OWPML vocabulary, so the helpers below
//! read a value either from the node itself (records, flat XML attributes)
//! or from the child element OWPML nests it in.

use crate::parser::record::tags;
use crate::parser::tree::{Label, TreeNode};

const OWPML_PREFIX: &str = "http://www.hancom.co.kr/hwpml/";

/// What a source node contributes to the document model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Section,
    Paragraph,
    Run,
    /// Text run element (`hp:t`).
    Text,
    /// Character data.
    Chars,
    Tab,
    LineBreak,
    Space,
    /// Decoded `PARA_TEXT` with object markers.
    ParaText,
    /// `PARA_CHAR_SHAPE` position table.
    CharShapeRuns,
    /// `CTRL_HEADER`; the control id selects the object.
    Control,
    Table,
    TableProps,
    Row,
    Cell,
    SubList,
    Caption,
    Picture,
    /// Image reference carrying `binaryItemIDRef`.
    Image,
    /// Drawing object that may hold a text box.
    Shape,
    FontGroup,
    Font,
    CharShape,
    ParaShape,
    Style,
    BinItem,
    /// Known node without content of its own; descend into it.
    Container,
    /// Known node whose subtree is skipped (headers, footers, layout caches).
    Ignored,
    Unknown,
}

/// Classify a node.
pub(crate) fn classify<N: TreeNode>(node: &N) -> NodeKind {
    match node.label() {
        Label::Tag(tag) => classify_tag(tag),
        Label::Element { namespace, local } => match namespace {
            Some(ns) if ns.starts_with(OWPML_PREFIX) => classify_element(local),
            _ => NodeKind::Unknown,
        },
        Label::Text => NodeKind::Chars,
    }
}

fn classify_tag(tag: u16) -> NodeKind {
    match tag {
        tags::PARA_HEADER => NodeKind::Paragraph,
        tags::PARA_TEXT => NodeKind::ParaText,
        tags::PARA_CHAR_SHAPE => NodeKind::CharShapeRuns,
        tags::CTRL_HEADER => NodeKind::Control,
        tags::TABLE => NodeKind::TableProps,
        tags::LIST_HEADER => NodeKind::SubList,
        tags::SHAPE_COMPONENT => NodeKind::Shape,
        tags::SHAPE_COMPONENT_PICTURE => NodeKind::Image,
        tags::ID_MAPPINGS => NodeKind::Container,
        tags::FACE_NAME => NodeKind::Font,
        tags::CHAR_SHAPE => NodeKind::CharShape,
        tags::PARA_SHAPE => NodeKind::ParaShape,
        tags::STYLE => NodeKind::Style,
        tags::BIN_DATA => NodeKind::BinItem,
        tags::DOCUMENT_PROPERTIES
        | tags::BORDER_FILL
        | tags::TAB_DEF
        | tags::NUMBERING
        | tags::BULLET
        | tags::PARA_LINE_SEG
        | tags::PARA_RANGE_TAG
        | tags::PAGE_DEF
        | tags::FOOTNOTE_SHAPE
        | tags::PAGE_BORDER_FILL
        | tags::SHAPE_COMPONENT_LINE
        | tags::SHAPE_COMPONENT_RECTANGLE
        | tags::SHAPE_COMPONENT_ELLIPSE
        | tags::SHAPE_COMPONENT_ARC
        | tags::SHAPE_COMPONENT_POLYGON
        | tags::SHAPE_COMPONENT_CURVE
        | tags::SHAPE_COMPONENT_OLE
        | tags::SHAPE_COMPONENT_CONTAINER
        | tags::CTRL_DATA
        | tags::EQEDIT => NodeKind::Ignored,
        _ => NodeKind::Unknown,
    }
}

fn classify_element(local: &str) -> NodeKind {
    match local {
        "sec" => NodeKind::Section,
        "p" => NodeKind::Paragraph,
        "run" => NodeKind::Run,
        "t" => NodeKind::Text,
        "tab" => NodeKind::Tab,
        "lineBreak" => NodeKind::LineBreak,
        "nbSpace" | "fwSpace" => NodeKind::Space,
        "tbl" => NodeKind::Table,
        "tr" => NodeKind::Row,
        "tc" => NodeKind::Cell,
        "subList" => NodeKind::SubList,
        "caption" => NodeKind::Caption,
        "pic" => NodeKind::Picture,
        "img" => NodeKind::Image,
        "rect" | "ellipse" | "arc" | "polygon" | "curve" | "connectLine" | "container"
        | "drawText" => NodeKind::Shape,
        "fontface" => NodeKind::FontGroup,
        "font" => NodeKind::Font,
        "charPr" => NodeKind::CharShape,
        "paraPr" => NodeKind::ParaShape,
        "style" => NodeKind::Style,
        "head" | "refList" | "fontfaces" | "charProperties" | "paraProperties" | "styles" => {
            NodeKind::Container
        }
        "ctrl" | "secPr" | "linesegarray" | "switch" | "header" | "footer" | "footNote"
        | "endNote" | "equation" | "chart" | "ole" | "line" | "textart" | "markpenBegin"
        | "markpenEnd" | "fieldBegin" | "fieldEnd" | "bookmark" | "titleMark" | "hiddenComment"
        | "insertBegin" | "insertEnd" | "deleteBegin" | "deleteEnd" | "beginInfo" | "endInfo"
        | "borderFills" | "tabProperties" | "numberings" | "bullets" | "memoProperties"
        | "trackChanges" | "trackChangeAuthors" | "compatibleDocument" | "docOption"
        | "beginNum" | "forbiddenWordList" => NodeKind::Ignored,
        _ => NodeKind::Unknown,
    }
}

/// Value stored flat on the node (`flat`) or on a child element
/// (`<child attr=".."/>`).
pub(crate) fn prop<'n, N: TreeNode>(
    node: &'n N,
    child: &str,
    attr: &str,
    flat: &str,
) -> Option<&'n str> {
    node.attr(flat)
        .or_else(|| node.child(child).and_then(|c| c.attr(attr)))
}

/// Numeric variant of [`prop`].
pub(crate) fn prop_u32<N: TreeNode>(node: &N, child: &str, attr: &str, flat: &str) -> Option<u32> {
    prop(node, child, attr, flat)?.trim().parse().ok()
}

/// Boolean property: a flat `"1"`/`"true"` attribute, or the presence of an
/// empty marker element such as `<hh:bold/>`.
pub(crate) fn flag<N: TreeNode>(node: &N, name: &str) -> bool {
    match node.attr(name) {
        Some(value) => matches!(value, "1" | "true"),
        None => node.child(name).is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::xml::{ns, ElementTree};
    use crate::parser::tree::SourceTree;

    #[test]
    fn test_element_kinds_require_owpml_namespace() {
        let xml = format!(
            r#"<root xmlns:hp="{}" xmlns:x="urn:other"><hp:p/><x:p/></root>"#,
            ns::PARAGRAPH
        );
        let tree = ElementTree::parse("s", xml.as_bytes()).unwrap();
        let root = &tree.roots()[0];
        assert_eq!(classify(&root.children()[0]), NodeKind::Paragraph);
        assert_eq!(classify(&root.children()[1]), NodeKind::Unknown);
    }

    #[test]
    fn test_2016_namespace_accepted() {
        let xml = format!(r#"<hp:tbl xmlns:hp="{}"/>"#, ns::PARAGRAPH_2016);
        let tree = ElementTree::parse("s", xml.as_bytes()).unwrap();
        assert_eq!(classify(&tree.roots()[0]), NodeKind::Table);
    }

    #[test]
    fn test_prop_reads_child_or_flat() {
        let xml = format!(
            r#"<hh:charPr xmlns:hh="{}" id="1"><hh:underline type="BOTTOM"/><hh:bold/></hh:charPr>"#,
            ns::HEAD
        );
        let tree = ElementTree::parse("h", xml.as_bytes()).unwrap();
        let node = &tree.roots()[0];
        assert_eq!(prop(node, "underline", "type", "underline"), Some("BOTTOM"));
        assert!(flag(node, "bold"));
        assert!(!flag(node, "italic"));
        assert_eq!(prop_u32(node, "x", "y", "id"), Some(1));
    }

    #[test]
    fn test_record_kinds() {
        assert_eq!(classify_tag(tags::PARA_HEADER), NodeKind::Paragraph);
        assert_eq!(classify_tag(tags::PARA_LINE_SEG), NodeKind::Ignored);
        assert_eq!(classify_tag(0x3F0), NodeKind::Unknown);
    }
}

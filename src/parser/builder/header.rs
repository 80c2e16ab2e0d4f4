//! Header part: fonts, character shapes, paragraph shapes, named styles and
//! binary item declarations.

use super::mapping::{classify, flag, prop, prop_u32, NodeKind};
use crate::model::{
    char_shape_id, named_style_id, Alignment, StyleDefinition, StyleOverrides, StyleTable,
    DEFAULT_STYLE_ID,
};
use crate::parser::tree::{SourceTree, TreeNode};
use std::collections::BTreeMap;

const HANGUL: &str = "HANGUL";

/// Heading kind declared by a paragraph shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum HeadingKind {
    #[default]
    None,
    Outline,
    Number,
    Bullet,
}

/// Layout-relevant part of a paragraph shape.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct ParaShape {
    pub alignment: Alignment,
    pub heading: HeadingKind,
    /// Zero-based outline or list level.
    pub level: u8,
}

/// A named style (`바탕글`, `개요 1`, ...).
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct NamedStyle {
    pub name: String,
    pub para_shape: Option<u32>,
    pub char_shape: Option<u32>,
}

/// HWP 5 `BIN_DATA` declaration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BinItem {
    /// Container asset key (decimal stream id).
    pub asset_key: String,
    /// `Some(true)` compressed, `Some(false)` stored, `None` follows the document flag.
    pub compressed: Option<bool>,
    pub format: Option<String>,
}

/// Everything the body builder and the resolver need from the header part.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeaderInfo {
    /// Font names keyed by `(language, id)`.
    pub fonts: BTreeMap<(String, u32), String>,
    pub char_shapes: BTreeMap<u32, StyleOverrides>,
    pub para_shapes: BTreeMap<u32, ParaShape>,
    pub named_styles: BTreeMap<u32, NamedStyle>,
    /// Keyed by the 1-based item id pictures refer to.
    pub bin_items: BTreeMap<String, BinItem>,
}

impl HeaderInfo {
    /// Collect header definitions from a decoded header part.
    pub(crate) fn read<T: SourceTree>(tree: &T) -> Self {
        let mut info = Self::default();
        let mut shapes = Vec::new();
        for root in tree.roots() {
            info.walk(root, None, &mut shapes);
        }
        // Char shapes refer to fonts that may be declared after them.
        for (id, (mut overrides, font)) in shapes {
            overrides.font_name =
                font.and_then(|font| info.fonts.get(&(HANGUL.to_string(), font)).cloned());
            info.char_shapes.insert(id, overrides);
        }
        log::debug!(
            "{}: {} font(s), {} char shape(s), {} para shape(s), {} style(s)",
            tree.part(),
            info.fonts.len(),
            info.char_shapes.len(),
            info.para_shapes.len(),
            info.named_styles.len()
        );
        info
    }

    fn walk<N: TreeNode>(
        &mut self,
        node: &N,
        lang: Option<&str>,
        shapes: &mut Vec<(u32, (StyleOverrides, Option<u32>))>,
    ) {
        match classify(node) {
            NodeKind::FontGroup => {
                let lang = node.attr("lang").or(lang);
                for child in node.children() {
                    self.walk(child, lang, shapes);
                }
            }
            NodeKind::Font => {
                let lang = node.attr("lang").or(lang).unwrap_or(HANGUL);
                if let (Some(id), Some(face)) = (node.attr_u32("id"), node.attr("face")) {
                    self.fonts.insert((lang.to_string(), id), face.to_string());
                }
            }
            NodeKind::CharShape => {
                if let Some(id) = node.attr_u32("id") {
                    shapes.push((id, char_shape(node)));
                }
            }
            NodeKind::ParaShape => {
                if let Some(id) = node.attr_u32("id") {
                    self.para_shapes.insert(id, para_shape(node));
                }
            }
            NodeKind::Style => {
                if let Some(id) = node.attr_u32("id") {
                    self.named_styles.insert(
                        id,
                        NamedStyle {
                            name: node.attr("name").unwrap_or_default().to_string(),
                            para_shape: node.attr_u32("paraPrIDRef"),
                            char_shape: node.attr_u32("charPrIDRef"),
                        },
                    );
                }
            }
            NodeKind::BinItem => {
                if let (Some(id), Some(key)) = (node.attr("id"), node.attr("binaryItemId")) {
                    let compressed = match node.attr("compress") {
                        Some("COMPRESS") => Some(true),
                        Some("NONE") => Some(false),
                        _ => None,
                    };
                    self.bin_items.insert(
                        id.to_string(),
                        BinItem {
                            asset_key: key.to_string(),
                            compressed,
                            format: node.attr("format").map(String::from),
                        },
                    );
                }
            }
            NodeKind::Ignored => {}
            _ => {
                for child in node.children() {
                    self.walk(child, lang, shapes);
                }
            }
        }
    }

    /// Style table with the default style, one definition per char shape and
    /// one per named style. Named styles inherit from their char shape.
    pub(crate) fn style_table(&self) -> StyleTable {
        let mut table = StyleTable::new();
        table.define(
            DEFAULT_STYLE_ID,
            StyleDefinition {
                name: Some(DEFAULT_STYLE_ID.to_string()),
                ..Default::default()
            },
        );
        for (id, overrides) in &self.char_shapes {
            table.define(
                char_shape_id(*id),
                StyleDefinition {
                    name: None,
                    parent: Some(DEFAULT_STYLE_ID.to_string()),
                    overrides: overrides.clone(),
                },
            );
        }
        for (id, style) in &self.named_styles {
            let parent = match style.char_shape {
                Some(shape) if self.char_shapes.contains_key(&shape) => char_shape_id(shape),
                _ => DEFAULT_STYLE_ID.to_string(),
            };
            table.define(
                named_style_id(*id),
                StyleDefinition {
                    name: Some(style.name.clone()),
                    parent: Some(parent),
                    overrides: StyleOverrides::default(),
                },
            );
        }
        table
    }
}

/// Overrides declared by a char shape plus its Hangul font reference.
fn char_shape<N: TreeNode>(node: &N) -> (StyleOverrides, Option<u32>) {
    let underline = prop(node, "underline", "type", "underline").unwrap_or("NONE");
    let strikeout = prop(node, "strikeout", "shape", "strikeout").unwrap_or("NONE");
    let overrides = StyleOverrides {
        bold: Some(flag(node, "bold")),
        italic: Some(flag(node, "italic")),
        underline: Some(underline != "NONE"),
        strikethrough: Some(!matches!(strikeout, "NONE" | "3D")),
        superscript: Some(flag(node, "supscript")),
        subscript: Some(flag(node, "subscript")),
        font_name: None,
        font_size: node
            .attr_i64("height")
            .filter(|h| *h > 0)
            .map(|h| h as f32 / 100.0),
        color: node.attr("textColor").and_then(color),
        background_color: node
            .attr("shadeColor")
            .and_then(color)
            .filter(|c| c != "#FFFFFF"),
    };
    (overrides, prop_u32(node, "fontRef", "hangul", "fontRef"))
}

fn color(value: &str) -> Option<String> {
    let value = value.trim();
    (value.len() == 7 && value.starts_with('#')).then(|| value.to_ascii_uppercase())
}

fn para_shape<N: TreeNode>(node: &N) -> ParaShape {
    let alignment = match prop(node, "align", "horizontal", "align").unwrap_or("JUSTIFY") {
        "LEFT" => Alignment::Left,
        "RIGHT" => Alignment::Right,
        "CENTER" => Alignment::Center,
        _ => Alignment::Justify,
    };
    let heading = match prop(node, "heading", "type", "headingType") {
        Some("OUTLINE") => HeadingKind::Outline,
        Some("NUMBER") => HeadingKind::Number,
        Some("BULLET") => HeadingKind::Bullet,
        _ => HeadingKind::None,
    };
    let level = prop_u32(node, "heading", "level", "level").unwrap_or(0).min(9) as u8;
    ParaShape {
        alignment,
        heading,
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::xml::{ns, ElementTree};

    fn header_xml(body: &str) -> ElementTree {
        let xml = format!(
            r#"<hh:head xmlns:hh="{}"><hh:refList>{body}</hh:refList></hh:head>"#,
            ns::HEAD
        );
        ElementTree::parse("Contents/header.xml", xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_reads_owpml_header() {
        let tree = header_xml(
            r##"<hh:fontfaces>
                 <hh:fontface lang="HANGUL"><hh:font id="0" face="맑은 고딕"/></hh:fontface>
                 <hh:fontface lang="LATIN"><hh:font id="0" face="Arial"/></hh:fontface>
               </hh:fontfaces>
               <hh:charProperties>
                 <hh:charPr id="0" height="1000" textColor="#000000" shadeColor="none">
                   <hh:fontRef hangul="0" latin="0"/>
                   <hh:underline type="NONE"/><hh:strikeout shape="NONE"/>
                 </hh:charPr>
                 <hh:charPr id="1" height="1600" textColor="#ff0000" shadeColor="#FFFF00">
                   <hh:fontRef hangul="0"/><hh:bold/><hh:underline type="BOTTOM"/>
                 </hh:charPr>
               </hh:charProperties>
               <hh:paraProperties>
                 <hh:paraPr id="2"><hh:align horizontal="CENTER"/><hh:heading type="OUTLINE" level="1" idRef="0"/></hh:paraPr>
               </hh:paraProperties>
               <hh:styles><hh:style id="1" type="PARA" name="개요 1" paraPrIDRef="2" charPrIDRef="1"/></hh:styles>"##,
        );
        let info = HeaderInfo::read(&tree);

        assert_eq!(info.fonts.get(&("LATIN".to_string(), 0)).map(String::as_str), Some("Arial"));
        let plain = &info.char_shapes[&0];
        assert_eq!(plain.bold, Some(false));
        assert_eq!(plain.underline, Some(false));
        assert_eq!(plain.background_color, None);
        assert_eq!(plain.font_name.as_deref(), Some("맑은 고딕"));

        let strong = &info.char_shapes[&1];
        assert_eq!(strong.bold, Some(true));
        assert_eq!(strong.underline, Some(true));
        assert_eq!(strong.font_size, Some(16.0));
        assert_eq!(strong.color.as_deref(), Some("#FF0000"));
        assert_eq!(strong.background_color.as_deref(), Some("#FFFF00"));

        let shape = info.para_shapes[&2];
        assert_eq!(shape.alignment, Alignment::Center);
        assert_eq!(shape.heading, HeadingKind::Outline);
        assert_eq!(shape.level, 1);

        let table = info.style_table();
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.definition("style:1").and_then(|d| d.parent.as_deref()),
            Some("char:1")
        );
    }
}

//! Namespace-aware XML element tree for HWPX parts.
//!
//! Element names are resolved to `(namespace URI, local name)` so documents
//! that bind the OWPML namespaces to unusual prefixes still decode. Text is
//! unescaped; whitespace-only text is kept only inside text-run elements
//! (`hp:t`), where it is content.

use super::tree::{Attributes, Label, SourceTree, TreeNode};
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

/// OWPML namespaces.
pub mod ns {
    pub const HEAD: &str = "http://www.hancom.co.kr/hwpml/2011/head";
    pub const PARAGRAPH: &str = "http://www.hancom.co.kr/hwpml/2011/paragraph";
    pub const PARAGRAPH_2016: &str = "http://www.hancom.co.kr/hwpml/2016/paragraph";
    pub const SECTION: &str = "http://www.hancom.co.kr/hwpml/2011/section";
    pub const CORE: &str = "http://www.hancom.co.kr/hwpml/2011/core";
}

/// Deepest element nesting a part may use.
pub const MAX_ELEMENT_DEPTH: usize = 512;

/// Element qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: QName,
    pub attributes: Attributes,
    pub children: Vec<XmlNode>,
}

/// A node of the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
}

impl TreeNode for XmlNode {
    fn label(&self) -> Label<'_> {
        match self {
            XmlNode::Element(e) => Label::Element {
                namespace: e.name.namespace.as_deref(),
                local: &e.name.local,
            },
            XmlNode::Text(_) => Label::Text,
        }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        match self {
            XmlNode::Element(e) => e.attributes.get(key),
            XmlNode::Text(_) => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            XmlNode::Text(t) => Some(t),
            XmlNode::Element(_) => None,
        }
    }

    fn children(&self) -> &[Self] {
        match self {
            XmlNode::Element(e) => &e.children,
            XmlNode::Text(_) => &[],
        }
    }
}

/// Element tree of one XML part.
#[derive(Debug, Clone)]
pub struct ElementTree {
    part: String,
    roots: Vec<XmlNode>,
}

impl ElementTree {
    /// Parse a part. Malformed markup, including elements left open at the
    /// end of input, fails with [`Error::XmlSyntax`]. Elements nested past
    /// [`MAX_ELEMENT_DEPTH`] fail with [`Error::Structural`].
    pub fn parse(part: &str, data: &[u8]) -> Result<Self> {
        let mut reader = NsReader::from_reader(data);
        let mut stack: Vec<Element> = Vec::new();
        let mut roots = Vec::new();

        let syntax = |reader: &NsReader<&[u8]>, detail: String| Error::XmlSyntax {
            part: part.to_string(),
            position: reader.buffer_position(),
            detail,
        };

        loop {
            let (namespace, event) = match reader.read_resolved_event() {
                Ok((resolved, event)) => (namespace_of(resolved), event),
                Err(e) => {
                    let detail = e.to_string();
                    return Err(syntax(&reader, detail));
                }
            };

            match event {
                Event::Start(start) => {
                    if stack.len() >= MAX_ELEMENT_DEPTH {
                        return Err(Error::Structural(format!(
                            "{part}: elements nest deeper than {MAX_ELEMENT_DEPTH} levels"
                        )));
                    }
                    let element = namespace
                        .and_then(|ns| open_element(ns, &start))
                        .map_err(|e| syntax(&reader, e))?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = namespace
                        .and_then(|ns| open_element(ns, &start))
                        .map_err(|e| syntax(&reader, e))?;
                    attach(&mut stack, &mut roots, XmlNode::Element(element));
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| syntax(&reader, "unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut roots, XmlNode::Element(element));
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| syntax(&reader, e.to_string()))?;
                    push_text(&mut stack, &text);
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    push_text(&mut stack, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(syntax(
                &reader,
                format!("unexpected end of input inside <{}>", open.name.local),
            ));
        }

        Ok(Self {
            part: part.to_string(),
            roots,
        })
    }

    /// The document element.
    pub fn root(&self) -> Option<&XmlNode> {
        self.roots
            .iter()
            .find(|n| matches!(n, XmlNode::Element(_)))
    }
}

impl SourceTree for ElementTree {
    type Node = XmlNode;

    fn part(&self) -> &str {
        &self.part
    }

    fn roots(&self) -> &[XmlNode] {
        &self.roots
    }
}

/// Owned namespace URI of an element name.
fn namespace_of(resolved: ResolveResult<'_>) -> std::result::Result<Option<String>, String> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.into_inner()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(format!(
            "unbound namespace prefix {:?}",
            String::from_utf8_lossy(&prefix)
        )),
    }
}

fn open_element(
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> std::result::Result<Element, String> {
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        attributes.insert(key, value);
    }

    Ok(Element {
        name: QName { namespace, local },
        attributes,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], roots: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if text.trim().is_empty() && parent.name.local != "t" {
        return;
    }
    // Adjacent text and CDATA merge into one node.
    if let Some(XmlNode::Text(previous)) = parent.children.last_mut() {
        previous.push_str(text);
    } else {
        parent.children.push(XmlNode::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hs:sec xmlns:hs="http://www.hancom.co.kr/hwpml/2011/section"
        xmlns:hp="http://www.hancom.co.kr/hwpml/2011/paragraph">
  <hp:p paraPrIDRef="3" styleIDRef="0">
    <hp:run charPrIDRef="1"><hp:t>A &amp; B<hp:tab/> </hp:t></hp:run>
  </hp:p>
</hs:sec>"#;

    #[test]
    fn test_parse_resolves_namespaces() {
        let tree = ElementTree::parse("Contents/section0.xml", SECTION.as_bytes()).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(
            root.label(),
            Label::Element {
                namespace: Some(ns::SECTION),
                local: "sec"
            }
        );
        let paragraph = root.child("p").unwrap();
        assert_eq!(paragraph.attr("paraPrIDRef"), Some("3"));
        assert_eq!(
            paragraph.label(),
            Label::Element {
                namespace: Some(ns::PARAGRAPH),
                local: "p"
            }
        );

        let t = paragraph.child("run").unwrap().child("t").unwrap();
        assert_eq!(t.children().len(), 3);
        assert_eq!(t.children()[0].text(), Some("A & B"));
        assert_eq!(t.children()[1].local_name(), Some("tab"));
        assert_eq!(t.children()[2].text(), Some(" "));
    }

    #[test]
    fn test_other_prefixes_resolve_alike() {
        let xml = r#"<x:sec xmlns:x="http://www.hancom.co.kr/hwpml/2011/section"/>"#;
        let tree = ElementTree::parse("s", xml.as_bytes()).unwrap();
        assert_eq!(tree.root().unwrap().local_name(), Some("sec"));
        assert!(matches!(
            tree.root().unwrap().label(),
            Label::Element { namespace: Some(ns::SECTION), .. }
        ));
    }

    #[test]
    fn test_unclosed_element_is_syntax_error() {
        let xml = r#"<hs:sec xmlns:hs="urn:x"><hp:p xmlns:hp="urn:y">"#;
        let err = ElementTree::parse("Contents/section0.xml", xml.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::XmlSyntax { ref part, .. } if part == "Contents/section0.xml"));
    }

    #[test]
    fn test_mismatched_tag_is_syntax_error() {
        let xml = r#"<a><b></a>"#;
        assert!(matches!(
            ElementTree::parse("p", xml.as_bytes()),
            Err(Error::XmlSyntax { .. })
        ));
    }

    #[test]
    fn test_deep_nesting_is_structural_error() {
        let depth = 10_000;
        let xml = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        let err = ElementTree::parse("Contents/section0.xml", xml.as_bytes()).unwrap_err();
        assert!(
            matches!(err, Error::Structural(ref detail) if detail.starts_with("Contents/section0.xml"))
        );

        let xml = format!(
            "{}{}",
            "<a>".repeat(MAX_ELEMENT_DEPTH),
            "</a>".repeat(MAX_ELEMENT_DEPTH)
        );
        assert!(ElementTree::parse("p", xml.as_bytes()).is_ok());
    }
}

//! Document model builder.
//!
//! Written once against [`SourceTree`]: the binary record tree and the XML
//! element tree both feed the same walk. Nodes are classified through the
//! fixed table in [`mapping`]; anything the table does not know is skipped.
//! The output still carries style references by id. The resolver makes
//! them concrete.

mod body;
mod header;
mod mapping;

pub(crate) use body::ParagraphRef;
pub(crate) use header::{HeadingKind, NamedStyle, ParaShape};

use crate::container::Container;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::parser::tree::SourceTree;
use body::BodyBuilder;
use header::HeaderInfo;
use std::collections::BTreeMap;

/// A built document whose styles are still references.
#[derive(Debug, Clone)]
pub(crate) struct UnresolvedDocument {
    pub document: Document,
    /// Body paragraphs in reading order with their layout references.
    pub paragraphs: Vec<ParagraphRef>,
    pub para_shapes: BTreeMap<u32, ParaShape>,
    pub named_styles: BTreeMap<u32, NamedStyle>,
}

/// Build the document from a decoded header part and decoded body sections.
///
/// `sections` pairs each tree with its zero-based position in the source.
pub(crate) fn build<T: SourceTree>(
    container: &Container,
    header: &T,
    sections: &[(usize, T)],
    load_assets: bool,
) -> Result<UnresolvedDocument> {
    if sections.is_empty() {
        return Err(Error::Structural("document has no body sections".into()));
    }

    let info = HeaderInfo::read(header);
    let mut body = BodyBuilder::new(&info, container, load_assets);
    for (index, tree) in sections {
        body.section(*index, tree);
    }
    let (mut document, paragraphs) = body.finish();
    document.styles = info.style_table();

    log::debug!(
        "built {} section(s), {} block(s), {} resource(s)",
        document.sections.len(),
        document.blocks.len(),
        document.resources.len()
    );

    Ok(UnresolvedDocument {
        document,
        paragraphs,
        para_shapes: info.para_shapes,
        named_styles: info.named_styles,
    })
}

//! Style and layout resolver.
//!
//! Turns the builder's style references into concrete formatting. Every
//! style definition is resolved exactly once by walking its parent chain
//! iteratively; a repeated identifier on the chain is a cycle and fails the
//! parse. Results are cached in [`StyleTable::resolved`] and copied onto the
//! runs, after which the document is never mutated again.

use super::builder::{HeadingKind, NamedStyle, ParaShape, ParagraphRef, UnresolvedDocument};
use crate::error::{Error, Result};
use crate::model::{
    Block, Document, ListInfo, StyleDefinition, StyleTable, TextStyle, DEFAULT_STYLE_ID,
};
use std::collections::{BTreeMap, BTreeSet};

/// Deepest outline or list level tracked by the numbering counters.
const MAX_LEVEL: usize = 10;

/// Resolve styles and paragraph layout.
pub(crate) fn resolve(unresolved: UnresolvedDocument) -> Result<Document> {
    let UnresolvedDocument {
        mut document,
        paragraphs,
        para_shapes,
        named_styles,
    } = unresolved;

    resolve_styles(&mut document.styles)?;
    assign_run_styles(&mut document);
    apply_layout(&mut document, &paragraphs, &para_shapes, &named_styles);

    log::debug!(
        "resolved {} style(s) over {} paragraph(s)",
        document.styles.resolved.len(),
        document.paragraph_count()
    );
    Ok(document)
}

/// Resolve every definition of `table` into [`StyleTable::resolved`].
pub(crate) fn resolve_styles(table: &mut StyleTable) -> Result<()> {
    let mut cache = BTreeMap::new();
    for id in table.definitions.keys() {
        resolve_one(&table.definitions, id, &mut cache)?;
    }
    table.resolved = cache;
    Ok(())
}

/// Resolve one style. The chain is walked child to root, then overrides are
/// applied root to child so the child wins; each prefix is cached.
fn resolve_one(
    definitions: &BTreeMap<String, StyleDefinition>,
    id: &str,
    cache: &mut BTreeMap<String, TextStyle>,
) -> Result<TextStyle> {
    if let Some(style) = cache.get(id) {
        return Ok(style.clone());
    }

    let mut chain: Vec<(&str, &StyleDefinition)> = Vec::new();
    let mut visited = BTreeSet::new();
    let mut base = TextStyle::default();
    let mut current = Some(id);

    while let Some(cur) = current {
        if let Some(style) = cache.get(cur) {
            base = style.clone();
            break;
        }
        if !visited.insert(cur) {
            let mut ids: Vec<String> = chain.iter().map(|(id, _)| id.to_string()).collect();
            ids.push(cur.to_string());
            return Err(Error::CyclicStyle { chain: ids });
        }
        match definitions.get(cur) {
            Some(definition) => {
                chain.push((cur, definition));
                current = definition.parent.as_deref();
            }
            None => {
                match chain.last() {
                    Some((child, _)) => log::warn!(
                        "style {child} inherits from undefined style {cur}; using the document default"
                    ),
                    None => log::warn!("style {cur} is not defined; using the document default"),
                }
                break;
            }
        }
    }

    for (id, definition) in chain.iter().rev() {
        definition.overrides.apply_to(&mut base);
        cache.insert(id.to_string(), base.clone());
    }
    Ok(base)
}

/// Copy resolved formatting onto every run. Dangling references are
/// redirected to the default style.
fn assign_run_styles(document: &mut Document) {
    let styles = &document.styles;
    let fallback = styles
        .resolved(DEFAULT_STYLE_ID)
        .cloned()
        .unwrap_or_default();

    for block in &mut document.blocks {
        let Block::Paragraph(paragraph) = block else {
            continue;
        };
        for run in &mut paragraph.runs {
            match styles.resolved(&run.style_id) {
                Some(style) => run.style = style.clone(),
                None => {
                    log::warn!(
                        "run references undefined style {}; using the document default",
                        run.style_id
                    );
                    run.style_id = DEFAULT_STYLE_ID.to_string();
                    run.style = fallback.clone();
                }
            }
        }
        // Redirected runs may now match their neighbours.
        for run in std::mem::take(&mut paragraph.runs) {
            paragraph.push_run(run);
        }
    }
}

/// Headings, list items, alignment and style names from paragraph shapes.
fn apply_layout(
    document: &mut Document,
    paragraphs: &[ParagraphRef],
    para_shapes: &BTreeMap<u32, ParaShape>,
    named_styles: &BTreeMap<u32, NamedStyle>,
) {
    let mut counters = [0u32; MAX_LEVEL];

    for reference in paragraphs {
        let Some(Block::Paragraph(paragraph)) = document.blocks.get_mut(reference.block.0) else {
            continue;
        };
        let named = reference.style.and_then(|id| named_styles.get(&id));
        if let Some(named) = named.filter(|n| !n.name.is_empty()) {
            paragraph.style.style_name = Some(named.name.clone());
        }

        let shape = reference
            .para_shape
            .and_then(|id| para_shapes.get(&id))
            .or_else(|| named.and_then(|n| n.para_shape).and_then(|id| para_shapes.get(&id)));
        let Some(shape) = shape else {
            continue;
        };

        paragraph.style.alignment = shape.alignment;
        let level = usize::from(shape.level).min(MAX_LEVEL - 1);
        match shape.heading {
            HeadingKind::Outline => {
                paragraph.style.heading_level = Some((shape.level + 1).min(6));
            }
            HeadingKind::Number => {
                counters[level] += 1;
                counters[level + 1..].iter_mut().for_each(|c| *c = 0);
                paragraph.style.list_info = Some(ListInfo::numbered(shape.level, counters[level]));
            }
            HeadingKind::Bullet => {
                paragraph.style.list_info = Some(ListInfo::bullet(shape.level));
            }
            HeadingKind::None => {}
        }
    }
}

//! HTML rendering.

use crate::model::{Alignment, Document, Image, ListInfo, ListStyle, Paragraph, Run, Section, Table};

use super::markdown::image_source;
use super::traverse::{walk, walk_blocks, Emitter, Visit};
use super::RenderOptions;

/// Body text color; runs in it need no `color` declaration.
const TEXT_COLOR: &str = "#000000";

/// Convert a document to HTML.
///
/// Produces a standalone page unless [`RenderOptions::html_fragment`] is set,
/// in which case only the section markup is returned.
pub fn to_html(doc: &Document, options: &RenderOptions) -> String {
    let mut emitter = HtmlEmitter::new(options, !options.html_fragment);
    walk(doc, &options.section_selection, &mut emitter);
    emitter.output
}

struct OpenList {
    style: ListStyle,
    level: u8,
    item_open: bool,
}

struct HtmlEmitter<'o> {
    options: &'o RenderOptions,
    page: bool,
    output: String,
    lists: Vec<OpenList>,
    closing_tag: &'static str,
}

impl<'o> HtmlEmitter<'o> {
    fn new(options: &'o RenderOptions, page: bool) -> Self {
        Self {
            options,
            page,
            output: String::new(),
            lists: Vec::new(),
            closing_tag: "</p>",
        }
    }

    fn close_list(&mut self) {
        if let Some(list) = self.lists.pop() {
            if list.item_open {
                self.output.push_str("</li>\n");
            }
            self.output.push_str(match list.style {
                ListStyle::Ordered => "</ol>\n",
                ListStyle::Unordered => "</ul>\n",
            });
        }
    }

    fn close_lists(&mut self) {
        while !self.lists.is_empty() {
            self.close_list();
        }
    }

    fn open_item(&mut self, info: &ListInfo) {
        while let Some(top) = self.lists.last() {
            let deeper = top.level > info.level;
            let switched = top.level == info.level && top.style != info.style;
            if deeper || switched {
                self.close_list();
            } else {
                break;
            }
        }

        match self.lists.last_mut() {
            Some(top) if top.level == info.level => {
                if top.item_open {
                    self.output.push_str("</li>\n");
                }
                top.item_open = true;
            }
            _ => {
                match (info.style, info.item_number) {
                    (ListStyle::Ordered, Some(start)) if start != 1 => {
                        self.output.push_str(&format!("<ol start=\"{}\">\n", start));
                    }
                    (ListStyle::Ordered, _) => self.output.push_str("<ol>\n"),
                    (ListStyle::Unordered, _) => self.output.push_str("<ul>\n"),
                }
                self.lists.push(OpenList {
                    style: info.style,
                    level: info.level,
                    item_open: true,
                });
            }
        }
        self.output.push_str("<li>");
    }

    fn cell_content(&self, doc: &Document, blocks: &[crate::model::BlockId]) -> String {
        let mut inner = HtmlEmitter::new(self.options, false);
        walk_blocks(doc, blocks, &mut inner);
        inner.close_lists();
        inner.output.trim_end().to_string()
    }

    fn run_css(&self, run: &Run) -> Vec<String> {
        let style = &run.style;
        let mut css = Vec::new();
        if style.bold {
            css.push("font-weight:bold".to_string());
        }
        if style.italic {
            css.push("font-style:italic".to_string());
        }
        let decorations: Vec<&str> = [
            (style.underline, "underline"),
            (style.strikethrough, "line-through"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();
        if !decorations.is_empty() {
            css.push(format!("text-decoration:{}", decorations.join(" ")));
        }
        if style.superscript {
            css.push("vertical-align:super".to_string());
        } else if style.subscript {
            css.push("vertical-align:sub".to_string());
        }
        if let Some(color) = style.color.as_ref().filter(|c| *c != TEXT_COLOR) {
            css.push(format!("color:{}", color));
        }
        if let Some(background) = &style.background_color {
            css.push(format!("background-color:{}", background));
        }
        if self.options.html_font_styles {
            css.push(format!("font-family:'{}'", style.font_name.replace('\'', "")));
            css.push(format!("font-size:{}pt", style.font_size));
        }
        css
    }
}

fn align_attr(alignment: Alignment) -> String {
    match alignment {
        Alignment::Left => String::new(),
        other => format!(" style=\"text-align:{}\"", other.as_css()),
    }
}

fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).replace('\n', "<br>")
}

impl Emitter for HtmlEmitter<'_> {
    fn start_document(&mut self, doc: &Document) {
        if !self.page {
            return;
        }
        let title = doc.metadata.title.as_deref().unwrap_or("Document");
        self.output.push_str("<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n");
        self.output.push_str("<meta charset=\"utf-8\">\n");
        self.output.push_str(&format!(
            "<title>{}</title>\n",
            html_escape::encode_text(title)
        ));
        self.output.push_str("</head>\n<body>\n");
    }

    fn end_document(&mut self, _doc: &Document) {
        self.close_lists();
        if self.page {
            self.output.push_str("</body>\n</html>\n");
        }
    }

    fn start_section(&mut self, _section: &Section) {
        self.output.push_str("<section>\n");
    }

    fn end_section(&mut self, _section: &Section) {
        self.close_lists();
        self.output.push_str("</section>\n");
    }

    fn start_paragraph(&mut self, paragraph: &Paragraph) -> Visit {
        if paragraph.is_empty() {
            return Visit::Skip;
        }

        if let Some(info) = &paragraph.style.list_info {
            self.open_item(info);
            self.closing_tag = "";
            return Visit::Children;
        }

        self.close_lists();
        let align = align_attr(paragraph.style.alignment);
        match paragraph.heading_level() {
            Some(level) => {
                let level = level.clamp(1, 6);
                self.output.push_str(&format!("<h{}{}>", level, align));
                self.closing_tag = match level {
                    1 => "</h1>\n",
                    2 => "</h2>\n",
                    3 => "</h3>\n",
                    4 => "</h4>\n",
                    5 => "</h5>\n",
                    _ => "</h6>\n",
                };
            }
            None => {
                self.output.push_str(&format!("<p{}>", align));
                self.closing_tag = "</p>\n";
            }
        }
        Visit::Children
    }

    fn run(&mut self, run: &Run) {
        let text = escape_text(&run.text);
        let css = self.run_css(run);
        if css.is_empty() {
            self.output.push_str(&text);
        } else {
            self.output
                .push_str(&format!("<span style=\"{}\">{}</span>", css.join(";"), text));
        }
    }

    fn end_paragraph(&mut self, _paragraph: &Paragraph) {
        self.output.push_str(self.closing_tag);
    }

    fn table(&mut self, doc: &Document, table: &Table) {
        self.close_lists();
        self.output.push_str("<table>\n");
        if let Some(caption) = &table.caption {
            self.output
                .push_str(&format!("<caption>{}</caption>\n", escape_text(caption)));
        }
        for row in table.rows_of_cells() {
            self.output.push_str("<tr>");
            for cell in row {
                let mut attrs = String::new();
                if cell.row_span > 1 {
                    attrs.push_str(&format!(" rowspan=\"{}\"", cell.row_span));
                }
                if cell.col_span > 1 {
                    attrs.push_str(&format!(" colspan=\"{}\"", cell.col_span));
                }
                let content = self.cell_content(doc, &cell.blocks);
                self.output
                    .push_str(&format!("<td{}>{}</td>", attrs, content));
            }
            self.output.push_str("</tr>\n");
        }
        self.output.push_str("</table>\n");
    }

    fn image(&mut self, doc: &Document, image: &Image) {
        self.close_lists();
        let src = image_source(doc, image, self.options);
        let alt = image.alt_text.as_deref().unwrap_or("");
        let mut attrs = format!(
            "src=\"{}\" alt=\"{}\"",
            html_escape::encode_double_quoted_attribute(&src),
            html_escape::encode_double_quoted_attribute(alt)
        );
        if let (Some(width), Some(height)) = (image.width, image.height) {
            attrs.push_str(&format!(" style=\"width:{}pt;height:{}pt\"", width, height));
        }

        self.output.push_str("<figure>\n");
        self.output.push_str(&format!("<img {}>\n", attrs));
        if !alt.trim().is_empty() {
            self.output
                .push_str(&format!("<figcaption>{}</figcaption>\n", escape_text(alt)));
        }
        self.output.push_str("</figure>\n");
    }
}

//! Rendering options and configuration.

use super::CleanupOptions;
use crate::parser::SectionSelection;

/// Options for rendering document content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix for image paths in output (e.g., "./images/")
    pub image_path_prefix: String,

    /// Inline images as data URIs instead of linking to files
    pub embed_images: bool,

    /// How to render tables with merged cells in Markdown
    pub table_fallback: TableFallback,

    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Include YAML frontmatter with metadata
    pub include_frontmatter: bool,

    /// Preserve line breaks from source
    pub preserve_line_breaks: bool,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,

    /// Emit only the body content of the HTML page
    pub html_fragment: bool,

    /// Emit font family and size on HTML spans
    pub html_font_styles: bool,

    /// Section selection
    pub section_selection: SectionSelection,

    /// Collect extraction statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Inline images as data URIs.
    pub fn with_embedded_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    /// Set the table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.table_fallback = fallback;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Enable or disable line break preservation.
    pub fn with_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: super::CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    /// Render HTML as a body fragment instead of a full page.
    pub fn with_html_fragment(mut self, fragment: bool) -> Self {
        self.html_fragment = fragment;
        self
    }

    /// Emit font family and size on HTML spans.
    pub fn with_html_font_styles(mut self, enabled: bool) -> Self {
        self.html_font_styles = enabled;
        self
    }

    /// Set section selection.
    pub fn with_sections(mut self, selection: SectionSelection) -> Self {
        self.section_selection = selection;
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_path_prefix: String::new(),
            embed_images: false,
            table_fallback: TableFallback::Html,
            max_heading_level: 6,
            include_frontmatter: false,
            preserve_line_breaks: false,
            list_marker: '-',
            escape_special_chars: true,
            cleanup: None,
            html_fragment: false,
            html_font_styles: false,
            section_selection: SectionSelection::All,
            collect_stats: false,
        }
    }
}

/// How to render tables with merged cells, which pipe tables cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFallback {
    /// Flatten spans into a pipe table
    Markdown,
    /// Use HTML table tags with rowspan/colspan
    #[default]
    Html,
    /// Use a boxed text grid
    Ascii,
}

impl std::str::FromStr for TableFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(TableFallback::Markdown),
            "html" => Ok(TableFallback::Html),
            "ascii" => Ok(TableFallback::Ascii),
            other => Err(format!("unknown table fallback: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_frontmatter(true)
            .with_max_heading(9)
            .with_table_fallback(TableFallback::Ascii)
            .with_sections(SectionSelection::Range(1..=2));

        assert!(options.include_frontmatter);
        assert_eq!(options.max_heading_level, 6);
        assert_eq!(options.table_fallback, TableFallback::Ascii);
        assert!(!options.section_selection.includes(3));
    }

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.table_fallback, TableFallback::Html);
        assert!(options.escape_special_chars);
        assert!(!options.html_fragment);
    }

    #[test]
    fn test_table_fallback_from_str() {
        assert_eq!("HTML".parse::<TableFallback>(), Ok(TableFallback::Html));
        assert_eq!("md".parse::<TableFallback>(), Ok(TableFallback::Markdown));
        assert!("grid".parse::<TableFallback>().is_err());
    }
}

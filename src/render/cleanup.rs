//! Text cleanup pipeline for rendered output.
//!
//! Every stage only removes or normalizes characters, so the presets never
//! introduce markup into plain text.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Minimal cleanup: Unicode NFC normalization and space runs
    Minimal,
    /// Standard cleanup: NFC + character filtering + blank line limit
    #[default]
    Standard,
    /// Aggressive cleanup: also drops private-use glyphs and joins list markers
    Aggressive,
}

impl std::str::FromStr for CleanupPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(CleanupPreset::Minimal),
            "standard" => Ok(CleanupPreset::Standard),
            "aggressive" => Ok(CleanupPreset::Aggressive),
            other => Err(format!("unknown cleanup preset: {other}")),
        }
    }
}

/// Options for text cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Standardize bullet characters (●, ○, ■ → •)
    pub standardize_bullets: bool,

    /// Replace ideographic and no-break spaces with ASCII spaces
    pub normalize_spaces: bool,

    /// Remove control characters other than tab and newline
    pub remove_control_chars: bool,

    /// Remove Private Use Area (PUA) characters (old Hangul glyph codes)
    pub remove_pua: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Merge bullet/number markers with the following line
    pub merge_list_markers: bool,

    /// Collapse runs of 3+ spaces
    pub normalize_whitespace: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,

    /// Preserve YAML frontmatter during cleanup
    pub preserve_frontmatter: bool,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            standardize_bullets: false,
            normalize_spaces: false,
            remove_control_chars: false,
            remove_pua: false,
            remove_replacement_char: false,
            merge_list_markers: false,
            normalize_whitespace: true,
            max_consecutive_newlines: 0,
            preserve_frontmatter: true,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            standardize_bullets: true,
            normalize_spaces: true,
            remove_control_chars: true,
            remove_pua: false,
            remove_replacement_char: true,
            merge_list_markers: false,
            normalize_whitespace: true,
            max_consecutive_newlines: 2,
            preserve_frontmatter: true,
        }
    }

    /// Aggressive cleanup options.
    pub fn aggressive() -> Self {
        Self {
            remove_pua: true,
            merge_list_markers: true,
            ..Self::standard()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Compiled patterns used by the pipeline.
struct Patterns {
    spaces: Regex,
    bullet_marker: Regex,
    number_marker: Regex,
    korean_marker: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            spaces: Regex::new(r"[ ]{3,}")?,
            bullet_marker: Regex::new(r"(?m)^([•■□▪▸►◆◇➤※-])[ \t]*\n[ \t]*")?,
            number_marker: Regex::new(r"(?m)^(\(?\d{1,3}[.)][ \t]*)\n[ \t]*")?,
            korean_marker: Regex::new(r"(?m)^([가-힣][.)][ \t]*)\n[ \t]*")?,
        })
    }
}

/// Text cleanup pipeline.
pub struct CleanupPipeline {
    options: CleanupOptions,
    patterns: Option<Patterns>,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        let patterns = match Patterns::compile() {
            Ok(patterns) => Some(patterns),
            Err(e) => {
                log::warn!("cleanup patterns unavailable: {e}");
                None
            }
        };
        Self { options, patterns }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        let frontmatter = if self.options.preserve_frontmatter {
            split_frontmatter(text)
        } else {
            None
        };

        match frontmatter {
            Some((fm, content)) => format!("{}\n{}", fm, self.process_content(content)),
            None => self.process_content(text),
        }
    }

    fn process_content(&self, text: &str) -> String {
        let mut result: String = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        let options = &self.options;
        result = result
            .chars()
            .filter_map(|c| match c {
                '●' | '○' | '◦' | '▶' | '▷' | '◆' | '◇' | '■' | '□' | '▪' | '▫'
                    if options.standardize_bullets =>
                {
                    Some('•')
                }
                '\u{3000}' | '\u{00A0}' | '\u{2007}' | '\u{202F}' if options.normalize_spaces => {
                    Some(' ')
                }
                '\u{FFFD}' if options.remove_replacement_char => None,
                c if options.remove_control_chars && c.is_control() && c != '\n' && c != '\t' => {
                    None
                }
                c if options.remove_pua && is_private_use(c) => None,
                c => Some(c),
            })
            .collect();

        if let Some(patterns) = &self.patterns {
            if options.merge_list_markers {
                result = patterns.bullet_marker.replace_all(&result, "$1 ").into_owned();
                result = patterns.number_marker.replace_all(&result, "$1").into_owned();
                result = patterns.korean_marker.replace_all(&result, "$1").into_owned();
            }
            if options.normalize_whitespace {
                result = patterns.spaces.replace_all(&result, "  ").into_owned();
            }
        }

        if options.max_consecutive_newlines > 0 {
            result = limit_newlines(&result, options.max_consecutive_newlines as usize);
        }

        result.trim().to_string()
    }
}

impl Default for CleanupPipeline {
    fn default() -> Self {
        Self::new(CleanupOptions::default())
    }
}

/// Split `---\n...\n---\n` from the start of the text.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let stripped = text.strip_prefix("---\n")?;
    let end = stripped.find("\n---\n")?;
    Some(text.split_at(4 + end + 5))
}

fn is_private_use(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}

/// Replace runs of more than `max` newlines with exactly `max`.
fn limit_newlines(text: &str, max: usize) -> String {
    let mut result = String::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c == '\n' {
            run += 1;
            if run > max {
                continue;
            }
        } else {
            run = 0;
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_normalization() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Minimal);
        // Decomposed jamo compose into one syllable.
        let result = pipeline.process("\u{1100}\u{1161}");
        assert_eq!(result, "가");
    }

    #[test]
    fn test_patterns_compile() {
        assert!(Patterns::compile().is_ok());
    }

    #[test]
    fn test_bullet_standardization() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        let result = pipeline.process("● 항목 1\n○ 항목 2\n■ 항목 3");
        assert_eq!(result, "• 항목 1\n• 항목 2\n• 항목 3");
    }

    #[test]
    fn test_character_filters() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        assert_eq!(pipeline.process("Hello\u{FFFD}World"), "HelloWorld");
        assert_eq!(pipeline.process("가\u{3000}나\u{0007}"), "가 나");
        assert_eq!(pipeline.process("a\tb"), "a\tb");
    }

    #[test]
    fn test_pua_removed_only_when_aggressive() {
        let text = "옛\u{E0BC}글";
        assert_eq!(CleanupPipeline::from_preset(CleanupPreset::Standard).process(text), text);
        assert_eq!(
            CleanupPipeline::from_preset(CleanupPreset::Aggressive).process(text),
            "옛글"
        );
    }

    #[test]
    fn test_newline_limit() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        assert_eq!(pipeline.process("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(limit_newlines("a\n\n\nb\nc", 1), "a\nb\nc");
    }

    #[test]
    fn test_whitespace_runs() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Minimal);
        assert_eq!(pipeline.process("a     b"), "a  b");
    }

    #[test]
    fn test_frontmatter_preservation() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Aggressive);
        let text = "---\ntitle: Test\n---\n\nContent with   extra   spaces.";
        let result = pipeline.process(text);
        assert!(result.starts_with("---\ntitle: Test\n---\n"));
        assert!(result.ends_with("Content with  extra  spaces."));
    }

    #[test]
    fn test_merge_list_markers() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Aggressive);
        assert_eq!(pipeline.process("• \n주의사항을 확인하십시오."), "• 주의사항을 확인하십시오.");
        assert_eq!(pipeline.process("01. \n인명에 영향이 큰 기기"), "01. 인명에 영향이 큰 기기");
        assert_eq!(pipeline.process("가. \n목적"), "가. 목적");
    }
}

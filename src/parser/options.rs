//! Parsing options and configuration.

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// Options for parsing HWP and HWPX documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Whether to load embedded resources (images)
    pub extract_resources: bool,

    /// Which body sections to parse
    pub sections: SectionSelection,

    /// Reject inputs larger than this many bytes (None = unlimited)
    pub max_input_bytes: Option<u64>,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable resource extraction.
    pub fn with_resources(mut self, extract: bool) -> Self {
        self.extract_resources = extract;
        self
    }

    /// Extract text and structure only, skipping embedded binaries.
    pub fn text_only(mut self) -> Self {
        self.extract_resources = false;
        self
    }

    /// Set section selection.
    pub fn with_sections(mut self, sections: SectionSelection) -> Self {
        self.sections = sections;
        self
    }

    /// Set the input size limit in bytes.
    pub fn with_max_input_bytes(mut self, limit: u64) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }

    /// Fail with [`Error::InputTooLarge`] when `size` exceeds the limit.
    pub fn check_input_size(&self, size: u64) -> Result<()> {
        match self.max_input_bytes {
            Some(limit) if size > limit => Err(Error::InputTooLarge { size, limit }),
            _ => Ok(()),
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            extract_resources: true,
            sections: SectionSelection::All,
            max_input_bytes: None,
        }
    }
}

/// Selection of body sections (1-indexed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SectionSelection {
    /// Every section
    #[default]
    All,
    /// A range of sections (inclusive)
    Range(RangeInclusive<u32>),
    /// Specific sections
    Indices(Vec<u32>),
}

impl SectionSelection {
    /// Check if a section number should be included.
    pub fn includes(&self, section: u32) -> bool {
        match self {
            SectionSelection::All => true,
            SectionSelection::Range(range) => range.contains(&section),
            SectionSelection::Indices(indices) => indices.contains(&section),
        }
    }

    /// Check a zero-based section index.
    pub fn includes_index(&self, index: usize) -> bool {
        u32::try_from(index + 1).is_ok_and(|n| self.includes(n))
    }

    /// Parse a selection string (e.g., "all", "2-4", "1,3,5-7").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(SectionSelection::All);
        }

        let invalid = || Error::InvalidSectionRange(s.to_string());
        let number = |part: &str| -> Result<u32> {
            match part.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid()),
            }
        };
        let range = |part: &str| -> Result<Option<RangeInclusive<u32>>> {
            let Some((start, end)) = part.split_once('-') else {
                return Ok(None);
            };
            let (start, end) = (number(start)?, number(end)?);
            if start > end {
                return Err(invalid());
            }
            Ok(Some(start..=end))
        };

        if !s.contains(',') {
            if let Some(range) = range(s)? {
                return Ok(SectionSelection::Range(range));
            }
        }

        let mut indices = Vec::new();
        for part in s.split(',') {
            match range(part)? {
                Some(range) => indices.extend(range),
                None => indices.push(number(part)?),
            }
        }
        indices.sort_unstable();
        indices.dedup();
        Ok(SectionSelection::Indices(indices))
    }
}

impl std::str::FromStr for SectionSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

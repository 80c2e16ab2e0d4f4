//! HWP and HWPX document parser.

use std::io::Read;
use std::path::Path;

use crate::container::{Container, DocumentFlags, FormatVersion, Part};
use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use crate::model::{Document, Metadata};

use super::builder::{self, UnresolvedDocument};
use super::options::ParseOptions;
use super::record::RecordTree;
use super::resolver;
use super::tree::SourceTree;
use super::xml::ElementTree;

/// HWP/HWPX document parser.
///
/// Opening validates the container; [`HwpParser::parse`] runs decode, build
/// and resolve and returns a read-only [`Document`].
pub struct HwpParser {
    container: Container,
    options: ParseOptions,
}

impl HwpParser {
    /// Open a document file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a document file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        options.check_input_size(std::fs::metadata(path)?.len())?;
        let data = std::fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Open a document from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Open a document from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        options.check_input_size(data.len() as u64)?;
        let container = Container::open_with_assets(data, options.extract_resources)?;
        Ok(Self { container, options })
    }

    /// Open a document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Open a document from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        match options.max_input_bytes {
            // Read one byte past the limit so oversized input is detected
            // without buffering all of it.
            Some(limit) => {
                reader.take(limit.saturating_add(1)).read_to_end(&mut data)?;
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut data)?;
            }
        }
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse the document and return a structured Document.
    pub fn parse(&self) -> Result<Document> {
        let unresolved = match self.container.format {
            SourceFormat::Hwp5 => self.build(RecordTree::decode)?,
            SourceFormat::Hwpx => self.build(ElementTree::parse)?,
        };
        let mut document = resolver::resolve(unresolved)?;
        document.metadata = self.metadata();
        Ok(document)
    }

    fn build<T, F>(&self, decode: F) -> Result<UnresolvedDocument>
    where
        T: SourceTree,
        F: Fn(&str, &[u8]) -> Result<T>,
    {
        let header = decode_part(&self.container.header, &decode)?;

        let total = self.container.sections.len();
        let mut sections = Vec::new();
        for (index, part) in self.container.sections.iter().enumerate() {
            if self.options.sections.includes_index(index) {
                sections.push((index, decode_part(part, &decode)?));
            }
        }
        if sections.is_empty() && total > 0 {
            return Err(Error::InvalidSectionRange(format!(
                "{:?} selects none of {total} section(s)",
                self.options.sections
            )));
        }

        builder::build(
            &self.container,
            &header,
            &sections,
            self.options.extract_resources,
        )
    }

    /// Document metadata from the container.
    fn metadata(&self) -> Metadata {
        let container = &self.container;
        let properties = container.properties.clone();
        let mut metadata = Metadata::with_format(container.format, container.version.to_string());
        metadata.compressed = container.flags.compressed;
        metadata.title = properties.title;
        metadata.author = properties.author;
        metadata.subject = properties.subject;
        metadata.keywords = properties.keywords;
        metadata.comments = properties.comments;
        metadata.last_saved_by = properties.last_saved_by;
        metadata.created = properties.created;
        metadata.modified = properties.modified;
        metadata.preview_text = container.preview_text.clone();
        metadata.section_count = container.sections.len() as u32;
        metadata
    }

    /// Get the container variant.
    pub fn format(&self) -> SourceFormat {
        self.container.format
    }

    /// Get the format version.
    pub fn version(&self) -> FormatVersion {
        self.container.version
    }

    /// Get the document flags.
    pub fn flags(&self) -> DocumentFlags {
        self.container.flags
    }

    /// Get the number of body sections in the source.
    pub fn section_count(&self) -> usize {
        self.container.sections.len()
    }

    /// Get the opened container.
    pub fn container(&self) -> &Container {
        &self.container
    }
}

fn decode_part<T, F>(part: &Part, decode: &F) -> Result<T>
where
    F: Fn(&str, &[u8]) -> Result<T>,
{
    decode(&part.name, &part.data)
}

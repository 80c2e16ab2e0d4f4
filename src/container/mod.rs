//! Container reader.
//!
//! Opens the raw byte buffer, validates the outer container (OLE compound file
//! for HWP 5, zip package for HWPX) and exposes its parts by logical role:
//! the header part, body sections in source order, the optional settings part
//! and embedded binary assets keyed by identifier. Parts are copied into owned
//! buffers; compressed HWP 5 streams are inflated here.

mod compound;
mod package;
mod summary;

use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Version of the HWP format that wrote the document (`major.minor.micro.build`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u8,
    pub minor: u8,
    pub micro: u8,
    pub build: u8,
}

impl FormatVersion {
    /// Create a version from its four components.
    pub fn new(major: u8, minor: u8, micro: u8, build: u8) -> Self {
        Self {
            major,
            minor,
            micro,
            build,
        }
    }

    /// Decode the packed `0xMMnnPPrr` form used by the HWP 5 file header.
    pub fn from_packed(value: u32) -> Self {
        let [build, micro, minor, major] = value.to_le_bytes();
        Self::new(major, minor, micro, build)
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.micro, self.build)
    }
}

/// Document-level flags read from the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentFlags {
    /// Body streams are raw-deflate compressed.
    pub compressed: bool,
    /// Password protected.
    pub encrypted: bool,
    /// Distribution (read-only, locked) document.
    pub distributed: bool,
}

/// Descriptive properties stored beside the content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Vec<String>,
    pub comments: Option<String>,
    pub last_saved_by: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// A named part's bytes.
#[derive(Debug, Clone)]
pub struct Part {
    /// Path of the part inside its container.
    pub name: String,
    /// Decompressed content.
    pub data: Vec<u8>,
}

impl Part {
    pub(crate) fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// An embedded binary (usually an image).
#[derive(Debug, Clone)]
pub struct Asset {
    /// Identifier referenced from the document body.
    pub id: String,
    /// Path inside the container.
    pub path: String,
    /// Declared media type, if the container records one.
    pub media_type: Option<String>,
    /// Stored bytes. HWP 5 assets may still be deflated, see [`Asset::compressed`].
    pub data: Vec<u8>,
    /// Whether the stored bytes are raw deflate unless the item says otherwise.
    pub compressed: bool,
}

/// Uniform view over an opened HWP or HWPX container.
#[derive(Debug, Clone)]
pub struct Container {
    pub format: SourceFormat,
    pub version: FormatVersion,
    pub flags: DocumentFlags,
    /// Header part: `DocInfo` stream or `Contents/header.xml`.
    pub header: Part,
    /// Body sections in document order.
    pub sections: Vec<Part>,
    /// Application settings part (`settings.xml`), HWPX only.
    pub settings: Option<Part>,
    /// Embedded binaries keyed by identifier.
    pub assets: BTreeMap<String, Asset>,
    pub properties: DocumentProperties,
    /// Preview text saved by the authoring application.
    pub preview_text: Option<String>,
}

impl Container {
    /// Open a container, loading embedded assets.
    pub fn open(data: &[u8]) -> Result<Self> {
        Self::open_with_assets(data, true)
    }

    /// Open a container. Assets are skipped when `load_assets` is false.
    pub fn open_with_assets(data: &[u8], load_assets: bool) -> Result<Self> {
        let container = match detect_format_from_bytes(data)? {
            SourceFormat::Hwp5 => compound::read(data, load_assets)?,
            SourceFormat::Hwpx => package::read(data, load_assets)?,
        };
        log::debug!(
            "opened {} container v{}: {} section(s), {} asset(s)",
            container.format,
            container.version,
            container.sections.len(),
            container.assets.len()
        );
        Ok(container)
    }

    /// Look up an embedded asset.
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }
}

/// Inflate a raw deflate stream (no zlib header), as used by HWP 5.
pub(crate) fn inflate(part: &str, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 4);
    flate2::read::DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::Compression {
            part: part.to_string(),
            detail: e.to_string(),
        })?;
    Ok(out)
}

pub(crate) fn le_u16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn le_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Decode UTF-16LE bytes, stopping at the first NUL.
pub(crate) fn utf16le_string(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

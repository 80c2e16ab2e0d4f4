//! HWP/HWPX format detection.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Source container variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// HWP 5.x: binary records inside an OLE compound file.
    Hwp5,
    /// HWPX: OWPML XML parts inside a zip package.
    Hwpx,
}

impl SourceFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Hwp5 => "hwp",
            SourceFormat::Hwpx => "hwpx",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Hwp5 => write!(f, "HWP 5 (compound file)"),
            SourceFormat::Hwpx => write!(f, "HWPX (zip package)"),
        }
    }
}

/// Compound file magic bytes.
pub(crate) const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
/// Zip local file header magic bytes.
pub(crate) const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the container format from a file path.
///
/// # Example
/// ```no_run
/// use unhwp::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("document.hwp").unwrap();
/// println!("Format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(CFB_MAGIC.len());
    BufReader::new(file)
        .take(CFB_MAGIC.len() as u64)
        .read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the container format from the leading bytes of a file.
///
/// # Returns
/// * `Ok(SourceFormat)` when a known signature is present
/// * `Err(Error::Format)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.starts_with(CFB_MAGIC) {
        Ok(SourceFormat::Hwp5)
    } else if data.starts_with(ZIP_MAGIC) {
        Ok(SourceFormat::Hwpx)
    } else {
        Err(Error::Format(
            "no compound-file or zip signature found".to_string(),
        ))
    }
}

/// Check if a file carries an HWP or HWPX signature.
pub fn is_hwp<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes carry an HWP or HWPX signature.
pub fn is_hwp_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

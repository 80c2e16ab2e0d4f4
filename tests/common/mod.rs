//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

#[path = "../../src/test_support.rs"]
mod support;

pub use support::*;

/// Write `data` to a temporary file with the given extension.
pub fn write_temp(data: &[u8], extension: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .unwrap();
    std::io::Write::write_all(&mut file, data).unwrap();
    file
}

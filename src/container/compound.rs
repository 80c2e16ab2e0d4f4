//! HWP 5 compound file backend.

use super::{
    inflate, le_u16, le_u32, summary, utf16le_string, Asset, Container, DocumentFlags,
    DocumentProperties, FormatVersion, Part,
};
use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use cfb::CompoundFile;
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};

const LAYER: &str = "compound file";
const HEADER_LEN: usize = 512;
const DIFAT_IN_HEADER: usize = 109;
const MAX_REGULAR_SECTOR: u32 = 0xFFFF_FFFA;
const FREE_SECTOR: u32 = 0xFFFF_FFFF;

const FILE_HEADER_LEN: usize = 256;
const FILE_HEADER_SIGNATURE: &[u8] = b"HWP Document File";

const FLAG_COMPRESSED: u32 = 1 << 0;
const FLAG_PASSWORD: u32 = 1 << 1;
const FLAG_DISTRIBUTION: u32 = 1 << 2;

type Compound<'a> = CompoundFile<Cursor<&'a [u8]>>;

pub(super) fn read(data: &[u8], load_assets: bool) -> Result<Container> {
    validate_extent(data)?;

    let mut file = CompoundFile::open(Cursor::new(data)).map_err(|e| io_error(LAYER, e))?;

    let file_header = read_stream(&mut file, "FileHeader")?
        .ok_or_else(|| Error::Format("compound file has no FileHeader stream".into()))?;
    let (version, flags) = parse_file_header(&file_header)?;
    if flags.encrypted || flags.distributed {
        return Err(Error::Encrypted);
    }

    let doc_info = read_stream(&mut file, "DocInfo")?
        .ok_or_else(|| Error::Structural("missing DocInfo stream".into()))?;
    let header = Part::new("DocInfo", unpack(&flags, "DocInfo", doc_info)?);

    let mut sections = Vec::new();
    for (_, name) in numbered_streams(&file, "BodyText", "Section") {
        let path = format!("BodyText/{name}");
        if let Some(raw) = read_stream(&mut file, &path)? {
            let data = unpack(&flags, &path, raw)?;
            sections.push(Part::new(path, data));
        }
    }
    if sections.is_empty() {
        return Err(Error::Structural("no BodyText sections".into()));
    }

    let mut assets = BTreeMap::new();
    if load_assets {
        for (id, name) in hex_streams(&file, "BinData", "BIN") {
            let path = format!("BinData/{name}");
            if let Some(data) = read_stream(&mut file, &path)? {
                let id = id.to_string();
                assets.insert(
                    id.clone(),
                    Asset {
                        id,
                        path,
                        media_type: None,
                        data,
                        compressed: flags.compressed,
                    },
                );
            }
        }
    }

    let properties = match read_stream(&mut file, "\u{5}HwpSummaryInformation")? {
        Some(raw) => summary::parse(&raw).unwrap_or_else(|| {
            log::warn!("ignoring unreadable summary information stream");
            DocumentProperties::default()
        }),
        None => DocumentProperties::default(),
    };

    let preview_text = read_stream(&mut file, "PrvText")?
        .map(|raw| utf16le_string(&raw))
        .filter(|text| !text.trim().is_empty());

    Ok(Container {
        format: SourceFormat::Hwp5,
        version,
        flags,
        header,
        sections,
        settings: None,
        assets,
        properties,
        preview_text,
    })
}

/// Check the compound file header and that every sector the FAT marks as
/// in use is present in the buffer.
fn validate_extent(data: &[u8]) -> Result<()> {
    if data.len() < HEADER_LEN {
        return Err(Error::truncated(
            LAYER,
            data.len() as u64,
            "header needs 512 bytes",
        ));
    }

    let field16 = |offset| le_u16(data, offset).unwrap_or_default();
    let field32 = |offset| le_u32(data, offset).unwrap_or_default();

    let major = field16(26);
    let shift = match major {
        3 | 4 => field16(30),
        other => {
            return Err(Error::UnsupportedVersion(format!(
                "compound file major version {other}"
            )))
        }
    };
    if !((major == 3 && shift == 9) || (major == 4 && shift == 12)) {
        return Err(Error::Format(format!(
            "compound file v{major} with sector shift {shift}"
        )));
    }
    let sector_len = 1usize << shift;
    let entries_per_sector = sector_len / 4;
    let len = data.len() as u64;

    let fat_count = field32(44) as usize;
    let mut fat_sectors: Vec<u32> = (0..DIFAT_IN_HEADER)
        .map(|i| field32(76 + i * 4))
        .filter(|&s| s <= MAX_REGULAR_SECTOR)
        .collect();

    let mut next = field32(68);
    let mut remaining = field32(72);
    while next <= MAX_REGULAR_SECTOR && remaining > 0 {
        let difat = sector_at(data, next, sector_len, "DIFAT")?;
        fat_sectors.extend(
            (0..entries_per_sector - 1)
                .filter_map(|i| le_u32(difat, i * 4))
                .filter(|&s| s <= MAX_REGULAR_SECTOR),
        );
        next = le_u32(difat, sector_len - 4).unwrap_or(FREE_SECTOR);
        remaining -= 1;
    }
    fat_sectors.truncate(fat_count);

    let mut last_used: Option<u64> = None;
    for (k, &index) in fat_sectors.iter().enumerate() {
        let fat = sector_at(data, index, sector_len, "FAT")?;
        for j in 0..entries_per_sector {
            if le_u32(fat, j * 4) != Some(FREE_SECTOR) {
                last_used = Some((k * entries_per_sector + j) as u64);
            }
        }
    }

    if let Some(last) = last_used {
        let required = (last + 2) * sector_len as u64;
        if required > len {
            return Err(Error::truncated(
                LAYER,
                len,
                format!("sector {last} requires {required} bytes"),
            ));
        }
    }
    Ok(())
}

fn sector_at<'a>(data: &'a [u8], index: u32, sector_len: usize, what: &str) -> Result<&'a [u8]> {
    let start = (index as u64 + 1) * sector_len as u64;
    let end = start + sector_len as u64;
    if end > data.len() as u64 {
        return Err(Error::truncated(
            LAYER,
            start,
            format!("{what} sector {index} lies past the end of input"),
        ));
    }
    Ok(&data[start as usize..end as usize])
}

fn parse_file_header(data: &[u8]) -> Result<(FormatVersion, DocumentFlags)> {
    if data.len() < FILE_HEADER_LEN {
        return Err(Error::truncated(
            "FileHeader",
            data.len() as u64,
            "file header needs 256 bytes",
        ));
    }
    if !data.starts_with(FILE_HEADER_SIGNATURE) {
        return Err(Error::Format("missing HWP file header signature".into()));
    }

    let version = FormatVersion::from_packed(le_u32(data, 32).unwrap_or_default());
    if version.major != 5 {
        return Err(Error::UnsupportedVersion(format!("HWP {version}")));
    }

    let properties = le_u32(data, 36).unwrap_or_default();
    let flags = DocumentFlags {
        compressed: properties & FLAG_COMPRESSED != 0,
        encrypted: properties & FLAG_PASSWORD != 0,
        distributed: properties & FLAG_DISTRIBUTION != 0,
    };
    Ok((version, flags))
}

fn unpack(flags: &DocumentFlags, part: &str, raw: Vec<u8>) -> Result<Vec<u8>> {
    if flags.compressed {
        inflate(part, &raw)
    } else {
        Ok(raw)
    }
}

fn read_stream(file: &mut Compound<'_>, path: &str) -> Result<Option<Vec<u8>>> {
    let path = format!("/{path}");
    if !file.is_stream(&path) {
        return Ok(None);
    }
    let mut stream = file.open_stream(&path).map_err(|e| io_error(&path, e))?;
    let mut data = Vec::new();
    stream
        .read_to_end(&mut data)
        .map_err(|e| io_error(&path, e))?;
    Ok(Some(data))
}

/// Streams under `storage` named `{prefix}{decimal}`, sorted by number.
fn numbered_streams(file: &Compound<'_>, storage: &str, prefix: &str) -> Vec<(u32, String)> {
    streams_with(file, storage, |name| {
        name.strip_prefix(prefix)?.parse::<u32>().ok()
    })
}

/// Streams under `storage` named `{prefix}{hex}.{ext}`, sorted by id.
fn hex_streams(file: &Compound<'_>, storage: &str, prefix: &str) -> Vec<(u32, String)> {
    streams_with(file, storage, |name| {
        let stem = name.strip_prefix(prefix)?;
        let hex = stem.split('.').next()?;
        u32::from_str_radix(hex, 16).ok()
    })
}

fn streams_with<F>(file: &Compound<'_>, storage: &str, key: F) -> Vec<(u32, String)>
where
    F: Fn(&str) -> Option<u32>,
{
    let mut found: Vec<(u32, String)> = match file.read_storage(format!("/{storage}")) {
        Ok(entries) => entries
            .filter(|entry| entry.is_stream())
            .filter_map(|entry| key(entry.name()).map(|n| (n, entry.name().to_string())))
            .collect(),
        Err(_) => Vec::new(),
    };
    found.sort();
    found
}

fn io_error(part: &str, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::truncated(part, 0, err.to_string()),
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
            Error::Format(format!("{part}: {err}"))
        }
        _ => Error::Io(err),
    }
}

//! HWPX zip package backend.

use super::{le_u16, le_u32, Asset, Container, DocumentFlags, DocumentProperties, FormatVersion, Part};
use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

const LAYER: &str = "zip package";
const END_RECORD_SIGNATURE: &[u8] = b"PK\x05\x06";
const END_RECORD_LEN: usize = 22;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;
/// Largest buffer reserved up front from a declared entry size.
const MAX_PREALLOCATION: usize = 1 << 20;

const MIMETYPE: &str = "application/hwp+zip";
const MIMETYPE_PART: &str = "mimetype";
const VERSION_PART: &str = "version.xml";
const MANIFEST_PART: &str = "META-INF/manifest.xml";
const CONTENT_PART: &str = "Contents/content.hpf";
const HEADER_PART: &str = "Contents/header.xml";
const SETTINGS_PART: &str = "settings.xml";
const PREVIEW_PART: &str = "Preview/PrvText.txt";
const BINDATA_DIR: &str = "BinData/";

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Entries of `Contents/content.hpf`.
#[derive(Debug, Default)]
struct PackageManifest {
    /// `(id, href, media-type)` in declaration order.
    items: Vec<(String, String, Option<String>)>,
    /// Item ids in reading order.
    spine: Vec<String>,
    /// Metadata name/value pairs (`title`, `creator`, `CreatedDate`, ...).
    metadata: Vec<(String, String)>,
}

pub(super) fn read(data: &[u8], load_assets: bool) -> Result<Container> {
    validate_end_record(data)?;

    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(|e| zip_error(LAYER, e))?;
    let names: Vec<String> = archive.file_names().map(String::from).collect();

    if let Some(mimetype) = read_entry(&mut archive, MIMETYPE_PART)? {
        let mimetype = String::from_utf8_lossy(&mimetype);
        if mimetype.trim() != MIMETYPE {
            return Err(Error::Format(format!(
                "unexpected package mimetype {:?}",
                mimetype.trim()
            )));
        }
    }

    let encrypted = match read_entry(&mut archive, MANIFEST_PART)? {
        Some(manifest) => String::from_utf8_lossy(&manifest).contains("encryption-data"),
        None => false,
    };
    if encrypted {
        return Err(Error::Encrypted);
    }

    let version = match read_entry(&mut archive, VERSION_PART)? {
        Some(xml) => parse_version(&xml)?,
        None => FormatVersion::new(5, 0, 0, 0),
    };
    if version.major != 5 {
        return Err(Error::UnsupportedVersion(format!("HWPX {version}")));
    }

    let manifest = match read_entry(&mut archive, CONTENT_PART)? {
        Some(xml) => parse_manifest(&xml)?,
        None => PackageManifest::default(),
    };

    let header = read_entry(&mut archive, HEADER_PART)?
        .map(|data| Part::new(HEADER_PART, data))
        .ok_or_else(|| Error::Structural(format!("missing {HEADER_PART}")))?;

    let mut sections = Vec::new();
    for path in section_paths(&manifest, &names) {
        if let Some(data) = read_entry(&mut archive, &path)? {
            sections.push(Part::new(path, data));
        }
    }
    if sections.is_empty() {
        return Err(Error::Structural("no section parts in package".into()));
    }

    let settings = read_entry(&mut archive, SETTINGS_PART)?.map(|data| Part::new(SETTINGS_PART, data));
    let preview_text = read_entry(&mut archive, PREVIEW_PART)?
        .map(|data| String::from_utf8_lossy(&data).trim().to_string())
        .filter(|text| !text.is_empty());

    let mut assets = BTreeMap::new();
    if load_assets {
        for (id, path, media_type) in asset_entries(&manifest, &names) {
            if let Some(data) = read_entry(&mut archive, &path)? {
                assets.insert(
                    id.clone(),
                    Asset {
                        id,
                        path,
                        media_type,
                        data,
                        compressed: false,
                    },
                );
            }
        }
    }

    Ok(Container {
        format: SourceFormat::Hwpx,
        version,
        flags: DocumentFlags::default(),
        header,
        sections,
        settings,
        assets,
        properties: properties_from(&manifest),
        preview_text,
    })
}

/// Locate the end-of-central-directory record and check that it and the
/// central directory it points to are complete.
fn validate_end_record(data: &[u8]) -> Result<()> {
    let window = data.len().saturating_sub(END_RECORD_LEN + MAX_COMMENT_LEN);
    let position = data[window..]
        .windows(END_RECORD_SIGNATURE.len())
        .rposition(|w| w == END_RECORD_SIGNATURE)
        .map(|p| p + window)
        .ok_or_else(|| {
            Error::truncated(
                LAYER,
                data.len() as u64,
                "end of central directory record not found",
            )
        })?;

    let record_end = position + END_RECORD_LEN;
    if record_end > data.len() {
        return Err(Error::truncated(
            LAYER,
            position as u64,
            "end of central directory record cut short",
        ));
    }
    let comment_len = le_u16(data, position + 20).unwrap_or_default() as usize;
    if record_end + comment_len > data.len() {
        return Err(Error::truncated(
            LAYER,
            record_end as u64,
            "archive comment cut short",
        ));
    }

    let directory_len = le_u32(data, position + 12).unwrap_or_default();
    let directory_start = le_u32(data, position + 16).unwrap_or_default();
    if directory_start != u32::MAX
        && directory_start as u64 + directory_len as u64 > position as u64
    {
        return Err(Error::truncated(
            LAYER,
            directory_start as u64,
            "central directory extends past its end record",
        ));
    }
    Ok(())
}

fn read_entry(archive: &mut Archive<'_>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(zip_error(name, e)),
    };
    let declared = usize::try_from(entry.size()).unwrap_or(usize::MAX);
    let mut data = Vec::with_capacity(declared.min(MAX_PREALLOCATION));
    entry.read_to_end(&mut data)?;
    Ok(Some(data))
}

fn zip_error(part: &str, err: ZipError) -> Error {
    match err {
        ZipError::Io(e) => Error::Io(e),
        ZipError::FileNotFound => Error::Structural(format!("missing {part}")),
        other => {
            let message = other.to_string();
            if message.contains("assword") {
                Error::Encrypted
            } else {
                Error::Format(format!("{part}: {message}"))
            }
        }
    }
}

/// Section part paths: spine order when the manifest lists sections,
/// otherwise `Contents/sectionN.xml` by number.
fn section_paths(manifest: &PackageManifest, names: &[String]) -> Vec<String> {
    let from_spine: Vec<String> = manifest
        .spine
        .iter()
        .filter_map(|idref| manifest.items.iter().find(|(id, _, _)| id == idref))
        .map(|(_, href, _)| resolve_href(href, names))
        .filter(|path| section_number(path).is_some())
        .collect();
    if !from_spine.is_empty() {
        return from_spine;
    }

    let mut numbered: Vec<(u32, String)> = names
        .iter()
        .filter_map(|name| section_number(name).map(|n| (n, name.clone())))
        .collect();
    numbered.sort();
    numbered.into_iter().map(|(_, name)| name).collect()
}

fn section_number(path: &str) -> Option<u32> {
    path.strip_prefix("Contents/section")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Manifest hrefs are package-relative, but some writers make them
/// relative to `Contents/`.
fn resolve_href(href: &str, names: &[String]) -> String {
    let href = href.trim_start_matches('/');
    if names.iter().any(|n| n == href) {
        return href.to_string();
    }
    let nested = format!("Contents/{href}");
    if names.iter().any(|n| *n == nested) {
        nested
    } else {
        href.to_string()
    }
}

fn asset_entries(
    manifest: &PackageManifest,
    names: &[String],
) -> Vec<(String, String, Option<String>)> {
    let mut entries: Vec<(String, String, Option<String>)> = manifest
        .items
        .iter()
        .map(|(id, href, media)| (id.clone(), resolve_href(href, names), media.clone()))
        .filter(|(_, path, _)| path.starts_with(BINDATA_DIR))
        .collect();

    for name in names.iter().filter(|n| n.starts_with(BINDATA_DIR) && !n.ends_with('/')) {
        if entries.iter().any(|(_, path, _)| path == name) {
            continue;
        }
        let file = &name[BINDATA_DIR.len()..];
        let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
        entries.push((stem.to_string(), name.clone(), None));
    }
    entries
}

fn properties_from(manifest: &PackageManifest) -> DocumentProperties {
    let mut props = DocumentProperties::default();
    for (name, value) in &manifest.metadata {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.to_ascii_lowercase().as_str() {
            "title" => props.title = Some(value.to_string()),
            "subject" => props.subject = Some(value.to_string()),
            "creator" => props.author = Some(value.to_string()),
            "description" => props.comments = Some(value.to_string()),
            "lastsaveby" => props.last_saved_by = Some(value.to_string()),
            "keyword" | "keywords" => {
                props.keywords = value
                    .split([',', ';'])
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            }
            "createddate" => props.created = parse_date(value),
            "modifieddate" => props.modified = parse_date(value),
            _ => {}
        }
    }
    props
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn xml_error(part: &str, reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> Error {
    Error::XmlSyntax {
        part: part.to_string(),
        position: reader.buffer_position(),
        detail: err.to_string(),
    }
}

fn local_attributes(
    part: &str,
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| xml_error(part, reader, e))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(part, reader, e))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn parse_version(xml: &[u8]) -> Result<FormatVersion> {
    let text = String::from_utf8_lossy(xml);
    let mut reader = Reader::from_str(&text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"HCFVersion" => {
                let attrs = local_attributes(VERSION_PART, &reader, &e)?;
                let field = |key| {
                    attr(&attrs, key)
                        .and_then(|v| v.trim().parse::<u8>().ok())
                        .unwrap_or(0)
                };
                return Ok(FormatVersion::new(
                    field("major"),
                    field("minor"),
                    field("micro"),
                    field("buildNumber"),
                ));
            }
            Ok(Event::Eof) => return Ok(FormatVersion::new(5, 0, 0, 0)),
            Ok(_) => {}
            Err(e) => return Err(xml_error(VERSION_PART, &reader, e)),
        }
    }
}

fn parse_manifest(xml: &[u8]) -> Result<PackageManifest> {
    let text = String::from_utf8_lossy(xml);
    let mut reader = Reader::from_str(&text);
    let mut manifest = PackageManifest::default();
    // Metadata element whose text is being collected.
    let mut open_meta: Option<String> = None;
    let mut in_metadata = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"metadata" => in_metadata = true,
                    b"meta" if in_metadata => {
                        let attrs = local_attributes(CONTENT_PART, &reader, &e)?;
                        open_meta = attr(&attrs, "name").map(String::from);
                    }
                    other if in_metadata => {
                        open_meta = Some(String::from_utf8_lossy(other).into_owned());
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let attrs = local_attributes(CONTENT_PART, &reader, &e)?;
                match e.local_name().as_ref() {
                    b"item" => {
                        if let (Some(id), Some(href)) = (attr(&attrs, "id"), attr(&attrs, "href")) {
                            manifest.items.push((
                                id.to_string(),
                                href.to_string(),
                                attr(&attrs, "media-type").map(String::from),
                            ));
                        }
                    }
                    b"itemref" => {
                        if let Some(idref) = attr(&attrs, "idref") {
                            manifest.spine.push(idref.to_string());
                        }
                    }
                    b"meta" if in_metadata => {
                        if let (Some(name), Some(content)) = (attr(&attrs, "name"), attr(&attrs, "content")) {
                            manifest.metadata.push((name.to_string(), content.to_string()));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(name) = &open_meta {
                    let value = t.unescape().map_err(|e| xml_error(CONTENT_PART, &reader, e))?;
                    manifest.metadata.push((name.clone(), value.into_owned()));
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"metadata" {
                    in_metadata = false;
                }
                open_meta = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(CONTENT_PART, &reader, e)),
        }
    }
    Ok(manifest)
}

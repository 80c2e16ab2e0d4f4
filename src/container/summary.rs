//! `\x05HwpSummaryInformation` property set reader.

use super::{le_u16, le_u32, DocumentProperties};
use chrono::{DateTime, Utc};

const BYTE_ORDER_MARK: u16 = 0xFFFE;

const PID_TITLE: u32 = 2;
const PID_SUBJECT: u32 = 3;
const PID_AUTHOR: u32 = 4;
const PID_KEYWORDS: u32 = 5;
const PID_COMMENTS: u32 = 6;
const PID_LAST_AUTHOR: u32 = 8;
const PID_CREATED: u32 = 12;
const PID_LAST_SAVED: u32 = 13;

const VT_LPSTR: u32 = 0x1E;
const VT_LPWSTR: u32 = 0x1F;
const VT_FILETIME: u32 = 0x40;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_EPOCH_OFFSET: i64 = 11_644_473_600;

enum Value {
    Text(String),
    Time(DateTime<Utc>),
}

/// Parse the first property section. Returns `None` when the stream is not
/// a property set.
pub(super) fn parse(data: &[u8]) -> Option<DocumentProperties> {
    if le_u16(data, 0)? != BYTE_ORDER_MARK {
        return None;
    }
    if le_u32(data, 24)? == 0 {
        return Some(DocumentProperties::default());
    }
    let section = le_u32(data, 44)? as usize;
    let count = le_u32(data, section + 4)? as usize;

    let mut props = DocumentProperties::default();
    for i in 0..count {
        let entry = section + 8 + i * 8;
        let (Some(id), Some(offset)) = (le_u32(data, entry), le_u32(data, entry + 4)) else {
            break;
        };
        let Some(value) = read_value(data, section + offset as usize) else {
            continue;
        };
        match (id, value) {
            (PID_TITLE, Value::Text(s)) => props.title = Some(s),
            (PID_SUBJECT, Value::Text(s)) => props.subject = Some(s),
            (PID_AUTHOR, Value::Text(s)) => props.author = Some(s),
            (PID_KEYWORDS, Value::Text(s)) => {
                props.keywords = s
                    .split([',', ';'])
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            }
            (PID_COMMENTS, Value::Text(s)) => props.comments = Some(s),
            (PID_LAST_AUTHOR, Value::Text(s)) => props.last_saved_by = Some(s),
            (PID_CREATED, Value::Time(t)) => props.created = Some(t),
            (PID_LAST_SAVED, Value::Time(t)) => props.modified = Some(t),
            _ => {}
        }
    }
    Some(props)
}

fn read_value(data: &[u8], at: usize) -> Option<Value> {
    let kind = le_u32(data, at)? & 0xFFFF;
    match kind {
        VT_LPWSTR => {
            let chars = le_u32(data, at + 4)? as usize;
            let bytes = data.get(at + 8..at + 8 + chars * 2)?;
            non_empty(super::utf16le_string(bytes)).map(Value::Text)
        }
        VT_LPSTR => {
            let len = le_u32(data, at + 4)? as usize;
            let bytes = data.get(at + 8..at + 8 + len)?;
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            non_empty(String::from_utf8_lossy(&bytes[..end]).into_owned()).map(Value::Text)
        }
        VT_FILETIME => {
            let low = le_u32(data, at + 4)? as u64;
            let high = le_u32(data, at + 8)? as u64;
            filetime_to_utc((high << 32) | low).map(Value::Time)
        }
        _ => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Convert a FILETIME (100ns ticks since 1601) to UTC. Zero means unset.
fn filetime_to_utc(ticks: u64) -> Option<DateTime<Utc>> {
    if ticks == 0 {
        return None;
    }
    let secs = (ticks / 10_000_000) as i64 - FILETIME_EPOCH_OFFSET;
    let nanos = ((ticks % 10_000_000) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

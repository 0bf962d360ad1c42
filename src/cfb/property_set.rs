//! Summary-information property stream reader.
//!
//! HWP writes document properties to a `\x05HwpSummaryInformation` stream in
//! the standard OLE property-set layout. Only the property types the
//! metadata needs are handled; anything else is skipped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::consts::*;
use super::file::{read_u16, read_u32};
use crate::error::{Error, Result};
use crate::model::Metadata;

/// Property ids of the standard summary-information set.
const PID_TITLE: u32 = 2;
const PID_SUBJECT: u32 = 3;
const PID_AUTHOR: u32 = 4;
const PID_KEYWORDS: u32 = 5;
const PID_CREATE_TIME: u32 = 12;
const PID_LAST_SAVED_TIME: u32 = 13;
const PID_APPLICATION: u32 = 18;

/// A decoded property value. Only the types the metadata needs are
/// represented; other property types are skipped at parse time.
#[derive(Debug, Clone)]
enum PropertyValue {
    Str(String),
    Filetime(u64),
}

/// Fill `metadata` from a summary-information stream.
///
/// Callers treat failures as non-fatal; metadata loss never fails a parse.
pub fn apply_summary_info(metadata: &mut Metadata, data: &[u8]) -> Result<()> {
    let props = parse_property_stream(data)?;

    metadata.title = get_string(&props, PID_TITLE);
    metadata.subject = get_string(&props, PID_SUBJECT);
    metadata.author = get_string(&props, PID_AUTHOR);
    metadata.keywords = get_string(&props, PID_KEYWORDS);
    metadata.creator = get_string(&props, PID_APPLICATION);
    metadata.created = get_filetime(&props, PID_CREATE_TIME);
    metadata.modified = get_filetime(&props, PID_LAST_SAVED_TIME);

    Ok(())
}

fn get_string(props: &HashMap<u32, PropertyValue>, id: u32) -> Option<String> {
    match props.get(&id) {
        Some(PropertyValue::Str(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn get_filetime(props: &HashMap<u32, PropertyValue>, id: u32) -> Option<DateTime<Utc>> {
    match props.get(&id) {
        Some(PropertyValue::Filetime(ft)) => filetime_to_datetime(*ft),
        _ => None,
    }
}

/// Convert a Windows FILETIME (100ns ticks since 1601-01-01) to UTC.
fn filetime_to_datetime(filetime: u64) -> Option<DateTime<Utc>> {
    if filetime == 0 {
        return None;
    }
    const FILETIME_UNIX_DIFF_SECS: i64 = 11_644_473_600;
    let secs = (filetime / 10_000_000) as i64 - FILETIME_UNIX_DIFF_SECS;
    let nanos = ((filetime % 10_000_000) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// Parse a property stream into id → value.
fn parse_property_stream(data: &[u8]) -> Result<HashMap<u32, PropertyValue>> {
    if data.len() < 48 {
        return Err(Error::CorruptDirectory(
            "property stream too short".to_string(),
        ));
    }

    let mut properties = HashMap::new();

    // Header is 28 bytes, followed by one FMTID + section offset pair.
    let section_offset = read_u32(data, 44) as usize;
    if section_offset + 8 > data.len() {
        return Err(Error::CorruptDirectory(
            "property section offset out of range".to_string(),
        ));
    }

    let num_props = read_u32(data, section_offset + 4).min(1000);

    for i in 0..num_props as usize {
        let prop_offset = section_offset + 8 + i * 8;
        if prop_offset + 8 > data.len() {
            break;
        }

        let prop_id = read_u32(data, prop_offset);
        let value_offset = section_offset + read_u32(data, prop_offset + 4) as usize;
        if value_offset + 4 > data.len() {
            continue;
        }

        let prop_type = read_u16(data, value_offset);
        if let Some(value) = parse_property_value(data, value_offset + 4, prop_type) {
            properties.insert(prop_id, value);
        }
    }

    Ok(properties)
}

fn parse_property_value(data: &[u8], offset: usize, prop_type: u16) -> Option<PropertyValue> {
    match prop_type {
        VT_LPSTR | VT_BSTR => {
            if offset + 4 > data.len() {
                return None;
            }
            let len = read_u32(data, offset) as usize;
            let start = offset + 4;
            if start + len > data.len() {
                return None;
            }
            let s = String::from_utf8_lossy(&data[start..start + len])
                .trim_end_matches('\0')
                .to_string();
            Some(PropertyValue::Str(s))
        }
        VT_LPWSTR => {
            if offset + 4 > data.len() {
                return None;
            }
            let char_count = read_u32(data, offset) as usize;
            let start = offset + 4;
            if start + char_count * 2 > data.len() {
                return None;
            }
            let units: Vec<u16> = data[start..start + char_count * 2]
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .take_while(|&u| u != 0)
                .collect();
            Some(PropertyValue::Str(String::from_utf16_lossy(&units)))
        }
        VT_FILETIME => {
            if offset + 8 > data.len() {
                return None;
            }
            let low = read_u32(data, offset) as u64;
            let high = read_u32(data, offset + 4) as u64;
            Some(PropertyValue::Filetime(low | (high << 32)))
        }
        _ => None,
    }
}

//! Capture metadata extraction and caption resolution.
//!
//! Reads the embedded EXIF block of a source photo through typed accessors
//! (no generic tag-dictionary lookups) and resolves the two caption fields
//! with their fallback chains:
//!
//! - **Timestamp**: EXIF `DateTimeOriginal` (`%Y:%m:%d %H:%M:%S`) → file
//!   modification time. Formatted with the configured date pattern.
//! - **Place**: GPS rational triples → decimal degrees → reverse geocoding
//!   ([`crate::geocode`]). Either coordinate absent → no place line.
//!
//! EXIF reading itself never fails an image: a missing or unparseable block
//! simply yields empty fields and the fallbacks take over.

use crate::geocode::{self, ReverseGeocoder};
use crate::types::CaptionMetadata;
use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Tag, Value};
use std::io::Cursor;
use std::path::Path;

/// Format EXIF stores `DateTimeOriginal` in.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// One GPS coordinate as stored in EXIF: degrees/minutes/seconds rationals
/// plus a hemisphere reference (`N`/`S` or `E`/`W`).
#[derive(Debug, Clone, PartialEq)]
pub struct GpsTriple {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub reference: String,
}

impl GpsTriple {
    /// `deg + min/60 + sec/3600`, negated for the southern/western hemisphere.
    pub fn to_decimal_degrees(&self) -> f64 {
        let decimal = self.degrees + self.minutes / 60.0 + self.seconds / 3600.0;
        match self.reference.as_str() {
            "S" | "W" => -decimal,
            _ => decimal,
        }
    }
}

/// Typed view of the EXIF fields the caption pipeline cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureMetadata {
    /// `DateTimeOriginal`, when present and parseable.
    pub timestamp: Option<NaiveDateTime>,
    pub latitude: Option<GpsTriple>,
    pub longitude: Option<GpsTriple>,
}

impl CaptureMetadata {
    /// Decimal-degree coordinates, only when both triples are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (&self.latitude, &self.longitude) {
            (Some(lat), Some(lon)) => {
                Some((lat.to_decimal_degrees(), lon.to_decimal_degrees()))
            }
            _ => None,
        }
    }
}

/// Extract capture metadata from encoded image bytes.
///
/// Absent or malformed EXIF yields default (empty) metadata rather than an
/// error; each field falls back independently downstream.
pub fn read_capture_metadata(bytes: &[u8]) -> CaptureMetadata {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(err) => {
            log::debug!("no usable EXIF block: {err}");
            return CaptureMetadata::default();
        }
    };

    CaptureMetadata {
        timestamp: ascii_field(&exif, Tag::DateTimeOriginal)
            .and_then(|s| parse_exif_datetime(&s)),
        latitude: gps_triple(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef),
        longitude: gps_triple(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef),
    }
}

fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|field| match &field.value {
            Value::Ascii(parts) if !parts.is_empty() => std::str::from_utf8(&parts[0])
                .ok()
                .map(|s| s.trim().to_string()),
            _ => None,
        })
}

fn gps_triple(exif: &exif::Exif, value_tag: Tag, ref_tag: Tag) -> Option<GpsTriple> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let rationals = match &field.value {
        Value::Rational(r) if r.len() >= 3 => r,
        _ => return None,
    };
    let reference = ascii_field(exif, ref_tag)?;
    Some(GpsTriple {
        degrees: rationals[0].to_f64(),
        minutes: rationals[1].to_f64(),
        seconds: rationals[2].to_f64(),
        reference,
    })
}

fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, EXIF_DATETIME_FORMAT).ok()
}

/// Capture timestamp with the file-mtime fallback.
///
/// IO failure reading the mtime is the only error here; the orchestrator
/// treats it as a per-image skip.
pub fn resolve_timestamp(
    meta: &CaptureMetadata,
    path: &Path,
) -> std::io::Result<NaiveDateTime> {
    if let Some(ts) = meta.timestamp {
        return Ok(ts);
    }
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

/// Render a timestamp with the configured strftime pattern.
///
/// The pattern is validated at config load, so formatting cannot fail here.
pub fn format_timestamp(ts: NaiveDateTime, pattern: &str) -> String {
    ts.format(pattern).to_string()
}

/// Resolve the full caption content for one image.
pub fn resolve_caption_metadata(
    meta: &CaptureMetadata,
    path: &Path,
    date_format: &str,
    geocoder: &dyn ReverseGeocoder,
) -> std::io::Result<CaptionMetadata> {
    let timestamp = format_timestamp(resolve_timestamp(meta, path)?, date_format);
    let place = meta
        .coordinates()
        .and_then(|(lat, lon)| geocode::resolve_place(geocoder, lat, lon));
    Ok(CaptionMetadata { timestamp, place })
}

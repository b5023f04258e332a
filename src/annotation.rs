use std::num::ParseIntError;

use thiserror::Error;

use crate::geometry::Quad;

/// Byte-order mark that some ICDAR annotation files carry at the start of lines
const BOM: char = '\u{feff}';

/// Number of comma-separated coordinate fields before the transcription
const COORD_FIELDS: usize = 8;

/// Largest accepted coordinate magnitude, the JPEG dimension limit
pub const MAX_COORDINATE: i32 = 65_535;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 8 coordinate fields, found {found}")]
    TooFewFields { found: usize },

    #[error("field {position} is not an integer coordinate: {value:?}")]
    InvalidCoordinate {
        position: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("field {position} is outside ±65535: {value}")]
    CoordinateOutOfRange { position: usize, value: i32 },
}

/// One usable line of an ICDAR annotation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub quad: Quad,
    pub transcription: String,
}

impl AnnotationRecord {
    /// Parse one annotation line.
    ///
    /// Returns `Ok(None)` for lines that are skipped without error: fewer than
    /// 9 fields, or a transcription of at most one character (the dataset's
    /// "don't care" marker). Coordinates are only parsed for lines that pass
    /// that gate.
    pub fn parse(line: &str) -> Result<Option<AnnotationRecord>, ParseError> {
        let line = line.replace(BOM, "");
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() <= COORD_FIELDS {
            return Ok(None);
        }

        let transcription = fields[COORD_FIELDS..].join(",");
        if transcription.chars().count() <= 1 {
            return Ok(None);
        }

        let quad = parse_quad(&fields[..COORD_FIELDS])?;
        Ok(Some(AnnotationRecord { quad, transcription }))
    }
}

/// Parse exactly the eight `x0,y0,...,x3,y3` fields
pub fn parse_quad(fields: &[&str]) -> Result<Quad, ParseError> {
    if fields.len() < COORD_FIELDS {
        return Err(ParseError::TooFewFields { found: fields.len() });
    }

    let mut coords = [0i32; COORD_FIELDS];
    for (i, (slot, raw)) in coords.iter_mut().zip(fields).enumerate() {
        let value: i32 = raw
            .trim()
            .parse()
            .map_err(|source| ParseError::InvalidCoordinate {
                position: i + 1,
                value: raw.to_string(),
                source,
            })?;
        if value.unsigned_abs() > MAX_COORDINATE as u32 {
            return Err(ParseError::CoordinateOutOfRange {
                position: i + 1,
                value,
            });
        }
        *slot = value;
    }

    Ok(Quad::from_coords(coords))
}

/// Parse every line of an annotation file, keeping the 1-based line number of
/// each record. Stops at the first malformed coordinate.
pub fn parse_annotations(text: &str) -> Result<Vec<(usize, AnnotationRecord)>, (usize, ParseError)> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        match AnnotationRecord::parse(line) {
            Ok(Some(record)) => records.push((idx + 1, record)),
            Ok(None) => log::debug!("Skipping annotation line {}: {:?}", idx + 1, line),
            Err(e) => return Err((idx + 1, e)),
        }
    }
    Ok(records)
}

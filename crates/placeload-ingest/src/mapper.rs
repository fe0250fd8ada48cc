//! Row to document mapping
//!
//! Converts positional CSV fields into a [`PlaceDocument`]. Field coercion is
//! best effort: unparsable coordinates become `0.0`, unknown booleans become
//! `false`. Only a short row is fatal, since it almost always means the wrong
//! file or layout.

use placeload_common::types::{Coordinates, PlaceDocument, WorkflowState};
use placeload_common::{PlaceloadError, Result};

use crate::source::RawRecord;

/// Column positions of the input layout
pub mod column {
    pub const PLACE_ID: usize = 0;
    pub const NAME: usize = 1;
    pub const ADDRESS: usize = 2;
    pub const DISTRICT: usize = 3;
    pub const COUNTRY: usize = 4;
    pub const DIVISION: usize = 5;
    pub const POSTAL_CODE: usize = 6;
    pub const TYPES: usize = 7;
    pub const VERIFIED: usize = 8;
    pub const LATITUDE: usize = 9;
    pub const LONGITUDE: usize = 10;
}

/// Minimum number of columns a data row must have.
pub const REQUIRED_COLUMNS: usize = column::LONGITUDE + 1;

/// Result of mapping one row
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped {
    Document(PlaceDocument),
    /// Row excluded by the region predicate
    Filtered,
}

/// Maps raw rows to place documents, optionally keeping only one region
#[derive(Debug, Clone, Default)]
pub struct PlaceMapper {
    region: Option<String>,
}

impl PlaceMapper {
    pub fn new(region: Option<String>) -> Self {
        Self {
            region: region
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn map(&self, record: &RawRecord) -> Result<Mapped> {
        if record.len() < REQUIRED_COLUMNS {
            return Err(PlaceloadError::MissingColumn {
                line: record.line(),
                index: REQUIRED_COLUMNS - 1,
                len: record.len(),
            });
        }

        let field = |index: usize| record.get(index).unwrap_or_default().trim();

        let country = field(column::COUNTRY);
        if let Some(ref region) = self.region {
            if !country.eq_ignore_ascii_case(region) {
                return Ok(Mapped::Filtered);
            }
        }

        Ok(Mapped::Document(PlaceDocument {
            place_id: record.key().to_string(),
            name: field(column::NAME).to_string(),
            address: field(column::ADDRESS).to_string(),
            district: field(column::DISTRICT).to_string(),
            division: field(column::DIVISION).to_string(),
            country: country.to_string(),
            postal_code: field(column::POSTAL_CODE).to_string(),
            types: parse_list(field(column::TYPES)),
            is_verified: coerce_bool(field(column::VERIFIED)),
            coordinates: Coordinates::new(
                coerce_f64(field(column::LATITUDE)),
                coerce_f64(field(column::LONGITUDE)),
            ),
            workflow: WorkflowState::default(),
        }))
    }
}

/// Parse a bracketed list such as `['a', 'b', "c"]`.
///
/// Quotes and surrounding whitespace are stripped, commas inside quotes are
/// kept, and empty elements are dropped. Text without brackets is treated as
/// the list body.
pub fn parse_list(raw: &str) -> Vec<String> {
    let body = raw.trim();
    let body = body.strip_prefix('[').unwrap_or(body);
    let body = body.strip_suffix(']').unwrap_or(body);

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in body.chars() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, ',') => push_item(&mut items, &mut current),
            _ => current.push(c),
        }
    }
    push_item(&mut items, &mut current);

    items
}

fn push_item(items: &mut Vec<String>, current: &mut String) {
    let item = current.trim();
    if !item.is_empty() {
        items.push(item.to_string());
    }
    current.clear();
}

/// Parse a coordinate; anything unparsable or non-finite becomes `0.0`
pub fn coerce_f64(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Case-insensitive `"true"`; everything else is `false`
pub fn coerce_bool(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

//! Streaming CSV record source
//!
//! Yields raw rows in file order. The header row is consumed up front and the
//! reader is strict: every data row must have as many fields as the header.

use csv::{ErrorKind, ReaderBuilder, StringRecord, StringRecordsIntoIter};
use placeload_common::{PlaceloadError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One data row: positional string fields plus its line in the input
#[derive(Debug, Clone)]
pub struct RawRecord {
    line: u64,
    fields: StringRecord,
}

impl RawRecord {
    pub fn new(line: u64, fields: StringRecord) -> Self {
        Self { line, fields }
    }

    /// 1-based line number in the input file
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Natural key (first column, surrounding whitespace removed), empty if
    /// the row has no fields
    pub fn key(&self) -> &str {
        self.fields.get(0).unwrap_or_default().trim()
    }
}

impl<const N: usize> From<(u64, [&str; N])> for RawRecord {
    fn from((line, fields): (u64, [&str; N])) -> Self {
        Self::new(line, StringRecord::from(fields.to_vec()))
    }
}

/// Lazy, non-restartable iterator over the data rows of a delimited file
pub struct RecordSource<R> {
    header: StringRecord,
    records: StringRecordsIntoIter<R>,
}

impl RecordSource<File> {
    /// Open `path` and consume its header row
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            PlaceloadError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to open {}: {}", path.display(), e),
            ))
        })?;
        Self::from_reader(file, delimiter)
    }
}

impl<R: Read> RecordSource<R> {
    pub fn from_reader(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let header = reader.headers().map_err(classify)?.clone();
        debug!(columns = header.len(), header = ?header, "Read input header");

        Ok(Self {
            header,
            records: reader.into_records(),
        })
    }

    pub fn header(&self) -> &StringRecord {
        &self.header
    }
}

impl<R: Read> Iterator for RecordSource<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.records.next()?;
        Some(item.map_err(classify).map(|fields| {
            let line = fields.position().map(|p| p.line()).unwrap_or_default();
            RawRecord::new(line, fields)
        }))
    }
}

/// Map a csv error onto the input-error taxonomy
fn classify(err: csv::Error) -> PlaceloadError {
    let line = err.position().map(|p| p.line()).unwrap_or_default();

    match err.into_kind() {
        ErrorKind::Io(e) => PlaceloadError::Io(e),
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => PlaceloadError::MalformedInput {
            line,
            message: format!("expected {} fields, found {}", expected_len, len),
        },
        ErrorKind::Utf8 { err, .. } => PlaceloadError::MalformedInput {
            line,
            message: format!("invalid UTF-8 in field {}", err.field() + 1),
        },
        other => PlaceloadError::MalformedInput {
            line,
            message: format!("{:?}", other),
        },
    }
}

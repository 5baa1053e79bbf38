//! Packed table cells.
//!
//! The table callback only receives the header row and the body rows as two
//! opaque strings, so each cell is packed into a one-line JSON record that
//! carries its alignment and header flag along with the content:
//!
//! ```text
//! [1,"content","left",true]
//! ```
//!
//! The leading number is the record version. Records end with `\n`, rows end
//! with one more `\n`, so cells are separated by a line break and rows by a
//! blank line. JSON never emits a raw line break inside a record, which keeps
//! both delimiters unambiguous whatever the cell content is.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::Alignment;

pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub content: String,
    pub alignment: Alignment,
    pub header: bool,
}

#[derive(Serialize, Deserialize)]
struct Record(u32, String, Alignment, bool);

impl Cell {
    /// Serialize to a single record line, without the trailing newline.
    pub fn pack(&self) -> String {
        let record = Record(
            RECORD_VERSION,
            self.content.clone(),
            self.alignment,
            self.header,
        );
        // A tuple of a number, a string, a unit enum and a bool always
        // serializes.
        serde_json::to_string(&record).unwrap_or_default()
    }

    pub fn unpack(record: &str) -> Result<Self> {
        let Record(version, content, alignment, header) =
            serde_json::from_str(record).map_err(|source| Error::MalformedCell {
                record: record.to_string(),
                source,
            })?;
        if version != RECORD_VERSION {
            return Err(Error::UnsupportedCellVersion { version });
        }
        Ok(Self {
            content,
            alignment,
            header,
        })
    }
}

/// Decode the header row: one record per line.
pub fn unpack_header(header: &str) -> Result<Vec<Cell>> {
    header
        .lines()
        .filter(|line| !line.is_empty())
        .map(Cell::unpack)
        .collect()
}

/// Decode body rows: rows separated by blank lines, one record per line.
pub fn unpack_body(body: &str) -> Result<Vec<Vec<Cell>>> {
    body.split("\n\n")
        .filter(|row| !row.trim().is_empty())
        .map(unpack_header)
        .collect()
}

//! Tracking-event table and its delimited-text reader
//!
//! # File Format
//!
//! ```text
//! # pathline output from the tracking engine
//! kper,kstp,imdl,iprp,irpt,ilay,icell,izone,istatus,ireason,trelease,t,x,y,z,name
//! 1,1,1,1,1,1,1,0,1,0,0.0,0.0,0.5,9.5,0.5,
//! 1,1,1,1,1,1,1,0,1,1,0.0,12.3,1.0,9.2,0.5,
//! ```
//!
//! Lines starting with `#` and blank lines are skipped. The first remaining
//! line is the header. Fields are comma separated when the header contains a
//! comma, otherwise whitespace separated. In comma-separated files a field
//! may be double-quoted to carry commas (`"well,a"`); whitespace-separated
//! fields cannot contain spaces. Values that are empty or not
//! numeric (e.g. a `name` column) are stored as `NaN`; the analyzer rejects
//! them only if they fall in a column it needs.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Comma,
    Whitespace,
}

impl Delimiter {
    fn detect(header: &str) -> Self {
        if header.contains(',') {
            Delimiter::Comma
        } else {
            Delimiter::Whitespace
        }
    }

    fn split<'a>(self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Comma => split_quoted(line),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

/// Comma split that leaves commas inside double-quoted fields alone
fn split_quoted(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                fields.push(line[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(line[start..].trim());
    fields
}

fn unquote(field: &str) -> &str {
    field.trim_matches(|c| c == '"' || c == '\'')
}

/// Column-named table of numeric tracking events.
///
/// Rows are stored as read; the table imposes no ordering and no schema
/// beyond consistent row width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventTable {
    headers: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl EventTable {
    /// Empty table with the given column names
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the row width differs from the header width.
    pub fn push_row(&mut self, row: Vec<f64>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(Error::invalid(format!(
                "row {} has {} values, expected {}",
                self.rows.len(),
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder form of [`EventTable::push_row`].
    ///
    /// # Errors
    /// Returns `InvalidInput` if the row width differs from the header width.
    pub fn with_row(mut self, row: Vec<f64>) -> Result<Self> {
        self.push_row(row)?;
        Ok(self)
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in file order
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Index of a column, matched case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Values of a column, if present
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = f64> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[idx]))
    }

    /// Parse a delimited-text table.
    ///
    /// # Errors
    /// Returns `Io` on read failure and `InvalidInput` if the header is
    /// missing or a row has the wrong number of fields.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table: Option<EventTable> = None;
        let mut delimiter = Delimiter::Comma;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some(t) = table.as_mut() else {
                delimiter = Delimiter::detect(trimmed);
                let headers = delimiter.split(trimmed).into_iter().map(unquote);
                table = Some(EventTable::new(headers));
                continue;
            };

            let fields = delimiter.split(trimmed);
            if fields.len() != t.headers.len() {
                return Err(Error::invalid(format!(
                    "line {}: expected {} fields, found {}",
                    line_no + 1,
                    t.headers.len(),
                    fields.len()
                )));
            }
            let row = fields
                .into_iter()
                .map(|f| unquote(f).parse::<f64>().unwrap_or(f64::NAN))
                .collect();
            t.rows.push(row);
        }

        let table = table.ok_or_else(|| Error::invalid("event table has no header line"))?;
        debug!(
            "Read event table: {} columns, {} rows",
            table.headers.len(),
            table.rows.len()
        );
        Ok(table)
    }

    /// Parse a table held in memory.
    ///
    /// # Errors
    /// Same as [`EventTable::from_reader`].
    pub fn parse_str(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Read a table from a file.
    ///
    /// # Errors
    /// Same as [`EventTable::from_reader`], plus `Io` if the file cannot be opened.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

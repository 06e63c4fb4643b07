//! Delimited table decoding
//!
//! Turns the text of the target entry into a lazy sequence of rows with
//! optional values. Defaults for missing values are applied by the caller.

use std::io::{self, Read};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Malformed table at line {line}: {message}")]
    Malformed { line: u64, message: String },
}

impl TableError {
    fn from_csv(err: csv::Error, fallback_line: u64) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(fallback_line);
        let message = match err.kind() {
            csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {}", err),
            csv::ErrorKind::Io(io) => format!("read failed: {}", io),
            _ => err.to_string(),
        };
        TableError::Malformed { line, message }
    }
}

/// Position of the scanner inside the current field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote seen inside a quoted field: either `""` or the closing quote
    QuoteInQuoted,
}

const BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// Reader adapter that follows field quoting over the raw bytes.
///
/// The csv tokenizer accepts an opening quote that is never closed and folds
/// everything up to end of input into that field. This adapter sees the same
/// bytes and remembers where such a field opened.
struct QuoteScanner<R> {
    inner: R,
    delimiter: u8,
    state: QuoteState,
    line: u64,
    opened_at: u64,
    /// Leading bytes matched against the byte order mark, `None` once past it
    bom_matched: Option<usize>,
}

impl<R> QuoteScanner<R> {
    fn new(inner: R, delimiter: u8) -> Self {
        Self {
            inner,
            delimiter,
            state: QuoteState::FieldStart,
            line: 1,
            opened_at: 1,
            bom_matched: Some(0),
        }
    }

    fn scan(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            // The tokenizer strips a leading byte order mark
            if let Some(matched) = self.bom_matched {
                if matched < BOM.len() && BOM[matched] == byte {
                    self.bom_matched = Some(matched + 1);
                    continue;
                }
                self.bom_matched = None;
            }

            let terminator = byte == b'\n' || byte == b'\r';
            self.state = match self.state {
                QuoteState::FieldStart if byte == b'"' => {
                    self.opened_at = self.line;
                    QuoteState::Quoted
                },
                QuoteState::Quoted if byte == b'"' => QuoteState::QuoteInQuoted,
                QuoteState::Quoted => QuoteState::Quoted,
                QuoteState::QuoteInQuoted if byte == b'"' => QuoteState::Quoted,
                _ if terminator || byte == self.delimiter => QuoteState::FieldStart,
                _ => QuoteState::Unquoted,
            };
            if byte == b'\n' {
                self.line += 1;
            }
        }
    }

    /// Line of a quoted field still open at the end of the bytes read so far
    fn unterminated_quote(&self) -> Option<u64> {
        (self.state == QuoteState::Quoted).then_some(self.opened_at)
    }
}

impl<R: Read> Read for QuoteScanner<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.scan(&buf[..n]);
        Ok(n)
    }
}

/// Attribute a header column maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    PdfName,
    FirstName,
    LastName,
    Age,
    Address,
    NationalId,
}

impl Column {
    /// Match a header regardless of case, surrounding whitespace, byte order
    /// mark and `_`/`-`/space separators. `SSN` is accepted for the national id.
    pub fn from_header(header: &str) -> Option<Self> {
        let key: String = header
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' ' | '\u{feff}'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "pdfname" => Some(Column::PdfName),
            "firstname" => Some(Column::FirstName),
            "lastname" => Some(Column::LastName),
            "age" => Some(Column::Age),
            "address" => Some(Column::Address),
            "ssn" | "nationalid" => Some(Column::NationalId),
            _ => None,
        }
    }
}

/// One decoded row. `None` means the column was missing from the header or
/// the row was too short; `age` is also `None` when it is not an integer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRow {
    pub pdf_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub national_id: Option<String>,
}

impl DecodedRow {
    fn set(&mut self, column: Column, value: &str) {
        let slot = match column {
            Column::Age => {
                if self.age.is_none() {
                    self.age = value.trim().parse::<i32>().ok();
                }
                return;
            },
            Column::PdfName => &mut self.pdf_name,
            Column::FirstName => &mut self.first_name,
            Column::LastName => &mut self.last_name,
            Column::Address => &mut self.address,
            Column::NationalId => &mut self.national_id,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableDecoder {
    delimiter: u8,
}

impl TableDecoder {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read the header line and return an iterator over the remaining rows.
    ///
    /// A quoted field left open at end of input fails the decode with the line
    /// where the quote opened.
    pub fn decode<R: Read>(&self, reader: R) -> Result<DecodedRows<R>, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(QuoteScanner::new(reader, self.delimiter));

        let columns: Vec<Option<Column>> = reader
            .headers()
            .map_err(|e| TableError::from_csv(e, 1))?
            .iter()
            .map(Column::from_header)
            .collect();

        tracing::debug!(
            mapped = columns.iter().filter(|c| c.is_some()).count(),
            total = columns.len(),
            "Decoded table header"
        );

        Ok(DecodedRows {
            records: reader.into_records(),
            columns,
            last_line: 1,
            failed: false,
        })
    }
}

/// Lazy, single-pass row iterator. The first error ends the sequence.
pub struct DecodedRows<R> {
    records: csv::StringRecordsIntoIter<QuoteScanner<R>>,
    columns: Vec<Option<Column>>,
    last_line: u64,
    failed: bool,
}

impl<R: Read> Iterator for DecodedRows<R> {
    type Item = Result<DecodedRow, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let Some(next) = self.records.next() else {
            self.failed = true;
            let line = self.records.reader().get_ref().unterminated_quote()?;
            return Some(Err(TableError::Malformed {
                line,
                message: "unterminated quoted field".to_string(),
            }));
        };

        match next {
            Ok(record) => {
                if let Some(position) = record.position() {
                    self.last_line = position.line();
                }
                let mut row = DecodedRow::default();
                for (column, value) in self.columns.iter().zip(record.iter()) {
                    if let Some(column) = column {
                        row.set(*column, value);
                    }
                }
                Some(Ok(row))
            },
            Err(err) => {
                self.failed = true;
                Some(Err(TableError::from_csv(err, self.last_line + 1)))
            },
        }
    }
}

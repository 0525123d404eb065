use std::borrow::Cow;
use std::fmt;

use csv::StringRecord;
use encoding_rs::{SHIFT_JIS, UTF_8};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::columns::normalize_header;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Text encodings an order export may arrive in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// JIS X 0208 Shift_JIS without the Windows vendor extensions.
    ShiftJis,
    /// UTF-8; a leading byte-order mark is accepted and removed.
    Utf8,
    /// Windows-31J (CP932): Shift_JIS plus the NEC/IBM extensions and user-defined area.
    Cp932,
}

/// Order tried when decoding uploads, matching what marketplace exports and
/// spreadsheet "Save as CSV" produce most often.
pub const DEFAULT_ENCODINGS: &[TextEncoding] = &[
    TextEncoding::ShiftJis,
    TextEncoding::Utf8,
    TextEncoding::Cp932,
];

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::ShiftJis => "Shift_JIS",
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Cp932 => "CP932",
        }
    }

    /// Decode the whole input, or return why it is not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>, String> {
        if self != TextEncoding::Utf8 && bytes.starts_with(UTF8_BOM) {
            return Err("input starts with a UTF-8 byte-order mark".to_string());
        }
        match self {
            TextEncoding::Utf8 => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .ok_or_else(|| "invalid UTF-8 byte sequence".to_string())
            }
            TextEncoding::Cp932 => SHIFT_JIS
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or_else(|| "invalid CP932 byte sequence".to_string()),
            TextEncoding::ShiftJis => {
                if let Some(offset) = first_vendor_extension(bytes) {
                    return Err(format!(
                        "byte 0x{:02X} at offset {offset} is a CP932 extension, not Shift_JIS",
                        bytes[offset]
                    ));
                }
                SHIFT_JIS
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .ok_or_else(|| "invalid Shift_JIS byte sequence".to_string())
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Offset of the first double-byte character whose lead byte belongs to the Windows
/// extensions (NEC special row, NEC-selected IBM, user-defined, IBM extensions).
fn first_vendor_extension(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            0x81..=0x9F | 0xE0..=0xFC => {
                if matches!(b, 0x87 | 0xED | 0xEE | 0xF0..=0xFC) {
                    return Some(i);
                }
                i += 2;
            }
            _ => i += 1,
        }
    }
    None
}

/// A decoded, untyped table: every cell is kept as literal text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTable {
    pub encoding: TextEncoding,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One failed decoding attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeAttempt {
    pub encoding: TextEncoding,
    pub reason: String,
}

impl fmt::Display for DecodeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.encoding, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file is empty")]
    EmptyInput,
    #[error("could not read the file as CSV in any supported encoding ({})", join_attempts(.attempts))]
    Undecodable { attempts: Vec<DecodeAttempt> },
    #[error("required column {column:?} is missing from the header")]
    MissingColumn { column: String },
}

fn join_attempts(attempts: &[DecodeAttempt]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why the decoded text is not an acceptable table.
#[derive(Debug, Error)]
enum TableError {
    #[error("no header row")]
    NoHeader,
    #[error("row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: u64,
        expected: usize,
        found: usize,
    },
    #[error("csv parse error at row {row}: {reason}")]
    Parse { row: u64, reason: String },
}

/// Decode `bytes` with the first encoding in `candidates` that yields a valid table.
pub fn load_table(bytes: &[u8], candidates: &[TextEncoding]) -> Result<RawTable, LoadError> {
    let has_bom = bytes.starts_with(UTF8_BOM);
    if bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes).is_empty() {
        return Err(LoadError::EmptyInput);
    }

    let mut attempts = Vec::with_capacity(candidates.len());
    let mut saw_content = false;
    for &encoding in candidates {
        let parsed = match encoding.decode(bytes) {
            Ok(text) => parse_table(&text),
            Err(reason) => {
                log::debug!("{encoding} rejected: {reason}");
                // The Shift_JIS candidates refuse a BOM outright; that says nothing about content.
                saw_content |= !(has_bom && encoding != TextEncoding::Utf8);
                attempts.push(DecodeAttempt { encoding, reason });
                continue;
            }
        };
        match parsed {
            Ok((headers, rows)) => {
                log::debug!(
                    "decoded {} data rows as {encoding} after {} failed attempt(s)",
                    rows.len(),
                    attempts.len()
                );
                return Ok(RawTable {
                    encoding,
                    headers,
                    rows,
                });
            }
            Err(err) => {
                log::debug!("{encoding} rejected: {err}");
                saw_content |= !matches!(err, TableError::NoHeader);
                attempts.push(DecodeAttempt {
                    encoding,
                    reason: err.to_string(),
                });
            }
        }
    }

    // Text that decodes but holds no header row at all (e.g. only blank lines).
    if !attempts.is_empty() && !saw_content {
        return Err(LoadError::EmptyInput);
    }

    Err(LoadError::Undecodable { attempts })
}

fn parse_table(text: &str) -> Result<(Vec<String>, Vec<Vec<String>>), TableError> {
    let mut reader = csv::ReaderBuilder::new()
        // Headers are handled here so blank leading lines and row numbers stay consistent.
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut record = StringRecord::new();
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut row_number: u64 = 0;

    loop {
        let more = reader
            .read_record(&mut record)
            .map_err(|e| map_csv_error(e, row_number + 1))?;
        if !more {
            break;
        }
        row_number += 1;
        if is_blank(&record) {
            continue;
        }

        match &headers {
            None => {
                headers = Some(
                    record
                        .iter()
                        .map(|h| normalize_header(h).to_string())
                        .collect(),
                );
            }
            Some(h) => {
                if record.len() > h.len() {
                    return Err(TableError::RaggedRow {
                        row: row_number,
                        expected: h.len(),
                        found: record.len(),
                    });
                }
                rows.push(record.iter().map(str::to_string).collect());
            }
        }
    }

    let headers = headers.ok_or(TableError::NoHeader)?;
    Ok((headers, rows))
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty()) && record.len() <= 1
}

fn map_csv_error(err: csv::Error, fallback_row: u64) -> TableError {
    let reason = err.to_string();
    let row = err
        .position()
        .map(|p| p.record())
        .filter(|r| *r > 0)
        .unwrap_or(fallback_row);
    TableError::Parse { row, reason }
}

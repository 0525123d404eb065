use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::LabelRecord;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Column layout of the converted list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelLayout {
    /// Postal code, two address lines, phone number, recipient.
    #[default]
    Shipping,
    /// Same as [`LabelLayout::Shipping`] without the phone column.
    Basic,
}

impl LabelLayout {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            LabelLayout::Shipping => &["郵便番号", "住所1", "住所2", "電話番号", "宛名"],
            LabelLayout::Basic => &["郵便番号", "住所1", "住所2", "宛名"],
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            LabelLayout::Shipping => "converted_shipping_list.csv",
            LabelLayout::Basic => "converted_list.csv",
        }
    }

    /// The label fields this layout writes, in header order.
    pub fn row(self, label: &LabelRecord) -> Vec<&str> {
        match self {
            LabelLayout::Shipping => label.fields().to_vec(),
            LabelLayout::Basic => vec![
                label.postal_code.as_str(),
                label.address_1.as_str(),
                label.address_2.as_str(),
                label.recipient.as_str(),
            ],
        }
    }
}

/// How digit-only values with a leading zero are protected from spreadsheet auto-numbering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadingZeroGuard {
    /// Write values as plain text.
    #[default]
    Off,
    /// Write `0901234` as `="0901234"`, which spreadsheets display as text.
    ExcelFormula,
}

impl LeadingZeroGuard {
    fn apply<'a>(self, value: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            LeadingZeroGuard::ExcelFormula if needs_guard(value) => {
                format!("=\"{value}\"").into()
            }
            _ => value.into(),
        }
    }
}

fn needs_guard(value: &str) -> bool {
    value.len() > 1 && value.starts_with('0') && value.bytes().all(|b| b.is_ascii_digit())
}

fn unguard(value: &str) -> &str {
    value
        .strip_prefix("=\"")
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|inner| needs_guard(inner))
        .unwrap_or(value)
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write converted csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("converted csv is not valid UTF-8")]
    InvalidUtf8,
    #[error("converted csv header {found:?} does not match any label layout")]
    UnknownHeader { found: Vec<String> },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A finished file ready to hand to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize labels as UTF-8 CSV with a byte-order mark so spreadsheet tools pick the
/// right charset.
pub fn write_labels(
    labels: &[LabelRecord],
    layout: LabelLayout,
    guard: LeadingZeroGuard,
) -> Result<Vec<u8>, ExportError> {
    let mut out = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut out);
        writer.write_record(layout.header())?;
        for label in labels {
            let row = layout.row(label);
            writer.write_record(row.into_iter().map(|v| guard.apply(v).into_owned()))?;
        }
        writer.flush()?;
    }
    Ok(out)
}

pub fn build_artifact(
    labels: &[LabelRecord],
    layout: LabelLayout,
    guard: LeadingZeroGuard,
) -> Result<DownloadArtifact, ExportError> {
    Ok(DownloadArtifact {
        file_name: layout.file_name().to_string(),
        content_type: CSV_CONTENT_TYPE,
        bytes: write_labels(labels, layout, guard)?,
    })
}

/// Parse a converted list back into labels.
///
/// The layout is detected from the header. Excel text guards are unwrapped, and the phone
/// field is empty for [`LabelLayout::Basic`] files.
pub fn read_labels(bytes: &[u8]) -> Result<(LabelLayout, Vec<LabelRecord>), ExportError> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(body).map_err(|_| ExportError::InvalidUtf8)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let layout = [LabelLayout::Shipping, LabelLayout::Basic]
        .into_iter()
        .find(|layout| layout.header() == header.as_slice())
        .ok_or_else(|| ExportError::UnknownHeader {
            found: header.clone(),
        })?;

    let mut labels = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| unguard(record.get(i).unwrap_or("")).to_string();
        let label = match layout {
            LabelLayout::Shipping => {
                LabelRecord::new(field(0), field(1), field(2), field(3), field(4))
            }
            LabelLayout::Basic => LabelRecord::new(field(0), field(1), field(2), "", field(3)),
        };
        labels.push(label);
    }
    Ok((layout, labels))
}

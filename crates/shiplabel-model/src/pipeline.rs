use thiserror::Error;

use crate::columns::ColumnIndex;
use crate::export::{build_artifact, DownloadArtifact, ExportError};
use crate::import::{load_table, LoadError, TextEncoding};
use crate::normalize::normalize_order;
use crate::options::ConvertOptions;
use crate::record::{LabelRecord, OrderRecord};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted {
        labels: Vec<LabelRecord>,
        artifact: DownloadArtifact,
    },
    /// The file loaded, but no row carried an allowed SKU. Not an error.
    NoMatches,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionReport {
    /// Encoding the upload was decoded with.
    pub encoding: TextEncoding,
    /// Data rows read, excluding the header.
    pub rows_read: usize,
    pub outcome: ConversionOutcome,
}

impl ConversionReport {
    pub fn matched(&self) -> usize {
        match &self.outcome {
            ConversionOutcome::Converted { labels, .. } => labels.len(),
            ConversionOutcome::NoMatches => 0,
        }
    }

    pub fn labels(&self) -> &[LabelRecord] {
        match &self.outcome {
            ConversionOutcome::Converted { labels, .. } => labels,
            ConversionOutcome::NoMatches => &[],
        }
    }

    pub fn artifact(&self) -> Option<&DownloadArtifact> {
        match &self.outcome {
            ConversionOutcome::Converted { artifact, .. } => Some(artifact),
            ConversionOutcome::NoMatches => None,
        }
    }
}

/// Decode and parse an upload into order records.
pub fn read_orders(
    bytes: &[u8],
    options: &ConvertOptions,
) -> Result<(TextEncoding, Vec<OrderRecord>), LoadError> {
    let table = load_table(bytes, &options.encodings)?;
    let index = ColumnIndex::resolve(&options.columns, &table.headers)?;
    let orders = table
        .rows
        .iter()
        .map(|row| OrderRecord::from_row(&index, row))
        .collect();
    Ok((table.encoding, orders))
}

/// Run one upload through load, SKU filter, normalization and serialization.
pub fn convert(bytes: &[u8], options: &ConvertOptions) -> Result<ConversionReport, ConvertError> {
    let (encoding, orders) = read_orders(bytes, options)?;
    let rows_read = orders.len();

    let matched = options.allowed_skus.retain(orders);
    if matched.is_empty() {
        log::info!("{rows_read} rows read as {encoding}; none matched the SKU allow-list");
        return Ok(ConversionReport {
            encoding,
            rows_read,
            outcome: ConversionOutcome::NoMatches,
        });
    }

    let names = options.name_policy();
    let labels: Vec<LabelRecord> = matched
        .iter()
        .map(|order| normalize_order(order, &names))
        .collect();
    let artifact = build_artifact(&labels, options.layout, options.leading_zero_guard)?;

    log::info!(
        "{rows_read} rows read as {encoding}; converted {} into {}",
        labels.len(),
        artifact.file_name
    );

    Ok(ConversionReport {
        encoding,
        rows_read,
        outcome: ConversionOutcome::Converted { labels, artifact },
    })
}

//! `shiplabel-model` turns marketplace order exports into shipping-label lists.
//!
//! The pipeline is a single pass:
//! - [`import`]: decode the upload with the first encoding that yields a valid table
//! - [`SkuAllowList`]: keep rows whose product code is selected
//! - [`normalize`]: format postal code, address, phone and recipient name
//! - [`export`]: write the label list as a spreadsheet-friendly CSV
//!
//! [`convert`] runs all of it for one upload.

mod allow_list;
mod columns;
pub mod export;
pub mod import;
pub mod normalize;
mod options;
mod pipeline;
mod record;
mod text;

pub use allow_list::{SkuAllowList, DEFAULT_SKUS};
pub use columns::{ColumnIndex, ColumnNames};
pub use export::{
    build_artifact, read_labels, write_labels, DownloadArtifact, ExportError, LabelLayout,
    LeadingZeroGuard,
};
pub use import::{load_table, DecodeAttempt, LoadError, RawTable, TextEncoding};
pub use normalize::{normalize_order, MissingNamePolicy, NamePolicy};
pub use options::{ConvertOptions, OptionsError};
pub use pipeline::{convert, read_orders, ConversionOutcome, ConversionReport, ConvertError};
pub use record::{LabelRecord, OrderRecord};
pub use text::{OptionalText, MISSING_MARKERS};

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allow_list::SkuAllowList;
use crate::columns::ColumnNames;
use crate::export::{LabelLayout, LeadingZeroGuard};
use crate::import::{TextEncoding, DEFAULT_ENCODINGS};
use crate::normalize::{MissingNamePolicy, NamePolicy, DEFAULT_HONORIFIC};

/// Everything that varies between conversions.
///
/// Deserialized from a JSON options file; every key is optional and falls back to the
/// built-in defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    pub layout: LabelLayout,
    pub allowed_skus: SkuAllowList,
    pub columns: ColumnNames,
    pub honorific: String,
    pub missing_name: MissingNamePolicy,
    pub leading_zero_guard: LeadingZeroGuard,
    /// Candidate encodings, tried in order.
    pub encodings: Vec<TextEncoding>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layout: LabelLayout::default(),
            allowed_skus: SkuAllowList::default(),
            columns: ColumnNames::default(),
            honorific: DEFAULT_HONORIFIC.to_string(),
            missing_name: MissingNamePolicy::default(),
            leading_zero_guard: LeadingZeroGuard::default(),
            encodings: DEFAULT_ENCODINGS.to_vec(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read options file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("options must list at least one encoding")]
    NoEncodings,
}

impl ConvertOptions {
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        let options: ConvertOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let options = Self::read_json_file(path)?;
        options.validate()?;
        Ok(options)
    }

    /// Deserialize an options file without validating it, for callers that adjust the
    /// options further and validate once at the end.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| OptionsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.encodings.is_empty() {
            return Err(OptionsError::NoEncodings);
        }
        if self.allowed_skus.is_empty() {
            log::warn!("SKU allow-list is empty; every conversion will report no matches");
        }
        Ok(())
    }

    pub fn name_policy(&self) -> NamePolicy {
        NamePolicy {
            honorific: self.honorific.clone(),
            missing: self.missing_name,
        }
    }
}

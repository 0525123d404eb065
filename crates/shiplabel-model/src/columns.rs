use serde::{Deserialize, Serialize};

use crate::import::LoadError;

/// Header names of the order export, one per field the label needs.
///
/// Defaults match the marketplace order-list export. Any name can be overridden from the
/// options file when a shop exports with different headers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    pub postal_code_1: String,
    pub postal_code_2: String,
    pub prefecture: String,
    pub locality: String,
    pub street: String,
    pub phone_1: String,
    pub phone_2: String,
    pub phone_3: String,
    pub surname: String,
    pub given_name: String,
    pub sku: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            postal_code_1: "送付先郵便番号1".to_string(),
            postal_code_2: "送付先郵便番号2".to_string(),
            prefecture: "送付先住所都道府県".to_string(),
            locality: "送付先住所郡市区".to_string(),
            street: "送付先住所それ以降の住所".to_string(),
            phone_1: "送付先電話番号1".to_string(),
            phone_2: "送付先電話番号2".to_string(),
            phone_3: "送付先電話番号3".to_string(),
            surname: "送付先姓".to_string(),
            given_name: "送付先名".to_string(),
            sku: "SKU管理番号".to_string(),
        }
    }
}

impl ColumnNames {
    fn optional(&self) -> [&str; 10] {
        [
            self.postal_code_1.as_str(),
            self.postal_code_2.as_str(),
            self.prefecture.as_str(),
            self.locality.as_str(),
            self.street.as_str(),
            self.phone_1.as_str(),
            self.phone_2.as_str(),
            self.phone_3.as_str(),
            self.surname.as_str(),
            self.given_name.as_str(),
        ]
    }
}

/// Resolved positions of each field in a concrete header row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    pub postal_code_1: Option<usize>,
    pub postal_code_2: Option<usize>,
    pub prefecture: Option<usize>,
    pub locality: Option<usize>,
    pub street: Option<usize>,
    pub phone_1: Option<usize>,
    pub phone_2: Option<usize>,
    pub phone_3: Option<usize>,
    pub surname: Option<usize>,
    pub given_name: Option<usize>,
    pub sku: usize,
}

impl ColumnIndex {
    /// Locate every configured column in `headers`.
    ///
    /// Only the SKU column is required; the others are optional.
    pub fn resolve<S: AsRef<str>>(names: &ColumnNames, headers: &[S]) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| normalize_header(h.as_ref()) == name);

        let sku = find(&names.sku).ok_or_else(|| LoadError::MissingColumn {
            column: names.sku.clone(),
        })?;

        for name in names.optional() {
            if find(name).is_none() {
                log::warn!("column {name:?} not found in header; its values are treated as empty");
            }
        }

        Ok(Self {
            postal_code_1: find(&names.postal_code_1),
            postal_code_2: find(&names.postal_code_2),
            prefecture: find(&names.prefecture),
            locality: find(&names.locality),
            street: find(&names.street),
            phone_1: find(&names.phone_1),
            phone_2: find(&names.phone_2),
            phone_3: find(&names.phone_3),
            surname: find(&names.surname),
            given_name: find(&names.given_name),
            sku,
        })
    }
}

/// Header cells are compared after trimming and dropping a stray byte-order mark.
pub fn normalize_header(raw: &str) -> &str {
    raw.trim_start_matches('\u{FEFF}').trim()
}

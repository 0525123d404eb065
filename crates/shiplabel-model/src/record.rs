use serde::{Deserialize, Serialize};

use crate::columns::ColumnIndex;
use crate::text::OptionalText;

/// One order row, with every field already classified as present or absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub postal_code_1: OptionalText,
    pub postal_code_2: OptionalText,
    pub prefecture: OptionalText,
    pub locality: OptionalText,
    pub street: OptionalText,
    pub phone_1: OptionalText,
    pub phone_2: OptionalText,
    pub phone_3: OptionalText,
    pub surname: OptionalText,
    pub given_name: OptionalText,
    pub sku: OptionalText,
}

impl OrderRecord {
    /// Build a record from one table row. Columns past the end of a short row are absent.
    pub fn from_row<S: AsRef<str>>(index: &ColumnIndex, row: &[S]) -> Self {
        let cell = |idx: Option<usize>| -> OptionalText {
            idx.and_then(|i| row.get(i))
                .map(|raw| OptionalText::parse(raw.as_ref()))
                .unwrap_or_default()
        };

        Self {
            postal_code_1: cell(index.postal_code_1),
            postal_code_2: cell(index.postal_code_2),
            prefecture: cell(index.prefecture),
            locality: cell(index.locality),
            street: cell(index.street),
            phone_1: cell(index.phone_1),
            phone_2: cell(index.phone_2),
            phone_3: cell(index.phone_3),
            surname: cell(index.surname),
            given_name: cell(index.given_name),
            sku: cell(Some(index.sku)),
        }
    }
}

/// One formatted shipping label.
///
/// Always carries all five fields; the output layout decides whether the phone column is
/// written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub postal_code: String,
    pub address_1: String,
    pub address_2: String,
    pub phone: String,
    pub recipient: String,
}

impl LabelRecord {
    pub fn new(
        postal_code: impl Into<String>,
        address_1: impl Into<String>,
        address_2: impl Into<String>,
        phone: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            postal_code: postal_code.into(),
            address_1: address_1.into(),
            address_2: address_2.into(),
            phone: phone.into(),
            recipient: recipient.into(),
        }
    }

    pub fn fields(&self) -> [&str; 5] {
        [
            self.postal_code.as_str(),
            self.address_1.as_str(),
            self.address_2.as_str(),
            self.phone.as_str(),
            self.recipient.as_str(),
        ]
    }
}

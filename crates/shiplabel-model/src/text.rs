//! Optional text values resolved once at parse time.
//!
//! Order exports that passed through a spreadsheet or a dataframe carry literal
//! missing-value markers (`nan`, `#N/A`, `NULL`, ...) in place of blank cells. Every raw
//! field is classified here exactly once, so the normalizers only ever see
//! [`OptionalText::Absent`] or real text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cell contents that mean "no value" when they make up the entire (trimmed) field.
///
/// This is the full set of strings dataframe CSV readers treat as missing by default.
pub const MISSING_MARKERS: &[&str] = &[
    "nan", "NaN", "-nan", "-NaN", "NA", "N/A", "n/a", "<NA>", "#N/A", "#N/A N/A", "#NA",
    "NULL", "null", "None", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum OptionalText {
    #[default]
    Absent,
    /// Trimmed, non-empty text.
    Present(String),
}

impl OptionalText {
    /// Classify a raw cell.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
            OptionalText::Absent
        } else {
            OptionalText::Present(trimmed.to_string())
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            OptionalText::Absent => None,
            OptionalText::Present(s) => Some(s.as_str()),
        }
    }

    /// The text, or `""` when absent.
    pub fn as_str_or_empty(&self) -> &str {
        self.as_deref().unwrap_or("")
    }

    /// Drop a fractional-number artifact (`"1.0"` -> `"1"`) left behind when a
    /// numeric-as-text column was read as a float and written back out.
    ///
    /// Everything from the first `.` is removed; a value that becomes empty is absent.
    pub fn without_fraction(&self) -> OptionalText {
        match self.as_deref() {
            None => OptionalText::Absent,
            Some(s) => {
                let head = s.split('.').next().unwrap_or("");
                OptionalText::parse(head)
            }
        }
    }
}

impl From<&str> for OptionalText {
    fn from(raw: &str) -> Self {
        OptionalText::parse(raw)
    }
}

impl From<Option<String>> for OptionalText {
    fn from(value: Option<String>) -> Self {
        value.map(|s| OptionalText::parse(&s)).unwrap_or_default()
    }
}

impl From<OptionalText> for Option<String> {
    fn from(value: OptionalText) -> Self {
        match value {
            OptionalText::Absent => None,
            OptionalText::Present(s) => Some(s),
        }
    }
}

impl fmt::Display for OptionalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str_or_empty())
    }
}

/// Left-pad `s` with `'0'` up to `width` characters (never truncates).
pub fn zero_pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat('0').take(width - len));
    out.push_str(s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_and_blanks_are_absent() {
        for raw in [
            "", "   ", "nan", " NaN ", "#N/A", "None", "null", "#N/A N/A", "-1.#IND", "1.#QNAN",
        ] {
            assert_eq!(OptionalText::parse(raw), OptionalText::Absent, "{raw:?}");
        }
    }

    #[test]
    fn markers_only_match_whole_fields() {
        // A name that happens to contain "nan" must survive.
        assert_eq!(
            OptionalText::parse(" nanami "),
            OptionalText::Present("nanami".into())
        );
    }

    #[test]
    fn fraction_artifact_is_dropped() {
        assert_eq!(
            OptionalText::parse("1.0").without_fraction(),
            OptionalText::Present("1".into())
        );
        assert_eq!(
            OptionalText::parse("090").without_fraction(),
            OptionalText::Present("090".into())
        );
        assert_eq!(OptionalText::parse(".0").without_fraction(), OptionalText::Absent);
    }

    #[test]
    fn zero_pad_counts_chars() {
        assert_eq!(zero_pad("1", 4), "0001");
        assert_eq!(zero_pad("12345", 4), "12345");
        assert_eq!(zero_pad("", 3), "000");
    }
}

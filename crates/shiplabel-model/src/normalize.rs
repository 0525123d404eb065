//! Field normalizers that turn an [`OrderRecord`] into a [`LabelRecord`].
//!
//! Every function here is total: missing or malformed input degrades to empty text, never
//! to an error, so a matched row always produces a label.

use serde::{Deserialize, Serialize};

use crate::record::{LabelRecord, OrderRecord};
use crate::text::{zero_pad, OptionalText};

/// Written instead of a name when [`MissingNamePolicy::FlagForReview`] is selected and a
/// name part is missing.
pub const NEEDS_REVIEW_MARKER: &str = "データ確認が必要";

pub const DEFAULT_HONORIFIC: &str = "様";

/// What to write when only one (or neither) of surname and given name is present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingNamePolicy {
    /// Join whatever is present without a separating space, then append the honorific.
    #[default]
    Concatenate,
    /// Replace the whole name with [`NEEDS_REVIEW_MARKER`].
    FlagForReview,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamePolicy {
    pub honorific: String,
    pub missing: MissingNamePolicy,
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self {
            honorific: DEFAULT_HONORIFIC.to_string(),
            missing: MissingNamePolicy::default(),
        }
    }
}

/// `〒PPP-QQQQ`, or `""` when either part is missing or part 1 is the `000` placeholder.
///
/// Part 2 may legitimately be `0000` (a municipality's default code).
pub fn format_postal_code(part_1: &OptionalText, part_2: &OptionalText) -> String {
    let (Some(first), Some(second)) = (
        part_1.without_fraction().as_deref().map(|s| zero_pad(s, 3)),
        part_2.without_fraction().as_deref().map(|s| zero_pad(s, 4)),
    ) else {
        return String::new();
    };

    if is_all_zeros(&first) {
        return String::new();
    }

    format!("〒{first}-{second}")
}

fn is_all_zeros(s: &str) -> bool {
    s.chars().all(|c| c == '0')
}

/// Address line 1 (prefecture + locality) and line 2 (the rest of the address).
pub fn format_address(
    prefecture: &OptionalText,
    locality: &OptionalText,
    street: &OptionalText,
) -> (String, String) {
    let line_1 = format!(
        "{}{}",
        prefecture.as_str_or_empty(),
        locality.as_str_or_empty()
    );
    (
        line_1.trim().to_string(),
        street.as_str_or_empty().trim().to_string(),
    )
}

/// Restore a leading `0` dropped from the area/mobile prefix (`"90"` -> `"090"`).
pub fn restore_leading_zero(prefix: &str) -> String {
    if prefix.is_empty() || prefix.starts_with('0') {
        prefix.to_string()
    } else {
        format!("0{prefix}")
    }
}

/// `p1-p2-p3` when all three parts are present, otherwise the present parts run together.
pub fn format_phone_number(
    part_1: &OptionalText,
    part_2: &OptionalText,
    part_3: &OptionalText,
) -> String {
    let first = part_1
        .without_fraction()
        .as_deref()
        .map(restore_leading_zero);
    let second = part_2.without_fraction();
    let third = part_3.without_fraction();

    match (first.as_deref(), second.as_deref(), third.as_deref()) {
        (Some(a), Some(b), Some(c)) => format!("{a}-{b}-{c}"),
        (a, b, c) => [a, b, c]
            .into_iter()
            .flatten()
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

/// Recipient name with the honorific suffix, e.g. `山田 太郎 様`.
pub fn format_recipient_name(
    surname: &OptionalText,
    given_name: &OptionalText,
    policy: &NamePolicy,
) -> String {
    let honorific = policy.honorific.trim();
    match (surname.as_deref(), given_name.as_deref()) {
        (Some(last), Some(first)) => join_honorific(&format!("{last} {first}"), honorific),
        (last, first) => match policy.missing {
            MissingNamePolicy::FlagForReview => NEEDS_REVIEW_MARKER.to_string(),
            MissingNamePolicy::Concatenate => {
                let name = format!("{}{}", last.unwrap_or(""), first.unwrap_or(""));
                join_honorific(&name, honorific)
            }
        },
    }
}

fn join_honorific(name: &str, honorific: &str) -> String {
    match (name.is_empty(), honorific.is_empty()) {
        // No name at all: just the honorific, without a leading space.
        (true, _) => honorific.to_string(),
        (false, true) => name.to_string(),
        (false, false) => format!("{name} {honorific}"),
    }
}

/// Format one matched order row.
pub fn normalize_order(order: &OrderRecord, names: &NamePolicy) -> LabelRecord {
    let (address_1, address_2) = format_address(&order.prefecture, &order.locality, &order.street);
    LabelRecord {
        postal_code: format_postal_code(&order.postal_code_1, &order.postal_code_2),
        address_1,
        address_2,
        phone: format_phone_number(&order.phone_1, &order.phone_2, &order.phone_3),
        recipient: format_recipient_name(&order.surname, &order.given_name, names),
    }
}

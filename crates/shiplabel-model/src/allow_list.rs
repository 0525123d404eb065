use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::OrderRecord;

/// Product codes selected for label printing when no list is configured.
pub const DEFAULT_SKUS: &[&str] = &[
    "mod2",
    "mod3",
    "mod4",
    "ca-10",
    "z-01",
    "z-03",
    "lb-4",
    "kr--2",
    "kr-03",
    "bkye-c001",
    "bkye-c002",
];

/// Immutable set of SKUs whose rows are converted.
///
/// Entries are trimmed on construction; lookups trim the candidate and then compare exactly
/// (case sensitive).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SkuAllowList {
    skus: BTreeSet<String>,
}

impl SkuAllowList {
    pub fn new<I, S>(skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            skus: skus
                .into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.skus.contains(sku.trim())
    }

    pub fn allows(&self, record: &OrderRecord) -> bool {
        record.sku.as_deref().is_some_and(|sku| self.contains(sku))
    }

    /// Keep only the records whose SKU is allowed, preserving input order.
    pub fn retain(&self, records: Vec<OrderRecord>) -> Vec<OrderRecord> {
        records.into_iter().filter(|r| self.allows(r)).collect()
    }

    pub fn len(&self) -> usize {
        self.skus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.skus.iter().map(String::as_str)
    }
}

impl Default for SkuAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_SKUS)
    }
}

impl From<Vec<String>> for SkuAllowList {
    fn from(value: Vec<String>) -> Self {
        Self::new(value)
    }
}

impl From<SkuAllowList> for Vec<String> {
    fn from(value: SkuAllowList) -> Self {
        value.skus.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::OptionalText;

    fn order(sku: &str) -> OrderRecord {
        OrderRecord {
            sku: OptionalText::parse(sku),
            ..OrderRecord::default()
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let list = SkuAllowList::default();
        assert!(list.allows(&order(" mod2 ")));
        assert!(!list.allows(&order("mod5")));
        assert!(!list.allows(&order("MOD2")));
        assert!(!list.allows(&order("")));
    }

    #[test]
    fn retain_keeps_order_and_only_matches() {
        let list = SkuAllowList::new(["z-01", "kr--2"]);
        let kept = list.retain(vec![order("kr--2"), order("mod2"), order("z-01 ")]);
        let skus: Vec<_> = kept.iter().map(|r| r.sku.to_string()).collect();
        assert_eq!(skus, ["kr--2", "z-01"]);
    }
}

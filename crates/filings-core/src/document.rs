//! Typed shape of the archive's tagged-facts documents.
//!
//! The companyfacts endpoint returns facts organized as
//! taxonomy → tag → unit → list of dated entries. These types keep that nesting
//! but give every entry explicit optional fields, so parsers never walk
//! untyped maps.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Full tagged-facts document for one entity.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFacts {
    /// CIK number (the archive returns it unpadded).
    #[serde(default)]
    pub cik: u64,
    /// Entity name.
    #[serde(default)]
    pub entity_name: String,
    /// Facts organized by taxonomy and tag.
    #[serde(default)]
    pub facts: HashMap<String, HashMap<String, TagFacts>>,
}

impl CompanyFacts {
    /// Returns the facts reported for `tag` in `taxonomy`, if any.
    #[must_use]
    pub fn tag(&self, taxonomy: &str, tag: &str) -> Option<&TagFacts> {
        self.facts.get(taxonomy)?.get(tag)
    }

    /// Number of distinct tags across all taxonomies.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.facts.values().map(HashMap::len).sum()
    }
}

/// Facts for a single tag.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TagFacts {
    /// Label assigned by the taxonomy.
    #[serde(default)]
    pub label: Option<String>,
    /// Description assigned by the taxonomy.
    #[serde(default)]
    pub description: Option<String>,
    /// Entries grouped by unit of measure.
    #[serde(default)]
    pub units: HashMap<String, Vec<FactEntry>>,
}

/// A single dated fact entry.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FactEntry {
    /// Start of the period; absent for instant facts.
    #[serde(default)]
    pub start: Option<String>,
    /// End of the period, or the instant.
    #[serde(default)]
    pub end: Option<String>,
    /// Reported value, kept in the textual form the archive sent.
    #[serde(default)]
    pub val: Option<serde_json::Number>,
    /// Accession number of the reporting filing.
    #[serde(default)]
    pub accn: Option<String>,
    /// Fiscal year.
    #[serde(default)]
    pub fy: Option<i32>,
    /// Fiscal period (`FY`, `Q1`..`Q4`).
    #[serde(default)]
    pub fp: Option<String>,
    /// Form type of the reporting filing.
    #[serde(default)]
    pub form: Option<String>,
    /// Filing date.
    #[serde(default)]
    pub filed: Option<String>,
    /// Calendar frame (e.g. `CY2023Q4I`).
    #[serde(default)]
    pub frame: Option<String>,
}

impl FactEntry {
    /// Returns the value as an exact decimal.
    ///
    /// `serde_json` is built with `arbitrary_precision`, so the number holds
    /// the digits exactly as written and is converted from that text without
    /// passing through `f64`.
    #[must_use]
    pub fn decimal_value(&self) -> Option<Decimal> {
        let text = self.val.as_ref()?.to_string();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }
}

/// Response of the single-concept endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyConcept {
    /// CIK number.
    #[serde(default)]
    pub cik: u64,
    /// Taxonomy of the concept.
    #[serde(default)]
    pub taxonomy: String,
    /// Tag of the concept.
    #[serde(default)]
    pub tag: String,
    /// Label assigned by the taxonomy.
    #[serde(default)]
    pub label: Option<String>,
    /// Description assigned by the taxonomy.
    #[serde(default)]
    pub description: Option<String>,
    /// Entity name.
    #[serde(default)]
    pub entity_name: String,
    /// Entries grouped by unit of measure.
    #[serde(default)]
    pub units: HashMap<String, Vec<FactEntry>>,
}

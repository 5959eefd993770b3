//! Tagged-facts document → statement line items.
//!
//! Different companies report the same concept under different tags, and not
//! every company reports every tag. A [`TagDictionary`] lists the tags worth
//! extracting per statement; [`FactsParser`] emits one line item for every
//! dated entry of every listed tag it finds.
//!
//! Entries are not deduplicated: an amended filing that restates a figure
//! yields a second line item with its own accession number. Filtering by
//! filing is done with [`StatementSet::for_accession`].

use chrono::NaiveDate;
use filings_core::{
    AccessionNumber, CompanyFacts, FactEntry, NormalizedStatementLineItem, StatementCategory,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Taxonomy namespace of US GAAP tags.
pub const US_GAAP: &str = "us-gaap";

const INCOME_TAGS: &[&str] = &[
    "Revenues",
    "RevenueFromContractWithCustomerExcludingAssessedTax",
    "CostOfRevenue",
    "GrossProfit",
    "OperatingExpenses",
    "OperatingIncomeLoss",
    "NetIncomeLoss",
    "EarningsPerShareBasic",
    "EarningsPerShareDiluted",
];

const BALANCE_TAGS: &[&str] = &[
    "Assets",
    "AssetsCurrent",
    "CashAndCashEquivalentsAtCarryingValue",
    "AccountsReceivableNetCurrent",
    "InventoryNet",
    "PropertyPlantAndEquipmentNet",
    "Liabilities",
    "LiabilitiesCurrent",
    "AccountsPayableCurrent",
    "LongTermDebt",
    "StockholdersEquity",
];

const CASHFLOW_TAGS: &[&str] = &[
    "NetCashProvidedByUsedInOperatingActivities",
    "NetCashProvidedByUsedInInvestingActivities",
    "NetCashProvidedByUsedInFinancingActivities",
    "PaymentsToAcquirePropertyPlantAndEquipment",
    "Depreciation",
];

// Alternative tags companies use for the concepts above.
const EXTENDED_INCOME_TAGS: &[&str] = &[
    "SalesRevenueNet",
    "RevenueFromContractWithCustomerIncludingAssessedTax",
    "CostOfGoodsAndServicesSold",
    "CostOfGoodsSold",
    "ProfitLoss",
    "NetIncomeLossAvailableToCommonStockholdersBasic",
    "InterestExpense",
    "IncomeTaxExpenseBenefit",
    "WeightedAverageNumberOfSharesOutstandingBasic",
    "WeightedAverageNumberOfDilutedSharesOutstanding",
];

const EXTENDED_BALANCE_TAGS: &[&str] = &[
    "CashCashEquivalentsAndShortTermInvestments",
    "AccountsReceivableNet",
    "InventoryNet",
    "LongTermDebtNoncurrent",
    "ShortTermBorrowings",
    "DebtCurrent",
    "AccountsPayableAndAccruedLiabilitiesCurrent",
    "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
    "LiabilitiesAndStockholdersEquity",
    "CommonStockSharesOutstanding",
];

const EXTENDED_CASHFLOW_TAGS: &[&str] = &[
    "CashProvidedByUsedInOperatingActivities",
    "DepreciationDepletionAndAmortization",
    "PaymentsOfDividends",
    "PaymentsForRepurchaseOfCommonStock",
];

const EQUITY_TAGS: &[&str] = &[
    "StockIssuedDuringPeriodValueNewIssues",
    "StockRepurchasedDuringPeriodValue",
    "DividendsCommonStock",
    "CommonStockDividendsPerShareDeclared",
    "RetainedEarningsAccumulatedDeficit",
    "AccumulatedOtherComprehensiveIncomeLossNetOfTax",
];

/// One tag to extract and the statement it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMapping {
    /// Statement the tag feeds.
    pub category: StatementCategory,
    /// Human-readable label given to the line items.
    pub label: String,
    /// Taxonomy namespace (e.g. `us-gaap`).
    pub taxonomy: String,
    /// Tag name within the taxonomy.
    pub tag: String,
}

impl TagMapping {
    /// Maps a `us-gaap` tag, deriving the label from the tag name.
    #[must_use]
    pub fn gaap(category: StatementCategory, tag: &str) -> Self {
        Self {
            category,
            label: humanize_tag(tag),
            taxonomy: US_GAAP.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// The set of tags a [`FactsParser`] extracts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDictionary {
    mappings: Vec<TagMapping>,
}

impl TagDictionary {
    /// A dictionary with no tags.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }

    /// The core income, balance sheet and cash flow tags.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with_tags(StatementCategory::Income, INCOME_TAGS)
            .with_tags(StatementCategory::Balance, BALANCE_TAGS)
            .with_tags(StatementCategory::CashFlow, CASHFLOW_TAGS)
    }

    /// The standard tags plus common alternatives and the equity statement.
    #[must_use]
    pub fn extended() -> Self {
        Self::standard()
            .with_tags(StatementCategory::Income, EXTENDED_INCOME_TAGS)
            .with_tags(StatementCategory::Balance, EXTENDED_BALANCE_TAGS)
            .with_tags(StatementCategory::CashFlow, EXTENDED_CASHFLOW_TAGS)
            .with_tags(StatementCategory::Equity, EQUITY_TAGS)
    }

    /// Adds a `us-gaap` tag. Tags already mapped to the category are ignored.
    #[must_use]
    pub fn with_tag(self, category: StatementCategory, tag: &str) -> Self {
        self.with_mapping(TagMapping::gaap(category, tag))
    }

    /// Adds an explicit mapping. Duplicates of an existing mapping are ignored.
    #[must_use]
    pub fn with_mapping(mut self, mapping: TagMapping) -> Self {
        let exists = self.mappings.iter().any(|m| {
            m.category == mapping.category && m.taxonomy == mapping.taxonomy && m.tag == mapping.tag
        });
        if !exists {
            self.mappings.push(mapping);
        }
        self
    }

    fn with_tags(self, category: StatementCategory, tags: &[&str]) -> Self {
        tags.iter()
            .fold(self, |dictionary, tag| dictionary.with_tag(category, tag))
    }

    /// All mappings, in insertion order.
    #[must_use]
    pub fn mappings(&self) -> &[TagMapping] {
        &self.mappings
    }

    /// Mappings feeding `category`.
    pub fn for_category(&self, category: StatementCategory) -> impl Iterator<Item = &TagMapping> {
        self.mappings.iter().filter(move |m| m.category == category)
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if no tags are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Line items grouped by statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementSet {
    statements: BTreeMap<StatementCategory, Vec<NormalizedStatementLineItem>>,
}

impl StatementSet {
    /// Line items of one statement.
    #[must_use]
    pub fn category(&self, category: StatementCategory) -> &[NormalizedStatementLineItem] {
        self.statements
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates over every line item, statement by statement.
    pub fn iter(&self) -> impl Iterator<Item = &NormalizedStatementLineItem> {
        self.statements.values().flatten()
    }

    /// Total number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.values().map(Vec::len).sum()
    }

    /// Returns true if no line items were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps only the line items reported by `accession`.
    #[must_use]
    pub fn for_accession(&self, accession: &AccessionNumber) -> Self {
        let statements = self
            .statements
            .iter()
            .map(|(category, items)| {
                let kept = items
                    .iter()
                    .filter(|item| item.reported_in(accession))
                    .cloned()
                    .collect::<Vec<_>>();
                (*category, kept)
            })
            .filter(|(_, items)| !items.is_empty())
            .collect();

        Self { statements }
    }

    /// Consumes the set, returning every line item.
    #[must_use]
    pub fn into_items(self) -> Vec<NormalizedStatementLineItem> {
        self.statements.into_values().flatten().collect()
    }

    fn push(&mut self, item: NormalizedStatementLineItem) {
        self.statements.entry(item.category).or_default().push(item);
    }
}

/// Flattens tagged-facts documents into statement line items.
#[derive(Debug, Clone)]
pub struct FactsParser {
    dictionary: TagDictionary,
}

impl Default for FactsParser {
    fn default() -> Self {
        Self::new(TagDictionary::standard())
    }
}

impl FactsParser {
    /// Creates a parser extracting the tags in `dictionary`.
    #[must_use]
    pub const fn new(dictionary: TagDictionary) -> Self {
        Self { dictionary }
    }

    /// The tags this parser extracts.
    #[must_use]
    pub const fn dictionary(&self) -> &TagDictionary {
        &self.dictionary
    }

    /// Extracts every mapped tag from `facts`.
    ///
    /// Tags the document does not carry are skipped; a document with none of
    /// them yields an empty set. Units are visited in name order so output is
    /// deterministic.
    #[must_use]
    pub fn parse(&self, facts: &CompanyFacts) -> StatementSet {
        let mut set = StatementSet::default();

        for mapping in self.dictionary.mappings() {
            let Some(tag_facts) = facts.tag(&mapping.taxonomy, &mapping.tag) else {
                continue;
            };

            let mut units: Vec<_> = tag_facts.units.iter().collect();
            units.sort_by(|a, b| a.0.cmp(b.0));

            for (unit, entries) in units {
                for entry in entries {
                    if let Some(item) = line_item(mapping, unit, entry) {
                        set.push(item);
                    }
                }
            }
        }

        if set.is_empty() {
            info!(
                cik = facts.cik,
                taxonomies = facts.facts.len(),
                "No mapped tags found in facts document"
            );
        } else {
            info!(
                cik = facts.cik,
                income = set.category(StatementCategory::Income).len(),
                balance = set.category(StatementCategory::Balance).len(),
                cashflow = set.category(StatementCategory::CashFlow).len(),
                equity = set.category(StatementCategory::Equity).len(),
                "Parsed statement line items"
            );
        }

        set
    }
}

fn line_item(
    mapping: &TagMapping,
    unit: &str,
    entry: &FactEntry,
) -> Option<NormalizedStatementLineItem> {
    let Some(period_end) = entry.end.as_deref().and_then(parse_date) else {
        debug!(tag = %mapping.tag, end = ?entry.end, "Skipping entry without a valid end date");
        return None;
    };

    let period_start = match entry.start.as_deref() {
        None => None,
        Some(raw) => match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                debug!(tag = %mapping.tag, start = raw, "Skipping entry with an invalid start date");
                return None;
            }
        },
    };

    let Some(value) = entry.decimal_value() else {
        debug!(tag = %mapping.tag, val = ?entry.val, "Skipping entry without a decimal value");
        return None;
    };

    Some(NormalizedStatementLineItem {
        category: mapping.category,
        label: mapping.label.clone(),
        tag: mapping.tag.clone(),
        taxonomy: mapping.taxonomy.clone(),
        value,
        unit: unit.to_string(),
        fiscal_year: entry.fy,
        fiscal_period: entry.fp.clone(),
        fiscal_quarter: entry.fp.as_deref().and_then(fiscal_quarter),
        period_start,
        period_end,
        accession: entry.accn.as_deref().map(AccessionNumber::new),
        form: entry.form.clone(),
        filed: entry.filed.as_deref().and_then(parse_date),
        frame: entry.frame.clone(),
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// `Q1`..`Q4` → 1..4; anything else (including `FY`) has no quarter.
fn fiscal_quarter(fp: &str) -> Option<u8> {
    match fp.trim() {
        "Q1" => Some(1),
        "Q2" => Some(2),
        "Q3" => Some(3),
        "Q4" => Some(4),
        _ => None,
    }
}

/// Turns a tag name into a readable label.
///
/// `Abstract` and `TextBlock` markers are dropped and words are split at case
/// changes, keeping acronyms together.
///
/// ```
/// use filings_parse::humanize_tag;
///
/// assert_eq!(humanize_tag("NetIncomeLoss"), "Net Income Loss");
/// assert_eq!(humanize_tag("EBITDAMargin"), "EBITDA Margin");
/// ```
#[must_use]
pub fn humanize_tag(tag: &str) -> String {
    let cleaned = tag.replace("Abstract", "").replace("TextBlock", "");
    let chars: Vec<char> = cleaned.chars().collect();
    let mut label = String::with_capacity(chars.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                label.push(' ');
            }
        }
        label.push(c);
    }

    label.trim().to_string()
}

//! Core record types for ingested filings.
//!
//! This module defines the normalized structures produced by the ingestion core:
//!
//! - [`Cik`] - Central Index Key of a reporting entity
//! - [`AccessionNumber`] - Archive identifier of one filed document
//! - [`Company`] - Entity index entry
//! - [`FilingSummary`] - One row of an entity's filing index
//! - [`RawFilingDocument`] - Raw bytes of a filing plus identifying metadata
//! - [`NormalizedStatementLineItem`] - One fact of a financial statement
//! - [`NormalizedHolding`] - One institutional position from a 13F information table

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::FilingsError;

/// A Central Index Key.
///
/// Always stored zero-padded to ten digits, the form the archive uses in its
/// JSON endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cik(String);

impl Cik {
    /// Returns the padded CIK as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric value of the CIK (the form used in archive paths).
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0.parse().unwrap_or_default()
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Cik {
    fn from(value: u64) -> Self {
        Self(format!("{value:0>10}"))
    }
}

impl FromStr for Cik {
    type Err = FilingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("CIK")
            .or_else(|| trimmed.strip_prefix("cik"))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FilingsError::InvalidParameter(format!("Invalid CIK: {s}")));
        }

        Ok(Self(format!("{digits:0>10}")))
    }
}

/// An accession number, e.g. `0000320193-24-000123`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessionNumber(String);

impl AccessionNumber {
    /// Creates a new accession number, trimming surrounding whitespace.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_string())
    }

    /// Returns the accession number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the accession number without dashes, as used in archive folder names.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.replace('-', "")
    }
}

impl fmt::Display for AccessionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccessionNumber {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccessionNumber {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Entry of the archive's entity index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Central Index Key.
    pub cik: Cik,
    /// Primary ticker, when the entity trades.
    pub ticker: Option<String>,
    /// Registered entity name.
    pub name: String,
}

impl Company {
    /// Creates a new company record.
    #[must_use]
    pub fn new(cik: Cik, name: impl Into<String>) -> Self {
        Self {
            cik,
            ticker: None,
            name: name.into(),
        }
    }

    /// Sets the ticker symbol (uppercased).
    #[must_use]
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into().to_uppercase());
        self
    }
}

/// One filing from an entity's filing index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingSummary {
    /// Filer CIK.
    pub cik: Cik,
    /// Accession number.
    pub accession: AccessionNumber,
    /// Form type (e.g. `10-K`, `13F-HR`).
    pub form_type: String,
    /// Date the filing was accepted.
    pub filing_date: NaiveDate,
    /// Period the filing reports on, if provided.
    pub report_date: Option<NaiveDate>,
    /// Primary document file name inside the filing folder.
    pub primary_document: Option<String>,
}

impl FilingSummary {
    /// Object-store key under which the raw submission text is cached.
    #[must_use]
    pub fn object_key(&self) -> String {
        format!("filings/{}/{}.txt", self.cik, self.accession)
    }

    /// Form type with any amendment suffix removed (`10-K/A` becomes `10-K`).
    #[must_use]
    pub fn base_form(&self) -> &str {
        self.form_type
            .strip_suffix("/A")
            .unwrap_or(&self.form_type)
    }

    /// Returns true for forms whose figures come from the tagged-facts document.
    #[must_use]
    pub fn is_financial_report(&self) -> bool {
        matches!(self.base_form(), "10-K" | "10-Q")
    }

    /// Returns true for institutional holdings reports.
    #[must_use]
    pub fn is_holdings_report(&self) -> bool {
        self.base_form() == "13F-HR"
    }

    /// Date holdings of this filing are reported as of.
    #[must_use]
    pub fn effective_report_date(&self) -> NaiveDate {
        self.report_date.unwrap_or(self.filing_date)
    }
}

/// Processing state of a filing, as reported to the record sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "message")]
pub enum FilingStatus {
    /// Known but not yet parsed.
    Pending,
    /// Parse in progress.
    Processing,
    /// Parsed successfully (possibly with an empty result).
    Completed,
    /// Parse failed with the given message.
    Failed(String),
}

impl FilingStatus {
    /// Returns the status label without the failure message.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Raw filing bytes plus identifying metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFilingDocument {
    /// Filer CIK.
    pub cik: Cik,
    /// Accession number of the filing.
    pub accession: AccessionNumber,
    /// URL the document was fetched from, when it came from the archive.
    pub url: Option<String>,
    /// Raw document content.
    pub content: Vec<u8>,
}

impl RawFilingDocument {
    /// Creates a new raw document.
    #[must_use]
    pub const fn new(cik: Cik, accession: AccessionNumber, content: Vec<u8>) -> Self {
        Self {
            cik,
            accession,
            url: None,
            content,
        }
    }

    /// Sets the source URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Decodes the content as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Size of the content in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns true if the document has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Financial statement a line item belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementCategory {
    /// Income statement.
    Income,
    /// Balance sheet.
    Balance,
    /// Cash flow statement.
    #[serde(rename = "cashflow")]
    CashFlow,
    /// Statement of stockholders' equity.
    Equity,
}

impl StatementCategory {
    /// All categories, in statement order.
    pub const ALL: [Self; 4] = [Self::Income, Self::Balance, Self::CashFlow, Self::Equity];

    /// Returns the lowercase label used in persisted records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Balance => "balance",
            Self::CashFlow => "cashflow",
            Self::Equity => "equity",
        }
    }
}

impl fmt::Display for StatementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized fact of a financial statement.
///
/// Whether the fact is a point-in-time balance or a flow over a period is not
/// stored; [`is_instant`](Self::is_instant) derives it from `period_start`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedStatementLineItem {
    /// Statement the item belongs to.
    pub category: StatementCategory,
    /// Human-readable line item label.
    pub label: String,
    /// Standardized tag name (without namespace).
    pub tag: String,
    /// Taxonomy namespace the tag was read from (e.g. `us-gaap`).
    pub taxonomy: String,
    /// Exact reported value.
    pub value: Decimal,
    /// Unit of measure (e.g. `USD`, `shares`, `USD/shares`).
    pub unit: String,
    /// Fiscal year.
    pub fiscal_year: Option<i32>,
    /// Fiscal period as reported (`FY`, `Q1`..`Q4`).
    pub fiscal_period: Option<String>,
    /// Fiscal quarter (1-4), absent for annual figures.
    pub fiscal_quarter: Option<u8>,
    /// Start of the reporting period; absent for instant facts.
    pub period_start: Option<NaiveDate>,
    /// End of the reporting period (or the instant).
    pub period_end: NaiveDate,
    /// Accession number of the filing that reported the fact.
    pub accession: Option<AccessionNumber>,
    /// Form type of the filing that reported the fact.
    pub form: Option<String>,
    /// Date the reporting filing was filed.
    pub filed: Option<NaiveDate>,
    /// Calendar frame assigned by the archive (e.g. `CY2023Q4I`).
    pub frame: Option<String>,
}

impl NormalizedStatementLineItem {
    /// Returns true when the fact is a point-in-time balance (no period start).
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.period_start.is_none()
    }

    /// Returns true if the fact was reported by the given filing.
    #[must_use]
    pub fn reported_in(&self, accession: &AccessionNumber) -> bool {
        self.accession.as_ref() == Some(accession)
    }
}

/// Put/call indicator of a reported position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PutCall {
    /// Put option position.
    Put,
    /// Call option position.
    Call,
    /// Both puts and calls.
    Both,
    /// Plain shares or principal amount.
    #[default]
    #[serde(rename = "none")]
    Neither,
}

impl PutCall {
    /// Parses the indicator leniently; anything unrecognized is [`PutCall::Neither`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "put" => Self::Put,
            "call" => Self::Call,
            "both" => Self::Both,
            _ => Self::Neither,
        }
    }

    /// Returns the lowercase label used in persisted records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "put",
            Self::Call => "call",
            Self::Both => "both",
            Self::Neither => "none",
        }
    }
}

/// Breakdown of a position by voting/discretion authority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscretionBreakdown {
    /// Shares with sole authority.
    pub sole: Decimal,
    /// Shares with shared authority.
    pub shared: Decimal,
    /// Shares with no authority.
    pub none: Decimal,
}

/// One institutional position from a holdings report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedHolding {
    /// Nine-character CUSIP of the security.
    pub cusip: String,
    /// Issuer name as reported.
    pub issuer_name: String,
    /// Ticker symbol, filled in by enrichment.
    pub ticker: Option<String>,
    /// Title of the class of security (e.g. `COM`).
    pub title_of_class: Option<String>,
    /// Share count or principal amount.
    pub shares: Decimal,
    /// `SH` for shares, `PRN` for principal amount.
    pub share_type: Option<String>,
    /// Market value, in thousands of the reporting currency.
    pub market_value: Decimal,
    /// Put/call indicator.
    pub put_call: PutCall,
    /// Investment discretion code (`SOLE`, `DFND`, `OTR`).
    pub investment_discretion: Option<String>,
    /// Voting/discretion breakdown.
    pub discretion: DiscretionBreakdown,
    /// Date the position is reported as of.
    pub report_date: Option<NaiveDate>,
}

impl NormalizedHolding {
    /// Creates a holding with the two mandatory fields; everything else defaults.
    #[must_use]
    pub fn new(cusip: impl Into<String>, issuer_name: impl Into<String>) -> Self {
        Self {
            cusip: cusip.into().trim().to_ascii_uppercase(),
            issuer_name: issuer_name.into().trim().to_string(),
            ..Default::default()
        }
    }

    /// Returns true if `s` has the shape of a CUSIP (nine ASCII alphanumerics).
    #[must_use]
    pub fn is_cusip(s: &str) -> bool {
        s.len() == 9 && s.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// A holding is valid when it has a well-formed CUSIP and an issuer name.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Self::is_cusip(&self.cusip) && !self.issuer_name.is_empty()
    }

    /// Sets the report date.
    #[must_use]
    pub fn with_report_date(mut self, report_date: NaiveDate) -> Self {
        self.report_date = Some(report_date);
        self
    }
}

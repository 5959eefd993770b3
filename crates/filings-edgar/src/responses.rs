//! Archive JSON response types.

use chrono::NaiveDate;
use filings_core::{AccessionNumber, Cik, Company, FilingSummary};
use serde::Deserialize;
use tracing::debug;

/// One entry of the archive's ticker list.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyTickerInfo {
    /// CIK as a number (the archive returns it unpadded)
    pub cik_str: u64,
    /// Ticker symbol
    pub ticker: String,
    /// Company name
    pub title: String,
}

impl From<CompanyTickerInfo> for Company {
    fn from(info: CompanyTickerInfo) -> Self {
        let company = Self::new(Cik::from(info.cik_str), info.title);
        if info.ticker.trim().is_empty() {
            company
        } else {
            company.with_ticker(info.ticker.trim())
        }
    }
}

/// Company submissions: entity metadata plus the recent filing index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySubmissions {
    /// CIK as returned by the archive
    #[serde(default)]
    pub cik: String,
    /// Company name
    #[serde(default)]
    pub name: String,
    /// Ticker symbols
    #[serde(default)]
    pub tickers: Vec<String>,
    /// Exchanges the tickers trade on
    #[serde(default)]
    pub exchanges: Vec<String>,
    /// SIC code
    #[serde(default)]
    pub sic: Option<String>,
    /// SIC description
    #[serde(default)]
    pub sic_description: Option<String>,
    /// Filing index
    #[serde(default)]
    pub filings: SubmissionFilings,
}

/// Wrapper around the filing index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionFilings {
    /// Most recent filings, as parallel arrays
    #[serde(default)]
    pub recent: FilingsRecent,
}

/// Recent filings as column arrays, one index per filing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingsRecent {
    /// Accession numbers
    #[serde(default)]
    pub accession_number: Vec<String>,
    /// Filing dates (`YYYY-MM-DD`)
    #[serde(default)]
    pub filing_date: Vec<String>,
    /// Report dates; empty strings for forms without a period
    #[serde(default)]
    pub report_date: Vec<String>,
    /// Form types
    #[serde(default)]
    pub form: Vec<String>,
    /// Primary document file names
    #[serde(default)]
    pub primary_document: Vec<String>,
}

impl CompanySubmissions {
    /// Converts the recent filing index into summaries.
    ///
    /// Only forms listed in `forms` are kept; an empty slice keeps every form.
    /// Rows with a missing accession number or an unparseable filing date are
    /// skipped.
    #[must_use]
    pub fn to_summaries(&self, cik: &Cik, forms: &[String]) -> Vec<FilingSummary> {
        let recent = &self.filings.recent;
        let mut summaries = Vec::new();

        for (i, accession) in recent.accession_number.iter().enumerate() {
            let Some(form) = recent.form.get(i) else {
                continue;
            };
            if !forms.is_empty() && !forms.iter().any(|f| f == form) {
                continue;
            }

            let Some(filing_date) = recent.filing_date.get(i).and_then(|d| parse_date(d)) else {
                debug!(accession = %accession, "Skipping filing without a valid filing date");
                continue;
            };

            if accession.trim().is_empty() {
                continue;
            }

            summaries.push(FilingSummary {
                cik: cik.clone(),
                accession: AccessionNumber::new(accession.as_str()),
                form_type: form.clone(),
                filing_date,
                report_date: recent.report_date.get(i).and_then(|d| parse_date(d)),
                primary_document: recent
                    .primary_document
                    .get(i)
                    .filter(|d| !d.trim().is_empty())
                    .cloned(),
            });
        }

        summaries
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBMISSIONS: &str = r#"{
        "cik": "1067983",
        "name": "BERKSHIRE HATHAWAY INC",
        "tickers": ["BRK-B", "BRK-A"],
        "exchanges": ["NYSE", "NYSE"],
        "sic": "6331",
        "sicDescription": "Fire, Marine & Casualty Insurance",
        "filings": {
            "recent": {
                "accessionNumber": ["0000950123-24-008740", "0001193125-24-123456", "0000950170-24-000001"],
                "filingDate": ["2024-05-15", "2024-05-04", "not-a-date"],
                "reportDate": ["2024-03-31", "", "2023-12-31"],
                "form": ["13F-HR", "8-K", "10-K"],
                "primaryDocument": ["xslForm13F_X02/primary_doc.xml", "d123.htm", ""]
            }
        }
    }"#;

    #[test]
    fn test_to_summaries_filters_forms() {
        let submissions: CompanySubmissions = serde_json::from_str(SUBMISSIONS).unwrap();
        let cik = Cik::from(1067983);

        let holdings = submissions.to_summaries(&cik, &["13F-HR".to_string()]);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].accession.as_str(), "0000950123-24-008740");
        assert_eq!(holdings[0].report_date, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(holdings[0].cik, cik);
    }

    #[test]
    fn test_to_summaries_all_forms_skips_bad_dates() {
        let submissions: CompanySubmissions = serde_json::from_str(SUBMISSIONS).unwrap();
        let all = submissions.to_summaries(&Cik::from(1067983), &[]);

        // The 10-K row has an invalid filing date.
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].form_type, "8-K");
        assert_eq!(all[1].report_date, None);
        assert_eq!(all[1].primary_document.as_deref(), Some("d123.htm"));
    }

    #[test]
    fn test_ticker_info_into_company() {
        let info: CompanyTickerInfo =
            serde_json::from_str(r#"{"cik_str": 320193, "ticker": "aapl", "title": "Apple Inc."}"#)
                .unwrap();
        let company = Company::from(info);
        assert_eq!(company.cik.as_str(), "0000320193");
        assert_eq!(company.ticker.as_deref(), Some("AAPL"));
        assert_eq!(company.name, "Apple Inc.");
    }

    #[test]
    fn test_missing_filings_section() {
        let submissions: CompanySubmissions =
            serde_json::from_str(r#"{"cik": "1", "name": "Shell Co"}"#).unwrap();
        assert!(submissions.to_summaries(&Cik::from(1), &[]).is_empty());
    }
}

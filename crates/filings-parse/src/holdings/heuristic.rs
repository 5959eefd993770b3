//! Heuristic pass: holdings recovered from HTML table rows.
//!
//! Best effort only. Used for filings that predate the XML information table,
//! where positions live in formatted tables with no fixed column order. Each
//! row with at least four cells is scanned for:
//!
//! - a CUSIP: the first cell that is exactly nine uppercase alphanumerics
//! - an issuer: the first cell longer than ten characters that is not just a
//!   number, taken from the first column or from a column after the CUSIP
//! - a share count: the first number found inside any other cell, excluding
//!   the last column
//! - a market value: the first number found inside the last column
//!
//! Numbers are searched for within a cell, so `12,000 SH` yields 12000 and
//! `1,850 (x$1000)` yields 1850.
//!
//! Rows without both a CUSIP and an issuer are ignored. Fields that cannot be
//! recovered stay at zero.

use filings_core::NormalizedHolding;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use tracing::debug;

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to compile CELL_SELECTOR"));

static CUSIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{9}$").expect("Failed to compile CUSIP_RE"));

// First number token in a cell, comma-grouped or plain.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}(?:,\d{3})+|\d+").expect("Failed to compile NUMBER_RE"));

// A cell holding nothing but a number, optionally prefixed with `$`.
static NUMERIC_CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$?\s*(?:\d{1,3}(?:,\d{3})+|\d+)$")
        .expect("Failed to compile NUMERIC_CELL_RE")
});

const MIN_CELLS: usize = 4;
const MIN_ISSUER_LEN: usize = 10;

/// Scans every table row of `text` for holdings.
#[must_use]
pub fn parse(text: &str) -> Vec<NormalizedHolding> {
    let document = Html::parse_document(text);
    let mut holdings = Vec::new();

    for row in document.select(&ROW_SELECTOR) {
        let cells = cell_texts(row);
        if cells.len() < MIN_CELLS {
            continue;
        }
        if let Some(holding) = parse_row(&cells) {
            holdings.push(holding);
        }
    }

    debug!(holdings = holdings.len(), "Heuristic table scan finished");
    holdings
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SELECTOR)
        .map(|cell| {
            cell.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Recovers a holding from one row's cell texts.
pub(crate) fn parse_row(cells: &[String]) -> Option<NormalizedHolding> {
    let last = cells.len().checked_sub(1)?;
    let cusip_idx = cells.iter().position(|c| CUSIP_RE.is_match(c))?;

    let issuer_idx = cells.iter().enumerate().position(|(i, c)| {
        let eligible = i == 0 || i > cusip_idx;
        eligible && c.chars().count() > MIN_ISSUER_LEN && !NUMERIC_CELL_RE.is_match(c.trim())
    })?;

    let mut holding =
        NormalizedHolding::new(cells[cusip_idx].as_str(), cells[issuer_idx].as_str());

    holding.shares = cells
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != cusip_idx && *i != issuer_idx && *i != last)
        .find_map(|(_, c)| number(c))
        .unwrap_or_default();

    if last != cusip_idx && last != issuer_idx {
        holding.market_value = number(&cells[last]).unwrap_or_default();
    }

    Some(holding)
}

fn number(cell: &str) -> Option<Decimal> {
    let token = NUMBER_RE.find(cell)?;
    Decimal::from_str(&token.as_str().replace(',', "")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_row_with_all_fields() {
        let holding = parse_row(&row(&[
            "INTL BUSINESS MACHINES",
            "COM",
            "459200101",
            "12,000",
            "$1,850",
        ]))
        .unwrap();

        assert_eq!(holding.cusip, "459200101");
        assert_eq!(holding.issuer_name, "INTL BUSINESS MACHINES");
        assert_eq!(holding.shares, Decimal::from(12_000));
        assert_eq!(holding.market_value, Decimal::from(1850));
        assert_eq!(holding.put_call, filings_core::PutCall::Neither);
    }

    #[test]
    fn test_row_without_numbers_has_zero_fields() {
        let holding = parse_row(&row(&[
            "ACME WIDGETS CORPORATION",
            "COM",
            "00123X101",
            "n/a",
        ]))
        .unwrap();

        assert_eq!(holding.cusip, "00123X101");
        assert_eq!(holding.issuer_name, "ACME WIDGETS CORPORATION");
        assert_eq!(holding.shares, Decimal::ZERO);
        assert_eq!(holding.market_value, Decimal::ZERO);
    }

    #[test]
    fn test_numbers_are_found_inside_annotated_cells() {
        let holding = parse_row(&row(&[
            "INTL BUSINESS MACHINES",
            "COM",
            "459200101",
            "12,000 SH",
            "1,850 (x$1000)",
        ]))
        .unwrap();

        assert_eq!(holding.shares, Decimal::from(12_000));
        assert_eq!(holding.market_value, Decimal::from(1850));
    }

    #[test]
    fn test_digits_in_issuer_and_cusip_are_not_counted() {
        let holding = parse_row(&row(&[
            "3M COMPANY HOLDINGS",
            "COM",
            "88579Y101",
            "SH",
            "n/a",
        ]))
        .unwrap();

        assert_eq!(holding.issuer_name, "3M COMPANY HOLDINGS");
        assert_eq!(holding.shares, Decimal::ZERO);
        assert_eq!(holding.market_value, Decimal::ZERO);

        // A long bare number is not an issuer name.
        assert!(parse_row(&row(&["12,000,000,000", "COM", "88579Y101", "5"])).is_none());
    }

    #[test]
    fn test_row_needs_cusip_and_issuer() {
        // No CUSIP-shaped cell.
        assert!(parse_row(&row(&["NAME OF ISSUER", "TITLE", "CUSIP", "VALUE"])).is_none());
        // Issuer name too short.
        assert!(parse_row(&row(&["IBM", "COM", "459200101", "1,850"])).is_none());
        // Lowercase token is not a CUSIP.
        assert!(parse_row(&row(&["ACME WIDGETS CORPORATION", "COM", "00123x101", "5"])).is_none());
    }

    #[test]
    fn test_issuer_before_cusip_must_be_first_column() {
        // The long text sits between the first column and the CUSIP.
        assert!(
            parse_row(&row(&["1", "ACME WIDGETS CORPORATION", "00123X101", "5"])).is_none()
        );
        // After the CUSIP is fine.
        let holding =
            parse_row(&row(&["1", "00123X101", "ACME WIDGETS CORPORATION", "5"])).unwrap();
        assert_eq!(holding.issuer_name, "ACME WIDGETS CORPORATION");
        assert_eq!(holding.shares, Decimal::ONE);
        assert_eq!(holding.market_value, Decimal::from(5));
    }

    #[test]
    fn test_parse_html_document() {
        let html = r#"<html><body>
<table>
  <tr><th>Name of issuer</th><th>Class</th><th>CUSIP</th><th>Shares</th><th>Value</th></tr>
  <tr><td>MICROSOFT CORPORATION</td><td>COM</td><td>594918104</td><td>7,500</td><td>2,250</td></tr>
  <tr><td>SHORT</td><td>ROW</td></tr>
  <tr>
    <td>
      JOHNSON &amp; JOHNSON
    </td>
    <td>COM</td><td>478160104</td><td>300</td><td>45</td>
  </tr>
</table>
</body></html>"#;

        let holdings = parse(html);
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].issuer_name, "MICROSOFT CORPORATION");
        assert_eq!(holdings[0].shares, Decimal::from(7500));
        assert_eq!(holdings[1].issuer_name, "JOHNSON & JOHNSON");
        assert_eq!(holdings[1].market_value, Decimal::from(45));
    }

    #[test]
    fn test_no_tables() {
        assert!(parse("just some text").is_empty());
        assert!(parse("").is_empty());
    }
}

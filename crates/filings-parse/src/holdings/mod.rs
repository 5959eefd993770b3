//! 13F holdings extraction.
//!
//! Filings since 2013 embed the information table as an XML document, read by
//! the [`structured`] pass. Older filings only carry formatted tables, which
//! the [`heuristic`] pass scans on a best-effort basis. The heuristic pass only
//! runs when the structured pass finds nothing.

pub mod heuristic;
pub mod structured;

use filings_core::NormalizedHolding;
use std::collections::HashMap;
use tracing::{info, warn};

/// Which pass produced a [`HoldingsExtraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionSource {
    /// Read from an embedded XML information table.
    Structured,
    /// Recovered from table markup by pattern matching.
    Heuristic,
    /// Neither pass found a holding.
    Empty,
}

impl ExtractionSource {
    /// Returns the lowercase label used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Heuristic => "heuristic",
            Self::Empty => "empty",
        }
    }
}

/// Result of parsing one filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingsExtraction {
    /// Extracted holdings; empty when nothing could be recovered.
    pub holdings: Vec<NormalizedHolding>,
    /// Pass that produced the holdings.
    pub source: ExtractionSource,
    /// Why extraction degraded (fell back or came up empty), if it did.
    pub degraded_reason: Option<String>,
}

impl HoldingsExtraction {
    /// Returns true if no holdings were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// Extracts holdings from the raw text of a 13F submission.
///
/// Parsing never fails: malformed or unrecognized documents produce an empty
/// [`HoldingsExtraction`] with a degraded reason.
#[derive(Debug, Clone, Copy)]
pub struct HoldingsParser {
    heuristic_fallback: bool,
}

impl Default for HoldingsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HoldingsParser {
    /// Creates a parser with the heuristic fallback enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            heuristic_fallback: true,
        }
    }

    /// Creates a parser that only reads structured information tables.
    #[must_use]
    pub const fn structured_only() -> Self {
        Self {
            heuristic_fallback: false,
        }
    }

    /// Parses `text`, trying the structured pass first.
    #[must_use]
    pub fn parse(&self, text: &str) -> HoldingsExtraction {
        let structured = structured::parse(text);
        if !structured.holdings.is_empty() {
            info!(
                holdings = structured.holdings.len(),
                documents = structured.documents,
                "Parsed holdings from information table"
            );
            return HoldingsExtraction {
                holdings: structured.holdings,
                source: ExtractionSource::Structured,
                degraded_reason: None,
            };
        }

        let structured_reason = structured.failure_reason();

        if self.heuristic_fallback {
            let holdings = heuristic::parse(text);
            if !holdings.is_empty() {
                info!(
                    holdings = holdings.len(),
                    reason = %structured_reason,
                    "Parsed holdings from table markup"
                );
                return HoldingsExtraction {
                    holdings,
                    source: ExtractionSource::Heuristic,
                    degraded_reason: Some(structured_reason),
                };
            }
        }

        let reason = if self.heuristic_fallback {
            format!("{structured_reason}; no holding rows found in table markup")
        } else {
            structured_reason
        };
        warn!(reason = %reason, "Could not extract holdings");

        HoldingsExtraction {
            holdings: Vec::new(),
            source: ExtractionSource::Empty,
            degraded_reason: Some(reason),
        }
    }
}

/// Attaches tickers to holdings whose CUSIP appears in `cusip_to_ticker`.
///
/// Holdings that already carry a ticker are left untouched, so applying this
/// repeatedly is idempotent. Returns the number of holdings that gained a
/// ticker.
pub fn enrich_with_ticker(
    holdings: &mut [NormalizedHolding],
    cusip_to_ticker: &HashMap<String, String>,
) -> usize {
    let mut enriched = 0;
    for holding in holdings.iter_mut().filter(|h| h.ticker.is_none()) {
        if let Some(ticker) = cusip_to_ticker.get(&holding.cusip) {
            holding.ticker = Some(ticker.clone());
            enriched += 1;
        }
    }
    enriched
}

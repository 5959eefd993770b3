#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # Example
//!
//! ```
//! use filings_parse::{ExtractionSource, HoldingsParser};
//!
//! let text = r#"<XML>
//! <?xml version="1.0" encoding="UTF-8"?>
//! <informationTable xmlns="http://www.sec.gov/edgar/document/thirteenf/informationtable">
//!   <infoTable>
//!     <nameOfIssuer>Apple Inc</nameOfIssuer>
//!     <cusip>037833100</cusip>
//!     <value>1000</value>
//!     <shrsOrPrnAmt><sshPrnamt>500</sshPrnamt><sshPrnamtType>SH</sshPrnamtType></shrsOrPrnAmt>
//!   </infoTable>
//! </informationTable>
//! </XML>"#;
//!
//! let extraction = HoldingsParser::new().parse(text);
//! assert_eq!(extraction.source, ExtractionSource::Structured);
//! assert_eq!(extraction.holdings[0].cusip, "037833100");
//! ```

pub mod facts;
pub mod holdings;

pub use facts::{FactsParser, StatementSet, TagDictionary, TagMapping, humanize_tag};
pub use holdings::{ExtractionSource, HoldingsExtraction, HoldingsParser, enrich_with_ticker};

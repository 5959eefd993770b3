#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # Example
//!
//! ```no_run
//! use filings_core::{Cik, ClientConfig};
//! use filings_edgar::EdgarClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("contact@example.com").with_user_agent("MyApp/1.0");
//!     let client = EdgarClient::new(config)?;
//!
//!     let filings = client
//!         .company_filings(&Cik::from(320193), &["10-K".to_string()])
//!         .await?;
//!     for filing in filings {
//!         println!("{} filed {}", filing.accession, filing.filing_date);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod rate_limit;
pub mod responses;
pub mod transport;

pub use client::EdgarClient;
pub use rate_limit::RateLimiter;
pub use responses::{CompanySubmissions, CompanyTickerInfo, FilingsRecent, SubmissionFilings};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

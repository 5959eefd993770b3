#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use filings::{
//!     Cik, ClientConfig, EdgarClient, InMemoryObjectStore, IngestionOrchestrator,
//!     SqliteRecordSink,
//! };
//!
//! #[tokio::main]
//! async fn main() -> filings::Result<()> {
//!     let client = EdgarClient::new(ClientConfig::from_env()?)?;
//!     let orchestrator = IngestionOrchestrator::new(
//!         Arc::new(client),
//!         Arc::new(InMemoryObjectStore::new()),
//!         Arc::new(SqliteRecordSink::new("filings.db")?),
//!     );
//!
//!     let cik = Cik::from(320193);
//!     orchestrator.ingest_company_filings(&cik, &[]).await?;
//!
//!     let filings = orchestrator.client().company_filings(&cik, &["10-K".to_string()]).await?;
//!     for (accession, outcome) in orchestrator.parse_filings(&filings).await {
//!         println!("{accession}: {outcome:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use filings_core::*;

// Archive client
pub use filings_edgar::{EdgarClient, HttpResponse, HttpTransport, RateLimiter, ReqwestTransport};

// Parsers
pub use filings_parse::{
    ExtractionSource, FactsParser, HoldingsExtraction, HoldingsParser, StatementSet,
    TagDictionary, TagMapping, enrich_with_ticker, humanize_tag,
};

// Collaborator implementations
#[cfg(feature = "sqlite")]
pub use filings_store::SqliteRecordSink;
pub use filings_store::{InMemoryObjectStore, InMemoryRecordSink, NoopObjectStore};

mod orchestrator;
pub use orchestrator::{IngestSummary, IngestionOrchestrator, ParseOutcome};

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and collaborator traits for EDGAR filings ingestion.
//!
//! This crate provides the foundational abstractions shared by the fetch
//! client, the parsers and the orchestrator:
//!
//! - [`FilingsError`](error::FilingsError) - Error taxonomy for the whole pipeline
//! - [`ClientConfig`](config::ClientConfig) - Access-policy and retry configuration
//! - [`CompanyFacts`](document::CompanyFacts) - Typed tagged-facts documents
//! - [`NormalizedStatementLineItem`](types::NormalizedStatementLineItem) and
//!   [`NormalizedHolding`](types::NormalizedHolding) - Output records
//! - [`ObjectStore`](store::ObjectStore) and [`RecordSink`](store::RecordSink) - External collaborators

/// Client and orchestrator configuration.
pub mod config;
/// Typed tagged-facts documents.
pub mod document;
/// Error types for ingestion operations.
pub mod error;
/// Tabular export of normalized records.
pub mod frame;
/// Collaborator traits for storage and persistence.
pub mod store;
/// Core record types (CIK, filings, line items, holdings).
pub mod types;

// Re-export commonly used items at crate root
pub use config::{ClientConfig, OrchestratorConfig};
pub use document::{CompanyConcept, CompanyFacts, FactEntry, TagFacts};
pub use error::{FilingsError, Result};
pub use store::{ObjectStore, RecordSink};
pub use types::{
    AccessionNumber, Cik, Company, DiscretionBreakdown, FilingStatus, FilingSummary,
    NormalizedHolding, NormalizedStatementLineItem, PutCall, RawFilingDocument,
    StatementCategory,
};

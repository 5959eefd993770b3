//! Collaborator traits for the object store and the persistence layer.
//!
//! This module defines the [`ObjectStore`] trait used as a pass-through cache
//! for raw filing bytes, and the [`RecordSink`] trait that receives normalized
//! records. The core never owns a database connection; it only calls these.

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{
        AccessionNumber, Company, FilingStatus, FilingSummary, NormalizedHolding,
        NormalizedStatementLineItem,
    },
};

/// Blob storage for raw filing documents.
///
/// Implementations can store data in various backends (S3, local disk,
/// in-memory, etc.). A missing key is not an error.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key`, replacing any previous object.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Retrieves the object stored under `key`.
    ///
    /// Returns `Ok(Some(bytes))` if present, `Ok(None)` if not yet stored.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Returns true if an object is stored under `key`.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Persistence collaborator for normalized records.
///
/// Every method is an upsert keyed by natural identifiers, so replaying the
/// same records is safe:
///
/// - companies by CIK
/// - filings by accession number
/// - line items by (filing, category, label, period start, period end, unit)
/// - holdings by (filing, CUSIP, put/call, report date)
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Upserts entity index entries. Returns the number of records written.
    async fn upsert_companies(&self, companies: &[Company]) -> Result<usize>;

    /// Upserts filing index entries. Returns the number of records written.
    async fn upsert_filings(&self, filings: &[FilingSummary]) -> Result<usize>;

    /// Upserts the statement line items reported by `filing`.
    async fn upsert_line_items(
        &self,
        filing: &FilingSummary,
        items: &[NormalizedStatementLineItem],
    ) -> Result<usize>;

    /// Upserts the holdings reported by `filing`.
    async fn upsert_holdings(
        &self,
        filing: &FilingSummary,
        holdings: &[NormalizedHolding],
    ) -> Result<usize>;

    /// Records the processing state of a filing.
    async fn mark_filing(&self, accession: &AccessionNumber, status: FilingStatus) -> Result<()>;
}

//! In-memory object store and record sink.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use filings_core::{
    AccessionNumber, Cik, Company, FilingStatus, FilingSummary, NormalizedHolding,
    NormalizedStatementLineItem, ObjectStore, PutCall, RecordSink, Result, StatementCategory,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Stored object with its content type and write time.
#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
    stored_at: DateTime<Utc>,
}

/// Object store backed by a `HashMap`.
///
/// Objects are lost when the store is dropped. Bytes are cloned on every
/// `put` and `get`.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Returns true if nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Content type recorded for `key`, if stored.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }

    /// When `key` was last written, if stored.
    pub async fn stored_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.objects.read().await.get(key).map(|o| o.stored_at)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    #[instrument(skip(self, bytes), fields(key = %key, size = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let object = StoredObject {
            bytes: bytes.to_vec(),
            content_type: content_type.to_string(),
            stored_at: Utc::now(),
        };
        self.objects.write().await.insert(key.to_string(), object);
        debug!("Stored object");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let objects = self.objects.read().await;
        let found = objects.get(key).map(|o| o.bytes.clone());
        debug!(hit = found.is_some(), "Object lookup");
        Ok(found)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }
}

/// Natural key of a statement line item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LineItemKey {
    accession: AccessionNumber,
    category: StatementCategory,
    label: String,
    period_start: Option<NaiveDate>,
    period_end: NaiveDate,
    unit: String,
}

impl LineItemKey {
    fn new(filing: &FilingSummary, item: &NormalizedStatementLineItem) -> Self {
        Self {
            accession: filing.accession.clone(),
            category: item.category,
            label: item.label.clone(),
            period_start: item.period_start,
            period_end: item.period_end,
            unit: item.unit.clone(),
        }
    }
}

/// Natural key of a holding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HoldingKey {
    accession: AccessionNumber,
    cusip: String,
    put_call: PutCall,
    report_date: Option<NaiveDate>,
}

impl HoldingKey {
    fn new(filing: &FilingSummary, holding: &NormalizedHolding) -> Self {
        Self {
            accession: filing.accession.clone(),
            cusip: holding.cusip.clone(),
            put_call: holding.put_call,
            report_date: holding.report_date,
        }
    }
}

/// Record sink backed by `HashMap`s keyed on natural identifiers.
///
/// Replaying the same records overwrites them in place, so the sink can be
/// used to check that ingestion is idempotent. Every status transition is
/// kept in order.
#[derive(Debug, Default)]
pub struct InMemoryRecordSink {
    companies: RwLock<HashMap<Cik, Company>>,
    filings: RwLock<HashMap<AccessionNumber, FilingSummary>>,
    line_items: RwLock<HashMap<LineItemKey, NormalizedStatementLineItem>>,
    holdings: RwLock<HashMap<HoldingKey, NormalizedHolding>>,
    statuses: RwLock<HashMap<AccessionNumber, Vec<FilingStatus>>>,
}

impl InMemoryRecordSink {
    /// Create a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All companies, ordered by CIK.
    pub async fn companies(&self) -> Vec<Company> {
        let mut companies: Vec<_> = self.companies.read().await.values().cloned().collect();
        companies.sort_by(|a, b| a.cik.cmp(&b.cik));
        companies
    }

    /// All filings, ordered by accession number.
    pub async fn filings(&self) -> Vec<FilingSummary> {
        let mut filings: Vec<_> = self.filings.read().await.values().cloned().collect();
        filings.sort_by(|a, b| a.accession.cmp(&b.accession));
        filings
    }

    /// Line items stored for `accession`, ordered by category, label and period.
    pub async fn line_items(&self, accession: &AccessionNumber) -> Vec<NormalizedStatementLineItem> {
        let mut items: Vec<_> = self
            .line_items
            .read()
            .await
            .iter()
            .filter(|(key, _)| &key.accession == accession)
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_by(|a, b| {
            (a.category, &a.label, a.period_end, a.period_start)
                .cmp(&(b.category, &b.label, b.period_end, b.period_start))
        });
        items
    }

    /// Holdings stored for `accession`, ordered by CUSIP.
    pub async fn holdings(&self, accession: &AccessionNumber) -> Vec<NormalizedHolding> {
        let mut holdings: Vec<_> = self
            .holdings
            .read()
            .await
            .iter()
            .filter(|(key, _)| &key.accession == accession)
            .map(|(_, holding)| holding.clone())
            .collect();
        holdings.sort_by(|a, b| {
            (&a.cusip, a.put_call.as_str()).cmp(&(&b.cusip, b.put_call.as_str()))
        });
        holdings
    }

    /// Total number of stored line items.
    pub async fn line_item_count(&self) -> usize {
        self.line_items.read().await.len()
    }

    /// Total number of stored holdings.
    pub async fn holding_count(&self) -> usize {
        self.holdings.read().await.len()
    }

    /// Latest status recorded for `accession`.
    pub async fn status(&self, accession: &AccessionNumber) -> Option<FilingStatus> {
        self.statuses
            .read()
            .await
            .get(accession)
            .and_then(|history| history.last().cloned())
    }

    /// Every status recorded for `accession`, oldest first.
    pub async fn status_history(&self, accession: &AccessionNumber) -> Vec<FilingStatus> {
        self.statuses
            .read()
            .await
            .get(accession)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for InMemoryRecordSink {
    #[instrument(skip(self, companies), fields(count = companies.len()))]
    async fn upsert_companies(&self, companies: &[Company]) -> Result<usize> {
        let mut stored = self.companies.write().await;
        for company in companies {
            stored.insert(company.cik.clone(), company.clone());
        }
        debug!(total = stored.len(), "Upserted companies");
        Ok(companies.len())
    }

    #[instrument(skip(self, filings), fields(count = filings.len()))]
    async fn upsert_filings(&self, filings: &[FilingSummary]) -> Result<usize> {
        let mut stored = self.filings.write().await;
        for filing in filings {
            stored.insert(filing.accession.clone(), filing.clone());
        }
        debug!(total = stored.len(), "Upserted filings");
        Ok(filings.len())
    }

    #[instrument(skip(self, filing, items), fields(accession = %filing.accession, count = items.len()))]
    async fn upsert_line_items(
        &self,
        filing: &FilingSummary,
        items: &[NormalizedStatementLineItem],
    ) -> Result<usize> {
        let mut stored = self.line_items.write().await;
        for item in items {
            stored.insert(LineItemKey::new(filing, item), item.clone());
        }
        debug!(total = stored.len(), "Upserted line items");
        Ok(items.len())
    }

    #[instrument(skip(self, filing, holdings), fields(accession = %filing.accession, count = holdings.len()))]
    async fn upsert_holdings(
        &self,
        filing: &FilingSummary,
        holdings: &[NormalizedHolding],
    ) -> Result<usize> {
        let mut stored = self.holdings.write().await;
        for holding in holdings {
            stored.insert(HoldingKey::new(filing, holding), holding.clone());
        }
        debug!(total = stored.len(), "Upserted holdings");
        Ok(holdings.len())
    }

    #[instrument(skip(self), fields(accession = %accession, status = status.as_str()))]
    async fn mark_filing(&self, accession: &AccessionNumber, status: FilingStatus) -> Result<()> {
        self.statuses
            .write()
            .await
            .entry(accession.clone())
            .or_default()
            .push(status);
        Ok(())
    }
}

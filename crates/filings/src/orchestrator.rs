//! Ingestion orchestrator composing the archive client, parsers and collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use filings_core::{
    AccessionNumber, Cik, Company, FilingStatus, FilingSummary, ObjectStore,
    OrchestratorConfig, RawFilingDocument, RecordSink, Result,
};
use filings_edgar::EdgarClient;
use filings_parse::{ExtractionSource, FactsParser, HoldingsParser, enrich_with_ticker};

const RAW_CONTENT_TYPE: &str = "text/plain";

/// Counts reported by the index ingestion operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Records received from the archive.
    pub fetched: usize,
    /// Records the sink reported as written.
    pub written: usize,
    /// Upsert calls made.
    pub batches: usize,
}

/// Result of parsing one filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Statement line items were written.
    LineItems {
        /// Items the sink reported as written.
        written: usize,
    },
    /// Holdings were written.
    Holdings {
        /// Holdings the sink reported as written.
        written: usize,
        /// Extraction pass that produced them.
        source: ExtractionSource,
    },
    /// The form type has no parser.
    Skipped {
        /// Form type of the filing.
        form_type: String,
    },
    /// Parsing failed; the filing was marked failed with this message.
    Failed {
        /// Error message recorded for the filing.
        message: String,
    },
}

/// Drives ingestion of entity indexes, filing indexes and individual filings.
///
/// The orchestrator owns no global state: the client, both collaborators and
/// the parsers are passed in, so several orchestrators can share one client
/// (and therefore one rate-limit window and response cache).
pub struct IngestionOrchestrator {
    client: Arc<EdgarClient>,
    object_store: Arc<dyn ObjectStore>,
    sink: Arc<dyn RecordSink>,
    facts_parser: FactsParser,
    holdings_parser: HoldingsParser,
    cusip_tickers: Option<Arc<HashMap<String, String>>>,
    config: OrchestratorConfig,
}

impl std::fmt::Debug for IngestionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionOrchestrator")
            .field("client", &self.client)
            .field("facts_parser", &self.facts_parser)
            .field("holdings_parser", &self.holdings_parser)
            .field(
                "cusip_tickers",
                &self.cusip_tickers.as_ref().map(|map| map.len()),
            )
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IngestionOrchestrator {
    /// Create an orchestrator with default parsers and configuration.
    #[must_use]
    pub fn new(
        client: Arc<EdgarClient>,
        object_store: Arc<dyn ObjectStore>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            client,
            object_store,
            sink,
            facts_parser: FactsParser::default(),
            holdings_parser: HoldingsParser::default(),
            cusip_tickers: None,
            config: OrchestratorConfig::default(),
        }
    }

    /// Set the batch size, concurrency and default forms.
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the facts parser, e.g. to use an extended tag dictionary.
    #[must_use]
    pub fn with_facts_parser(mut self, parser: FactsParser) -> Self {
        self.facts_parser = parser;
        self
    }

    /// Replace the holdings parser.
    #[must_use]
    pub const fn with_holdings_parser(mut self, parser: HoldingsParser) -> Self {
        self.holdings_parser = parser;
        self
    }

    /// Attach tickers to parsed holdings using a CUSIP to ticker map.
    #[must_use]
    pub fn with_cusip_tickers(mut self, cusip_tickers: HashMap<String, String>) -> Self {
        self.cusip_tickers = Some(Arc::new(cusip_tickers));
        self
    }

    /// The archive client.
    #[must_use]
    pub const fn client(&self) -> &Arc<EdgarClient> {
        &self.client
    }

    /// The orchestrator configuration.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    /// Fetch the archive's entity index and upsert it in batches.
    ///
    /// # Errors
    /// Returns fetch failures and sink failures; batches already written stay
    /// written.
    #[instrument(skip(self), fields(batch_size = self.batch_size()))]
    pub async fn ingest_companies(&self) -> Result<IngestSummary> {
        let companies = self.client.company_tickers().await?;
        let mut summary = IngestSummary {
            fetched: companies.len(),
            ..Default::default()
        };

        for batch in companies.chunks(self.batch_size()) {
            summary.written += self.sink.upsert_companies(batch).await?;
            summary.batches += 1;
            debug!(written = summary.written, "Company batch upserted");
        }

        info!(
            fetched = summary.fetched,
            written = summary.written,
            batches = summary.batches,
            "Company index ingested"
        );
        Ok(summary)
    }

    /// Fetch one entity's filing index and upsert the filings of the given
    /// form types. An empty `forms` slice uses the configured default forms.
    ///
    /// The entity itself is upserted as well, named as in its submissions.
    /// The returned summary counts filings only.
    ///
    /// # Errors
    /// Returns fetch failures and sink failures.
    #[instrument(skip(self, forms), fields(cik = %cik))]
    pub async fn ingest_company_filings(
        &self,
        cik: &Cik,
        forms: &[String],
    ) -> Result<IngestSummary> {
        let forms = if forms.is_empty() {
            self.config.default_forms.as_slice()
        } else {
            forms
        };

        let submissions = self.client.company_submissions(cik).await?;

        let mut company = Company::new(cik.clone(), submissions.name.as_str());
        if let Some(ticker) = submissions.tickers.first() {
            company = company.with_ticker(ticker.as_str());
        }
        self.sink.upsert_companies(&[company]).await?;

        let filings = submissions.to_summaries(cik, forms);
        if filings.is_empty() {
            warn!(forms = ?forms, "No matching filings found");
        }

        let mut summary = IngestSummary {
            fetched: filings.len(),
            ..Default::default()
        };
        for batch in filings.chunks(self.batch_size()) {
            summary.written += self.sink.upsert_filings(batch).await?;
            summary.batches += 1;
        }

        info!(
            fetched = summary.fetched,
            written = summary.written,
            "Filing index ingested"
        );
        Ok(summary)
    }

    /// Parse one filing and hand its records to the sink.
    ///
    /// The filing is marked `Processing`, then `Completed` or `Failed`. Raw
    /// submission text is read from the object store when present, otherwise
    /// fetched and stored; object store failures are logged and do not fail
    /// the filing.
    ///
    /// - `10-K` and `10-Q` (and amendments) write the statement line items
    ///   this filing reported
    /// - `13F-HR` (and amendments) write the holdings, enriched with tickers
    ///   and stamped with the report date
    /// - other forms are skipped
    ///
    /// Never returns an error: failures become [`ParseOutcome::Failed`].
    #[instrument(skip(self, filing), fields(accession = %filing.accession, form = %filing.form_type))]
    pub async fn parse_filing(&self, filing: &FilingSummary) -> ParseOutcome {
        self.mark(&filing.accession, FilingStatus::Processing).await;

        match self.try_parse(filing).await {
            Ok(outcome) => {
                self.mark(&filing.accession, FilingStatus::Completed).await;
                info!(outcome = ?outcome, "Filing parsed");
                outcome
            }
            Err(e) => {
                let message = e.to_string();
                error!(error = %message, "Filing parse failed");
                self.mark(&filing.accession, FilingStatus::Failed(message.clone()))
                    .await;
                ParseOutcome::Failed { message }
            }
        }
    }

    /// Parse several filings concurrently, up to the configured concurrency.
    ///
    /// All requests share the client's rate limiter. Results are returned in
    /// completion order, paired with their accession numbers.
    pub async fn parse_filings(
        &self,
        filings: &[FilingSummary],
    ) -> Vec<(AccessionNumber, ParseOutcome)> {
        let concurrency = self.config.concurrency.max(1);
        info!(filings = filings.len(), concurrency, "Parsing filings");

        stream::iter(filings)
            .map(|filing| async move { (filing.accession.clone(), self.parse_filing(filing).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }

    async fn try_parse(&self, filing: &FilingSummary) -> Result<ParseOutcome> {
        let document = self.load_document(filing).await?;

        if filing.is_financial_report() {
            self.write_line_items(filing).await
        } else if filing.is_holdings_report() {
            self.write_holdings(filing, &document).await
        } else {
            debug!("No parser for form type");
            Ok(ParseOutcome::Skipped {
                form_type: filing.form_type.clone(),
            })
        }
    }

    async fn load_document(&self, filing: &FilingSummary) -> Result<RawFilingDocument> {
        let key = filing.object_key();

        match self.object_store.get(&key).await {
            Ok(Some(bytes)) => {
                debug!(key, bytes = bytes.len(), "Raw filing loaded from object store");
                return Ok(RawFilingDocument::new(
                    filing.cik.clone(),
                    filing.accession.clone(),
                    bytes,
                ));
            }
            Ok(None) => {}
            Err(e) => warn!(key, error = %e, "Object store read failed, fetching from archive"),
        }

        let document = self
            .client
            .filing_document(&filing.cik, &filing.accession)
            .await?;

        if let Err(e) = self
            .object_store
            .put(&key, &document.content, RAW_CONTENT_TYPE)
            .await
        {
            warn!(key, error = %e, "Failed to store raw filing");
        }

        Ok(document)
    }

    async fn write_line_items(&self, filing: &FilingSummary) -> Result<ParseOutcome> {
        let facts = self.client.company_facts(&filing.cik).await?;
        let items = self
            .facts_parser
            .parse(&facts)
            .for_accession(&filing.accession)
            .into_items();

        let mut written = 0;
        for batch in items.chunks(self.batch_size()) {
            written += self.sink.upsert_line_items(filing, batch).await?;
        }

        Ok(ParseOutcome::LineItems { written })
    }

    async fn write_holdings(
        &self,
        filing: &FilingSummary,
        document: &RawFilingDocument,
    ) -> Result<ParseOutcome> {
        let extraction = self.holdings_parser.parse(&document.text());
        let source = extraction.source;
        let mut holdings = extraction.holdings;

        if let Some(tickers) = &self.cusip_tickers {
            let enriched = enrich_with_ticker(&mut holdings, tickers);
            debug!(enriched, "Tickers attached");
        }

        let report_date = filing.effective_report_date();
        for holding in &mut holdings {
            holding.report_date = Some(report_date);
        }

        let mut written = 0;
        for batch in holdings.chunks(self.batch_size()) {
            written += self.sink.upsert_holdings(filing, batch).await?;
        }

        Ok(ParseOutcome::Holdings { written, source })
    }

    async fn mark(&self, accession: &AccessionNumber, status: FilingStatus) {
        if let Err(e) = self.sink.mark_filing(accession, status.clone()).await {
            warn!(accession = %accession, status = status.as_str(), error = %e, "Failed to record filing status");
        }
    }
}

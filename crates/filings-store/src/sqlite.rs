//! SQLite-based record sink implementation.

use async_trait::async_trait;
use chrono::Utc;
use filings_core::{
    AccessionNumber, Company, FilingStatus, FilingSummary, FilingsError,
    NormalizedHolding, NormalizedStatementLineItem, RecordSink, Result,
};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Record sink that persists normalized records in SQLite.
///
/// Every write is an `INSERT ... ON CONFLICT DO UPDATE` on the record's
/// natural key, run inside one transaction per batch. Optional key columns
/// (period start, report date) are stored as empty strings so they take part
/// in uniqueness.
#[derive(Debug)]
pub struct SqliteRecordSink {
    conn: Mutex<Connection>,
}

fn sink_err(e: impl std::fmt::Display) -> FilingsError {
    FilingsError::Sink(e.to_string())
}

impl SqliteRecordSink {
    /// Open (or create) a database at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(sink_err)?;
        let sink = Self {
            conn: Mutex::new(conn),
        };
        sink.initialize_schema()?;
        Ok(sink)
    }

    /// Create an in-memory database.
    ///
    /// Useful for testing; data is lost when the sink is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sink_err)?;
        let sink = Self {
            conn: Mutex::new(conn),
        };
        sink.initialize_schema()?;
        Ok(sink)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(sink_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS companies (
                cik TEXT PRIMARY KEY,
                ticker TEXT,
                name TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS filings (
                accession TEXT PRIMARY KEY,
                cik TEXT NOT NULL,
                form_type TEXT NOT NULL,
                filing_date TEXT NOT NULL,
                report_date TEXT,
                primary_document TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                status_message TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_filings_cik_form
                ON filings(cik, form_type);

            CREATE TABLE IF NOT EXISTS statement_line_items (
                accession TEXT NOT NULL,
                category TEXT NOT NULL,
                label TEXT NOT NULL,
                period_start TEXT NOT NULL,
                period_end TEXT NOT NULL,
                unit TEXT NOT NULL,
                tag TEXT NOT NULL,
                taxonomy TEXT NOT NULL,
                value TEXT NOT NULL,
                is_instant INTEGER NOT NULL,
                fiscal_year INTEGER,
                fiscal_period TEXT,
                fiscal_quarter INTEGER,
                source_accession TEXT,
                form TEXT,
                filed TEXT,
                frame TEXT,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (accession, category, label, period_start, period_end, unit)
            );

            CREATE TABLE IF NOT EXISTS holdings (
                accession TEXT NOT NULL,
                cusip TEXT NOT NULL,
                put_call TEXT NOT NULL,
                report_date TEXT NOT NULL,
                issuer_name TEXT NOT NULL,
                ticker TEXT,
                title_of_class TEXT,
                shares TEXT NOT NULL,
                share_type TEXT,
                market_value TEXT NOT NULL,
                investment_discretion TEXT,
                voting_sole TEXT NOT NULL,
                voting_shared TEXT NOT NULL,
                voting_none TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (accession, cusip, put_call, report_date)
            );

            CREATE INDEX IF NOT EXISTS idx_holdings_cusip
                ON holdings(cusip);",
        )
        .map_err(sink_err)?;

        debug!("SQLite record sink schema initialized");
        Ok(())
    }

    /// Latest status recorded for `accession`, or `None` if the filing is unknown.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn filing_status(&self, accession: &AccessionNumber) -> Result<Option<FilingStatus>> {
        let conn = self.conn.lock().map_err(sink_err)?;
        let row: Option<(String, Option<String>)> = conn
            .query_row(
                "SELECT status, status_message FROM filings WHERE accession = ?1",
                params![accession.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(sink_err)?;

        row.map(|(status, message)| Self::status_from_row(&status, message))
            .transpose()
    }

    /// Number of rows in the line item table.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn line_item_count(&self) -> Result<usize> {
        self.count("statement_line_items")
    }

    /// Number of rows in the holdings table.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn holding_count(&self) -> Result<usize> {
        self.count("holdings")
    }

    fn count(&self, table: &str) -> Result<usize> {
        let conn = self.conn.lock().map_err(sink_err)?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .map_err(sink_err)?;
        usize::try_from(count).map_err(sink_err)
    }

    fn status_from_row(status: &str, message: Option<String>) -> Result<FilingStatus> {
        match status {
            "pending" => Ok(FilingStatus::Pending),
            "processing" => Ok(FilingStatus::Processing),
            "completed" => Ok(FilingStatus::Completed),
            "failed" => Ok(FilingStatus::Failed(message.unwrap_or_default())),
            other => Err(FilingsError::Sink(format!("Unknown filing status: {other}"))),
        }
    }
}

#[async_trait]
impl RecordSink for SqliteRecordSink {
    #[instrument(skip(self, companies), fields(count = companies.len()))]
    async fn upsert_companies(&self, companies: &[Company]) -> Result<usize> {
        let mut conn = self.conn.lock().map_err(sink_err)?;
        let tx = conn.transaction().map_err(sink_err)?;
        let now = Utc::now().to_rfc3339();
        let mut written = 0;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO companies (cik, ticker, name, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(cik) DO UPDATE SET
                        ticker = excluded.ticker,
                        name = excluded.name,
                        updated_at = excluded.updated_at",
                )
                .map_err(sink_err)?;
            for company in companies {
                written += stmt
                    .execute(params![
                        company.cik.as_str(),
                        company.ticker,
                        company.name,
                        now
                    ])
                    .map_err(sink_err)?;
            }
        }
        tx.commit().map_err(sink_err)?;

        debug!(written, "Upserted companies");
        Ok(written)
    }

    #[instrument(skip(self, filings), fields(count = filings.len()))]
    async fn upsert_filings(&self, filings: &[FilingSummary]) -> Result<usize> {
        let mut conn = self.conn.lock().map_err(sink_err)?;
        let tx = conn.transaction().map_err(sink_err)?;
        let now = Utc::now().to_rfc3339();
        let mut written = 0;
        {
            // Status columns are left alone so re-indexing keeps progress.
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO filings
                        (accession, cik, form_type, filing_date, report_date,
                         primary_document, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(accession) DO UPDATE SET
                        cik = excluded.cik,
                        form_type = excluded.form_type,
                        filing_date = excluded.filing_date,
                        report_date = excluded.report_date,
                        primary_document = excluded.primary_document,
                        updated_at = excluded.updated_at",
                )
                .map_err(sink_err)?;
            for filing in filings {
                written += stmt
                    .execute(params![
                        filing.accession.as_str(),
                        filing.cik.as_str(),
                        filing.form_type,
                        filing.filing_date.to_string(),
                        filing.report_date.map(|d| d.to_string()),
                        filing.primary_document,
                        now
                    ])
                    .map_err(sink_err)?;
            }
        }
        tx.commit().map_err(sink_err)?;

        debug!(written, "Upserted filings");
        Ok(written)
    }

    #[instrument(skip(self, filing, items), fields(accession = %filing.accession, count = items.len()))]
    async fn upsert_line_items(
        &self,
        filing: &FilingSummary,
        items: &[NormalizedStatementLineItem],
    ) -> Result<usize> {
        let mut conn = self.conn.lock().map_err(sink_err)?;
        let tx = conn.transaction().map_err(sink_err)?;
        let now = Utc::now().to_rfc3339();
        let mut written = 0;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO statement_line_items
                        (accession, category, label, period_start, period_end, unit,
                         tag, taxonomy, value, is_instant, fiscal_year, fiscal_period,
                         fiscal_quarter, source_accession, form, filed, frame, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                             ?15, ?16, ?17, ?18)
                     ON CONFLICT(accession, category, label, period_start, period_end, unit)
                     DO UPDATE SET
                        tag = excluded.tag,
                        taxonomy = excluded.taxonomy,
                        value = excluded.value,
                        is_instant = excluded.is_instant,
                        fiscal_year = excluded.fiscal_year,
                        fiscal_period = excluded.fiscal_period,
                        fiscal_quarter = excluded.fiscal_quarter,
                        source_accession = excluded.source_accession,
                        form = excluded.form,
                        filed = excluded.filed,
                        frame = excluded.frame,
                        updated_at = excluded.updated_at",
                )
                .map_err(sink_err)?;
            for item in items {
                written += stmt
                    .execute(params![
                        filing.accession.as_str(),
                        item.category.as_str(),
                        item.label,
                        item.period_start.map(|d| d.to_string()).unwrap_or_default(),
                        item.period_end.to_string(),
                        item.unit,
                        item.tag,
                        item.taxonomy,
                        item.value.to_string(),
                        item.is_instant(),
                        item.fiscal_year,
                        item.fiscal_period,
                        item.fiscal_quarter,
                        item.accession.as_ref().map(AccessionNumber::as_str),
                        item.form,
                        item.filed.map(|d| d.to_string()),
                        item.frame,
                        now
                    ])
                    .map_err(sink_err)?;
            }
        }
        tx.commit().map_err(sink_err)?;

        debug!(written, "Upserted line items");
        Ok(written)
    }

    #[instrument(skip(self, filing, holdings), fields(accession = %filing.accession, count = holdings.len()))]
    async fn upsert_holdings(
        &self,
        filing: &FilingSummary,
        holdings: &[NormalizedHolding],
    ) -> Result<usize> {
        let mut conn = self.conn.lock().map_err(sink_err)?;
        let tx = conn.transaction().map_err(sink_err)?;
        let now = Utc::now().to_rfc3339();
        let mut written = 0;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO holdings
                        (accession, cusip, put_call, report_date, issuer_name, ticker,
                         title_of_class, shares, share_type, market_value,
                         investment_discretion, voting_sole, voting_shared, voting_none,
                         updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                     ON CONFLICT(accession, cusip, put_call, report_date) DO UPDATE SET
                        issuer_name = excluded.issuer_name,
                        ticker = excluded.ticker,
                        title_of_class = excluded.title_of_class,
                        shares = excluded.shares,
                        share_type = excluded.share_type,
                        market_value = excluded.market_value,
                        investment_discretion = excluded.investment_discretion,
                        voting_sole = excluded.voting_sole,
                        voting_shared = excluded.voting_shared,
                        voting_none = excluded.voting_none,
                        updated_at = excluded.updated_at",
                )
                .map_err(sink_err)?;
            for holding in holdings {
                written += stmt
                    .execute(params![
                        filing.accession.as_str(),
                        holding.cusip,
                        holding.put_call.as_str(),
                        holding.report_date.map(|d| d.to_string()).unwrap_or_default(),
                        holding.issuer_name,
                        holding.ticker,
                        holding.title_of_class,
                        holding.shares.to_string(),
                        holding.share_type,
                        holding.market_value.to_string(),
                        holding.investment_discretion,
                        holding.discretion.sole.to_string(),
                        holding.discretion.shared.to_string(),
                        holding.discretion.none.to_string(),
                        now
                    ])
                    .map_err(sink_err)?;
            }
        }
        tx.commit().map_err(sink_err)?;

        debug!(written, "Upserted holdings");
        Ok(written)
    }

    #[instrument(skip(self), fields(accession = %accession, status = status.as_str()))]
    async fn mark_filing(&self, accession: &AccessionNumber, status: FilingStatus) -> Result<()> {
        let conn = self.conn.lock().map_err(sink_err)?;
        let message = match &status {
            FilingStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        };
        let updated = conn
            .execute(
                "UPDATE filings SET status = ?1, status_message = ?2, updated_at = ?3
                 WHERE accession = ?4",
                params![
                    status.as_str(),
                    message,
                    Utc::now().to_rfc3339(),
                    accession.as_str()
                ],
            )
            .map_err(sink_err)?;

        if updated == 0 {
            return Err(FilingsError::NotFound(format!("filing {accession}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use filings_core::{Cik, PutCall, StatementCategory};
    use rust_decimal::Decimal;

    fn filing() -> FilingSummary {
        FilingSummary {
            cik: Cik::from(1_067_983),
            accession: AccessionNumber::new("0000950123-24-008740"),
            form_type: "13F-HR".to_string(),
            filing_date: NaiveDate::from_ymd_opt(2024, 8, 14).unwrap(),
            report_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            primary_document: Some("xslForm13F_X02/primary_doc.xml".to_string()),
        }
    }

    fn cash(value: i64) -> NormalizedStatementLineItem {
        NormalizedStatementLineItem {
            category: StatementCategory::Balance,
            label: "Cash And Cash Equivalents At Carrying Value".to_string(),
            tag: "CashAndCashEquivalentsAtCarryingValue".to_string(),
            taxonomy: "us-gaap".to_string(),
            value: Decimal::from(value),
            unit: "USD".to_string(),
            fiscal_year: Some(2024),
            fiscal_period: Some("Q2".to_string()),
            fiscal_quarter: Some(2),
            period_start: None,
            period_end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            accession: None,
            form: Some("10-Q".to_string()),
            filed: None,
            frame: Some("CY2024Q2I".to_string()),
        }
    }

    #[tokio::test]
    async fn test_companies_upsert() {
        let sink = SqliteRecordSink::in_memory().unwrap();
        let company = Company::new(Cik::from(320193), "Apple Inc.");
        assert_eq!(sink.upsert_companies(&[company.clone()]).await.unwrap(), 1);
        sink.upsert_companies(&[company.with_ticker("AAPL")])
            .await
            .unwrap();

        let conn = sink.conn.lock().unwrap();
        let (count, ticker): (i64, Option<String>) = conn
            .query_row("SELECT COUNT(*), MAX(ticker) FROM companies", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(ticker.as_deref(), Some("AAPL"));
    }

    #[tokio::test]
    async fn test_filing_status_lifecycle() {
        let sink = SqliteRecordSink::in_memory().unwrap();
        let filing = filing();
        sink.upsert_filings(&[filing.clone()]).await.unwrap();
        assert_eq!(
            sink.filing_status(&filing.accession).unwrap(),
            Some(FilingStatus::Pending)
        );

        sink.mark_filing(&filing.accession, FilingStatus::Failed("boom".into()))
            .await
            .unwrap();
        assert_eq!(
            sink.filing_status(&filing.accession).unwrap(),
            Some(FilingStatus::Failed("boom".into()))
        );

        // Re-indexing does not reset progress.
        sink.upsert_filings(&[filing.clone()]).await.unwrap();
        assert_eq!(
            sink.filing_status(&filing.accession).unwrap(),
            Some(FilingStatus::Failed("boom".into()))
        );

        sink.mark_filing(&filing.accession, FilingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(
            sink.filing_status(&filing.accession).unwrap(),
            Some(FilingStatus::Completed)
        );
    }

    #[tokio::test]
    async fn test_mark_unknown_filing() {
        let sink = SqliteRecordSink::in_memory().unwrap();
        let err = sink
            .mark_filing(&AccessionNumber::new("0000000000-00-000000"), FilingStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, FilingsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_line_items_replay_is_idempotent() {
        let sink = SqliteRecordSink::in_memory().unwrap();
        let filing = filing();

        sink.upsert_line_items(&filing, &[cash(100)]).await.unwrap();
        sink.upsert_line_items(&filing, &[cash(250)]).await.unwrap();
        assert_eq!(sink.line_item_count().unwrap(), 1);

        let conn = sink.conn.lock().unwrap();
        let (value, instant): (String, bool) = conn
            .query_row(
                "SELECT value, is_instant FROM statement_line_items",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(value, "250");
        assert!(instant);
    }

    #[tokio::test]
    async fn test_holdings_natural_key() {
        let sink = SqliteRecordSink::in_memory().unwrap();
        let filing = filing();
        let report_date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        let shares = NormalizedHolding::new("037833100", "Apple Inc").with_report_date(report_date);
        let mut puts = shares.clone();
        puts.put_call = PutCall::Put;
        let undated = NormalizedHolding::new("037833100", "Apple Inc");

        sink.upsert_holdings(&filing, &[shares.clone(), puts, undated.clone()])
            .await
            .unwrap();
        sink.upsert_holdings(&filing, &[shares, undated]).await.unwrap();
        assert_eq!(sink.holding_count().unwrap(), 3);

        let conn = sink.conn.lock().unwrap();
        let put_call: String = conn
            .query_row(
                "SELECT put_call FROM holdings WHERE report_date = '' ",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(put_call, "none");
    }

    #[test]
    fn test_file_backed_database() {
        let path = std::env::temp_dir().join(format!("filings-store-{}.db", std::process::id()));
        {
            let sink = SqliteRecordSink::new(&path).unwrap();
            assert_eq!(sink.line_item_count().unwrap(), 0);
        }
        // Reopening an existing database keeps the schema.
        let sink = SqliteRecordSink::new(&path).unwrap();
        assert_eq!(sink.holding_count().unwrap(), 0);
        drop(sink);
        let _ = std::fs::remove_file(&path);
    }
}

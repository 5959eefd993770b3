//! Rate-limited, retrying, caching archive client.

use filings_core::{
    AccessionNumber, Cik, ClientConfig, Company, CompanyConcept, CompanyFacts, FilingSummary,
    FilingsError, RawFilingDocument, Result,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{
    rate_limit::RateLimiter,
    responses::{CompanySubmissions, CompanyTickerInfo},
    transport::{HttpTransport, ReqwestTransport},
};

/// Result of one logical fetch, before it is handed to the caller.
#[derive(Debug)]
enum FetchOutcome {
    /// Body of a successful response.
    Fetched(Vec<u8>),
    /// Every attempt failed.
    Exhausted {
        attempts: u32,
        last_error: FilingsError,
    },
}

impl FetchOutcome {
    fn into_bytes(self, url: &str) -> Result<Vec<u8>> {
        match self {
            Self::Fetched(body) => Ok(body),
            Self::Exhausted {
                attempts,
                last_error,
            } => {
                error!(url, attempts, last_error = %last_error, "Giving up on request");
                Err(FilingsError::FetchExhausted {
                    url: url.to_string(),
                    attempts,
                })
            }
        }
    }
}

/// Client for the SEC EDGAR archive.
///
/// Every request passes through a shared [`RateLimiter`] and carries the
/// identification header from [`ClientConfig`]. Decoded JSON responses are
/// cached in memory keyed by method and URL for the client's lifetime; call
/// [`clear_cache`](Self::clear_cache) to drop them.
///
/// Failures are handled per attempt:
///
/// - `429 Too Many Requests` waits the server-given delay and does not count
///   as an attempt
/// - network errors and `5xx` statuses back off exponentially and retry
/// - any other non-success status fails immediately
///
/// # Example
///
/// ```no_run
/// use filings_core::{Cik, ClientConfig};
/// use filings_edgar::EdgarClient;
///
/// # async fn run() -> filings_core::Result<()> {
/// let client = EdgarClient::new(ClientConfig::new("ops@example.com"))?;
/// let facts = client.company_facts(&Cik::from(320193)).await?;
/// println!("{} tags for {}", facts.tag_count(), facts.entity_name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EdgarClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    rate_limiter: Arc<RateLimiter>,
    cache: RwLock<HashMap<String, Arc<Value>>>,
}

impl EdgarClient {
    /// Creates a client backed by `reqwest`.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if the configuration violates the
    /// access policy or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client that sends requests through `transport`.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if the configuration is invalid.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let rate_limiter = Arc::new(RateLimiter::new(config.max_requests, config.time_window));

        Ok(Self {
            config,
            transport,
            rate_limiter,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Replaces the rate limiter, e.g. to share one window across clients.
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// The client's configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The rate limiter every request passes through.
    #[must_use]
    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.rate_limiter)
    }

    /// Requests `url` and decodes the body as JSON.
    ///
    /// A cached response is returned without touching the network or the
    /// limiter when `use_cache` is set and caching is enabled.
    ///
    /// # Errors
    /// - [`FilingsError::Http`] for non-retryable statuses
    /// - [`FilingsError::FetchExhausted`] when every attempt failed
    /// - [`FilingsError::Throttled`] when the server kept throttling. A `429`
    ///   is waited out rather than counted as an attempt, but only
    ///   [`ClientConfig::max_throttle_waits`] times per request; throttling is
    ///   deliberately not retried without bound.
    /// - [`FilingsError::Parse`] when the body is not valid JSON
    pub async fn request(&self, url: &str, method: Method, use_cache: bool) -> Result<Arc<Value>> {
        let caching = use_cache && self.config.cache_enabled;
        let cache_key = format!("{method}:{url}");

        let cached = if caching {
            self.cache.read().await.get(&cache_key).cloned()
        } else {
            None
        };
        if let Some(hit) = cached {
            debug!(url, "Cache hit");
            return Ok(hit);
        }

        let body = self.send_with_retry(&method, url).await?.into_bytes(url)?;

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| FilingsError::Parse(format!("Invalid JSON from {url}: {e}")))?;
        let value = Arc::new(value);

        if caching {
            self.cache
                .write()
                .await
                .insert(cache_key, Arc::clone(&value));
        }

        Ok(value)
    }

    /// Requests `url` with `GET` (cached) and decodes it into `T`.
    ///
    /// # Errors
    /// As [`request`](Self::request); a body that does not match `T` is a
    /// [`FilingsError::Parse`].
    pub async fn request_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self.request(url, Method::GET, true).await?;
        T::deserialize(value.as_ref())
            .map_err(|e| FilingsError::Parse(format!("Unexpected response shape from {url}: {e}")))
    }

    /// Fetches raw bytes from `url`. Never cached.
    ///
    /// # Errors
    /// As [`request`](Self::request), minus JSON decoding.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.send_with_retry(&Method::GET, url)
            .await?
            .into_bytes(url)
    }

    /// Fetches `url` as text, replacing invalid UTF-8. Never cached.
    ///
    /// # Errors
    /// As [`fetch_bytes`](Self::fetch_bytes).
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fetches the archive's ticker list.
    ///
    /// # Errors
    /// Propagates fetch and decode failures.
    pub async fn company_tickers(&self) -> Result<Vec<Company>> {
        let url = format!("{}/files/company_tickers.json", self.config.archive_base_url);
        let raw: HashMap<String, CompanyTickerInfo> = self.request_json(&url).await?;

        let mut entries: Vec<(String, CompanyTickerInfo)> = raw.into_iter().collect();
        entries.sort_by_key(|(key, _)| key.parse::<usize>().unwrap_or(usize::MAX));

        let companies: Vec<Company> = entries
            .into_iter()
            .map(|(_, info)| Company::from(info))
            .collect();

        info!(count = companies.len(), "Fetched company tickers");
        Ok(companies)
    }

    /// Fetches entity metadata and the recent filing index.
    ///
    /// # Errors
    /// Propagates fetch and decode failures.
    pub async fn company_submissions(&self, cik: &Cik) -> Result<CompanySubmissions> {
        let url = format!("{}/submissions/CIK{cik}.json", self.config.data_base_url);
        let submissions: CompanySubmissions = self.request_json(&url).await?;
        info!(cik = %cik, name = %submissions.name, "Fetched submissions");
        Ok(submissions)
    }

    /// Lists an entity's recent filings of the given form types.
    ///
    /// An empty `forms` slice lists every form.
    ///
    /// # Errors
    /// Propagates fetch and decode failures.
    pub async fn company_filings(&self, cik: &Cik, forms: &[String]) -> Result<Vec<FilingSummary>> {
        let submissions = self.company_submissions(cik).await?;
        Ok(submissions.to_summaries(cik, forms))
    }

    /// Fetches the tagged-facts document for an entity.
    ///
    /// # Errors
    /// Propagates fetch and decode failures.
    pub async fn company_facts(&self, cik: &Cik) -> Result<CompanyFacts> {
        let url = format!(
            "{}/api/xbrl/companyfacts/CIK{cik}.json",
            self.config.data_base_url
        );
        let facts: CompanyFacts = self.request_json(&url).await?;
        info!(cik = %cik, tags = facts.tag_count(), "Fetched company facts");
        Ok(facts)
    }

    /// Fetches the history of a single concept for an entity.
    ///
    /// # Errors
    /// Propagates fetch and decode failures.
    pub async fn company_concept(
        &self,
        cik: &Cik,
        taxonomy: &str,
        tag: &str,
    ) -> Result<CompanyConcept> {
        let url = format!(
            "{}/api/xbrl/companyconcept/CIK{cik}/{taxonomy}/{tag}.json",
            self.config.data_base_url
        );
        let concept: CompanyConcept = self.request_json(&url).await?;
        info!(cik = %cik, taxonomy, tag, "Fetched company concept");
        Ok(concept)
    }

    /// URL of the full submission text of a filing.
    #[must_use]
    pub fn filing_document_url(&self, cik: &Cik, accession: &AccessionNumber) -> String {
        format!(
            "{}/Archives/edgar/data/{}/{}/{accession}.txt",
            self.config.archive_base_url,
            cik.as_u64(),
            accession.compact()
        )
    }

    /// Fetches the full submission text of a filing.
    ///
    /// # Errors
    /// Propagates fetch failures.
    pub async fn filing_document(
        &self,
        cik: &Cik,
        accession: &AccessionNumber,
    ) -> Result<RawFilingDocument> {
        let url = self.filing_document_url(cik, accession);
        let content = self.fetch_bytes(&url).await?;
        info!(cik = %cik, accession = %accession, bytes = content.len(), "Fetched filing document");
        Ok(RawFilingDocument::new(cik.clone(), accession.clone(), content).with_url(url))
    }

    /// Drops every cached response.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        debug!("Response cache cleared");
    }

    /// Number of cached responses.
    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Runs the attempt loop. Non-transient failures and persistent
    /// throttling are returned as errors; running out of attempts is an
    /// [`FetchOutcome::Exhausted`].
    async fn send_with_retry(&self, method: &Method, url: &str) -> Result<FetchOutcome> {
        let max_retries = self.config.max_retries;
        let mut attempt: u32 = 0;
        let mut throttle_waits: u32 = 0;
        let mut last_error = None;

        while attempt < max_retries {
            self.rate_limiter.acquire().await;
            debug!(url, attempt = attempt + 1, max_retries, %method, "Sending request");

            let error = match self.transport.send(method.clone(), url).await {
                Ok(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
                    if throttle_waits >= self.config.max_throttle_waits {
                        error!(url, waits = throttle_waits, "Still throttled, giving up on request");
                        return Err(FilingsError::Throttled {
                            url: url.to_string(),
                            waits: throttle_waits,
                        });
                    }
                    throttle_waits += 1;

                    let wait = response
                        .retry_after
                        .unwrap_or(self.config.default_retry_after);
                    warn!(url, wait_secs = wait.as_secs(), "Throttled by server, waiting");
                    sleep(wait).await;
                    continue;
                }
                Ok(response) if response.status.is_success() => {
                    return Ok(FetchOutcome::Fetched(response.body));
                }
                Ok(response) => FilingsError::Http {
                    status: response.status.as_u16(),
                    url: url.to_string(),
                },
                Err(e) => e,
            };

            if !error.is_transient() {
                return Err(error);
            }

            attempt += 1;
            if attempt < max_retries {
                let delay = self.backoff(attempt - 1);
                warn!(url, attempt, error = %error, delay_ms = delay.as_millis() as u64, "Request failed, retrying");
                sleep(delay).await;
            } else {
                warn!(url, attempt, error = %error, "Request failed, no attempts left");
            }
            last_error = Some(error);
        }

        Ok(FetchOutcome::Exhausted {
            attempts: max_retries,
            last_error: last_error
                .unwrap_or_else(|| FilingsError::Other("no attempt was made".to_string())),
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.config
            .backoff_base
            .saturating_mul(2_u32.saturating_pow(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays a fixed script of responses and records every requested URL.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<HttpResponse>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, _method: Method, url: &str) -> Result<HttpResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FilingsError::Network("script exhausted".to_string())))
        }
    }

    fn ok(body: &str) -> Result<HttpResponse> {
        Ok(HttpResponse::new(StatusCode::OK, body))
    }

    fn status(code: StatusCode) -> Result<HttpResponse> {
        Ok(HttpResponse::new(code, ""))
    }

    fn network() -> Result<HttpResponse> {
        Err(FilingsError::Network("connection reset".to_string()))
    }

    fn config() -> ClientConfig {
        ClientConfig::new("test@example.com")
            .with_user_agent("Test/1.0")
            .with_base_urls("http://data.test", "http://archive.test")
    }

    fn client(config: ClientConfig, transport: &Arc<ScriptedTransport>) -> EdgarClient {
        EdgarClient::with_transport(config, Arc::clone(transport) as Arc<dyn HttpTransport>)
            .unwrap()
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        assert!(matches!(
            EdgarClient::new(ClientConfig::default()),
            Err(FilingsError::Config(_))
        ));

        let transport = ScriptedTransport::new(vec![]);
        let result = EdgarClient::with_transport(
            ClientConfig::new("test@example.com").with_max_retries(0),
            transport,
        );
        assert!(matches!(result, Err(FilingsError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_issues_one_network_call() {
        let transport = ScriptedTransport::new(vec![ok(r#"{"name": "Apple Inc."}"#)]);
        let client = client(config(), &transport);

        let first = client
            .request("http://data.test/x.json", Method::GET, true)
            .await
            .unwrap();
        let second = client
            .request("http://data.test/x.json", Method::GET, true)
            .await
            .unwrap();

        assert_eq!(first, second);
        // A hit hands back the stored document itself.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(client.cache_len().await, 1);
        // The cache hit never touched the limiter.
        assert_eq!(client.rate_limiter().current_rate(), 1);

        client.clear_cache().await;
        assert_eq!(client.cache_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_bypass() {
        let transport = ScriptedTransport::new(vec![ok("1"), ok("2")]);
        let client = client(config(), &transport);

        let first = client.request("http://data.test/n", Method::GET, false).await.unwrap();
        let second = client.request("http://data.test/n", Method::GET, false).await.unwrap();

        assert_eq!(*first, Value::from(1));
        assert_eq!(*second, Value::from(2));
        assert_eq!(transport.calls().len(), 2);
        assert_eq!(client.cache_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_disabled_in_config() {
        let transport = ScriptedTransport::new(vec![ok("{}"), ok("{}")]);
        let client = client(config().with_cache(false), &transport);

        client.request("http://data.test/a", Method::GET, true).await.unwrap();
        client.request("http://data.test/a", Method::GET, true).await.unwrap();
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_max_retries_acquisitions() {
        let transport = ScriptedTransport::new(vec![network(), network(), network(), ok("{}")]);
        let limiter = Arc::new(RateLimiter::new(100, Duration::from_secs(3600)));
        let client = client(config().with_max_retries(3), &transport)
            .with_rate_limiter(Arc::clone(&limiter));

        let start = Instant::now();
        let result = client.request("http://data.test/down", Method::GET, true).await;

        match result {
            Err(FilingsError::FetchExhausted { url, attempts }) => {
                assert_eq!(url, "http://data.test/down");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected FetchExhausted, got {other:?}"),
        }
        assert_eq!(limiter.current_rate(), 3);
        assert_eq!(transport.calls().len(), 3);
        // Backoff of 1s then 2s between the three attempts.
        assert_eq!(Instant::now() - start, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_is_retried() {
        let transport = ScriptedTransport::new(vec![
            status(StatusCode::SERVICE_UNAVAILABLE),
            ok(r#"{"ok": true}"#),
        ]);
        let client = client(config(), &transport);

        let value = client.request("http://data.test/flaky", Method::GET, true).await.unwrap();
        assert_eq!(value["ok"], Value::Bool(true));
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_is_not_retried() {
        let transport = ScriptedTransport::new(vec![status(StatusCode::NOT_FOUND), ok("{}")]);
        let client = client(config(), &transport);

        let result = client.request("http://data.test/missing", Method::GET, true).await;
        assert!(matches!(result, Err(FilingsError::Http { status: 404, .. })));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttling_does_not_consume_attempts() {
        let throttled = HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, "")
            .with_retry_after(Duration::from_secs(5));
        let transport = ScriptedTransport::new(vec![Ok(throttled), ok("{}")]);
        let client = client(config().with_max_retries(1), &transport);

        let start = Instant::now();
        client.request("http://data.test/busy", Method::GET, true).await.unwrap();

        assert_eq!(transport.calls().len(), 2);
        assert_eq!(Instant::now() - start, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttling_without_header_uses_default_wait() {
        let transport = ScriptedTransport::new(vec![
            status(StatusCode::TOO_MANY_REQUESTS),
            ok("{}"),
        ]);
        let client = client(config(), &transport);

        let start = Instant::now();
        client.request("http://data.test/busy", Method::GET, true).await.unwrap();
        assert_eq!(Instant::now() - start, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_throttling_is_bounded() {
        let mut config = config();
        config.max_throttle_waits = 2;
        let transport = ScriptedTransport::new(
            (0..5)
                .map(|_| {
                    Ok(HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, "")
                        .with_retry_after(Duration::from_secs(1)))
                })
                .collect(),
        );
        let client = client(config, &transport);

        let result = client.request("http://data.test/busy", Method::GET, true).await;
        assert!(matches!(result, Err(FilingsError::Throttled { waits: 2, .. })));
        assert_eq!(transport.calls().len(), 3);
        assert_eq!(client.cache_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_bound_applies_to_raw_fetches() {
        let mut config = config();
        config.max_throttle_waits = 1;
        let transport = ScriptedTransport::new(
            (0..3)
                .map(|_| {
                    Ok(HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, "")
                        .with_retry_after(Duration::from_secs(5)))
                })
                .collect(),
        );
        let client = client(config, &transport);
        let start = tokio::time::Instant::now();

        let result = client.fetch_bytes("http://data.test/doc.txt").await;
        match result {
            Err(FilingsError::Throttled { url, waits }) => {
                assert_eq!(url, "http://data.test/doc.txt");
                assert_eq!(waits, 1);
            }
            other => panic!("expected Throttled, got {other:?}"),
        }
        assert_eq!(transport.calls().len(), 2);
        assert!(tokio::time::Instant::now() - start >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_json_is_a_parse_error() {
        let transport = ScriptedTransport::new(vec![ok("<html>"), ok("{}")]);
        let client = client(config(), &transport);

        let result = client.request("http://data.test/html", Method::GET, true).await;
        assert!(matches!(result, Err(FilingsError::Parse(_))));
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(client.cache_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_endpoint_urls() {
        let transport = ScriptedTransport::new(vec![
            ok(r#"{"cik": 320193, "entityName": "Apple Inc.", "facts": {}}"#),
            ok(r#"{"cik": 320193, "taxonomy": "us-gaap", "tag": "Assets", "units": {}}"#),
            ok("<SEC-DOCUMENT>"),
        ]);
        let client = client(config(), &transport);
        let cik = Cik::from(320193);
        let accession = AccessionNumber::new("0000320193-23-000106");

        let facts = client.company_facts(&cik).await.unwrap();
        assert_eq!(facts.entity_name, "Apple Inc.");

        let concept = client.company_concept(&cik, "us-gaap", "Assets").await.unwrap();
        assert_eq!(concept.tag, "Assets");

        let document = client.filing_document(&cik, &accession).await.unwrap();
        assert_eq!(document.text(), "<SEC-DOCUMENT>");

        assert_eq!(
            transport.calls(),
            vec![
                "http://data.test/api/xbrl/companyfacts/CIK0000320193.json",
                "http://data.test/api/xbrl/companyconcept/CIK0000320193/us-gaap/Assets.json",
                "http://archive.test/Archives/edgar/data/320193/000032019323000106/0000320193-23-000106.txt",
            ]
        );
        assert_eq!(document.url.as_deref(), Some(transport.calls()[2].as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_company_tickers_keep_archive_order() {
        let transport = ScriptedTransport::new(vec![ok(r#"{
            "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"},
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}
        }"#)]);
        let client = client(config(), &transport);

        let companies = client.company_tickers().await.unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].ticker.as_deref(), Some("AAPL"));
        assert_eq!(companies[1].cik.as_str(), "0000789019");
        assert_eq!(transport.calls(), vec!["http://archive.test/files/company_tickers.json"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_company_filings_filters_forms() {
        let transport = ScriptedTransport::new(vec![ok(r#"{
            "cik": "320193",
            "name": "Apple Inc.",
            "filings": {"recent": {
                "accessionNumber": ["0000320193-23-000106", "0000320193-23-000077"],
                "filingDate": ["2023-11-03", "2023-08-04"],
                "reportDate": ["2023-09-30", "2023-07-01"],
                "form": ["10-K", "10-Q"],
                "primaryDocument": ["aapl-20230930.htm", "aapl-20230701.htm"]
            }}
        }"#)]);
        let client = client(config(), &transport);

        let filings = client
            .company_filings(&Cik::from(320193), &["10-K".to_string()])
            .await
            .unwrap();
        assert_eq!(filings.len(), 1);
        assert_eq!(filings[0].form_type, "10-K");
        assert_eq!(
            transport.calls(),
            vec!["http://data.test/submissions/CIK0000320193.json"]
        );
    }
}

//! Remote spreadsheet loading: fetch CSV exports and build the QA table.
//!
//! At startup the bot fetches each configured CSV export once, in order.
//! A source that fails for any reason (network, HTTP status, unparseable
//! CSV, missing question/answer columns) is logged and skipped; the load
//! continues with the remaining sources. Later sources overwrite earlier
//! ones on duplicate questions.

mod parser;

use reqwest::Client;
use sheetfaq_shared::{QaTable, Result, SheetFaqError};
use tracing::{info, instrument, warn};
use url::Url;

pub use parser::{ColumnRoles, detect_columns, ingest_csv};

/// Maximum number of redirects to follow. Google Sheets export URLs
/// redirect at least once.
const MAX_REDIRECTS: usize = 5;

/// Maximum response size we consider valid (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// User-Agent string for sheet fetches.
const USER_AGENT: &str = concat!("SheetFAQ/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// SourceReport
// ---------------------------------------------------------------------------

/// Per-source outcome of a load, surfaced at startup and by `sheetfaq check`.
#[derive(Debug, Clone)]
pub struct SourceReport {
    /// The source URL.
    pub url: String,
    /// Rows ingested from this source (zero when skipped).
    pub rows: usize,
    /// Why the source was skipped, if it was.
    pub error: Option<String>,
}

impl SourceReport {
    fn loaded(url: &Url, rows: usize) -> Self {
        Self {
            url: url.to_string(),
            rows,
            error: None,
        }
    }

    fn skipped(url: &Url, error: &SheetFaqError) -> Self {
        Self {
            url: url.to_string(),
            rows: 0,
            error: Some(error.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// SheetLoader
// ---------------------------------------------------------------------------

/// Fetches spreadsheet CSV exports and merges them into one [`QaTable`].
pub struct SheetLoader {
    client: Client,
}

impl SheetLoader {
    /// Create a loader with the given per-request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SheetFaqError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch every source once and merge the rows into a single table.
    ///
    /// Never fails as a whole: per-source errors become [`SourceReport`]
    /// entries and the remaining sources still load.
    #[instrument(skip_all, fields(sources = urls.len()))]
    pub async fn load(&self, urls: &[Url]) -> (QaTable, Vec<SourceReport>) {
        let mut table = QaTable::new();
        let mut reports = Vec::with_capacity(urls.len());

        for url in urls {
            match self.load_source(url, &mut table).await {
                Ok(rows) => {
                    info!(%url, rows, "loaded source");
                    reports.push(SourceReport::loaded(url, rows));
                }
                Err(e) => {
                    warn!(%url, error = %e, "skipping source");
                    reports.push(SourceReport::skipped(url, &e));
                }
            }
        }

        info!(entries = table.len(), "table build complete");
        (table, reports)
    }

    /// Fetch one source and ingest its rows into `table`.
    async fn load_source(&self, url: &Url, table: &mut QaTable) -> Result<usize> {
        let body = self.fetch_csv(url).await?;
        ingest_csv(&body, table)
    }

    /// Fetch a CSV export, enforcing status and size limits.
    async fn fetch_csv(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SheetFaqError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetFaqError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(SheetFaqError::validation(format!(
                    "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SheetFaqError::Network(format!("{url}: failed to read body: {e}")))?;

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn mock_csv_source(server: &wiremock::MockServer, path: &str, body: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(path))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "text/csv"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn load_merges_multiple_sources() {
        let server = wiremock::MockServer::start().await;
        mock_csv_source(
            &server,
            "/sheet-a.csv",
            "Question,Answer\nhow to login,Use the portal\nwhat is sso,Single sign-on\n",
        )
        .await;
        mock_csv_source(&server, "/sheet-b.csv", "Question,Answer\nhow to pay,By card\n").await;

        let loader = SheetLoader::new(5).unwrap();
        let urls = vec![
            Url::parse(&format!("{}/sheet-a.csv", server.uri())).unwrap(),
            Url::parse(&format!("{}/sheet-b.csv", server.uri())).unwrap(),
        ];
        let (table, reports) = loader.load(&urls).await;

        assert_eq!(table.len(), 3);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].rows, 2);
        assert_eq!(reports[1].rows, 1);
        assert!(reports.iter().all(|r| r.error.is_none()));
    }

    #[tokio::test]
    async fn later_source_overwrites_earlier_on_collision() {
        let server = wiremock::MockServer::start().await;
        mock_csv_source(&server, "/first.csv", "Question,Answer\nshared question,old\n").await;
        mock_csv_source(&server, "/second.csv", "Question,Answer\nShared Question,new\n").await;

        let loader = SheetLoader::new(5).unwrap();
        let urls = vec![
            Url::parse(&format!("{}/first.csv", server.uri())).unwrap(),
            Url::parse(&format!("{}/second.csv", server.uri())).unwrap(),
        ];
        let (table, _) = loader.load(&urls).await;

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("shared question"), Some("new"));
    }

    #[tokio::test]
    async fn failing_source_does_not_abort_load() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/broken.csv"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mock_csv_source(&server, "/good.csv", "Question,Answer\nstill works,yes\n").await;

        let loader = SheetLoader::new(5).unwrap();
        let urls = vec![
            Url::parse(&format!("{}/broken.csv", server.uri())).unwrap(),
            Url::parse(&format!("{}/good.csv", server.uri())).unwrap(),
        ];
        let (table, reports) = loader.load(&urls).await;

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("still works"), Some("yes"));
        assert!(reports[0].error.as_deref().unwrap().contains("HTTP 500"));
        assert!(reports[1].error.is_none());
    }

    #[tokio::test]
    async fn source_without_qa_columns_contributes_nothing() {
        let server = wiremock::MockServer::start().await;
        mock_csv_source(&server, "/odd.csv", "Q,Ans\nwhat,ever\n").await;

        let loader = SheetLoader::new(5).unwrap();
        let urls = vec![Url::parse(&format!("{}/odd.csv", server.uri())).unwrap()];
        let (table, reports) = loader.load(&urls).await;

        assert!(table.is_empty());
        assert_eq!(reports[0].rows, 0);
        assert!(
            reports[0]
                .error
                .as_deref()
                .unwrap()
                .contains("missing question/answer columns")
        );
    }
}

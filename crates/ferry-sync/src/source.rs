//! # Record Sources
//!
//! Where flat records come from: CSV files on disk and a JSON orders feed.
//!
//! ## Source Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RecordSource::read                               │
//! │                                                                         │
//! │   CsvFileSource("./orders.csv")          HttpJsonSource(url)            │
//! │   ─────────────────────────────          ──────────────────────         │
//! │   header row = field names               GET url                        │
//! │   short rows omit trailing fields        body must be [ {..}, {..} ]    │
//! │   extra columns kept as field3, ..       each object → RawRecord        │
//! │   values trimmed                                                        │
//! │   bad UTF-8 → U+FFFD + warning                                          │
//! │              │                                      │                   │
//! │              └──────────────┬───────────────────────┘                   │
//! │                             ▼                                           │
//! │                 Vec<RawRecord> (source order)                           │
//! │                                                                         │
//! │   Unreadable, malformed, or ZERO records → SourceUnavailable           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## CSV Column Rules
//!
//! | Row shape                  | Result                                       |
//! |----------------------------|----------------------------------------------|
//! | same width as header       | one field per header name                    |
//! | shorter than header        | trailing fields absent (`get` → `None`)      |
//! | wider than header          | extra values kept as `field{column}` (1-based) |
//! | value not valid UTF-8      | decoded lossily, `DataQualityWarning` for it |

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use csv::{ReaderBuilder, Trim};
use ferry_core::{DataQualityWarning, RawRecord};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

/// Reason attached to a source that produced nothing.
pub const ZERO_RECORDS: &str = "returned zero records";

const INVALID_UTF8: &str = "invalid UTF-8 replaced";

// =============================================================================
// Source Trait
// =============================================================================

/// Records plus the non-fatal findings made while reading them.
#[derive(Debug, Clone, Default)]
pub struct SourceRead {
    pub records: Vec<RawRecord>,
    pub warnings: Vec<DataQualityWarning>,
}

/// An ordered supply of flat records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Reads every record. Never returns an empty vector.
    async fn read(&self) -> SyncResult<Vec<RawRecord>>;

    /// Reads every record along with decoding warnings.
    async fn read_detailed(&self) -> SyncResult<SourceRead> {
        Ok(SourceRead {
            records: self.read().await?,
            warnings: Vec::new(),
        })
    }

    /// Human-readable location for logs ("./orders.csv", a URL).
    fn describe(&self) -> String;
}

fn non_empty(origin: String, records: Vec<RawRecord>) -> SyncResult<Vec<RawRecord>> {
    if records.is_empty() {
        return Err(SyncError::source_unavailable(origin, ZERO_RECORDS));
    }
    info!(source = %origin, count = records.len(), "Read records");
    Ok(records)
}

// =============================================================================
// CSV File Source
// =============================================================================

/// Header-keyed CSV file.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for CsvFileSource {
    async fn read(&self) -> SyncResult<Vec<RawRecord>> {
        Ok(self.read_detailed().await?.records)
    }

    async fn read_detailed(&self) -> SyncResult<SourceRead> {
        let path = self.path.clone();
        let parsed = tokio::task::spawn_blocking(move || parse_csv_file(&path))
            .await
            .map_err(|e| SyncError::source_unavailable(self.describe(), e.to_string()))?
            .map_err(|e| match e {
                SyncError::CsvRead(reason) => SyncError::source_unavailable(self.describe(), reason),
                other => other,
            })?;

        for warning in &parsed.warnings {
            warn!(source = %self.describe(), %warning, "Data quality warning");
        }

        Ok(SourceRead {
            records: non_empty(self.describe(), parsed.records)?,
            warnings: parsed.warnings,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn parse_csv_file(path: &Path) -> SyncResult<SourceRead> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true) // Short rows just omit trailing fields
        .from_path(path)?;

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();
    debug!(path = %path.display(), columns = headers.len(), "CSV headers");

    let mut parsed = SourceRead::default();
    for (index, row) in reader.byte_records().enumerate() {
        let row = row?;
        let line = index + 1;

        if row.len() > headers.len() {
            debug!(
                path = %path.display(),
                row = line,
                extra = row.len() - headers.len(),
                "Row wider than header, keeping extra columns"
            );
        }

        let mut record = RawRecord::new();
        for (column, bytes) in row.iter().enumerate() {
            let field = headers
                .get(column)
                .cloned()
                .unwrap_or_else(|| format!("field{}", column + 1));

            let value = String::from_utf8_lossy(bytes);
            if matches!(value, Cow::Owned(_)) {
                parsed
                    .warnings
                    .push(DataQualityWarning::new(line, &field, Some(value.as_ref()), INVALID_UTF8));
            }
            record.insert(field, value.into_owned());
        }
        parsed.records.push(record);
    }

    Ok(parsed)
}

// =============================================================================
// HTTP JSON Source
// =============================================================================

/// A JSON endpoint answering with an array of flat objects.
#[derive(Debug, Clone)]
pub struct HttpJsonSource {
    client: reqwest::Client,
    url: String,
}

impl HttpJsonSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(client, url))
    }

    /// Reuses an existing client (connection pool, timeout).
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn fetch(&self) -> SyncResult<Value> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteRequest {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl RecordSource for HttpJsonSource {
    async fn read(&self) -> SyncResult<Vec<RawRecord>> {
        let body = self
            .fetch()
            .await
            .map_err(|e| SyncError::source_unavailable(self.describe(), e.to_string()))?;

        let items = match body {
            Value::Array(items) => items,
            other => {
                return Err(SyncError::source_unavailable(
                    self.describe(),
                    format!("expected a JSON array, got {}", json_kind(&other)),
                ))
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or_else(|| {
                SyncError::source_unavailable(
                    self.describe(),
                    format!("element {} is {}, not an object", index + 1, json_kind(item)),
                )
            })?;
            records.push(RawRecord::from_json_object(object));
        }

        non_empty(self.describe(), records)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_csv_rows_keyed_by_header() {
        let file = csv_file(
            "email,lineitem_title,lineitem_quantity\n\
             a@b.com, Shirt ,2\n\
             a@b.com,Hat\n",
        );
        let records = CsvFileSource::new(file.path()).read().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("lineitem_title"), Some("Shirt"));
        assert_eq!(records[0].get("lineitem_quantity"), Some("2"));
        assert_eq!(records[1].get("lineitem_title"), Some("Hat"));
        assert_eq!(records[1].get("lineitem_quantity"), None);
    }

    #[tokio::test]
    async fn test_csv_invalid_utf8_is_decoded_with_warning() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"email,lineitem_title,lineitem_quantity\n").unwrap();
        file.write_all(b"a@b.com,Shirt,2\n").unwrap();
        file.write_all(b"c@d.com,Caf\xe9 Mug,1\n").unwrap();
        file.write_all(b"e@f.com,Hat,1\n").unwrap();

        let read = CsvFileSource::new(file.path()).read_detailed().await.unwrap();

        assert_eq!(read.records.len(), 3);
        assert_eq!(read.records[1].get("lineitem_title"), Some("Caf\u{FFFD} Mug"));
        assert_eq!(read.records[1].get("email"), Some("c@d.com"));
        assert_eq!(read.records[2].get("lineitem_title"), Some("Hat"));
        assert_eq!(
            read.warnings,
            vec![DataQualityWarning::new(2, "lineitem_title", Some("Caf\u{FFFD} Mug"), INVALID_UTF8)]
        );
    }

    #[tokio::test]
    async fn test_csv_extra_columns_are_kept() {
        let file = csv_file("sku,inventory_level\nA,1,extra,more\nB,2\n");
        let read = CsvFileSource::new(file.path()).read_detailed().await.unwrap();

        assert_eq!(read.records[0].len(), 4);
        assert_eq!(read.records[0].get("field3"), Some("extra"));
        assert_eq!(read.records[0].get("field4"), Some("more"));
        assert_eq!(read.records[1].len(), 2);
        assert!(read.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_json_source_reports_no_warnings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"email": "a@b.com"}])))
            .mount(&server)
            .await;

        let source = HttpJsonSource::new(server.uri(), Duration::from_secs(5)).unwrap();
        let read = source.read_detailed().await.unwrap();
        assert_eq!(read.records.len(), 1);
        assert!(read.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_csv_header_only_is_unavailable() {
        let file = csv_file("sku,inventory_level\n");
        let err = CsvFileSource::new(file.path()).read().await.unwrap_err();

        assert!(err.is_source_error());
        assert!(err.to_string().contains(ZERO_RECORDS));
    }

    #[tokio::test]
    async fn test_missing_csv_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvFileSource::new(dir.path().join("nope.csv"));
        let err = source.read().await.unwrap_err();
        assert!(matches!(err, SyncError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_json_array_of_objects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"email": "a@b.com", "lineitem_quantity": 2},
                {"email": "c@d.com", "billing_address2": null}
            ])))
            .mount(&server)
            .await;

        let source = HttpJsonSource::new(
            format!("{}/api/orders", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();
        let records = source.read().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("lineitem_quantity"), Some("2"));
        assert_eq!(records[1].get("billing_address2"), None);
    }

    #[tokio::test]
    async fn test_json_non_array_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orders": []})))
            .mount(&server)
            .await;

        let source = HttpJsonSource::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = source.read().await.unwrap_err();
        assert!(err.to_string().contains("expected a JSON array, got an object"));
    }

    #[tokio::test]
    async fn test_json_empty_and_error_status_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let empty = HttpJsonSource::new(format!("{}/empty", server.uri()), Duration::from_secs(5)).unwrap();
        let err = empty.read().await.unwrap_err();
        assert!(err.to_string().contains(ZERO_RECORDS));

        let down = HttpJsonSource::new(format!("{}/down", server.uri()), Duration::from_secs(5)).unwrap();
        let err = down.read().await.unwrap_err();
        assert!(err.is_source_error());
        assert!(err.to_string().contains("503"));
    }
}

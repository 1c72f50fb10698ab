//! EventSource trait definition.
//!
//! This module defines the [`EventSource`] trait, the abstraction over where
//! raw event records come from, together with the non-network sources:
//! - [`JsonFileSource`]: reads a local JSON file
//! - [`StaticSource`]: serves an in-memory list
//! - [`ErrorSource`]: always fails, for tests and misconfiguration

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::debug;

use crate::error::{FetchError, FetchErrorCode, FetchResult};
use crate::raw_event::RawEvent;

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe so callers can hold a
/// `Box<dyn EventSource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A source of raw event records.
///
/// One call to [`fetch_events`](EventSource::fetch_events) is one fetch of
/// the whole collection. Sources do not retry; retrying is the caller's
/// policy.
pub trait EventSource: Send + Sync {
    /// Returns the kind of this source (e.g., "http", "file").
    fn name(&self) -> &str;

    /// Returns where this source reads from, for logs and `check` output.
    fn location(&self) -> String {
        self.name().to_string()
    }

    /// Fetches the full list of raw records.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when no collection can be produced.
    fn fetch_events(&self) -> BoxFuture<'_, FetchResult<Vec<RawEvent>>>;
}

/// Parses a list body into raw records.
pub fn parse_event_list(body: &str) -> FetchResult<Vec<RawEvent>> {
    RawEvent::list_from_json(body).map_err(|e| {
        FetchError::invalid_response(format!("expected a JSON array of events: {}", e))
            .with_source(e)
    })
}

/// Reads raw records from a local JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for JsonFileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_events(&self) -> BoxFuture<'_, FetchResult<Vec<RawEvent>>> {
        Box::pin(async move {
            debug!(path = %self.path.display(), "Reading events file");
            let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                let code = if e.kind() == std::io::ErrorKind::NotFound {
                    FetchErrorCode::NotFound
                } else {
                    FetchErrorCode::InternalError
                };
                FetchError::new(
                    code,
                    format!("Failed to read {}: {}", self.path.display(), e),
                )
                .with_source_name(self.name())
                .with_source(e)
            })?;

            parse_event_list(&body).map_err(|e| e.with_source_name(self.name()))
        })
    }
}

/// Serves a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    events: Vec<RawEvent>,
}

impl StaticSource {
    /// Creates a source serving `events`.
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self { events }
    }
}

impl EventSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_events(&self) -> BoxFuture<'_, FetchResult<Vec<RawEvent>>> {
        let events = self.events.clone();
        Box::pin(async move { Ok(events) })
    }
}

/// A source that always returns an error.
#[derive(Debug)]
pub struct ErrorSource {
    name: String,
    error: FetchError,
}

impl ErrorSource {
    /// Creates a new error source.
    pub fn new(name: impl Into<String>, error: FetchError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl EventSource for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_events(&self) -> BoxFuture<'_, FetchResult<Vec<RawEvent>>> {
        let error = self.error.detached().with_source_name(&self.name);
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn static_source_returns_events() {
        let source = StaticSource::new(vec![RawEvent::new().with_name("Expo")]);
        assert_eq!(source.name(), "static");
        let events = source.fetch_events().await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn error_source_returns_error() {
        let source = ErrorSource::new("test", FetchError::configuration("not configured"));
        let err = source.fetch_events().await.unwrap_err();
        assert_eq!(err.code(), FetchErrorCode::ConfigurationError);
        assert_eq!(err.source_name(), Some("test"));

        // Repeated calls keep failing the same way.
        let again = source.fetch_events().await.unwrap_err();
        assert_eq!(again.message(), "not configured");
    }

    #[tokio::test]
    async fn file_source_reads_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"event_id": "E1", "event_name": "Expo", "date": "01/01/2030"}}]"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        assert_eq!(source.location(), file.path().display().to_string());
        let events = source.fetch_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source_id(), Some("E1"));
    }

    #[tokio::test]
    async fn file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("missing.json"));
        let err = source.fetch_events().await.unwrap_err();
        assert_eq!(err.code(), FetchErrorCode::NotFound);
        assert_eq!(err.source_name(), Some("file"));
    }

    #[tokio::test]
    async fn file_source_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<html>not json</html>").unwrap();

        let err = JsonFileSource::new(file.path())
            .fetch_events()
            .await
            .unwrap_err();
        assert_eq!(err.code(), FetchErrorCode::InvalidResponse);
    }

    #[test]
    fn parse_event_list_keeps_valid_records_next_to_bad_ones() {
        let body = r#"[
            {"event_id": "A", "date": "10/03/2030"},
            {"event_id": "B", "date": {"day": 10}},
            {"event_id": "C", "contact": "N/A"},
            {"event_id": "D", "id": "E"},
            null
        ]"#;
        let events = parse_event_list(body).unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].date.as_deref(), Some("10/03/2030"));
        assert_eq!(events[1].source_id(), Some("B"));
        assert!(events[2].contact.is_none());
        assert_eq!(events[3].source_id(), Some("D"));
        assert!(events[4].rejection().is_some());
    }

    #[test]
    fn parse_event_list_rejects_object() {
        let err = parse_event_list(r#"{"events": []}"#).unwrap_err();
        assert_eq!(err.code(), FetchErrorCode::InvalidResponse);
        assert!(parse_event_list("[]").unwrap().is_empty());
    }
}

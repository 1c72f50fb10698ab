//! HTTP source for the event list endpoint.
//!
//! One fetch is one `GET` of the configured URL. The body must be a JSON
//! array of raw event records.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::raw_event::RawEvent;
use crate::source::{BoxFuture, EventSource, parse_event_list};

/// The public list endpoint.
pub const DEFAULT_EVENTS_URL: &str = "https://events-webapp.onrender.com/events";

/// Configuration for the HTTP source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// The list endpoint.
    pub url: Url,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl HttpSourceConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

    /// Creates a configuration for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url.as_ref())?,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("eventboard/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Creates a configuration for [`DEFAULT_EVENTS_URL`].
    pub fn public() -> Result<Self, url::ParseError> {
        Self::new(DEFAULT_EVENTS_URL)
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches raw records from the list endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpEventSource {
    /// Creates a new HTTP source.
    pub fn new(config: HttpSourceConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                FetchError::configuration(format!("Failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { client, config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    async fn fetch(&self) -> FetchResult<Vec<RawEvent>> {
        trace!(url = %self.config.url, "Sending request");
        let response = self
            .client
            .get(self.config.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("Request timed out after {}s", self.config.timeout.as_secs())
                } else {
                    format!("Request failed: {}", e)
                };
                FetchError::network(message).with_source(e)
            })?;

        let status = response.status();
        trace!(status = %status, "Received response");

        let body = response.text().await.map_err(|e| {
            FetchError::network(format!("Failed to read response: {}", e)).with_source(e)
        })?;

        if let Some(err) = status_error(status, &body) {
            return Err(err);
        }

        let events = parse_event_list(&body)?;
        debug!(count = events.len(), "Fetched raw events");
        Ok(events)
    }
}

impl EventSource for HttpEventSource {
    fn name(&self) -> &str {
        "http"
    }

    fn location(&self) -> String {
        self.config.url.to_string()
    }

    fn fetch_events(&self) -> BoxFuture<'_, FetchResult<Vec<RawEvent>>> {
        Box::pin(async move { self.fetch().await.map_err(|e| e.with_source_name("http")) })
    }
}

/// Maps a non-success status to an error.
fn status_error(status: StatusCode, body: &str) -> Option<FetchError> {
    match status {
        s if s.is_success() => None,
        StatusCode::NOT_FOUND => Some(FetchError::not_found("Event list endpoint not found")),
        StatusCode::TOO_MANY_REQUESTS => {
            Some(FetchError::rate_limited("Too many requests to server"))
        }
        s if s.is_server_error() => Some(FetchError::server(format!(
            "Server error ({}): {}",
            s,
            body.trim()
        ))),
        s => {
            warn!(status = %s, body = %body, "Unexpected response status");
            Some(FetchError::invalid_response(format!(
                "Unexpected status {}: {}",
                s,
                body.trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response on a local port and returns its URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/events", addr)
    }

    fn source_for(url: &str) -> HttpEventSource {
        let config = HttpSourceConfig::new(url)
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        HttpEventSource::new(config).unwrap()
    }

    mod config {
        use super::*;

        #[test]
        fn defaults() {
            let config = HttpSourceConfig::public().unwrap();
            assert_eq!(config.url.as_str(), DEFAULT_EVENTS_URL);
            assert_eq!(config.timeout, Duration::from_secs(15));
            assert!(config.user_agent.starts_with("eventboard/"));
        }

        #[test]
        fn builder_methods() {
            let config = HttpSourceConfig::new("https://example.com/events")
                .unwrap()
                .with_timeout(Duration::from_secs(3))
                .with_user_agent("test-agent");
            assert_eq!(config.timeout, Duration::from_secs(3));
            assert_eq!(config.user_agent, "test-agent");
        }

        #[test]
        fn invalid_url_returns_error() {
            assert!(HttpSourceConfig::new("not a url").is_err());
        }
    }

    mod status {
        use super::*;

        #[test]
        fn success_is_not_an_error() {
            assert!(status_error(StatusCode::OK, "[]").is_none());
        }

        #[test]
        fn maps_status_codes() {
            let cases = [
                (StatusCode::NOT_FOUND, FetchErrorCode::NotFound),
                (StatusCode::TOO_MANY_REQUESTS, FetchErrorCode::RateLimited),
                (StatusCode::BAD_GATEWAY, FetchErrorCode::ServerError),
                (StatusCode::SERVICE_UNAVAILABLE, FetchErrorCode::ServerError),
                (StatusCode::UNAUTHORIZED, FetchErrorCode::InvalidResponse),
                (StatusCode::MOVED_PERMANENTLY, FetchErrorCode::InvalidResponse),
            ];
            for (status, code) in cases {
                assert_eq!(status_error(status, "").unwrap().code(), code, "{status}");
            }
        }
    }

    mod fetch {
        use super::*;

        #[tokio::test]
        async fn fetches_event_array() {
            let url = serve_once(
                "200 OK",
                r#"[{"event_id":"E1","event_name":"Expo","date":"10/03/2030","Country":"USA"}]"#,
            )
            .await;
            let source = source_for(&url);
            assert_eq!(source.location(), url);

            let events = source.fetch_events().await.unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].country.as_deref(), Some("USA"));
        }

        #[tokio::test]
        async fn server_error_status() {
            let url = serve_once("503 Service Unavailable", "down").await;
            let err = source_for(&url).fetch_events().await.unwrap_err();
            assert_eq!(err.code(), FetchErrorCode::ServerError);
            assert_eq!(err.source_name(), Some("http"));
            assert!(err.is_retryable());
        }

        #[tokio::test]
        async fn non_array_body() {
            let url = serve_once("200 OK", r#"{"error":"nope"}"#).await;
            let err = source_for(&url).fetch_events().await.unwrap_err();
            assert_eq!(err.code(), FetchErrorCode::InvalidResponse);
        }

        #[tokio::test]
        async fn connection_refused_is_network_error() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let err = source_for(&format!("http://{}/events", addr))
                .fetch_events()
                .await
                .unwrap_err();
            assert_eq!(err.code(), FetchErrorCode::NetworkError);
        }
    }
}

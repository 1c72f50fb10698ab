//! Fetch session: the currently applied catalog and how it gets replaced.
//!
//! A session owns one [`EventSource`] and the last collection it produced.
//! Every fetch takes a ticket when it starts. When a fetch completes, its
//! normalized collection is applied only if its ticket is newer than the
//! catalog already in place, so a slow response can never overwrite a
//! fresher one. A failed fetch never discards the applied catalog.
//!
//! Readers take an `Arc<Catalog>` snapshot and filter it without holding
//! the lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use eventboard_core::{Event, FilterCriteria, FilterEngine, PageResult, today_local};
use eventboard_providers::{
    EventSource, FetchError, FetchResult, NormalizeError, RawEvent, normalize_events,
};

use crate::error::{ClientError, ClientResult};

/// A normalized collection produced by one successful fetch.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Canonical events in source order.
    pub events: Vec<Event>,
    /// Problems found while normalizing.
    pub diagnostics: Vec<NormalizeError>,
    /// Number of raw records received.
    pub received: usize,
    /// Ticket of the fetch that produced this catalog.
    pub generation: u64,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result replaced the catalog.
    Applied {
        /// Ticket of the applied fetch.
        generation: u64,
    },
    /// A newer fetch had already been applied; the result was discarded.
    Superseded {
        /// Ticket of the discarded fetch.
        ticket: u64,
        /// Ticket of the catalog that stays in place.
        current: u64,
    },
}

impl FetchOutcome {
    /// Returns true if the fetch replaced the catalog.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// The most recent failure that is newer than the applied catalog.
#[derive(Debug, Clone)]
pub struct FailedFetch {
    /// Ticket of the failed fetch.
    pub ticket: u64,
    /// The error, without its source chain.
    pub error: Arc<FetchError>,
}

#[derive(Debug, Default)]
struct SessionState {
    catalog: Option<Arc<Catalog>>,
    last_error: Option<FailedFetch>,
}

impl SessionState {
    fn applied_generation(&self) -> u64 {
        self.catalog.as_ref().map_or(0, |c| c.generation)
    }
}

/// One page of a session view, detached from the catalog lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPage {
    pub events: Vec<Event>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_matching: usize,
    pub total_pages: usize,
}

impl OwnedPage {
    fn from_result(result: &PageResult<'_>) -> Self {
        Self {
            events: result.page.iter().map(|e| (*e).clone()).collect(),
            page_number: result.page_number,
            page_size: result.page_size,
            total_matching: result.total_matching,
            total_pages: result.total_pages,
        }
    }

    /// Borrows this page as an engine result for formatting.
    pub fn as_page_result(&self) -> PageResult<'_> {
        PageResult {
            page: self.events.iter().collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_matching: self.total_matching,
            total_pages: self.total_pages,
        }
    }
}

/// Re-fetch policy after transient failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any delay.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given number of retries.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Builder: set backoff parameters.
    pub fn with_backoff(mut self, initial: Duration, max: Duration, multiplier: f64) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self.backoff_multiplier = multiplier;
        self
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let delay = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(delay.min(self.max_backoff.as_secs_f64()))
    }
}

/// Holds the applied catalog for one event source.
pub struct EventSession {
    source: Arc<dyn EventSource>,
    engine: FilterEngine,
    next_ticket: AtomicU64,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for EventSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSession")
            .field("source", &self.source.name())
            .field("engine", &self.engine)
            .field("next_ticket", &self.next_ticket)
            .finish_non_exhaustive()
    }
}

impl EventSession {
    /// Creates a session with the default page size.
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            source,
            engine: FilterEngine::default(),
            next_ticket: AtomicU64::new(0),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Sets the engine used by [`view`](Self::view).
    pub fn with_engine(mut self, engine: FilterEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Returns the source.
    pub fn source(&self) -> &dyn EventSource {
        self.source.as_ref()
    }

    /// Returns the engine.
    pub fn engine(&self) -> FilterEngine {
        self.engine
    }

    /// Starts a fetch and returns its ticket.
    pub fn begin_fetch(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies the result of the fetch that holds `ticket`.
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged. The applied catalog is kept.
    pub async fn complete(
        &self,
        ticket: u64,
        result: FetchResult<Vec<RawEvent>>,
    ) -> FetchResult<FetchOutcome> {
        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                self.record_failure(ticket, &err).await;
                return Err(err);
            }
        };

        let normalized = normalize_events(&raw);
        let catalog = Arc::new(Catalog {
            events: normalized.events,
            diagnostics: normalized.diagnostics,
            received: raw.len(),
            generation: ticket,
            fetched_at: Utc::now(),
        });

        let mut state = self.state.write().await;
        let current = state.applied_generation();
        if ticket <= current {
            debug!(ticket, current, "Discarding superseded fetch");
            return Ok(FetchOutcome::Superseded { ticket, current });
        }

        info!(
            generation = ticket,
            events = catalog.events.len(),
            diagnostics = catalog.diagnostics.len(),
            "Applied event catalog"
        );
        state.catalog = Some(catalog);
        if state
            .last_error
            .as_ref()
            .is_some_and(|failed| failed.ticket < ticket)
        {
            state.last_error = None;
        }
        Ok(FetchOutcome::Applied { generation: ticket })
    }

    async fn record_failure(&self, ticket: u64, err: &FetchError) {
        let mut state = self.state.write().await;
        let newest_failure = state.last_error.as_ref().map_or(0, |f| f.ticket);
        if ticket > state.applied_generation() && ticket > newest_failure {
            info!(ticket, error = %err, "Fetch failed");
            state.last_error = Some(FailedFetch {
                ticket,
                error: Arc::new(err.detached()),
            });
        } else {
            debug!(ticket, error = %err, "Ignoring failure of superseded fetch");
        }
    }

    /// Fetches from the source and applies the result.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the source produced no collection.
    pub async fn refresh(&self) -> FetchResult<FetchOutcome> {
        let ticket = self.begin_fetch();
        debug!(ticket, source = self.source.name(), "Starting fetch");
        let result = self.source.fetch_events().await;
        self.complete(ticket, result).await
    }

    /// Refreshes, retrying retryable failures according to `policy`.
    ///
    /// # Errors
    ///
    /// Returns the last fetch error once retries are exhausted or the
    /// error is not retryable.
    pub async fn refresh_with_retries(&self, policy: &RetryPolicy) -> FetchResult<FetchOutcome> {
        let mut retry = 0;
        loop {
            match self.refresh().await {
                Err(err) if err.is_retryable() && retry < policy.max_retries => {
                    retry += 1;
                    let delay = policy.backoff_delay(retry);
                    warn!(
                        retry,
                        max = policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying fetch"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Returns the applied catalog, if any fetch has succeeded.
    pub async fn snapshot(&self) -> Option<Arc<Catalog>> {
        self.state.read().await.catalog.clone()
    }

    /// Returns the newest failure not yet superseded by a successful fetch.
    pub async fn last_error(&self) -> Option<FailedFetch> {
        self.state.read().await.last_error.clone()
    }

    /// Applies criteria to the current catalog using today's date.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoEventsLoaded`] before the first successful
    /// fetch.
    pub async fn view(&self, criteria: &FilterCriteria) -> ClientResult<OwnedPage> {
        self.view_at(criteria, today_local()).await
    }

    /// Applies criteria to the current catalog with an explicit "today".
    pub async fn view_at(
        &self,
        criteria: &FilterCriteria,
        today: NaiveDate,
    ) -> ClientResult<OwnedPage> {
        let catalog = self.snapshot().await.ok_or(ClientError::NoEventsLoaded)?;
        let result = self.engine.apply_at(&catalog.events, criteria, today);
        Ok(OwnedPage::from_result(&result))
    }
}

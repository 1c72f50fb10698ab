//! EventSource trait, raw records, and normalization.
//!
//! This crate sits between the outside world and the canonical model:
//!
//! - [`EventSource`] - Where raw records come from (HTTP, file, memory)
//! - [`RawEvent`] - One record as the source sends it
//! - [`normalize_events`] - Pipeline from raw records to canonical events
//! - [`FetchError`] - Why a fetch produced no collection
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │  List endpoint  │    │   JSON file     │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │ HttpEventSource │    │ JsonFileSource  │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          │      EventSource     │
//!          └──────────┬───────────┘
//!                     │
//!                     ▼
//!              ┌─────────────┐
//!              │  RawEvent   │
//!              └──────┬──────┘
//!                     │
//!                     ▼ normalize_events()
//!              ┌──────────────────────────┐
//!              │ Event + NormalizeError   │
//!              └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use eventboard_providers::{EventSource, normalize_events};
//!
//! async fn load(source: &dyn EventSource) -> FetchResult<Normalized> {
//!     let raw = source.fetch_events().await?;
//!     Ok(normalize_events(&raw))
//! }
//! ```

pub mod error;
pub mod http;
pub mod normalize;
pub mod raw_event;
pub mod source;

pub use error::{FetchError, FetchErrorCode, FetchResult, USER_FETCH_MESSAGE};
pub use http::{DEFAULT_EVENTS_URL, HttpEventSource, HttpSourceConfig};
pub use normalize::{NormalizeError, Normalized, normalize_event, normalize_events};
pub use raw_event::{RawContact, RawEvent};
pub use source::{BoxFuture, ErrorSource, EventSource, JsonFileSource, StaticSource, parse_event_list};

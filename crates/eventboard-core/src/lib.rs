//! Core types: events, dates, filter criteria, paging engine, formatting

pub mod date;
pub mod engine;
pub mod event;
pub mod filter;
pub mod format;
pub mod tracing;

pub use date::{
    DateParseError, YearMonth, format_event_date, format_long_date, parse_event_date, today_local,
};
pub use engine::{
    DEFAULT_PAGE_SIZE, FilterEngine, PageResult, apply, apply_at, available_countries,
    total_pages,
};
pub use event::{Contact, Event, EventId, NOT_APPLICABLE, present};
pub use filter::{CountryFilter, FilterCriteria, TemporalMode, TemporalStatus};
pub use format::{
    FormatOptions, FormattedEvent, JsonEvent, JsonOutput, OutputFormat, OutputFormatter,
    ellipsis, make_hyperlink, summary_line,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};

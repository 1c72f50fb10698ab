//! Output formatting for event pages.
//!
//! This module provides formatters for displaying a [`PageResult`]:
//! - **TTY**: Human-readable event cards with a status badge and paging footer
//! - **JSON**: Machine-readable JSON output
//!
//! # Example
//!
//! ```rust
//! use eventboard_core::format::{FormatOptions, OutputFormatter};
//! use eventboard_core::{FilterCriteria, FilterEngine};
//!
//! let events = Vec::new();
//! let result = FilterEngine::default().apply(&events, &FilterCriteria::new());
//! let formatter = OutputFormatter::new(FormatOptions::default());
//! let text = formatter.format_tty(&result);
//! assert!(text.starts_with("No events found"));
//! ```

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{format_event_date, format_long_date, today_local};
use crate::engine::PageResult;
use crate::event::{Event, EventId};
use crate::filter::TemporalStatus;

/// Description length shown on a card.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 160;

/// Description length shown on a card in compact mode.
pub const DEFAULT_COMPACT_DESCRIPTION_LIMIT: usize = 60;

/// Text shown when no event matches.
pub const DEFAULT_NO_EVENTS_TEXT: &str = "No events found matching your criteria.";

/// The output format for page display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// Machine-readable JSON output.
    Json,
}

/// Configuration options for output formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Maximum description length in characters.
    pub description_limit: usize,
    /// Maximum description length in compact mode.
    pub compact_description_limit: usize,
    /// Use the compact description limit.
    pub compact: bool,
    /// Whether to render event names as OSC8 hyperlinks to their URL.
    pub hyperlinks: bool,
    /// Message shown for an empty page.
    pub no_events_text: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            compact_description_limit: DEFAULT_COMPACT_DESCRIPTION_LIMIT,
            compact: false,
            hyperlinks: false,
            no_events_text: DEFAULT_NO_EVENTS_TEXT.to_string(),
        }
    }
}

impl FormatOptions {
    /// Returns the description limit in effect.
    pub fn effective_description_limit(&self) -> usize {
        if self.compact {
            self.compact_description_limit
        } else {
            self.description_limit
        }
    }
}

/// JSON output format for machine consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Events on the requested page.
    pub events: Vec<JsonEvent>,
    /// The requested page number.
    pub page: usize,
    /// Events per page.
    pub page_size: usize,
    /// Events matching the criteria across all pages.
    pub total_matching: usize,
    /// Number of pages.
    pub total_pages: usize,
}

/// A single event in JSON format.
///
/// Sentinel values are already resolved: absent fields are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEvent {
    /// Event identity.
    pub id: EventId,
    /// Display title.
    pub name: String,
    /// Date in `DD/MM/YYYY` form.
    pub date: String,
    /// Upcoming or past relative to today.
    pub status: TemporalStatus,
    /// Full description.
    pub description: String,
    /// Location.
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsorship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A formatted event card with metadata.
#[derive(Debug, Clone)]
pub struct FormattedEvent {
    /// The card text, one line per field.
    pub text: String,
    /// The status badge shown on the card.
    pub status: TemporalStatus,
    /// The identity of the underlying event.
    pub id: EventId,
}

/// Output formatter for event pages.
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    /// Creates a new OutputFormatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Creates a new OutputFormatter with default options.
    pub fn with_defaults() -> Self {
        Self::new(FormatOptions::default())
    }

    /// Returns the formatting options.
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Formats a page for TTY output.
    pub fn format_tty(&self, result: &PageResult<'_>) -> String {
        self.format_tty_at(result, today_local())
    }

    /// Formats a page for TTY output with a fixed "today".
    ///
    /// Cards are separated by a blank line and followed by a footer with
    /// the shown range and, when there is more than one page, a page hint.
    pub fn format_tty_at(&self, result: &PageResult<'_>, today: NaiveDate) -> String {
        if result.is_empty() {
            return self.format_empty(result);
        }

        let cards: Vec<String> = result
            .page
            .iter()
            .map(|event| self.format_card(event, today).text)
            .collect();

        let mut out = cards.join("\n\n");
        out.push_str("\n\n");
        out.push_str(&summary_line(result));
        if result.has_navigation() {
            out.push('\n');
            out.push_str(&format!(
                "Page {} of {}",
                result.page_number, result.total_pages
            ));
        }
        out
    }

    /// Formats the message for an empty page.
    fn format_empty(&self, result: &PageResult<'_>) -> String {
        if result.total_matching > 0 && result.is_out_of_range() {
            let pages = if result.total_pages == 1 {
                "1 page".to_string()
            } else {
                format!("{} pages", result.total_pages)
            };
            return format!(
                "Page {} is out of range ({} matching events, {}).",
                result.page_number, result.total_matching, pages
            );
        }
        self.options.no_events_text.clone()
    }

    /// Formats a single event card.
    pub fn format_card(&self, event: &Event, today: NaiveDate) -> FormattedEvent {
        let status = TemporalStatus::of(event.date, today);
        let mut lines = Vec::new();

        lines.push(format!("{} [{}]", self.format_name(event), status.label()));

        let mut header = vec![format_long_date(event.date)];
        if !event.location.trim().is_empty() {
            header.push(event.location.clone());
        }
        if let Some(country) = event.country.as_deref().filter(|c| !c.trim().is_empty()) {
            header.push(country.to_string());
        }
        lines.push(format!("  {}", header.join(" | ")));

        if !event.description.trim().is_empty() {
            let limit = self.options.effective_description_limit();
            lines.push(format!("  {}", ellipsis(event.description.trim(), limit)));
        }
        if let Some(organizer) = event.organizer() {
            lines.push(format!("  Organizer: {}", organizer));
        }
        if let Some(sponsorship) = event.sponsorship() {
            lines.push(format!("  Sponsorship: {}", sponsorship));
        }
        let contact: Vec<&str> = [event.email(), event.phone()]
            .into_iter()
            .flatten()
            .collect();
        if !contact.is_empty() {
            lines.push(format!("  Contact: {}", contact.join(" | ")));
        }
        if let Some(url) = event.url() {
            lines.push(format!("  Link: {}", url));
        }

        FormattedEvent {
            text: lines.join("\n"),
            status,
            id: event.id.clone(),
        }
    }

    /// Formats the event name, optionally with hyperlink.
    fn format_name(&self, event: &Event) -> String {
        match event.url() {
            Some(url) if self.options.hyperlinks => make_hyperlink(url, &event.name),
            _ => event.name.clone(),
        }
    }

    /// Formats a page as JSON output.
    pub fn format_json(&self, result: &PageResult<'_>) -> JsonOutput {
        self.format_json_at(result, today_local())
    }

    /// Formats a page as JSON output with a fixed "today".
    pub fn format_json_at(&self, result: &PageResult<'_>, today: NaiveDate) -> JsonOutput {
        JsonOutput {
            events: result
                .page
                .iter()
                .map(|event| to_json_event(event, today))
                .collect(),
            page: result.page_number,
            page_size: result.page_size,
            total_matching: result.total_matching,
            total_pages: result.total_pages,
        }
    }
}

/// Converts an Event to JsonEvent.
fn to_json_event(event: &Event, today: NaiveDate) -> JsonEvent {
    JsonEvent {
        id: event.id.clone(),
        name: event.name.clone(),
        date: format_event_date(event.date),
        status: TemporalStatus::of(event.date, today),
        description: event.description.clone(),
        location: event.location.clone(),
        country: event.country.clone(),
        organizer: event.organizer().map(str::to_string),
        sponsorship: event.sponsorship().map(str::to_string),
        email: event.email().map(str::to_string),
        phone: event.phone().map(str::to_string),
        url: event.url().map(str::to_string),
    }
}

/// Returns the "Showing a-b of n events" line for a non-empty page.
pub fn summary_line(result: &PageResult<'_>) -> String {
    match result.display_range() {
        Some((first, last)) => format!(
            "Showing {}-{} of {} event{}",
            first,
            last,
            result.total_matching,
            if result.total_matching == 1 { "" } else { "s" }
        ),
        None => format!("Showing 0 of {} events", result.total_matching),
    }
}

/// Truncates a string to `max_len` characters, appending an ellipsis.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }
    let truncated: String = s.chars().take(max_len).collect();
    Cow::Owned(format!("{}…", truncated.trim_end()))
}

/// Creates an OSC8 hyperlink for terminal output.
pub fn make_hyperlink(url: &str, label: &str) -> String {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, label)
}

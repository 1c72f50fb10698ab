//! Filter criteria and the predicates they activate.
//!
//! [`FilterCriteria`] is owned by the caller and passed to the engine on
//! every call. Each criterion maps to one predicate; a predicate is active
//! only when its criterion is set to something other than its neutral value.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::YearMonth;
use crate::event::Event;

/// Coarse classification of events relative to today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalMode {
    /// Every event, regardless of date.
    All,
    /// Events on or after today.
    #[default]
    Upcoming,
    /// Events strictly before today.
    Past,
}

impl TemporalMode {
    /// Returns true if an event on `date` passes this mode given `today`.
    pub fn admits(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => date >= today,
            Self::Past => date < today,
        }
    }

    /// Returns the lowercase name used in config files and flags.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Upcoming => "upcoming",
            Self::Past => "past",
        }
    }
}

impl fmt::Display for TemporalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemporalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "upcoming" => Ok(Self::Upcoming),
            "past" => Ok(Self::Past),
            other => Err(format!(
                "unknown temporal mode {other:?} (expected all, upcoming or past)"
            )),
        }
    }
}

/// Badge for a single event: whether it is still ahead or already over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalStatus {
    /// On or after today.
    Upcoming,
    /// Before today.
    Past,
}

impl TemporalStatus {
    /// Classifies `date` relative to `today`, consistent with [`TemporalMode`].
    pub fn of(date: NaiveDate, today: NaiveDate) -> Self {
        if TemporalMode::Upcoming.admits(date, today) {
            Self::Upcoming
        } else {
            Self::Past
        }
    }

    /// Returns the display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Past => "Past",
        }
    }
}

/// Country selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryFilter {
    /// No country restriction.
    #[default]
    All,
    /// Only events tagged with this country (case-insensitive).
    Only(String),
}

impl CountryFilter {
    /// Builds a filter from user input; blank input or `All` means no filter.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    /// Returns true if the predicate is active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Only(_))
    }

    /// Returns true if an event with the given country tag passes.
    ///
    /// Surrounding whitespace is ignored on both sides, the same way
    /// [`available_countries`](crate::engine::available_countries) lists tags.
    pub fn admits(&self, country: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => country.is_some_and(|c| {
                c.trim().to_lowercase() == selected.trim().to_lowercase()
            }),
        }
    }
}

/// The caller-owned set of active filter, search and paging parameters.
///
/// The setters for filtering criteria reset `page` to 1, so a caller that
/// mutates criteria through them never asks the engine for a page that may
/// no longer exist. Writing fields directly bypasses that reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring query; empty means no search.
    pub search_term: String,
    /// Upcoming/past/all classification.
    pub temporal_mode: TemporalMode,
    /// Country selection.
    pub country: CountryFilter,
    /// Exact calendar date, combined with the temporal mode.
    pub exact_date: Option<NaiveDate>,
    /// Calendar month.
    pub month: Option<YearMonth>,
    /// 1-based page index.
    pub page: usize,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            temporal_mode: TemporalMode::default(),
            country: CountryFilter::default(),
            exact_date: None,
            month: None,
            page: 1,
        }
    }
}

impl FilterCriteria {
    /// Creates criteria with default values (upcoming events, page 1).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the search term if the search predicate is active.
    pub fn active_search(&self) -> Option<&str> {
        let term = self.search_term.as_str();
        (!term.trim().is_empty()).then_some(term)
    }

    /// Returns true if an event passes every active predicate.
    pub fn matches(&self, event: &Event, today: NaiveDate) -> bool {
        self.matches_search(event)
            && self.country.admits(event.country.as_deref())
            && self.temporal_mode.admits(event.date, today)
            && self.exact_date.is_none_or(|d| event.date == d)
            && self.month.is_none_or(|m| m.contains(event.date))
    }

    fn matches_search(&self, event: &Event) -> bool {
        let Some(term) = self.active_search() else {
            return true;
        };
        let needle = term.to_lowercase();
        event
            .searchable_fields()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Sets the search term and resets to the first page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    /// Sets the temporal mode and resets to the first page.
    pub fn set_temporal_mode(&mut self, mode: TemporalMode) {
        self.temporal_mode = mode;
        self.page = 1;
    }

    /// Sets the country selection and resets to the first page.
    pub fn set_country(&mut self, country: CountryFilter) {
        self.country = country;
        self.page = 1;
    }

    /// Sets or clears the exact date and resets to the first page.
    pub fn set_exact_date(&mut self, date: Option<NaiveDate>) {
        self.exact_date = date;
        self.page = 1;
    }

    /// Sets or clears the month and resets to the first page.
    pub fn set_month(&mut self, month: Option<YearMonth>) {
        self.month = month;
        self.page = 1;
    }

    /// Moves to another page without touching the other criteria.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Builder: set the search term.
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.set_search_term(term);
        self
    }

    /// Builder: set the temporal mode.
    pub fn with_temporal_mode(mut self, mode: TemporalMode) -> Self {
        self.set_temporal_mode(mode);
        self
    }

    /// Builder: set the country selection.
    pub fn with_country(mut self, country: CountryFilter) -> Self {
        self.set_country(country);
        self
    }

    /// Builder: set the exact date.
    pub fn with_exact_date(mut self, date: NaiveDate) -> Self {
        self.set_exact_date(Some(date));
        self
    }

    /// Builder: set the month.
    pub fn with_month(mut self, month: YearMonth) -> Self {
        self.set_month(Some(month));
        self
    }

    /// Builder: set the page.
    pub fn with_page(mut self, page: usize) -> Self {
        self.set_page(page);
        self
    }
}

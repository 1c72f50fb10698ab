//! Filter, search and paginate engine.
//!
//! The engine derives the visible page from a canonical event collection and
//! a [`FilterCriteria`]. It is a pure function of its inputs: it performs no
//! I/O, never mutates the collection, never re-sorts it, and keeps no state
//! between calls.
//!
//! # Caller contract
//!
//! The engine does not clamp `criteria.page`. A page past the last one
//! yields an empty `page` with correct totals. Callers must reset the page
//! to 1 whenever any other criterion changes (the [`FilterCriteria`] setters
//! do this), otherwise an out-of-range empty page would be shown.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::trace;

use crate::date::today_local;
use crate::event::Event;
use crate::filter::FilterCriteria;

/// Number of events per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// One page of filtered events with the derived counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult<'a> {
    /// The events on the requested page, in canonical order.
    pub page: Vec<&'a Event>,
    /// The requested 1-based page number, as given by the caller.
    pub page_number: usize,
    /// Maximum number of events per page.
    pub page_size: usize,
    /// Number of events passing every active predicate.
    pub total_matching: usize,
    /// `ceil(total_matching / page_size)`, never less than 1.
    pub total_pages: usize,
}

impl PageResult<'_> {
    /// Returns true if no event is shown.
    pub fn is_empty(&self) -> bool {
        self.page.is_empty()
    }

    /// Returns true if page navigation should be offered.
    pub fn has_navigation(&self) -> bool {
        self.total_pages > 1
    }

    /// Returns true if the requested page lies outside `1..=total_pages`.
    pub fn is_out_of_range(&self) -> bool {
        self.page_number == 0 || self.page_number > self.total_pages
    }

    /// Returns the 1-based inclusive positions of the shown events among all
    /// matches, e.g. `(10, 18)` for page 2 of 20 with nine per page.
    pub fn display_range(&self) -> Option<(usize, usize)> {
        if self.page.is_empty() {
            return None;
        }
        let first = (self.page_number - 1) * self.page_size + 1;
        Some((first, first + self.page.len() - 1))
    }
}

/// Computes `max(1, ceil(total / page_size))`.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// The engine, parameterised by page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterEngine {
    page_size: usize,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FilterEngine {
    /// Creates an engine with the given page size (0 is treated as 1).
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    /// Returns the page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Applies the criteria using the process-local calendar day as "today".
    pub fn apply<'a>(&self, events: &'a [Event], criteria: &FilterCriteria) -> PageResult<'a> {
        self.apply_at(events, criteria, today_local())
    }

    /// Applies the criteria with an explicit "today".
    pub fn apply_at<'a>(
        &self,
        events: &'a [Event],
        criteria: &FilterCriteria,
        today: NaiveDate,
    ) -> PageResult<'a> {
        let matching: Vec<&Event> = events
            .iter()
            .filter(|event| criteria.matches(event, today))
            .collect();

        let total_matching = matching.len();
        let total_pages = total_pages(total_matching, self.page_size);

        let page = match criteria.page.checked_sub(1) {
            Some(index) => matching
                .into_iter()
                .skip(index.saturating_mul(self.page_size))
                .take(self.page_size)
                .collect(),
            None => Vec::new(),
        };

        trace!(
            total = events.len(),
            total_matching,
            total_pages,
            page = criteria.page,
            shown = page.len(),
            "Applied filter criteria"
        );

        PageResult {
            page,
            page_number: criteria.page,
            page_size: self.page_size,
            total_matching,
            total_pages,
        }
    }

    /// Counts matching events without materialising a page.
    pub fn count_at(&self, events: &[Event], criteria: &FilterCriteria, today: NaiveDate) -> usize {
        events
            .iter()
            .filter(|event| criteria.matches(event, today))
            .count()
    }
}

/// Applies the criteria with the default page size and local "today".
///
/// See the module docs for the page reset contract.
pub fn apply<'a>(events: &'a [Event], criteria: &FilterCriteria) -> PageResult<'a> {
    FilterEngine::default().apply(events, criteria)
}

/// Applies the criteria with the default page size and an explicit "today".
pub fn apply_at<'a>(
    events: &'a [Event],
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> PageResult<'a> {
    FilterEngine::default().apply_at(events, criteria, today)
}

/// Returns the distinct country tags in a collection.
///
/// Values are deduplicated case-insensitively, keeping the first spelling
/// seen, and sorted case-insensitively. Blank tags are skipped.
pub fn available_countries(events: &[Event]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut countries: Vec<String> = Vec::new();
    for country in events.iter().filter_map(|e| e.country.as_deref()) {
        let country = country.trim();
        if !country.is_empty() && seen.insert(country.to_lowercase()) {
            countries.push(country.to_string());
        }
    }
    countries.sort_by_key(|c| c.to_lowercase());
    countries
}

//! RawEvent to Event conversion pipeline.
//!
//! Normalization turns the source's raw records into canonical [`Event`]s:
//! 0. Excludes elements that could not be read as records at all
//! 1. Parses the `DD/MM/YYYY` date; records with a malformed or missing date
//!    are excluded and reported
//! 2. Assigns identities: the source identifier when present and unique,
//!    otherwise the record's 1-based position
//! 3. Copies optional fields verbatim, including `N/A` sentinels
//!
//! Per-record problems never abort the run. They are collected as
//! [`NormalizeError`] diagnostics next to the events that did normalize.

use std::collections::HashSet;

use eventboard_core::{Contact, Event, EventId, parse_event_date};
use thiserror::Error;
use tracing::{debug, warn};

use crate::raw_event::RawEvent;

/// A per-record normalization problem. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The date is missing, not `DD/MM/YYYY`, or not a real calendar date.
    /// The record is excluded.
    #[error("record {position}: malformed date {raw:?}")]
    MalformedDate { position: usize, raw: String },

    /// The array element is not a readable record. It is excluded.
    #[error("record {position}: malformed record ({reason})")]
    MalformedRecord { position: usize, reason: String },

    /// The source identifier was already used by an earlier record. The
    /// record keeps its positional identifier instead.
    #[error("record {position}: duplicate identifier {id:?}, using positional id")]
    DuplicateIdentifier { position: usize, id: String },
}

impl NormalizeError {
    /// Returns true if the record was left out of the collection.
    pub fn is_exclusion(&self) -> bool {
        !matches!(self, Self::DuplicateIdentifier { .. })
    }

    /// Returns the 1-based position of the offending record.
    pub fn position(&self) -> usize {
        match self {
            Self::MalformedDate { position, .. }
            | Self::MalformedRecord { position, .. }
            | Self::DuplicateIdentifier { position, .. } => *position,
        }
    }
}

/// The outcome of normalizing a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Canonical events in source order.
    pub events: Vec<Event>,
    /// Problems found along the way, in source order.
    pub diagnostics: Vec<NormalizeError>,
}

impl Normalized {
    /// Returns true if no diagnostics were produced.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of records excluded, for their date or because they could
    /// not be read.
    pub fn excluded_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_exclusion()).count()
    }

    /// Number of records that fell back to a positional identifier because
    /// their source identifier was taken.
    pub fn duplicate_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, NormalizeError::DuplicateIdentifier { .. }))
            .count()
    }
}

/// Converts a single raw record, given its 1-based position.
///
/// The identity is taken from the source when it supplies a non-blank one,
/// otherwise it is positional. Uniqueness across a collection is handled by
/// [`normalize_events`].
pub fn normalize_event(position: usize, raw: &RawEvent) -> Result<Event, NormalizeError> {
    if let Some(reason) = raw.rejection() {
        warn!(position, reason = %reason, "Excluding unreadable record");
        return Err(NormalizeError::MalformedRecord {
            position,
            reason: reason.to_string(),
        });
    }

    let raw_date = raw.date.as_deref().unwrap_or_default();
    let date = parse_event_date(raw_date).map_err(|err| {
        warn!(position, raw = %raw_date, reason = %err, "Excluding event with malformed date");
        NormalizeError::MalformedDate {
            position,
            raw: raw_date.to_string(),
        }
    })?;

    let id = match raw.source_id() {
        Some(id) => EventId::Source(id.to_string()),
        None => EventId::Position(position),
    };

    let mut event = Event::new(id, raw.event_name.clone().unwrap_or_default(), date)
        .with_description(raw.description.clone().unwrap_or_default())
        .with_location(raw.location.clone().unwrap_or_default());

    event.country = raw.country.clone();
    event.organizer = raw.organizer.clone();
    event.raw_sponsorship = raw.sponsorship.clone();
    event.url = raw.url.clone();
    event.contact = raw
        .contact
        .as_ref()
        .map(|c| Contact::new(c.email.clone(), c.phone.clone()));

    Ok(event)
}

/// Converts a collection of raw records.
///
/// Records are processed in order. A record with a malformed date is
/// excluded. A record whose source identifier was already claimed by an
/// earlier included record falls back to `EventId::Position`. Since the two
/// identifier kinds never compare equal, the result has unique identifiers.
pub fn normalize_events(raw: &[RawEvent]) -> Normalized {
    let mut normalized = Normalized {
        events: Vec::with_capacity(raw.len()),
        diagnostics: Vec::new(),
    };
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, record) in raw.iter().enumerate() {
        let position = index + 1;
        let mut event = match normalize_event(position, record) {
            Ok(event) => event,
            Err(err) => {
                normalized.diagnostics.push(err);
                continue;
            }
        };

        if let EventId::Source(ref id) = event.id {
            if !seen_ids.insert(id.clone()) {
                warn!(position, id = %id, "Duplicate event identifier, using positional id");
                normalized.diagnostics.push(NormalizeError::DuplicateIdentifier {
                    position,
                    id: id.clone(),
                });
                event.id = EventId::Position(position);
            }
        }

        normalized.events.push(event);
    }

    debug!(
        received = raw.len(),
        normalized = normalized.events.len(),
        excluded = normalized.excluded_count(),
        duplicates = normalized.duplicate_count(),
        "Normalized event records"
    );

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw(name: &str, date: &str) -> RawEvent {
        RawEvent::new().with_name(name).with_date(date)
    }

    mod single {
        use super::*;

        #[test]
        fn copies_fields_verbatim() {
            let record = raw("RustConf", "10/03/2030")
                .with_id("EVT123ABC")
                .with_description("Annual Rust conference")
                .with_location("Portland, OR")
                .with_country("USA")
                .with_sponsorship("N/A")
                .with_contact(Some("hi@rustconf.com"), Some("N/A"));

            let event = normalize_event(1, &record).unwrap();
            assert_eq!(event.id, EventId::Source("EVT123ABC".into()));
            assert_eq!(event.name, "RustConf");
            assert_eq!(event.date, date(2030, 3, 10));
            assert_eq!(event.country.as_deref(), Some("USA"));
            assert_eq!(event.raw_sponsorship.as_deref(), Some("N/A"));
            assert_eq!(event.sponsorship(), None);
            assert_eq!(event.email(), Some("hi@rustconf.com"));
            assert_eq!(event.phone(), None);
        }

        #[test]
        fn missing_text_fields_become_empty() {
            let event = normalize_event(3, &RawEvent::new().with_date("01/01/2030")).unwrap();
            assert_eq!(event.id, EventId::Position(3));
            assert_eq!(event.name, "");
            assert_eq!(event.description, "");
            assert_eq!(event.location, "");
            assert!(event.contact.is_none());
        }

        #[test]
        fn missing_date_is_malformed() {
            let err = normalize_event(2, &RawEvent::new().with_name("No date")).unwrap_err();
            assert_eq!(
                err,
                NormalizeError::MalformedDate {
                    position: 2,
                    raw: String::new(),
                }
            );
        }

        #[test]
        fn blank_id_is_positional() {
            let record = raw("Expo", "01/01/2030").with_id("   ");
            let event = normalize_event(5, &record).unwrap();
            assert_eq!(event.id, EventId::Position(5));
        }
    }

    mod collection {
        use super::*;

        #[test]
        fn malformed_date_is_excluded_and_reported() {
            let records = vec![
                raw("First", "10/03/2030"),
                raw("Broken", "31/02/2030"),
                raw("Third", "01/01/2020"),
            ];
            let normalized = normalize_events(&records);

            assert_eq!(normalized.events.len(), 2);
            assert_eq!(normalized.events[0].name, "First");
            assert_eq!(normalized.events[1].name, "Third");
            assert_eq!(
                normalized.diagnostics,
                vec![NormalizeError::MalformedDate {
                    position: 2,
                    raw: "31/02/2030".into(),
                }]
            );
            assert_eq!(normalized.excluded_count(), 1);
            assert!(!normalized.is_clean());
        }

        #[test]
        fn positional_ids_follow_input_position() {
            let records = vec![
                raw("A", "01/01/2030"),
                raw("B", "bad"),
                raw("C", "02/01/2030"),
            ];
            let normalized = normalize_events(&records);
            let ids: Vec<_> = normalized.events.iter().map(|e| e.id.clone()).collect();
            assert_eq!(ids, vec![EventId::Position(1), EventId::Position(3)]);
        }

        #[test]
        fn duplicate_ids_fall_back_to_position() {
            let records = vec![
                raw("A", "01/01/2030").with_id("E1"),
                raw("B", "02/01/2030").with_id("E1"),
                raw("C", "03/01/2030").with_id("E2"),
                raw("D", "04/01/2030"),
            ];
            let normalized = normalize_events(&records);

            let ids: Vec<_> = normalized.events.iter().map(|e| e.id.clone()).collect();
            assert_eq!(
                ids,
                vec![
                    EventId::Source("E1".into()),
                    EventId::Position(2),
                    EventId::Source("E2".into()),
                    EventId::Position(4),
                ]
            );
            assert_eq!(
                normalized.diagnostics,
                vec![NormalizeError::DuplicateIdentifier {
                    position: 2,
                    id: "E1".into(),
                }]
            );
            assert_eq!(normalized.duplicate_count(), 1);

            let unique: HashSet<_> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len());
        }

        #[test]
        fn excluded_record_does_not_claim_its_id() {
            let records = vec![
                raw("Broken", "99/99/2030").with_id("E1"),
                raw("Good", "01/01/2030").with_id("E1"),
            ];
            let normalized = normalize_events(&records);
            assert_eq!(normalized.events.len(), 1);
            assert_eq!(normalized.events[0].id, EventId::Source("E1".into()));
            assert_eq!(normalized.duplicate_count(), 0);
        }

        #[test]
        fn bad_elements_do_not_sink_the_list() {
            let body = r#"[
                {"event_id": "A", "date": "10/03/2030"},
                {"event_id": "B", "date": {"day": 10, "month": 3}},
                {"event_id": "C", "date": "11/03/2030", "contact": "N/A"},
                {"event_id": "D", "id": "X", "date": "12/03/2030"},
                null,
                {"event_id": "F", "date": ["13", "03", "2030"]}
            ]"#;
            let records = crate::source::parse_event_list(body).unwrap();
            let normalized = normalize_events(&records);

            let ids: Vec<_> = normalized.events.iter().map(|e| e.id.clone()).collect();
            assert_eq!(
                ids,
                vec![
                    EventId::Source("A".into()),
                    EventId::Source("C".into()),
                    EventId::Source("D".into()),
                ]
            );
            assert!(normalized.events[1].contact.is_none());
            assert_eq!(
                normalized.diagnostics,
                vec![
                    NormalizeError::MalformedDate {
                        position: 2,
                        raw: r#"{"day":10,"month":3}"#.into(),
                    },
                    NormalizeError::MalformedRecord {
                        position: 5,
                        reason: "expected an object, got null".into(),
                    },
                    NormalizeError::MalformedDate {
                        position: 6,
                        raw: r#"["13","03","2030"]"#.into(),
                    },
                ]
            );
            assert_eq!(normalized.excluded_count(), 3);
            assert_eq!(normalized.duplicate_count(), 0);
        }

        #[test]
        fn rejected_record_keeps_position_and_frees_id() {
            let records = vec![
                RawEvent::rejected("expected an object, got string"),
                raw("B", "01/01/2030"),
            ];
            let normalized = normalize_events(&records);
            assert_eq!(normalized.events.len(), 1);
            assert_eq!(normalized.events[0].id, EventId::Position(2));
            assert_eq!(normalized.diagnostics[0].position(), 1);
            assert_eq!(
                normalized.diagnostics[0].to_string(),
                "record 1: malformed record (expected an object, got string)"
            );
        }

        #[test]
        fn empty_input() {
            let normalized = normalize_events(&[]);
            assert!(normalized.events.is_empty());
            assert!(normalized.is_clean());
        }

        #[test]
        fn diagnostic_messages() {
            let err = NormalizeError::MalformedDate {
                position: 4,
                raw: "31/02/2030".into(),
            };
            assert_eq!(err.to_string(), "record 4: malformed date \"31/02/2030\"");
            assert_eq!(err.position(), 4);
        }
    }
}

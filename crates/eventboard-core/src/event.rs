//! Canonical event types.
//!
//! This module provides the types every other part of the system works with
//! once raw records have been normalized:
//! - [`Event`]: a validated event with a stable identity and a parsed date
//! - [`EventId`]: the identity, either supplied by the source or positional
//! - [`Contact`]: optional contact details
//!
//! Optional text fields may hold the literal sentinel `N/A`. The fields keep
//! the value exactly as received; the accessor methods are the boundary that
//! turns sentinels into absence.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The sentinel string sources use for "not applicable".
pub const NOT_APPLICABLE: &str = "N/A";

/// Returns the value if it carries content.
///
/// `None`, blank strings, and the [`NOT_APPLICABLE`] sentinel (compared
/// case-insensitively, ignoring surrounding whitespace) are all absent.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| {
        let trimmed = v.trim();
        !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(NOT_APPLICABLE)
    })
}

/// Identity of an event within one fetched collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventId {
    /// Identifier supplied by the source.
    Source(String),
    /// 1-based position in the fetched sequence, used when the source
    /// supplies no usable identifier.
    Position(usize),
}

impl EventId {
    /// Returns true if the identifier was assigned from the fetch position.
    pub fn is_positional(&self) -> bool {
        matches!(self, Self::Position(_))
    }

    /// Returns a text key that is unique within a collection.
    ///
    /// The two kinds get distinct prefixes, so `Source("2")` and
    /// `Position(2)` never share a key. Use this, not `Display`, wherever
    /// the id is rendered as a lookup key.
    pub fn key(&self) -> String {
        match self {
            Self::Source(id) => format!("source:{}", id),
            Self::Position(pos) => format!("position:{}", pos),
        }
    }
}

/// Human-readable form: the source id verbatim, or `#n` for a position.
///
/// A source id may itself look like `#n`, so this form is not guaranteed
/// unique; see [`EventId::key`].
impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(id) => f.write_str(id),
            Self::Position(pos) => write!(f, "#{}", pos),
        }
    }
}

/// Contact details for an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Raw email value, possibly the `N/A` sentinel.
    pub raw_email: Option<String>,
    /// Raw phone value, possibly the `N/A` sentinel.
    pub raw_phone: Option<String>,
}

impl Contact {
    /// Creates contact details from raw values.
    pub fn new(email: Option<String>, phone: Option<String>) -> Self {
        Self {
            raw_email: email,
            raw_phone: phone,
        }
    }

    /// Returns the email address, if one is actually present.
    pub fn email(&self) -> Option<&str> {
        present(self.raw_email.as_deref())
    }

    /// Returns the phone number, if one is actually present.
    pub fn phone(&self) -> Option<&str> {
        present(self.raw_phone.as_deref())
    }

    /// Returns true if at least one contact channel is present.
    pub fn has_any(&self) -> bool {
        self.email().is_some() || self.phone().is_some()
    }
}

/// A normalized event.
///
/// Produced by the normalizer from a raw record; every instance has an
/// identity and a successfully parsed calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identity, unique within one fetched collection.
    pub id: EventId,
    /// Display title.
    pub name: String,
    /// Free-text description, may be empty.
    pub description: String,
    /// Free-text location.
    pub location: String,
    /// Country tag; `None` means uncategorized.
    pub country: Option<String>,
    /// The calendar date the event takes place on.
    pub date: NaiveDate,
    /// Organizer, if known.
    pub organizer: Option<String>,
    /// Raw sponsorship value, possibly the `N/A` sentinel.
    pub raw_sponsorship: Option<String>,
    /// Contact details, if supplied.
    pub contact: Option<Contact>,
    /// External link, not validated.
    pub url: Option<String>,
}

impl Event {
    /// Creates a new event with the required fields.
    pub fn new(id: EventId, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            location: String::new(),
            country: None,
            date,
            organizer: None,
            raw_sponsorship: None,
            contact: None,
            url: None,
        }
    }

    /// Returns the sponsorship text, if actually present.
    pub fn sponsorship(&self) -> Option<&str> {
        present(self.raw_sponsorship.as_deref())
    }

    /// Returns the contact email, if actually present.
    pub fn email(&self) -> Option<&str> {
        self.contact.as_ref().and_then(Contact::email)
    }

    /// Returns the contact phone, if actually present.
    pub fn phone(&self) -> Option<&str> {
        self.contact.as_ref().and_then(Contact::phone)
    }

    /// Returns the organizer, ignoring blank values.
    pub fn organizer(&self) -> Option<&str> {
        self.organizer.as_deref().filter(|o| !o.trim().is_empty())
    }

    /// Returns the external link, ignoring blank values.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Returns the fields free-text search looks at.
    ///
    /// Optional fields are only included when present.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.name.as_str()),
            Some(self.description.as_str()),
            Some(self.location.as_str()),
            self.country.as_deref(),
            self.organizer.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Builder method to set the organizer.
    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = Some(organizer.into());
        self
    }

    /// Builder method to set the raw sponsorship value.
    pub fn with_sponsorship(mut self, sponsorship: impl Into<String>) -> Self {
        self.raw_sponsorship = Some(sponsorship.into());
        self
    }

    /// Builder method to set contact details.
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Builder method to set the external link.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

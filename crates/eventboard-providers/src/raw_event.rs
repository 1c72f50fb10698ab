//! Raw event records as returned by the list endpoint.
//!
//! [`RawEvent`] mirrors one element of the endpoint's JSON array before any
//! validation. Every field is optional and loosely typed: strings, numbers
//! and booleans are accepted and kept as strings, `null` means absent, and
//! arrays or objects are kept as their JSON text. A `contact` that is not an
//! object is absent. Fields the record type does not know about are kept in
//! [`RawEvent::extra`].
//!
//! Each array element is read on its own. An element that cannot be read as
//! a record (e.g. `null`) becomes a rejected placeholder at its position, so
//! one bad element never costs the rest of the list.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contact details as sent by the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContact {
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A raw event record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Source identifier.
    #[serde(
        default,
        alias = "id",
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_id: Option<String>,

    /// Display title.
    #[serde(
        default,
        alias = "name",
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_name: Option<String>,

    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Date in `DD/MM/YYYY` form, unparsed.
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Country tag. The source capitalizes this key.
    #[serde(
        default,
        rename = "Country",
        alias = "country",
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub sponsorship: Option<String>,

    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,

    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Contact details; absent unless the source sends an object.
    #[serde(default, deserialize_with = "loose_contact", skip_serializing_if = "Option::is_none")]
    pub contact: Option<RawContact>,

    /// Fields not recognized above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,

    /// Why the element could not be read as a record, if it could not.
    #[serde(skip)]
    rejection: Option<String>,
}

/// Key pairs where the source may send either spelling. The first is the
/// field name; when both are present it wins and the second goes to `extra`.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("event_id", "id"),
    ("event_name", "name"),
    ("Country", "country"),
];

impl RawEvent {
    /// Creates an empty raw event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a placeholder for an element that is not a readable record.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Returns why this element could not be read, if it could not.
    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    /// Parses the list endpoint's body: a JSON array of records.
    ///
    /// Only a body that is not a JSON array is an error. Elements are read
    /// one by one with [`RawEvent::from_value`].
    pub fn list_from_json(body: &str) -> serde_json::Result<Vec<Self>> {
        let values: Vec<Value> = serde_json::from_str(body)?;
        Ok(values.into_iter().map(Self::from_value).collect())
    }

    /// Reads one array element. Never fails: an unreadable element becomes
    /// a [`rejected`](Self::rejected) placeholder.
    pub fn from_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Self::rejected(format!("expected an object, got {}", value_kind(&other)));
            }
        };

        let mut shadowed = BTreeMap::new();
        for (field, alias) in KEY_ALIASES {
            if map.contains_key(*field)
                && let Some(extra) = map.remove(*alias)
            {
                shadowed.insert((*alias).to_string(), extra);
            }
        }

        match serde_json::from_value::<Self>(Value::Object(map)) {
            Ok(mut raw) => {
                raw.extra.extend(shadowed);
                raw
            }
            Err(err) => Self::rejected(err.to_string()),
        }
    }

    /// Returns the source identifier unless it is missing or blank.
    pub fn source_id(&self) -> Option<&str> {
        self.event_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Builder method to set the source identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    /// Builder method to set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = Some(name.into());
        self
    }

    /// Builder method to set the raw date string.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Builder method to set the sponsorship.
    pub fn with_sponsorship(mut self, sponsorship: impl Into<String>) -> Self {
        self.sponsorship = Some(sponsorship.into());
        self
    }

    /// Builder method to set contact details.
    pub fn with_contact(mut self, email: Option<&str>, phone: Option<&str>) -> Self {
        self.contact = Some(RawContact {
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
        });
        self
    }
}

/// Accepts any JSON value: scalars become strings, `null` is absent, and
/// arrays or objects are kept as their JSON text.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Accepts a contact object; anything else (e.g. `"N/A"`) is absent.
fn loose_contact<'de, D>(deserializer: D) -> Result<Option<RawContact>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => {
            RawContact::deserialize(value).map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

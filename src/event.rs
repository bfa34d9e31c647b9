//! Event model
//!
//! `EventRecord` is the shape the router returns for each row of a query.
//! Every field is optional on the wire; `Event::try_from` validates a record
//! into the typed snapshot the reconciliation loop works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of one remote event at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Opaque identifier (`evid`), passed back verbatim when closing.
    pub id: String,
    /// Hierarchical class such as `/Status/Ping`.
    pub event_class: String,
    /// Epoch seconds.
    pub first_seen: f64,
    /// Epoch seconds.
    pub last_seen: f64,
}

/// Raw event row from an `EventsRouter.query` response.
///
/// Fields stay as raw JSON so one bad row is reported on its own instead of
/// failing the whole page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub evid: Option<Value>,
    /// Link object `{"text": "/Unknown", "uid": ...}` or, on older versions, a plain path.
    #[serde(rename = "eventClass", default)]
    pub event_class: Option<Value>,
    #[serde(rename = "firstTime", default)]
    pub first_time: Option<Value>,
    #[serde(rename = "lastTime", default)]
    pub last_time: Option<Value>,
}

impl EventRecord {
    /// The `evid` when it is a string.
    pub fn evid_str(&self) -> Option<&str> {
        self.evid.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventFieldError {
    Missing(&'static str),
    WrongType {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
    NotATimestamp { field: &'static str, value: String },
}

impl std::fmt::Display for EventFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventFieldError::Missing(field) => write!(f, "missing required field '{}'", field),
            EventFieldError::WrongType {
                field,
                expected,
                value,
            } => write!(f, "field '{}' should be {}, got {}", field, expected, value),
            EventFieldError::NotATimestamp { field, value } => {
                write!(f, "field '{}' is not an epoch timestamp: {}", field, value)
            }
        }
    }
}

impl std::error::Error for EventFieldError {}

impl TryFrom<EventRecord> for Event {
    type Error = EventFieldError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let id = non_empty_string("evid", record.evid.as_ref())?;

        let event_class = match record.event_class.as_ref() {
            Some(Value::Object(link)) => non_empty_string("eventClass.text", link.get("text"))?,
            other => non_empty_string("eventClass", other)?,
        };

        let first_seen = epoch_seconds("firstTime", record.first_time.as_ref())?;
        let last_seen = epoch_seconds("lastTime", record.last_time.as_ref())?;

        Ok(Event {
            id,
            event_class,
            first_seen,
            last_seen,
        })
    }
}

fn non_empty_string(field: &'static str, value: Option<&Value>) -> Result<String, EventFieldError> {
    match value {
        None | Some(Value::Null) => Err(EventFieldError::Missing(field)),
        Some(Value::String(s)) if s.is_empty() => Err(EventFieldError::Missing(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(EventFieldError::WrongType {
            field,
            expected: "a string",
            value: other.to_string(),
        }),
    }
}

fn epoch_seconds(field: &'static str, value: Option<&Value>) -> Result<f64, EventFieldError> {
    let value = match value {
        None | Some(Value::Null) => return Err(EventFieldError::Missing(field)),
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|secs| secs.is_finite())
        .ok_or_else(|| EventFieldError::NotATimestamp {
            field,
            value: value.to_string(),
        })
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A holiday entry as the application sees it. Provider data is loosely
/// shaped, so each field is optional; a field that was missing or of the
/// wrong type is simply `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HolidayWire", into = "HolidayWire")]
pub struct HolidayRecord {
    pub name: Option<String>,
    /// ISO-style weekday number, 1 (Monday) through 7 (Sunday).
    pub weekday: Option<u8>,
    pub public: Option<bool>,
}

impl HolidayRecord {
    pub fn new(name: &str, weekday: u8, public: bool) -> Self {
        Self {
            name: Some(name.to_string()),
            weekday: Some(weekday),
            public: Some(public),
        }
    }
}

/// The full holiday list for one country and year, plus the instant after
/// which it must not be served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayDataset {
    #[serde(default)]
    pub holidays: Vec<HolidayRecord>,
    #[serde(rename = "ttl")]
    pub expires_at: DateTime<Utc>,
}

impl HolidayDataset {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Body of the holiday provider's `/v1/holidays` endpoint.
#[derive(Debug, Deserialize)]
pub struct HolidayApiResponse {
    pub status: Option<u16>,
    pub error: Option<String>,
    #[serde(default)]
    pub holidays: Option<Vec<HolidayRecord>>,
}

// Provider shape: { name, public, weekday: { date: { numeric } } }. Fields are
// kept as raw JSON so one odd record never fails the whole list.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HolidayWire {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    public: Value,
    #[serde(default)]
    weekday: Value,
}

impl From<HolidayWire> for HolidayRecord {
    fn from(wire: HolidayWire) -> Self {
        let weekday = wire
            .weekday
            .get("date")
            .and_then(|date| date.get("numeric"))
            .and_then(weekday_number);

        Self {
            name: wire.name.as_str().map(str::to_string),
            weekday,
            public: wire.public.as_bool(),
        }
    }
}

impl From<HolidayRecord> for HolidayWire {
    fn from(record: HolidayRecord) -> Self {
        let weekday = match record.weekday {
            Some(day) => serde_json::json!({ "date": { "numeric": day.to_string() } }),
            None => Value::Null,
        };

        Self {
            name: record.name.map(Value::String).unwrap_or(Value::Null),
            public: record.public.map(Value::Bool).unwrap_or(Value::Null),
            weekday,
        }
    }
}

/// The provider sends `"3"`; older payloads and hand-written fixtures use `3`.
fn weekday_number(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.parse::<u64>().ok()?,
        _ => return None,
    };
    (1..=7).contains(&number).then_some(number as u8)
}

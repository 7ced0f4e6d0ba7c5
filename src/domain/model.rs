use crate::utils::error::FetchError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Search criteria accepted by the alarmeringdroid find endpoint.
///
/// Serialized as one JSON object appended to the request path. Key order
/// comes from the underlying map, not from construction order, so two
/// filters with equal content serialize byte-for-byte identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub gemeenten: Vec<String>,
    pub capcodes: Vec<String>,
    pub regios: Vec<String>,
    pub disciplines: Option<String>,
    /// Upstream encodes enabled flags as the literal string "1".
    pub flags: BTreeMap<String, bool>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.gemeenten.is_empty()
            && self.capcodes.is_empty()
            && self.regios.is_empty()
            && self.disciplines.is_none()
            && !self.flags.values().any(|enabled| *enabled)
    }

    /// Canonical JSON form of the filter. Empty keys are omitted.
    pub fn to_query(&self) -> String {
        self.to_value().to_string()
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();

        if !self.gemeenten.is_empty() {
            map.insert("gemeenten".to_string(), string_list(&self.gemeenten));
        }
        if !self.capcodes.is_empty() {
            map.insert("capcodes".to_string(), string_list(&self.capcodes));
        }
        if !self.regios.is_empty() {
            map.insert("regios".to_string(), string_list(&self.regios));
        }
        if let Some(disciplines) = &self.disciplines {
            map.insert(
                "disciplines".to_string(),
                Value::String(disciplines.clone()),
            );
        }
        for (name, enabled) in &self.flags {
            if *enabled {
                map.insert(name.clone(), Value::String("1".to_string()));
            }
        }

        Value::Object(map)
    }
}

fn string_list(values: &[String]) -> Value {
    Value::Array(
        values
            .iter()
            .map(|value| Value::String(value.clone()))
            .collect(),
    )
}

/// A single dispatch notification as delivered by the feed.
///
/// The upstream source guarantees no schema; fields come and go per
/// notification, so consumers pick them defensively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    /// Rename the coordinate fields the feed abbreviates: `lat` becomes
    /// `latitude` and `lon` becomes `longitude`, as a move. All other
    /// fields pass through untouched and no values are coerced. Running
    /// this twice is a no-op.
    pub fn normalized(mut self) -> Self {
        if let Some(lat) = self.data.remove("lat") {
            self.data.insert("latitude".to_string(), lat);
        }
        if let Some(lon) = self.data.remove("lon") {
            self.data.insert("longitude".to_string(), lon);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// String field with a fallback, for the loosely typed feed fields.
    pub fn get_str_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str {
        self.data
            .get(field)
            .and_then(|value| value.as_str())
            .unwrap_or(default)
    }

    /// Notification id, tolerant of the feed switching between string
    /// and numeric encodings.
    pub fn id(&self) -> Option<String> {
        match self.data.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Combines the feed's `datum` and `tijd` fields into a timestamp.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let datum = self.data.get("datum")?.as_str()?;
        let tijd = self.data.get("tijd")?.as_str()?;
        NaiveDateTime::parse_from_str(&format!("{} {}", datum, tijd), "%d-%m-%Y %H:%M:%S").ok()
    }
}

/// Result of one fetch call. `Empty` means the request went through but
/// no notification matched the filter; `Failure` means the result could
/// not be determined.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(Record),
    Empty,
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            FetchOutcome::Success(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FetchOutcome::Empty)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_from(value: Value) -> Record {
        match value {
            Value::Object(data) => Record { data },
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn query_serialization_is_deterministic() {
        let mut a = Filter {
            gemeenten: vec!["Utrecht".to_string(), "Amersfoort".to_string()],
            capcodes: vec!["1420059".to_string()],
            ..Default::default()
        };
        a.flags.insert("lifeliner".to_string(), true);
        a.flags.insert("grip".to_string(), true);

        // Same content, different construction order.
        let mut b = Filter::default();
        b.flags.insert("grip".to_string(), true);
        b.flags.insert("lifeliner".to_string(), true);
        b.capcodes = vec!["1420059".to_string()];
        b.gemeenten = vec!["Utrecht".to_string(), "Amersfoort".to_string()];

        assert_eq!(a.to_query(), b.to_query());
        assert_eq!(
            a.to_query(),
            r#"{"capcodes":["1420059"],"gemeenten":["Utrecht","Amersfoort"],"grip":"1","lifeliner":"1"}"#
        );
    }

    #[test]
    fn query_omits_empty_keys_and_disabled_flags() {
        let mut filter = Filter {
            disciplines: Some("Brandweer".to_string()),
            ..Default::default()
        };
        filter.flags.insert("grip".to_string(), false);

        assert_eq!(filter.to_query(), r#"{"disciplines":"Brandweer"}"#);
        assert_eq!(Filter::default().to_query(), "{}");
    }

    #[test]
    fn empty_filter_is_reported_as_empty() {
        let mut filter = Filter::default();
        assert!(filter.is_empty());

        filter.flags.insert("grip".to_string(), false);
        assert!(filter.is_empty());

        filter.capcodes.push("2029568".to_string());
        assert!(!filter.is_empty());
    }

    #[test]
    fn normalization_renames_coordinates_as_a_move() {
        let record = record_from(json!({
            "id": "42",
            "lat": "52.1",
            "lon": "4.9",
            "melding": "P 1 BDH-02 Gebouwbrand"
        }))
        .normalized();

        assert_eq!(record.get("latitude"), Some(&json!("52.1")));
        assert_eq!(record.get("longitude"), Some(&json!("4.9")));
        assert!(record.get("lat").is_none());
        assert!(record.get("lon").is_none());
        assert_eq!(record.get("melding"), Some(&json!("P 1 BDH-02 Gebouwbrand")));
    }

    #[test]
    fn normalization_tolerates_partially_absent_coordinates() {
        let record = record_from(json!({"id": "42", "lon": "4.9"})).normalized();

        assert!(record.get("lat").is_none());
        assert!(record.get("latitude").is_none());
        assert_eq!(record.get("longitude"), Some(&json!("4.9")));
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = record_from(json!({"lat": "52.1", "lon": "4.9"})).normalized();
        let twice = once.clone().normalized();

        assert_eq!(once, twice);
    }

    #[test]
    fn id_accepts_string_and_numeric_encodings() {
        assert_eq!(record_from(json!({"id": "42"})).id(), Some("42".to_string()));
        assert_eq!(record_from(json!({"id": 42})).id(), Some("42".to_string()));
        assert_eq!(record_from(json!({"melding": "x"})).id(), None);
    }

    #[test]
    fn timestamp_combines_datum_and_tijd() {
        let record = record_from(json!({"datum": "07-08-2026", "tijd": "13:45:12"}));
        let timestamp = record.timestamp().unwrap();

        assert_eq!(timestamp.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-08-07 13:45:12");
        assert!(record_from(json!({"datum": "07-08-2026"})).timestamp().is_none());
        assert!(record_from(json!({"datum": "not a date", "tijd": "13:45:12"}))
            .timestamp()
            .is_none());
    }
}

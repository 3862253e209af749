use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One hourly log entry. The row id plays the push-key role and is embedded
/// in the serialized form so list responses stay ordered.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    #[serde(rename = "key")]
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    #[serde(rename = "timestamp")]
    pub ts: DateTime<Utc>,
}

/// Incoming log payload; used for both create and partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLogEntry {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub rainfall: Option<f64>,
    pub battery: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewLogEntry {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.humidity.is_none()
            && self.pressure.is_none()
            && self.rainfall.is_none()
            && self.battery.is_none()
            && self.timestamp.is_none()
    }
}

/// Stations report timestamps as RFC3339 strings, offset-less ISO strings
/// (taken as UTC), or a unix epoch in seconds.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Epoch(f64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Text(s)) => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}"))),
        Some(Raw::Epoch(secs)) => Utc
            .timestamp_millis_opt((secs * 1000.0) as i64)
            .single()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("epoch out of range: {secs}"))),
    }
}

pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogListResponse {
    pub success: bool,
    pub data: Vec<LogEntry>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateLogResponse {
    pub success: bool,
    pub key: Uuid,
    pub data: LogEntry,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestLogResponse {
    pub success: bool,
    pub data: LogEntry,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedLogsResponse {
    pub success: bool,
    pub data: Vec<LogEntry>,
    pub count: usize,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub success: bool,
    pub key: Uuid,
    pub data: LogEntry,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteLogResponse {
    pub success: bool,
    pub key: Uuid,
    pub message: String,
}

/// Aggregates for one measured field. Fields with no samples report zeros.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LogStatistics {
    pub temperature: FieldStats,
    pub humidity: FieldStats,
    pub pressure: FieldStats,
    pub rainfall: FieldStats,
    pub battery: FieldStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsResponse {
    pub success: bool,
    pub statistics: LogStatistics,
    pub total_entries: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<LogEntry>,
    pub history: Vec<LogEntry>,
    pub total_entries: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<LogEntry>,
    pub statistics: LogStatistics,
    pub status: String,
    pub total_entries: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn log_entry_json_uses_key_and_timestamp_names() {
        let entry = LogEntry {
            id: Uuid::nil(),
            temperature: Some(22.5),
            humidity: Some(65.5),
            pressure: None,
            rainfall: None,
            battery: None,
            ts: Utc.with_ymd_and_hms(2026, 1, 14, 14, 43, 0).unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("key").is_some());
        assert!(json.get("id").is_none());
        assert_eq!(json["timestamp"], "2026-01-14T14:43:00Z");
        assert!(json.get("pressure").is_none());
    }

    #[test]
    fn new_entry_accepts_epoch_timestamp() {
        let entry: NewLogEntry =
            serde_json::from_str(r#"{"temperature": 22.5, "timestamp": 1768401780}"#).unwrap();
        assert_eq!(
            entry.timestamp,
            Some(Utc.with_ymd_and_hms(2026, 1, 14, 14, 43, 0).unwrap())
        );
    }

    #[test]
    fn empty_body_is_detected() {
        let entry: NewLogEntry = serde_json::from_str("{}").unwrap();
        assert!(entry.is_empty());
        let entry: NewLogEntry = serde_json::from_str(r#"{"rainfall": 0.0}"#).unwrap();
        assert!(!entry.is_empty());
    }
}

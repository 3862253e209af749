use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

/// The three sensor families the station reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SensorType {
    Bmp280,
    Aht10,
    Battery,
}

impl SensorType {
    pub const ALL: [SensorType; 3] = [SensorType::Bmp280, SensorType::Aht10, SensorType::Battery];

    pub fn table(&self) -> &'static str {
        match self {
            SensorType::Bmp280 => "bmp280_data",
            SensorType::Aht10 => "aht10_data",
            SensorType::Battery => "battery_data",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Bmp280 => "bmp280",
            SensorType::Aht10 => "aht10",
            SensorType::Battery => "battery",
        }
    }

}

impl FromStr for SensorType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bmp280" => Ok(SensorType::Bmp280),
            "aht10" => Ok(SensorType::Aht10),
            "battery" => Ok(SensorType::Battery),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored reading. Columns a sensor does not report come back NULL and are
/// omitted from the JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SensorReading {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,
    #[serde(rename = "timestamp")]
    pub ts: DateTime<Utc>,
}

/// Ingest payload: a flat reading where every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReading {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub altitude: Option<f64>,
    pub humidity: Option<f64>,
    pub battery_voltage: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewReading {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.pressure.is_none()
            && self.altitude.is_none()
            && self.humidity.is_none()
            && self.battery_voltage.is_none()
    }
}

/// Devices report timestamps either as an ISO-8601 string or as a unix
/// epoch in seconds; older firmware omits the offset suffix.
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

/// Parse an RFC3339 timestamp, an offset-less ISO timestamp (taken as UTC),
/// or a plain date (taken as midnight UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Query parameters for the paginated listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQueryParams {
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub hours: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    pub sensor: Option<String>,
    pub limit: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Whitelisted sort keys; anything else is a validation error before SQL is
/// ever composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Timestamp,
    Temperature,
    Humidity,
    Pressure,
    Altitude,
    BatteryVoltage,
}

impl SortKey {
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Timestamp => "ts",
            SortKey::Temperature => "temperature",
            SortKey::Humidity => "humidity",
            SortKey::Pressure => "pressure",
            SortKey::Altitude => "altitude",
            SortKey::BatteryVoltage => "battery_voltage",
        }
    }
}

impl FromStr for SortKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(SortKey::Timestamp),
            "temperature" => Ok(SortKey::Temperature),
            "humidity" => Ok(SortKey::Humidity),
            "pressure" => Ok(SortKey::Pressure),
            "altitude" => Ok(SortKey::Altitude),
            "battery_voltage" => Ok(SortKey::BatteryVoltage),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(()),
        }
    }
}

/// Validated listing filter handed from the service to the repository.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub sort: SortKey,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataListResponse {
    pub data: Vec<SensorReading>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    pub sensor_type: String,
    pub document_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Best-effort multi-sensor write: per-key outcomes plus a flat error list.
/// Successful sibling writes are never rolled back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiIngestResponse {
    pub results: BTreeMap<String, WriteStatus>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl MultiIngestResponse {
    pub fn is_partial(&self) -> bool {
        self.errors.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub total_records: i64,
    pub bmp280_count: i64,
    pub aht10_count: i64,
    pub battery_count: i64,
    pub avg_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
}

/// One row of the CSV export, unioned across the three tables.
#[derive(Debug, Clone, FromRow)]
pub struct ExportRow {
    pub sensor_type: String,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub altitude: Option<f64>,
    pub humidity: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub ts: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn sensor_type_parses_known_values_only() {
        assert_eq!("bmp280".parse::<SensorType>(), Ok(SensorType::Bmp280));
        assert_eq!("aht10".parse::<SensorType>(), Ok(SensorType::Aht10));
        assert_eq!("battery".parse::<SensorType>(), Ok(SensorType::Battery));
        assert!("dht22".parse::<SensorType>().is_err());
        assert!("BMP280".parse::<SensorType>().is_err());
        assert!("".parse::<SensorType>().is_err());
    }

    #[test]
    fn sensor_type_maps_to_fixed_tables() {
        assert_eq!(SensorType::Bmp280.table(), "bmp280_data");
        assert_eq!(SensorType::Aht10.table(), "aht10_data");
        assert_eq!(SensorType::Battery.table(), "battery_data");
    }

    #[test]
    fn sort_key_rejects_unknown_columns() {
        assert_eq!("timestamp".parse::<SortKey>(), Ok(SortKey::Timestamp));
        assert_eq!(
            "battery_voltage".parse::<SortKey>(),
            Ok(SortKey::BatteryVoltage)
        );
        assert!("id; DROP TABLE bmp280_data".parse::<SortKey>().is_err());
        assert!("ts".parse::<SortKey>().is_err());
    }

    #[test]
    fn parse_datetime_accepts_date_and_rfc3339() {
        assert_eq!(
            parse_datetime("2026-01-14"),
            Some(Utc.with_ymd_and_hms(2026, 1, 14, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_datetime("2026-01-14T14:43:00Z"),
            Some(Utc.with_ymd_and_hms(2026, 1, 14, 14, 43, 0).unwrap())
        );
        assert_eq!(parse_datetime("not a date"), None);
    }

    #[test]
    fn new_reading_preserves_explicit_timestamp() {
        let reading: NewReading = serde_json::from_str(
            r#"{"temperature": 25.1, "timestamp": "2026-01-14T14:43:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            reading.timestamp,
            Some(Utc.with_ymd_and_hms(2026, 1, 14, 14, 43, 0).unwrap())
        );
    }

    #[test]
    fn new_reading_without_timestamp() {
        let reading: NewReading = serde_json::from_str(r#"{"battery_voltage": 3.9}"#).unwrap();
        assert_eq!(reading.timestamp, None);
        assert!(!reading.is_empty());
        let empty: NewReading = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn reading_json_omits_absent_fields() {
        let reading = SensorReading {
            id: Uuid::nil(),
            temperature: Some(21.0),
            pressure: None,
            altitude: None,
            humidity: None,
            battery_voltage: None,
            ts: Utc.with_ymd_and_hms(2026, 1, 14, 14, 43, 0).unwrap(),
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["temperature"], 21.0);
        assert!(json.get("pressure").is_none());
        assert!(json.get("timestamp").is_some());
        assert!(json.get("ts").is_none());
    }
}

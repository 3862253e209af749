use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The sensor families the bridge knows how to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Bmp280,
    Aht10,
    Battery,
}

impl SensorKind {
    pub fn table(&self) -> &'static str {
        match self {
            SensorKind::Bmp280 => "bmp280_data",
            SensorKind::Aht10 => "aht10_data",
            SensorKind::Battery => "battery_data",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Bmp280 => "bmp280",
            SensorKind::Aht10 => "aht10",
            SensorKind::Battery => "battery",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded sensor message. Devices send a flat JSON object; every
/// measurement field is optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorPayload {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub altitude: Option<f64>,
    pub humidity: Option<f64>,
    pub battery_voltage: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SensorPayload {
    /// True when the payload carries no measurement at all.
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
        Some(Raw::Text(s)) => parse_timestamp_str(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}"))),
        Some(Raw::Epoch(secs)) => Utc
            .timestamp_millis_opt((secs * 1000.0) as i64)
            .single()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("epoch out of range: {secs}"))),
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Offset-less ISO strings are taken as UTC
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_mapping_is_fixed() {
        assert_eq!(SensorKind::Bmp280.table(), "bmp280_data");
        assert_eq!(SensorKind::Aht10.table(), "aht10_data");
        assert_eq!(SensorKind::Battery.table(), "battery_data");
    }

    #[test]
    fn payload_parses_rfc3339_timestamp() {
        let payload: SensorPayload =
            serde_json::from_str(r#"{"temperature": 22.5, "timestamp": "2026-01-14T14:43:00Z"}"#)
                .unwrap();
        assert_eq!(payload.temperature, Some(22.5));
        assert_eq!(
            payload.timestamp,
            Some(Utc.with_ymd_and_hms(2026, 1, 14, 14, 43, 0).unwrap())
        );
    }

    #[test]
    fn payload_parses_epoch_timestamp() {
        let payload: SensorPayload =
            serde_json::from_str(r#"{"battery_voltage": 3.7, "timestamp": 1700000000}"#).unwrap();
        assert_eq!(
            payload.timestamp,
            Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
    }

    #[test]
    fn payload_parses_offsetless_timestamp_as_utc() {
        let payload: SensorPayload =
            serde_json::from_str(r#"{"timestamp": "2026-01-14T14:43:00.250"}"#).unwrap();
        let ts = payload.timestamp.unwrap();
        assert_eq!(ts.timezone(), Utc);
        assert_eq!(ts.to_rfc3339(), "2026-01-14T14:43:00.250+00:00");
    }

    #[test]
    fn payload_without_timestamp_is_none() {
        let payload: SensorPayload = serde_json::from_str(r#"{"humidity": 61.0}"#).unwrap();
        assert_eq!(payload.timestamp, None);
        assert!(!payload.is_empty());
    }

    #[test]
    fn invalid_timestamp_is_rejected() {
        let res: Result<SensorPayload, _> =
            serde_json::from_str(r#"{"timestamp": "yesterday"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn empty_payload_is_detected() {
        let payload: SensorPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
    }
}

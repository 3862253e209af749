use crate::error::{AppError, Result};
use crate::models::{
    parse_datetime, DataListResponse, DataQueryParams, ExportParams, ExportRow, IngestResponse,
    ListFilter, MultiIngestResponse, NewReading, Pagination, SensorReading, SensorType, SortKey,
    SortOrder, StatisticsResponse, WriteStatus,
};
use crate::repositories::sensor::Metric;
use crate::repositories::SensorRepository;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

const MAX_PAGE_SIZE: i64 = 1000;
const DEFAULT_PAGE_SIZE: i64 = 50;
const DEFAULT_EXPORT_LIMIT: i64 = 1000;
const DEFAULT_HISTORY_HOURS: i64 = 24;

#[derive(Clone)]
pub struct SensorService {
    repository: SensorRepository,
}

impl SensorService {
    pub fn new(repository: SensorRepository) -> Self {
        Self { repository }
    }

    pub async fn ingest_one(
        &self,
        sensor: SensorType,
        reading: NewReading,
    ) -> Result<IngestResponse> {
        if reading.is_empty() {
            return Err(AppError::Validation("No data provided".to_string()));
        }

        let ts = reading.timestamp.unwrap_or_else(Utc::now);
        let id = self.repository.insert(sensor, &reading, ts).await?;

        Ok(IngestResponse {
            message: "Data uploaded successfully".to_string(),
            sensor_type: sensor.to_string(),
            document_id: id,
            timestamp: ts,
        })
    }

    /// Best-effort batch write: each sub-sensor is written independently and
    /// failures never roll back sibling writes. Unknown keys are recorded in
    /// the error list rather than dropped.
    pub async fn ingest_all(
        &self,
        payload: BTreeMap<String, NewReading>,
    ) -> Result<MultiIngestResponse> {
        if payload.is_empty() {
            return Err(AppError::Validation("No data provided".to_string()));
        }

        let batch_ts = Utc::now();
        let mut results = BTreeMap::new();
        let mut errors = Vec::new();

        for (key, reading) in payload {
            let sensor: SensorType = match key.parse() {
                Ok(s) => s,
                Err(()) => {
                    errors.push(format!("Invalid sensor type: {}", key));
                    results.insert(
                        key,
                        WriteStatus {
                            status: "error".to_string(),
                            document_id: None,
                            message: Some("Invalid sensor type".to_string()),
                        },
                    );
                    continue;
                }
            };

            let ts = reading.timestamp.unwrap_or(batch_ts);
            match self.repository.insert(sensor, &reading, ts).await {
                Ok(id) => {
                    results.insert(
                        key,
                        WriteStatus {
                            status: "success".to_string(),
                            document_id: Some(id),
                            message: None,
                        },
                    );
                }
                Err(e) => {
                    tracing::error!(sensor = %sensor, error = %e, "batch write failed");
                    let msg = format!("Failed to upload {} data", sensor);
                    errors.push(msg.clone());
                    results.insert(
                        key,
                        WriteStatus {
                            status: "error".to_string(),
                            document_id: None,
                            message: Some(msg),
                        },
                    );
                }
            }
        }

        Ok(MultiIngestResponse {
            results,
            timestamp: batch_ts,
            errors: if errors.is_empty() { None } else { Some(errors) },
        })
    }

    /// Latest reading per sensor; sensors without data are omitted.
    pub async fn latest_readings(&self) -> Result<BTreeMap<String, SensorReading>> {
        let mut latest = BTreeMap::new();
        for sensor in SensorType::ALL {
            if let Some(reading) = self.repository.find_latest(sensor).await? {
                latest.insert(sensor.to_string(), reading);
            }
        }
        Ok(latest)
    }

    pub async fn history(
        &self,
        sensor: SensorType,
        hours: Option<i64>,
    ) -> Result<Vec<SensorReading>> {
        let hours = hours.unwrap_or(DEFAULT_HISTORY_HOURS);
        if !(1..=24 * 365).contains(&hours) {
            return Err(AppError::Validation(
                "hours must be between 1 and 8760".to_string(),
            ));
        }
        let since = Utc::now() - Duration::hours(hours);
        self.repository.find_since(sensor, since).await
    }

    pub async fn list(
        &self,
        sensor: SensorType,
        params: DataQueryParams,
    ) -> Result<DataListResponse> {
        let (filter, page) = build_list_filter(&params)?;

        let total = self
            .repository
            .count(sensor, filter.date_from, filter.date_to)
            .await?;
        let data = self.repository.find_page(sensor, &filter).await?;

        Ok(DataListResponse {
            data,
            pagination: Pagination {
                current_page: page,
                per_page: filter.limit,
                total,
                total_pages: total_pages(total, filter.limit),
            },
        })
    }

    pub async fn statistics(&self) -> Result<StatisticsResponse> {
        let bmp280_count = self.repository.count(SensorType::Bmp280, None, None).await?;
        let aht10_count = self.repository.count(SensorType::Aht10, None, None).await?;
        let battery_count = self.repository.count(SensorType::Battery, None, None).await?;

        let since = Utc::now() - Duration::hours(24);
        let bmp_avg_temp = self
            .repository
            .average_since(SensorType::Bmp280, Metric::Temperature, since)
            .await?;
        let aht_avg_temp = self
            .repository
            .average_since(SensorType::Aht10, Metric::Temperature, since)
            .await?;
        let avg_humidity = self
            .repository
            .average_since(SensorType::Aht10, Metric::Humidity, since)
            .await?;

        Ok(StatisticsResponse {
            total_records: bmp280_count + aht10_count + battery_count,
            bmp280_count,
            aht10_count,
            battery_count,
            avg_temperature: combined_avg_temperature(bmp_avg_temp, aht_avg_temp),
            avg_humidity,
        })
    }

    pub async fn delete(&self, sensor: SensorType, id: uuid::Uuid) -> Result<()> {
        if self.repository.delete(sensor, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Record not found".to_string()))
        }
    }

    /// CSV export. Returns the attachment filename and body.
    pub async fn export_csv(&self, params: ExportParams) -> Result<(String, String)> {
        let format = params.format.as_deref().unwrap_or("csv");
        if !format.eq_ignore_ascii_case("csv") {
            return Err(AppError::Validation(
                "Unsupported format. Only CSV export is available.".to_string(),
            ));
        }

        let sensor_param = params.sensor.as_deref().unwrap_or("all");
        let sensor = match sensor_param {
            "all" => None,
            other => Some(other.parse::<SensorType>().map_err(|_| {
                AppError::Validation("Invalid sensor type".to_string())
            })?),
        };

        let limit = params.limit.unwrap_or(DEFAULT_EXPORT_LIMIT);
        if limit <= 0 {
            return Err(AppError::Validation("limit must be positive".to_string()));
        }

        let date_from = parse_optional_date(params.date_from.as_deref())?;
        let date_to = parse_optional_date(params.date_to.as_deref())?;

        let rows = self
            .repository
            .export_rows(sensor, date_from, date_to, limit)
            .await?;

        let filename = format!(
            "sensor_data_{}_{}.csv",
            sensor_param,
            Utc::now().format("%Y%m%d")
        );
        Ok((filename, rows_to_csv(&rows)))
    }
}

/// Headline temperature for the statistics endpoint: the mean of the two
/// thermometer averages. Null unless both sensors reported in the window.
fn combined_avg_temperature(bmp280: Option<f64>, aht10: Option<f64>) -> Option<f64> {
    match (bmp280, aht10) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        _ => None,
    }
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(s) => parse_datetime(s)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Invalid date: {}", s))),
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

/// Validate listing parameters and turn them into a repository filter.
pub fn build_list_filter(params: &DataQueryParams) -> Result<(ListFilter, i64)> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("page must be at least 1".to_string()));
    }

    let sort = match params.sort_by.as_deref() {
        None => SortKey::Timestamp,
        Some(s) => s
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid sort_by: {}", s)))?,
    };

    let order = match params.sort_order.as_deref() {
        None => SortOrder::Desc,
        Some(s) => s
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid sort_order: {}", s)))?,
    };

    let date_from = parse_optional_date(params.date_from.as_deref())?;
    let date_to = parse_optional_date(params.date_to.as_deref())?;
    if let (Some(from), Some(to)) = (date_from, date_to) {
        if from > to {
            return Err(AppError::Validation(
                "date_from must be before date_to".to_string(),
            ));
        }
    }

    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| AppError::Validation("page is out of range".to_string()))?;

    Ok((
        ListFilter {
            date_from,
            date_to,
            sort,
            order,
            limit,
            offset,
        },
        page,
    ))
}

const CSV_HEADER: &str = "sensor_type,temperature,pressure,altitude,humidity,battery_voltage,timestamp";

/// Render export rows as CSV. All values are numeric or RFC3339 timestamps,
/// so no quoting is required; absent measurements become empty cells.
pub fn rows_to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            row.sensor_type,
            fmt_cell(row.temperature),
            fmt_cell(row.pressure),
            fmt_cell(row.altitude),
            fmt_cell(row.humidity),
            fmt_cell(row.battery_voltage),
            row.ts.to_rfc3339(),
        ));
    }
    out
}

fn fmt_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }

    #[test]
    fn list_filter_defaults() {
        let (filter, page) = build_list_filter(&DataQueryParams::default()).unwrap();
        assert_eq!(page, 1);
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.sort, SortKey::Timestamp);
        assert_eq!(filter.order, SortOrder::Desc);
    }

    #[test]
    fn list_filter_computes_offset_from_page() {
        let params = DataQueryParams {
            page: Some(2),
            limit: Some(10),
            ..Default::default()
        };
        let (filter, page) = build_list_filter(&params).unwrap();
        assert_eq!(page, 2);
        assert_eq!(filter.offset, 10);
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn list_filter_rejects_bad_limit() {
        for limit in [0, -5, 1001] {
            let params = DataQueryParams {
                limit: Some(limit),
                ..Default::default()
            };
            assert!(build_list_filter(&params).is_err());
        }
    }

    #[test]
    fn list_filter_rejects_page_past_i64_range() {
        let params = DataQueryParams {
            page: Some(i64::MAX),
            limit: Some(1000),
            ..Default::default()
        };
        assert!(build_list_filter(&params).is_err());
    }

    #[test]
    fn avg_temperature_requires_both_thermometers() {
        assert_eq!(combined_avg_temperature(Some(20.0), Some(24.0)), Some(22.0));
        assert_eq!(combined_avg_temperature(Some(20.0), None), None);
        assert_eq!(combined_avg_temperature(None, Some(24.0)), None);
        assert_eq!(combined_avg_temperature(None, None), None);
    }

    #[test]
    fn list_filter_rejects_unknown_sort_key() {
        let params = DataQueryParams {
            sort_by: Some("id".to_string()),
            ..Default::default()
        };
        assert!(build_list_filter(&params).is_err());
    }

    #[test]
    fn list_filter_rejects_inverted_date_range() {
        let params = DataQueryParams {
            date_from: Some("2026-01-02".to_string()),
            date_to: Some("2026-01-01".to_string()),
            ..Default::default()
        };
        assert!(build_list_filter(&params).is_err());
    }

    #[test]
    fn list_filter_parses_date_range() {
        let params = DataQueryParams {
            date_from: Some("2026-01-01".to_string()),
            date_to: Some("2026-01-14T14:43:00Z".to_string()),
            ..Default::default()
        };
        let (filter, _) = build_list_filter(&params).unwrap();
        assert_eq!(
            filter.date_from,
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            filter.date_to,
            Some(Utc.with_ymd_and_hms(2026, 1, 14, 14, 43, 0).unwrap())
        );
    }

    #[test]
    fn csv_rows_leave_absent_fields_empty() {
        let rows = vec![
            ExportRow {
                sensor_type: "BMP280".to_string(),
                temperature: Some(24.5),
                pressure: Some(1012.0),
                altitude: Some(88.0),
                humidity: None,
                battery_voltage: None,
                ts: Utc.with_ymd_and_hms(2026, 1, 14, 14, 0, 0).unwrap(),
            },
            ExportRow {
                sensor_type: "Battery".to_string(),
                temperature: None,
                pressure: None,
                altitude: None,
                humidity: None,
                battery_voltage: Some(3.9),
                ts: Utc.with_ymd_and_hms(2026, 1, 14, 13, 0, 0).unwrap(),
            },
        ];
        let csv = rows_to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "BMP280,24.5,1012,88,,,2026-01-14T14:00:00+00:00");
        assert_eq!(lines[2], "Battery,,,,,3.9,2026-01-14T13:00:00+00:00");
    }

    #[test]
    fn csv_of_no_rows_is_header_only() {
        assert_eq!(rows_to_csv(&[]).lines().count(), 1);
    }
}

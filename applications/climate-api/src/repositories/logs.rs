use crate::db::DbPool;
use crate::error::Result;
use crate::models::{FieldStats, LogEntry, LogStatistics, NewLogEntry};
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

const COLUMNS: &str = "id, temperature, humidity, pressure, rainfall, battery, ts";

#[derive(Clone)]
pub struct LogRepository {
    pool: DbPool,
}

impl LogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &NewLogEntry, ts: DateTime<Utc>) -> Result<LogEntry> {
        let id = Uuid::new_v4();
        let query = format!(
            "INSERT INTO hourly_logs (id, temperature, humidity, pressure, rainfall, battery, ts) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, LogEntry>(&query)
            .bind(id)
            .bind(entry.temperature)
            .bind(entry.humidity)
            .bind(entry.pressure)
            .bind(entry.rainfall)
            .bind(entry.battery)
            .bind(ts)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_all(&self) -> Result<Vec<LogEntry>> {
        let query = format!("SELECT {COLUMNS} FROM hourly_logs ORDER BY ts DESC");
        let entries = sqlx::query_as::<_, LogEntry>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    pub async fn latest(&self) -> Result<Option<LogEntry>> {
        let query = format!("SELECT {COLUMNS} FROM hourly_logs ORDER BY ts DESC LIMIT 1");
        let entry = sqlx::query_as::<_, LogEntry>(&query)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    /// Newest N entries; the advisor and dashboard both read through this.
    pub async fn recent(&self, limit: i64) -> Result<Vec<LogEntry>> {
        let query = format!("SELECT {COLUMNS} FROM hourly_logs ORDER BY ts DESC LIMIT $1");
        let entries = sqlx::query_as::<_, LogEntry>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    pub async fn page(&self, limit: i64, offset: i64) -> Result<Vec<LogEntry>> {
        let query =
            format!("SELECT {COLUMNS} FROM hourly_logs ORDER BY ts DESC LIMIT $1 OFFSET $2");
        let entries = sqlx::query_as::<_, LogEntry>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM hourly_logs")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.get("count");
        Ok(count)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<LogEntry>> {
        let query = format!("SELECT {COLUMNS} FROM hourly_logs WHERE id = $1");
        let entry = sqlx::query_as::<_, LogEntry>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    /// Partial update: only supplied fields replace stored values. Returns
    /// None when no such entry exists.
    pub async fn update(&self, id: Uuid, entry: &NewLogEntry) -> Result<Option<LogEntry>> {
        let query = format!(
            "UPDATE hourly_logs SET \
             temperature = COALESCE($2, temperature), \
             humidity = COALESCE($3, humidity), \
             pressure = COALESCE($4, pressure), \
             rainfall = COALESCE($5, rainfall), \
             battery = COALESCE($6, battery), \
             ts = COALESCE($7, ts) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, LogEntry>(&query)
            .bind(id)
            .bind(entry.temperature)
            .bind(entry.humidity)
            .bind(entry.pressure)
            .bind(entry.rainfall)
            .bind(entry.battery)
            .bind(entry.timestamp)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM hourly_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Min/max/avg per field in one aggregate pass. Fields with no samples
    /// come back NULL and are reported as zeros.
    pub async fn statistics(&self) -> Result<(LogStatistics, i64)> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
             MIN(temperature) AS temperature_min, MAX(temperature) AS temperature_max, AVG(temperature) AS temperature_avg, \
             MIN(humidity) AS humidity_min, MAX(humidity) AS humidity_max, AVG(humidity) AS humidity_avg, \
             MIN(pressure) AS pressure_min, MAX(pressure) AS pressure_max, AVG(pressure) AS pressure_avg, \
             MIN(rainfall) AS rainfall_min, MAX(rainfall) AS rainfall_max, AVG(rainfall) AS rainfall_avg, \
             MIN(battery) AS battery_min, MAX(battery) AS battery_max, AVG(battery) AS battery_avg \
             FROM hourly_logs",
        )
        .fetch_one(&self.pool)
        .await?;

        let field = |name: &str| -> FieldStats {
            FieldStats {
                min: row
                    .get::<Option<f64>, _>(format!("{name}_min").as_str())
                    .unwrap_or(0.0),
                max: row
                    .get::<Option<f64>, _>(format!("{name}_max").as_str())
                    .unwrap_or(0.0),
                avg: row
                    .get::<Option<f64>, _>(format!("{name}_avg").as_str())
                    .unwrap_or(0.0),
            }
        };

        let stats = LogStatistics {
            temperature: field("temperature"),
            humidity: field("humidity"),
            pressure: field("pressure"),
            rainfall: field("rainfall"),
            battery: field("battery"),
        };
        let total: i64 = row.get("total");
        Ok((stats, total))
    }
}

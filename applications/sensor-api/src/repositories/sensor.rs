use crate::db::DbPool;
use crate::error::Result;
use crate::models::{ExportRow, ListFilter, NewReading, SensorReading, SensorType};
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

/// Metrics the statistics endpoint averages over. Closed set so column names
/// never come from request input.
#[derive(Debug, Clone, Copy)]
pub enum Metric {
    Temperature,
    Humidity,
}

impl Metric {
    fn column(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }
}

/// SELECT with the union column set: columns a table lacks are NULL so every
/// query maps onto the same row type.
fn base_select(sensor: SensorType) -> &'static str {
    match sensor {
        SensorType::Bmp280 => {
            "SELECT id, temperature, pressure, altitude, NULL::float8 AS humidity, \
             NULL::float8 AS battery_voltage, ts FROM bmp280_data"
        }
        SensorType::Aht10 => {
            "SELECT id, temperature, NULL::float8 AS pressure, NULL::float8 AS altitude, \
             humidity, NULL::float8 AS battery_voltage, ts FROM aht10_data"
        }
        SensorType::Battery => {
            "SELECT id, NULL::float8 AS temperature, NULL::float8 AS pressure, \
             NULL::float8 AS altitude, NULL::float8 AS humidity, battery_voltage, ts \
             FROM battery_data"
        }
    }
}

fn export_select(sensor: SensorType) -> String {
    match sensor {
        SensorType::Bmp280 => {
            "SELECT 'BMP280' AS sensor_type, temperature, pressure, altitude, \
             NULL::float8 AS humidity, NULL::float8 AS battery_voltage, ts FROM bmp280_data"
        }
        SensorType::Aht10 => {
            "SELECT 'AHT10' AS sensor_type, temperature, NULL::float8 AS pressure, \
             NULL::float8 AS altitude, humidity, NULL::float8 AS battery_voltage, ts \
             FROM aht10_data"
        }
        SensorType::Battery => {
            "SELECT 'Battery' AS sensor_type, NULL::float8 AS temperature, \
             NULL::float8 AS pressure, NULL::float8 AS altitude, NULL::float8 AS humidity, \
             battery_voltage, ts FROM battery_data"
        }
    }
    .to_string()
}

#[derive(Clone)]
pub struct SensorRepository {
    pool: DbPool,
}

impl SensorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        sensor: SensorType,
        reading: &NewReading,
        ts: DateTime<Utc>,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        match sensor {
            SensorType::Bmp280 => {
                sqlx::query(
                    "INSERT INTO bmp280_data (id, temperature, pressure, altitude, ts) \
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(id)
                .bind(reading.temperature)
                .bind(reading.pressure)
                .bind(reading.altitude)
                .bind(ts)
                .execute(&self.pool)
                .await?;
            }
            SensorType::Aht10 => {
                sqlx::query(
                    "INSERT INTO aht10_data (id, temperature, humidity, ts) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(id)
                .bind(reading.temperature)
                .bind(reading.humidity)
                .bind(ts)
                .execute(&self.pool)
                .await?;
            }
            SensorType::Battery => {
                sqlx::query(
                    "INSERT INTO battery_data (id, battery_voltage, ts) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(reading.battery_voltage)
                .bind(ts)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(id)
    }

    pub async fn find_latest(&self, sensor: SensorType) -> Result<Option<SensorReading>> {
        let query = format!("{} ORDER BY ts DESC LIMIT 1", base_select(sensor));
        let reading = sqlx::query_as::<_, SensorReading>(&query)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reading)
    }

    pub async fn find_since(
        &self,
        sensor: SensorType,
        since: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>> {
        let query = format!("{} WHERE ts >= $1 ORDER BY ts ASC", base_select(sensor));
        let readings = sqlx::query_as::<_, SensorReading>(&query)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(readings)
    }

    pub async fn find_page(
        &self,
        sensor: SensorType,
        filter: &ListFilter,
    ) -> Result<Vec<SensorReading>> {
        let mut query = base_select(sensor).to_string();

        let mut conditions = Vec::new();
        let mut arg_index = 1;

        if filter.date_from.is_some() {
            conditions.push(format!("ts >= ${}", arg_index));
            arg_index += 1;
        }

        if filter.date_to.is_some() {
            conditions.push(format!("ts <= ${}", arg_index));
            arg_index += 1;
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(&format!(
            " ORDER BY {} {} NULLS LAST LIMIT ${} OFFSET ${}",
            filter.sort.column(),
            filter.order.sql(),
            arg_index,
            arg_index + 1
        ));

        let mut sql_query = sqlx::query_as::<_, SensorReading>(&query);

        if let Some(date_from) = &filter.date_from {
            sql_query = sql_query.bind(date_from);
        }

        if let Some(date_to) = &filter.date_to {
            sql_query = sql_query.bind(date_to);
        }

        sql_query = sql_query.bind(filter.limit).bind(filter.offset);

        let readings = sql_query.fetch_all(&self.pool).await?;
        Ok(readings)
    }

    pub async fn count(
        &self,
        sensor: SensorType,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let mut query = format!("SELECT COUNT(*) AS count FROM {} WHERE 1=1", sensor.table());

        let mut arg_index = 1;
        if date_from.is_some() {
            query.push_str(&format!(" AND ts >= ${}", arg_index));
            arg_index += 1;
        }
        if date_to.is_some() {
            query.push_str(&format!(" AND ts <= ${}", arg_index));
        }

        let mut sql_query = sqlx::query(&query);
        if let Some(from) = date_from {
            sql_query = sql_query.bind(from);
        }
        if let Some(to) = date_to {
            sql_query = sql_query.bind(to);
        }

        let row = sql_query.fetch_one(&self.pool).await?;
        let count: i64 = row.get("count");
        Ok(count)
    }

    pub async fn average_since(
        &self,
        sensor: SensorType,
        metric: Metric,
        since: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let query = format!(
            "SELECT AVG({}) AS avg FROM {} WHERE ts >= $1",
            metric.column(),
            sensor.table()
        );
        let row = sqlx::query(&query).bind(since).fetch_one(&self.pool).await?;
        let avg: Option<f64> = row.get("avg");
        Ok(avg)
    }

    /// Delete one record by id. Returns false when no such record existed.
    pub async fn delete(&self, sensor: SensorType, id: Uuid) -> Result<bool> {
        let query = format!("DELETE FROM {} WHERE id = $1", sensor.table());
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rows for CSV export: one table, or all three unioned, newest first.
    pub async fn export_rows(
        &self,
        sensor: Option<SensorType>,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<ExportRow>> {
        let mut conditions = Vec::new();
        let mut arg_index = 1;

        if date_from.is_some() {
            conditions.push(format!("ts >= ${}", arg_index));
            arg_index += 1;
        }
        if date_to.is_some() {
            conditions.push(format!("ts <= ${}", arg_index));
            arg_index += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        // Placeholders are shared between the unioned subqueries, so the
        // date bounds are bound once regardless of sensor selection.
        let selects: Vec<String> = match sensor {
            Some(s) => vec![format!("{}{}", export_select(s), where_clause)],
            None => SensorType::ALL
                .iter()
                .map(|s| format!("{}{}", export_select(*s), where_clause))
                .collect(),
        };

        let query = format!(
            "{} ORDER BY ts DESC LIMIT ${}",
            selects.join(" UNION ALL "),
            arg_index
        );

        let mut sql_query = sqlx::query_as::<_, ExportRow>(&query);
        if let Some(from) = date_from {
            sql_query = sql_query.bind(from);
        }
        if let Some(to) = date_to {
            sql_query = sql_query.bind(to);
        }
        sql_query = sql_query.bind(limit);

        let rows = sql_query.fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

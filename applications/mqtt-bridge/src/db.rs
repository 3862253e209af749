use crate::error::AppError;
use crate::sensor::{SensorKind, SensorPayload};
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use uuid::Uuid;

pub type DbPool = Pool<Postgres>;

pub async fn connect(url: &str, max_connections: u32) -> Result<DbPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    Ok(pool)
}

/// Insert one reading into the table for its sensor kind. Returns the
/// generated row id.
pub async fn insert_reading(
    pool: &DbPool,
    kind: SensorKind,
    payload: &SensorPayload,
    ts: DateTime<Utc>,
) -> Result<Uuid, AppError> {
    let id = Uuid::new_v4();
    match kind {
        SensorKind::Bmp280 => {
            sqlx::query(
                "INSERT INTO bmp280_data (id, temperature, pressure, altitude, ts) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(id)
            .bind(payload.temperature)
            .bind(payload.pressure)
            .bind(payload.altitude)
            .bind(ts)
            .execute(pool)
            .await?;
        }
        SensorKind::Aht10 => {
            sqlx::query(
                "INSERT INTO aht10_data (id, temperature, humidity, ts) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(payload.temperature)
            .bind(payload.humidity)
            .bind(ts)
            .execute(pool)
            .await?;
        }
        SensorKind::Battery => {
            sqlx::query(
                "INSERT INTO battery_data (id, battery_voltage, ts) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(payload.battery_voltage)
            .bind(ts)
            .execute(pool)
            .await?;
        }
    }
    Ok(id)
}

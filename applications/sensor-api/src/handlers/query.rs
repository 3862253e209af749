use crate::error::Result;
use crate::handlers::ingest::parse_sensor;
use crate::models::{
    DataListResponse, DataQueryParams, HistoryParams, SensorReading, StatisticsResponse,
};
use crate::services::SensorService;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn latest_readings(
    State(service): State<SensorService>,
) -> Result<Json<BTreeMap<String, SensorReading>>> {
    let latest = service.latest_readings().await?;
    Ok(Json(latest))
}

pub async fn sensor_history(
    State(service): State<SensorService>,
    Path(sensor_type): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<SensorReading>>> {
    let sensor = parse_sensor(&sensor_type)?;
    let readings = service.history(sensor, params.hours).await?;
    Ok(Json(readings))
}

pub async fn sensor_data(
    State(service): State<SensorService>,
    Path(sensor_type): Path<String>,
    Query(params): Query<DataQueryParams>,
) -> Result<Json<DataListResponse>> {
    let sensor = parse_sensor(&sensor_type)?;
    let page = service.list(sensor, params).await?;
    Ok(Json(page))
}

pub async fn delete_sensor_data(
    State(service): State<SensorService>,
    Path((sensor_type, id)): Path<(String, Uuid)>,
) -> Result<Json<Value>> {
    let sensor = parse_sensor(&sensor_type)?;
    service.delete(sensor, id).await?;
    tracing::info!(sensor = %sensor, %id, "deleted reading");
    Ok(Json(json!({ "message": "Record deleted successfully" })))
}

pub async fn statistics(
    State(service): State<SensorService>,
) -> Result<Json<StatisticsResponse>> {
    let stats = service.statistics().await?;
    Ok(Json(stats))
}

/// Static catalogue of the sensors the station carries.
pub async fn sensor_catalogue() -> Json<Value> {
    Json(json!({
        "sensors": [
            {
                "type": "bmp280",
                "name": "BMP280",
                "measurements": ["temperature", "pressure", "altitude"],
            },
            {
                "type": "aht10",
                "name": "AHT10",
                "measurements": ["temperature", "humidity"],
            },
            {
                "type": "battery",
                "name": "Battery",
                "measurements": ["battery_voltage"],
            },
        ]
    }))
}

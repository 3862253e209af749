use crate::error::{AppError, Result};
use crate::models::{MultiIngestResponse, NewReading, SensorType};
use crate::services::SensorService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::collections::BTreeMap;

pub fn parse_sensor(value: &str) -> Result<SensorType> {
    value
        .parse()
        .map_err(|_| AppError::Validation("Invalid sensor type".to_string()))
}

pub async fn send_sensor_data(
    State(service): State<SensorService>,
    Path(sensor_type): Path<String>,
    Json(reading): Json<NewReading>,
) -> Result<impl axum::response::IntoResponse> {
    let sensor = parse_sensor(&sensor_type)?;
    let response = service.ingest_one(sensor, reading).await?;
    tracing::info!(sensor = %sensor, id = %response.document_id, "stored reading");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Writes every recognized sub-sensor independently. Responds 201 when all
/// writes succeed and 207 when some fail, with per-key outcomes either way.
pub async fn send_all_sensor_data(
    State(service): State<SensorService>,
    Json(payload): Json<BTreeMap<String, NewReading>>,
) -> Result<(StatusCode, Json<MultiIngestResponse>)> {
    let response = service.ingest_all(payload).await?;
    let status = if response.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(response)))
}

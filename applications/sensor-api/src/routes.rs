use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::export::export_csv;
use crate::handlers::ingest::{send_all_sensor_data, send_sensor_data};
use crate::handlers::query::{
    delete_sensor_data, health, latest_readings, sensor_catalogue, sensor_data, sensor_history,
    statistics,
};
use crate::services::SensorService;

pub fn create_router(service: SensorService) -> Router {
    Router::new()
        .route("/health", get(health))
        // Static segments win over the :sensor_type capture, so /all routes
        // never reach the single-sensor handlers.
        .route("/api/send/all", post(send_all_sensor_data))
        .route("/api/send/:sensor_type", post(send_sensor_data))
        .route("/esp32/sensors/all", post(send_all_sensor_data))
        .route("/esp32/sensor/:sensor_type", post(send_sensor_data))
        .route("/api/latest", get(latest_readings))
        .route("/api/history/:sensor_type", get(sensor_history))
        .route("/api/data/:sensor_type", get(sensor_data))
        .route("/api/data/:sensor_type/:id", delete(delete_sensor_data))
        .route("/api/statistics", get(statistics))
        .route("/api/export", get(export_csv))
        .route("/api/sensors", get(sensor_catalogue))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

use crate::error::Result;
use crate::models::{DashboardResponse, SummaryResponse};
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;

pub async fn dashboard_data(State(state): State<AppState>) -> Result<Json<DashboardResponse>> {
    Ok(Json(state.logs.dashboard().await?))
}

pub async fn sensor_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>> {
    Ok(Json(state.logs.summary().await?))
}

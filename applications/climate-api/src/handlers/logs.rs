use crate::error::Result;
use crate::models::{
    CreateLogResponse, DeleteLogResponse, EntryResponse, LatestLogResponse, LogListResponse,
    NewLogEntry, PageParams, PaginatedLogsResponse, StatisticsResponse,
};
use crate::routes::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_logs(State(state): State<AppState>) -> Result<Json<LogListResponse>> {
    Ok(Json(state.logs.list_all().await?))
}

pub async fn create_log(
    State(state): State<AppState>,
    Json(entry): Json<NewLogEntry>,
) -> Result<(StatusCode, Json<CreateLogResponse>)> {
    let response = state.logs.create(entry).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn latest_log(State(state): State<AppState>) -> Result<Json<LatestLogResponse>> {
    Ok(Json(state.logs.latest().await?))
}

pub async fn paginated_logs(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PaginatedLogsResponse>> {
    Ok(Json(state.logs.paginated(params).await?))
}

pub async fn log_statistics(State(state): State<AppState>) -> Result<Json<StatisticsResponse>> {
    Ok(Json(state.logs.statistics().await?))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(key): Path<Uuid>,
) -> Result<Json<EntryResponse>> {
    Ok(Json(state.logs.get(key).await?))
}

pub async fn update_log(
    State(state): State<AppState>,
    Path(key): Path<Uuid>,
    Json(entry): Json<NewLogEntry>,
) -> Result<Json<EntryResponse>> {
    Ok(Json(state.logs.update(key, entry).await?))
}

pub async fn delete_log(
    State(state): State<AppState>,
    Path(key): Path<Uuid>,
) -> Result<Json<DeleteLogResponse>> {
    Ok(Json(state.logs.delete(key).await?))
}

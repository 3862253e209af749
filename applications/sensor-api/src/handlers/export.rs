use crate::error::Result;
use crate::models::ExportParams;
use crate::services::SensorService;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;

pub async fn export_csv(
    State(service): State<SensorService>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse> {
    let (filename, body) = service.export_csv(params).await?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", filename),
        ),
    ];
    Ok((headers, body))
}

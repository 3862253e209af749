use crate::error::Result;
use crate::models::{ChatRequest, ChatResponse};
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let response = state.advisor.answer(request.query).await?;
    Ok(Json(ChatResponse { response }))
}

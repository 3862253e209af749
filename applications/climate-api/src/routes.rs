use axum::{
    routing::get,
    routing::post,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::chat::chat;
use crate::handlers::dashboard::{dashboard_data, sensor_summary};
use crate::handlers::logs::{
    create_log, delete_log, get_log, health, latest_log, list_logs, log_statistics,
    paginated_logs, update_log,
};
use crate::services::{AdvisorService, LogService};

#[derive(Clone)]
pub struct AppState {
    pub logs: LogService,
    pub advisor: AdvisorService,
}

pub fn create_router(logs: LogService, advisor: AdvisorService) -> Router {
    let state = AppState { logs, advisor };

    Router::new()
        .route("/health", get(health))
        .route("/sensor-data", get(list_logs).post(create_log))
        .route("/sensor-data/latest", get(latest_log))
        .route("/sensor-data/paginated", get(paginated_logs))
        .route("/sensor-data/statistics", get(log_statistics))
        .route(
            "/sensor-data/:key",
            get(get_log).put(update_log).delete(delete_log),
        )
        .route("/dashboard-data", get(dashboard_data))
        .route("/sensor-summary", get(sensor_summary))
        .route("/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

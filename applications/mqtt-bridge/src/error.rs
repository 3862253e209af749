use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("MQTT error: {0}")]
    Mqtt(String),
    #[error("DB error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unroutable topic: {0}")]
    UnknownTopic(String),
    #[error("payload carries no measurements")]
    EmptyReading,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

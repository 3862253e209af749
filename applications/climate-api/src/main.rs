use climate_api::repositories::LogRepository;
use climate_api::services::{AdvisorService, CompletionClient, KeywordGate, LogService};
use climate_api::{create_pool, routes, Config};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let pool = create_pool(&config).await?;
    sqlx::migrate!().run(&pool).await?;
    info!("Database ready");

    let repository = LogRepository::new(pool);
    let logs = LogService::new(repository.clone());
    let advisor = AdvisorService::new(
        repository,
        KeywordGate::from_env(),
        CompletionClient::new(config.completion.clone()),
    );

    let app = routes::create_router(logs, advisor);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

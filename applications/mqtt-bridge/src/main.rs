use mqtt_bridge::config::Config;
use mqtt_bridge::{db, ingest, mqtt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let cfg_path =
        std::env::var("APP_CONFIG").unwrap_or_else(|_| "config/config.example.yaml".into());
    let cfg = Config::load(&cfg_path)?;
    info!("loaded config; routes: {}", cfg.routes.len());

    let pool = db::connect(&cfg.database.url, cfg.database.max_connections).await?;
    info!("connected to database");

    let (client, mut eventloop) = mqtt::connect(&cfg.mqtt);
    for route in &cfg.routes {
        client
            .subscribe(route.topic.clone(), mqtt::qos(route.qos))
            .await?;
        info!(topic = %route.topic, sensor = %route.sensor, "subscribed");
    }

    let ingestor = ingest::Ingestor::new(pool);

    let sig = tokio::signal::ctrl_c();
    tokio::pin!(sig);
    loop {
        tokio::select! {
            biased;
            _ = &mut sig => {
                info!("stopping on ctrl-c");
                break;
            }
            res = mqtt::next_publish(&mut eventloop) => {
                match res {
                    Ok(msg) => {
                        let Ok(topic) = std::str::from_utf8(&msg.topic) else {
                            warn!("dropping message: topic is not valid utf-8");
                            continue;
                        };
                        if let Err(e) = ingestor.handle_message(&cfg.routes, topic, msg.payload.as_ref()).await {
                            warn!(topic = %topic, error = %e, "message dropped");
                        }
                    }
                    Err(e) => {
                        warn!("lost broker connection: {e}, retrying in 2s");
                        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                    }
                }
            }
        }
    }

    Ok(())
}

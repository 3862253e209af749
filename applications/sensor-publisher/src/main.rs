mod config;
mod mqtt;
mod sampler;

use anyhow::Context;
use config::Config;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config_path =
        std::env::var("APP_CONFIG").unwrap_or_else(|_| "config/config.example.yaml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path))?;

    info!(
        host = %config.mqtt.host,
        port = config.mqtt.port,
        interval_secs = config.interval_secs,
        "starting sensor publisher"
    );

    let options = mqtt::build_options(
        &config.mqtt.host,
        config.mqtt.port,
        &config.mqtt.username,
        &config.mqtt.password,
        config.mqtt.keep_alive_secs.unwrap_or(30),
    );
    let (client, mut eventloop) = mqtt::new(options);

    // The event loop must keep being polled for publishes to go out.
    tokio::spawn(async move {
        loop {
            if let Err(e) = eventloop.poll().await {
                warn!("mqtt connection error: {}", e);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_secs));
    let mut rng = rand::thread_rng();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                let batch = [
                    (&config.topics.bmp280, sampler::sample_bmp280(&mut rng)),
                    (&config.topics.aht10, sampler::sample_aht10(&mut rng)),
                    (&config.topics.battery, sampler::sample_battery(&mut rng)),
                ];
                for (topic, payload) in batch {
                    let body = payload.to_string();
                    match client.publish(topic, mqtt::qos(), false, body).await {
                        Ok(()) => info!(topic = %topic, payload = %payload, "published sample"),
                        Err(e) => error!(topic = %topic, "publish failed: {}", e),
                    }
                }
            }
        }
    }

    Ok(())
}

use crate::config::MqttConfig;
use crate::error::AppError;
use rumqttc::v5::mqttbytes::v5::Publish;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{AsyncClient, Event, EventLoop, Incoming, MqttOptions};
use rumqttc::Transport;
use std::time::Duration;
use uuid::Uuid;

/// Open the broker connection described by the bridge config. TLS is
/// switched on for the standard secure port.
pub fn connect(cfg: &MqttConfig) -> (AsyncClient, EventLoop) {
    let client_id = format!("mqtt-bridge-{}", Uuid::new_v4());
    let mut options = MqttOptions::new(client_id, cfg.host.clone(), cfg.port);
    options.set_keep_alive(Duration::from_secs(cfg.keep_alive_secs.unwrap_or(30)));
    options.set_clean_start(cfg.clean_session.unwrap_or(true));
    if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
        options.set_credentials(user.clone(), pass.clone());
    }
    if cfg.port == 8883 {
        options.set_transport(Transport::tls_with_default_config());
    }
    AsyncClient::new(options, 50)
}

pub fn qos(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

/// Drive the event loop until the broker hands over an application message.
pub async fn next_publish(eventloop: &mut EventLoop) -> Result<Publish, AppError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::Publish(publish))) => return Ok(publish),
            Ok(_) => {}
            Err(e) => return Err(AppError::Mqtt(e.to_string())),
        }
    }
}

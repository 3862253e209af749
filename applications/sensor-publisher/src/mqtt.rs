use std::time::Duration;
use uuid::Uuid;

use rumqttc::v5 as mqtt5;
use rumqttc::Transport;

pub type MqttOptions = mqtt5::MqttOptions;
pub type AsyncClient = mqtt5::AsyncClient;
pub type EventLoop = mqtt5::EventLoop;

pub fn build_options(
    host: &str,
    port: u16,
    username: &Option<String>,
    password: &Option<String>,
    keep_alive_secs: u64,
) -> MqttOptions {
    let client_id = format!("sensor-publisher-{}", Uuid::new_v4());
    let mut opts = MqttOptions::new(client_id, host, port);
    opts.set_keep_alive(Duration::from_secs(keep_alive_secs));
    opts.set_clean_start(true);
    if let (Some(u), Some(p)) = (username, password) {
        opts.set_credentials(u.clone(), p.clone());
    }
    if port == 8883 {
        opts.set_transport(Transport::tls_with_default_config());
    }
    opts
}

pub fn new(options: MqttOptions) -> (AsyncClient, EventLoop) {
    mqtt5::AsyncClient::new(options, 50)
}

pub fn qos() -> mqtt5::mqttbytes::QoS {
    mqtt5::mqttbytes::QoS::AtLeastOnce
}

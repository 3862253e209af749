use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub topics: Topics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topics {
    #[serde(default = "default_bmp280_topic")]
    pub bmp280: String,
    #[serde(default = "default_aht10_topic")]
    pub aht10: String,
    #[serde(default = "default_battery_topic")]
    pub battery: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            bmp280: default_bmp280_topic(),
            aht10: default_aht10_topic(),
            battery: default_battery_topic(),
        }
    }
}

fn default_interval_secs() -> u64 {
    5
}

fn default_bmp280_topic() -> String {
    "esp32/sensor/bmp280".to_string()
}

fn default_aht10_topic() -> String {
    "esp32/sensor/aht10".to_string()
}

fn default_battery_topic() -> String {
    "esp32/sensor/battery_capacity".to_string()
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_yaml::from_str(&raw)?;
        anyhow::ensure!(cfg.interval_secs > 0, "interval_secs must be positive");
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn minimal_config_gets_default_topics_and_interval() {
        let cfg: Config = serde_yaml::from_str(
            "mqtt:\n  host: broker.emqx.io\n  port: 1883\n",
        )
        .unwrap();
        assert_eq!(cfg.interval_secs, 5);
        assert_eq!(cfg.topics.bmp280, "esp32/sensor/bmp280");
        assert_eq!(cfg.topics.aht10, "esp32/sensor/aht10");
        assert_eq!(cfg.topics.battery, "esp32/sensor/battery_capacity");
    }

    #[test]
    fn explicit_topics_override_defaults() {
        let cfg: Config = serde_yaml::from_str(
            "mqtt:\n  host: localhost\n  port: 1883\ninterval_secs: 30\ntopics:\n  bmp280: station/bmp280\n",
        )
        .unwrap();
        assert_eq!(cfg.interval_secs, 30);
        assert_eq!(cfg.topics.bmp280, "station/bmp280");
        assert_eq!(cfg.topics.aht10, "esp32/sensor/aht10");
    }
}

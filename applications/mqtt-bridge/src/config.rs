use crate::sensor::SensorKind;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub database: DatabaseConfig,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: Option<u64>,
    pub clean_session: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// One subscription: messages on `topic` land in the table for `sensor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub topic: String,
    pub sensor: SensorKind,
    #[serde(default = "default_qos")]
    pub qos: u8,
}

fn default_qos() -> u8 {
    1
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    /// A DATABASE_URL env var overrides whatever the YAML had.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let raw = fs::read_to_string(path)?;
        let expanded = expand_env(&raw)?;
        let mut cfg: Self = serde_yaml::from_str(&expanded)?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            cfg.database.url = url;
        }

        anyhow::ensure!(
            !cfg.routes.is_empty(),
            "config must include at least one route"
        );
        Ok(cfg)
    }
}

/// Substitute $(VAR) and ${VAR} with environment values so the YAML can
/// reference deployment secrets. "$$" escapes a literal dollar; a dollar
/// that opens no placeholder passes through unchanged.
fn expand_env(raw: &str) -> Result<String, anyhow::Error> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            rest = after;
            continue;
        }

        let close = match tail.chars().next() {
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                rest = tail;
                continue;
            }
        };

        let inner = &tail[1..];
        let end = inner
            .find(close)
            .ok_or_else(|| anyhow::anyhow!("unclosed placeholder in config: ${}", tail))?;
        let name = &inner[..end];
        let value = std::env::var(name)
            .map_err(|_| anyhow::anyhow!("environment variable {} is not set", name))?;
        out.push_str(&value);
        rest = &inner[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn double_dollar_escapes_and_plain_dollar_passes() {
        assert_eq!(expand_env("cost: $$5").unwrap(), "cost: $5");
        assert_eq!(expand_env("a $ b").unwrap(), "a $ b");
        assert_eq!(expand_env("trailing $").unwrap(), "trailing $");
    }

    #[test]
    fn both_placeholder_styles_expand() {
        std::env::set_var("BRIDGE_CFG_TEST_VAR", "broker.example.org");
        assert_eq!(
            expand_env("host: $(BRIDGE_CFG_TEST_VAR)").unwrap(),
            "host: broker.example.org"
        );
        assert_eq!(
            expand_env("host: ${BRIDGE_CFG_TEST_VAR}").unwrap(),
            "host: broker.example.org"
        );
        std::env::remove_var("BRIDGE_CFG_TEST_VAR");
    }

    #[test]
    fn unclosed_placeholder_is_an_error() {
        assert!(expand_env("host: $(NEVER_CLOSED").is_err());
        assert!(expand_env("host: ${NEVER_CLOSED").is_err());
    }

    #[test]
    fn missing_variable_is_an_error() {
        assert!(expand_env("$(BRIDGE_CFG_TEST_UNSET_VAR)").is_err());
    }
}

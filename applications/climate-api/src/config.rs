use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings for the chat-completion vendor. The base URL is configurable so
/// an OpenRouter-compatible gateway can be swapped in without a code change.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub referer: Option<String>,
    pub title: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let completion = CompletionConfig {
            base_url: env::var("COMPLETION_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            api_key: env::var("COMPLETION_API_KEY").ok(),
            model: env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| "z-ai/glm-4.5-air:free".to_string()),
            referer: env::var("COMPLETION_REFERER").ok(),
            title: env::var("COMPLETION_TITLE").ok(),
        };

        Ok(Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            completion,
        })
    }
}

use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_INTEGRATION_API_URI: &str = "https://api.integration.app";
/// Integration id the token-extract connection is created against.
pub const TOKEN_EXTRACT_INTEGRATION_ID: &str = "69669baf2a3daad23cd6ef0d";
pub const TOKEN_EXTRACT_INTEGRATION_KEY: &str = "token-extract";
pub const RETRIEVE_TOKEN_FLOW_KEY: &str = "retrieve-token";
pub const DEFAULT_INTEGRATION_API_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_MINIO_ENDPOINT: &str = "minio.ringfree.com";
pub const DEFAULT_MINIO_PORT: u16 = 9000;
pub const DEFAULT_MINIO_BUCKET_NAME: &str = "pbx.ringfree.com";

// ~5 req/sec with short bursts for client polling
pub const DEFAULT_RATE_LIMIT_MS: u64 = 200;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct IntegrationSettings {
    pub api_uri: String,
    pub token_extract_integration_id: String,
    pub token_extract_key: String,
    pub retrieve_token_flow_key: String,
    pub request_timeout: Duration,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            api_uri: DEFAULT_INTEGRATION_API_URI.to_string(),
            token_extract_integration_id: TOKEN_EXTRACT_INTEGRATION_ID.to_string(),
            token_extract_key: TOKEN_EXTRACT_INTEGRATION_KEY.to_string(),
            retrieve_token_flow_key: RETRIEVE_TOKEN_FLOW_KEY.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_INTEGRATION_API_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectStorageSettings {
    pub endpoint: String,
    pub port: u16,
    pub bucket_name: String,
}

impl Default for ObjectStorageSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_MINIO_ENDPOINT.to_string(),
            port: DEFAULT_MINIO_PORT,
            bucket_name: DEFAULT_MINIO_BUCKET_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub per_millisecond: u64,
    pub burst_size: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub frontend_origin: String,
    pub bind_addr: SocketAddr,
    pub integration: IntegrationSettings,
    pub storage: ObjectStorageSettings,
    pub rate_limit: RateLimitSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = required("DATABASE_URL")?;
        let frontend_origin = required("FRONTEND_ORIGIN")?;
        let bind_addr = bind_addr()?;

        let integration_defaults = IntegrationSettings::default();
        let integration = IntegrationSettings {
            api_uri: optional("INTEGRATION_API_URI").unwrap_or(integration_defaults.api_uri),
            token_extract_integration_id: optional("TOKEN_EXTRACT_INTEGRATION_ID")
                .unwrap_or(integration_defaults.token_extract_integration_id),
            token_extract_key: optional("TOKEN_EXTRACT_INTEGRATION_KEY")
                .unwrap_or(integration_defaults.token_extract_key),
            retrieve_token_flow_key: integration_defaults.retrieve_token_flow_key,
            request_timeout: parsed::<u64>("INTEGRATION_API_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(integration_defaults.request_timeout),
        };

        let storage_defaults = ObjectStorageSettings::default();
        let storage = ObjectStorageSettings {
            endpoint: optional("MINIO_ENDPOINT").unwrap_or(storage_defaults.endpoint),
            port: parsed("MINIO_PORT")?.unwrap_or(storage_defaults.port),
            bucket_name: optional("MINIO_BUCKET_NAME").unwrap_or(storage_defaults.bucket_name),
        };

        let rate_limit = RateLimitSettings {
            per_millisecond: parsed("RATE_LIMITER_MILLISECONDS")?.unwrap_or(DEFAULT_RATE_LIMIT_MS),
            burst_size: parsed("RATE_LIMITER_BURST")?.unwrap_or(DEFAULT_RATE_LIMIT_BURST),
        };

        Ok(Config {
            database_url,
            frontend_origin,
            bind_addr,
            integration,
            storage,
            rate_limit,
        })
    }
}

fn bind_addr() -> Result<SocketAddr, ConfigError> {
    let value = optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    value.parse().map_err(|_| ConfigError::Invalid {
        key: "BIND_ADDR",
        value,
    })
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parsed<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match optional(key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(None),
    }
}

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/recordpoint".into(),
        frontend_origin: "http://localhost:5173".into(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        integration: IntegrationSettings::default(),
        storage: ObjectStorageSettings::default(),
        rate_limit: RateLimitSettings {
            per_millisecond: DEFAULT_RATE_LIMIT_MS,
            burst_size: DEFAULT_RATE_LIMIT_BURST,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_defaults_use_named_sentinels() {
        let settings = IntegrationSettings::default();
        assert_eq!(settings.api_uri, DEFAULT_INTEGRATION_API_URI);
        assert_eq!(settings.token_extract_key, "token-extract");
        assert_eq!(settings.token_extract_integration_id, "69669baf2a3daad23cd6ef0d");
        assert_eq!(settings.retrieve_token_flow_key, "retrieve-token");
    }

    #[test]
    fn bind_addr_defaults_to_constant_and_honours_override() {
        std::env::remove_var("BIND_ADDR");
        let default_addr = bind_addr().unwrap();
        std::env::set_var("BIND_ADDR", "0.0.0.0:8080");
        let overridden = bind_addr();
        std::env::set_var("BIND_ADDR", "nowhere");
        let invalid = bind_addr();
        std::env::remove_var("BIND_ADDR");

        assert_eq!(default_addr, DEFAULT_BIND_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(overridden.unwrap(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(matches!(invalid, Err(ConfigError::Invalid { key: "BIND_ADDR", .. })));
    }

    #[test]
    fn parsed_rejects_garbage() {
        std::env::set_var("RECORDPOINT_TEST_PORT", "not-a-port");
        let result = parsed::<u16>("RECORDPOINT_TEST_PORT");
        std::env::remove_var("RECORDPOINT_TEST_PORT");
        assert!(matches!(result, Err(ConfigError::Invalid { key: "RECORDPOINT_TEST_PORT", .. })));
    }
}

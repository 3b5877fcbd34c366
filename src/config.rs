use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Server configuration with validation.
///
/// Every required value must be present at startup; a missing warehouse or
/// generation credential is a fatal configuration error, never a
/// per-request error.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host address
    #[validate(length(min = 1, message = "HTTP host cannot be empty"))]
    pub http_host: String,

    /// HTTP server port (1-65535)
    #[validate(range(
        min = 1,
        max = 65535,
        message = "HTTP port must be between 1 and 65535"
    ))]
    pub http_port: u16,

    /// ClickHouse HTTP endpoint
    #[validate(length(min = 1, message = "Warehouse URL cannot be empty"))]
    pub warehouse_url: String,

    /// Warehouse user
    #[validate(length(min = 1, message = "Warehouse user cannot be empty"))]
    pub warehouse_user: String,

    /// Warehouse password (may be empty for default-user setups)
    #[serde(skip_serializing)]
    pub warehouse_password: String,

    /// Optional catalog label used when rendering qualified table names
    pub catalog: Option<String>,

    /// Warehouse schema holding the queryable tables
    #[validate(length(min = 1, message = "Schema name cannot be empty"))]
    pub schema: String,

    /// Optional YAML file declaring the catalog tables and/or join graph
    pub schema_file: Option<String>,

    /// Chat-completions endpoint base URL
    #[validate(length(min = 1, message = "LLM URL cannot be empty"))]
    pub llm_url: String,

    /// Bearer credential for the generation endpoint
    #[serde(skip_serializing)]
    pub llm_api_key: String,

    /// Model identifier sent with each generation request
    #[validate(length(min = 1, message = "LLM model cannot be empty"))]
    pub llm_model: String,
}

impl ServerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            http_host: env::var("ASKSQL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_env_var("ASKSQL_PORT", "8080")?,
            warehouse_url: required_env("CLICKHOUSE_URL")?,
            warehouse_user: required_env("CLICKHOUSE_USER")?,
            warehouse_password: required_env("CLICKHOUSE_PASSWORD")?,
            catalog: optional_env("ASKSQL_CATALOG"),
            schema: required_env("ASKSQL_SCHEMA")?,
            schema_file: optional_env("ASKSQL_SCHEMA_FILE"),
            llm_url: required_env("ASKSQL_LLM_URL")?,
            llm_api_key: required_env("ASKSQL_LLM_API_KEY")?,
            llm_model: env::var("ASKSQL_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the environment, re-validating
    pub fn apply_overrides(&mut self, overrides: CliOverrides) -> Result<(), ConfigError> {
        if let Some(host) = overrides.http_host {
            self.http_host = host;
        }
        if let Some(port) = overrides.http_port {
            self.http_port = port;
        }
        if let Some(path) = overrides.schema_file {
            self.schema_file = Some(path);
        }

        self.validate()?;
        Ok(())
    }
}

/// Overrides parsed from command line arguments
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub http_host: Option<String>,
    pub http_port: Option<u16>,
    pub schema_file: Option<String>,
}

fn required_env(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key))
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

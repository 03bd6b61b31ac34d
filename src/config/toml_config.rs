use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deployment configuration for the dispatch pipeline.
///
/// Loaded once and injected into the gateway client and the dispatcher at
/// construction; nothing reads it as ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub api_token: String,
    /// Originator presented to the gateway. Alphanumeric, max 11 characters.
    pub sender_id: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_max_recipients")]
    pub max_recipients: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_recipients: default_max_recipients(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_max_recipients() -> usize {
    500
}

impl DispatchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DispatchError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| DispatchError::Config {
            message: format!("TOML parsing error: {e}"),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values, so the
    /// gateway token never has to live in the config file itself.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{var_name}}}"))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("gateway.endpoint", &self.gateway.endpoint)?;
        validation::validate_non_empty_string("gateway.api_token", &self.gateway.api_token)?;
        validation::validate_non_empty_string("gateway.sender_id", &self.gateway.sender_id)?;

        if self.gateway.sender_id.len() > 11 {
            return Err(DispatchError::InvalidConfigValue {
                field: "gateway.sender_id".to_string(),
                value: self.gateway.sender_id.clone(),
                reason: "sender id must be at most 11 characters".to_string(),
            });
        }

        validation::validate_range(
            "gateway.timeout_seconds",
            self.gateway.timeout_seconds,
            1,
            120,
        )?;
        validation::validate_positive_number(
            "batch.max_recipients",
            self.batch.max_recipients,
            1,
        )?;

        Ok(())
    }
}

impl Validate for DispatchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

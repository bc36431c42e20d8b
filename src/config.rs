use crate::engine::OversellPolicy;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the CSV exports read by the binary.
    pub data_dir: PathBuf,
    pub oversell_policy: OversellPolicy,
    pub report_pretty: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let data_dir = env_map
            .get("DATA_DIR")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnv("DATA_DIR".to_string()))?;

        let oversell_policy = match env_map
            .get("OVERSELL_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("reject")
        {
            "reject" => OversellPolicy::Reject,
            "clamp" => OversellPolicy::Clamp,
            "allow" => OversellPolicy::Allow,
            other => {
                return Err(ConfigError::InvalidValue(
                    "OVERSELL_POLICY".to_string(),
                    format!("must be reject, clamp, or allow, got {}", other),
                ))
            }
        };

        let report_pretty = match env_map
            .get("REPORT_PRETTY")
            .map(|s| s.as_str())
            .unwrap_or("false")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "REPORT_PRETTY".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            data_dir,
            oversell_policy,
            report_pretty,
        })
    }
}

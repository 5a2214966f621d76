use crate::pagination::DEFAULT_PER_PAGE;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DATABASE: &str = "church_roster.db";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_address: String,
    pub per_page: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = vars
            .get("ROSTER_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let per_page = match vars.get("ROSTER_PER_PAGE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: "ROSTER_PER_PAGE".to_string(),
                    value: raw.clone(),
                })?,
            None => DEFAULT_PER_PAGE,
        };

        Ok(Config {
            database_path,
            bind_address,
            per_page,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from(DEFAULT_DATABASE),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

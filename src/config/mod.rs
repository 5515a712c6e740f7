//! Configuration management for Roomrank
//!
//! Connection, inference, and index-schema settings live in a TOML file;
//! per-request ranking preferences arrive with each search and are not
//! configured here.

use crate::error::{Result, RoomrankError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub engine: EngineConfig,
    pub inference: InferenceConfig,
    pub schema: SchemaConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Search engine connection settings. Credentials are referenced by
/// environment variable name, never stored in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub endpoint: String,
    pub index: String,

    /// Authenticate with basic auth instead of an API key
    #[serde(default)]
    pub use_password: bool,
    #[serde(default = "default_username")]
    pub username: String,
    pub api_key_env: String,
    pub password_env: String,

    pub timeout_secs: u64,

    /// Development clusters often run on self-signed certs
    #[serde(default)]
    pub verify_certs: bool,
}

fn default_username() -> String {
    "elastic".to_string()
}

/// Inference endpoint identifiers on the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub dense_id: String,
    pub sparse_id: String,
    pub reranker_id: String,
}

/// Index field names the composer writes queries against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Dense semantic-text field (E5)
    pub dense_field: String,
    /// Sparse semantic-text field (ELSER)
    pub sparse_field: String,
    /// Field the reranker scores against
    pub rerank_field: String,
    pub geo_field: String,
    pub rating_field: String,
    /// Fields projected back on every hit
    pub projected_fields: Vec<String>,
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RoomrankError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RoomrankError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| RoomrankError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        Ok(config)
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        if let Some(overrides) = self.profiles.get(profile) {
            if let Some(endpoint) = &overrides.endpoint {
                self.engine.endpoint = endpoint.clone();
            }
            if let Some(index) = &overrides.index {
                self.engine.index = index.clone();
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: ROOMRANK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("ROOMRANK_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        // Simple implementation for common overrides
        match path {
            "ENGINE__ENDPOINT" => {
                self.engine.endpoint = value.to_string();
            }
            "ENGINE__INDEX" => {
                self.engine.index = value.to_string();
            }
            "ENGINE__TIMEOUT_SECS" => {
                self.engine.timeout_secs =
                    value.parse().map_err(|_| RoomrankError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as integer", value),
                    })?;
            }
            "ENGINE__USE_PASSWORD" => {
                self.engine.use_password =
                    value.parse().map_err(|_| RoomrankError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as boolean", value),
                    })?;
            }
            "INFERENCE__RERANKER_ID" => {
                self.inference.reranker_id = value.to_string();
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            RoomrankError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("roomrank").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            engine: EngineConfig {
                endpoint: "https://localhost:9200".to_string(),
                index: "hotels".to_string(),
                use_password: false,
                username: default_username(),
                api_key_env: "ROOMRANK_API_KEY".to_string(),
                password_env: "ROOMRANK_PASSWORD".to_string(),
                timeout_secs: 300,
                verify_certs: false,
            },
            inference: InferenceConfig {
                dense_id: ".multilingual-e5-small-elasticsearch".to_string(),
                sparse_id: ".elser-2-elasticsearch".to_string(),
                reranker_id: ".rerank-v1-elasticsearch".to_string(),
            },
            schema: SchemaConfig {
                dense_field: "semantic_description_e5".to_string(),
                sparse_field: "semantic_description_elser".to_string(),
                rerank_field: "combined_fields".to_string(),
                geo_field: "location".to_string(),
                rating_field: "HotelRating".to_string(),
                projected_fields: vec![
                    "HotelName".to_string(),
                    "Description".to_string(),
                    "Address".to_string(),
                    "cityName".to_string(),
                    "HotelFacilities".to_string(),
                    "HotelRating".to_string(),
                    "Attractions".to_string(),
                ],
            },
            profiles: HashMap::new(),
        }
    }
}

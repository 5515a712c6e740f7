use crate::config::Config;
use crate::error::{Result, RoomrankError, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_engine(config, &mut errors);
        Self::validate_inference(config, &mut errors);
        Self::validate_schema(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RoomrankError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_engine(config: &Config, errors: &mut Vec<ValidationError>) {
        let engine = &config.engine;

        if engine.endpoint.is_empty() {
            errors.push(ValidationError::new(
                "engine.endpoint",
                "Endpoint cannot be empty",
            ));
        } else if !engine.endpoint.starts_with("http://") && !engine.endpoint.starts_with("https://")
        {
            errors.push(ValidationError::new(
                "engine.endpoint",
                format!("Endpoint must be an http(s) URL: {}", engine.endpoint),
            ));
        }

        if engine.index.is_empty() {
            errors.push(ValidationError::new("engine.index", "Index cannot be empty"));
        }

        if engine.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "engine.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }

        if engine.use_password {
            if engine.username.is_empty() {
                errors.push(ValidationError::new(
                    "engine.username",
                    "Username cannot be empty when basic auth is enabled",
                ));
            }
            if engine.password_env.is_empty() {
                errors.push(ValidationError::new(
                    "engine.password_env",
                    "Password environment variable name cannot be empty",
                ));
            }
        } else if engine.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "engine.api_key_env",
                "API key environment variable name cannot be empty",
            ));
        }
    }

    fn validate_inference(config: &Config, errors: &mut Vec<ValidationError>) {
        for (path, id) in [
            ("inference.dense_id", &config.inference.dense_id),
            ("inference.sparse_id", &config.inference.sparse_id),
            ("inference.reranker_id", &config.inference.reranker_id),
        ] {
            if id.is_empty() {
                errors.push(ValidationError::new(path, "Inference ID cannot be empty"));
            }
        }
    }

    fn validate_schema(config: &Config, errors: &mut Vec<ValidationError>) {
        let schema = &config.schema;

        for (path, field) in [
            ("schema.dense_field", &schema.dense_field),
            ("schema.sparse_field", &schema.sparse_field),
            ("schema.rerank_field", &schema.rerank_field),
            ("schema.geo_field", &schema.geo_field),
            ("schema.rating_field", &schema.rating_field),
        ] {
            if field.is_empty() {
                errors.push(ValidationError::new(path, "Field name cannot be empty"));
            }
        }

        if schema.projected_fields.is_empty() {
            errors.push(ValidationError::new(
                "schema.projected_fields",
                "At least one projected field is required",
            ));
        }
    }
}

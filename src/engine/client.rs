//! HTTP gateway to an Elasticsearch-compatible engine

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::engine::response::SearchResponse;
use crate::engine::{annotate_engine_message, EngineError, RawHit, SearchGateway};
use crate::query::SearchRequest;

/// Gateway backed by the engine's HTTP API. Credentials come from the
/// environment, never from the config file itself.
pub struct HttpGateway {
    client: Client,
    endpoint: String,
    auth: Auth,
}

enum Auth {
    ApiKey(String),
    Basic { username: String, password: String },
}

impl HttpGateway {
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let auth = if config.use_password {
            let password = std::env::var(&config.password_env).map_err(|_| {
                EngineError::Client(format!(
                    "environment variable {} is not set",
                    config.password_env
                ))
            })?;
            Auth::Basic {
                username: config.username.clone(),
                password,
            }
        } else {
            let key = std::env::var(&config.api_key_env).map_err(|_| {
                EngineError::Client(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
            Auth::ApiKey(key)
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .danger_accept_invalid_certs(!config.verify_certs)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn post(&self, url: String) -> reqwest::RequestBuilder {
        let builder = self.client.post(url);
        match &self.auth {
            Auth::ApiKey(key) => builder.header(
                reqwest::header::AUTHORIZATION,
                format!("ApiKey {key}"),
            ),
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        }
    }

    async fn search_body(&self, index: &str, body: Value) -> Result<Vec<RawHit>, EngineError> {
        let url = format!("{}/{}/_search", self.endpoint, index);
        tracing::trace!(%url, body = %body, "engine search");

        let response = self.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Rejected {
                status: status.as_u16(),
                message: annotate_engine_message(extract_reason(&text)),
            });
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.hits.hits)
    }
}

/// Pull the engine's human-readable reason out of an error body, falling
/// back to the raw text when the shape is unfamiliar.
fn extract_reason(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .pointer("/error/reason")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| value.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl SearchGateway for HttpGateway {
    async fn execute(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<RawHit>, EngineError> {
        let body = serde_json::to_value(request)
            .map_err(|e| EngineError::Client(format!("request serialization: {e}")))?;
        self.search_body(index, body).await
    }

    async fn execute_raw(&self, index: &str, query: Value) -> Result<Vec<RawHit>, EngineError> {
        self.search_body(index, query).await
    }

    async fn warm_up(&self, inference_id: &str, input: &str) -> Result<(), EngineError> {
        let url = format!("{}/_inference/{}", self.endpoint, inference_id);
        let body = serde_json::json!({ "input": [input] });

        let response = self.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Rejected {
                status: status.as_u16(),
                message: annotate_engine_message(extract_reason(&text)),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_structured_reason() {
        let body = r#"{"error":{"type":"parsing_exception","reason":"unknown field [foo]"},"status":400}"#;
        assert_eq!(extract_reason(body), "unknown field [foo]");
    }

    #[test]
    fn extracts_string_error() {
        let body = r#"{"error":"index_not_found"}"#;
        assert_eq!(extract_reason(body), "index_not_found");
    }

    #[test]
    fn falls_back_to_raw_text() {
        assert_eq!(extract_reason("gateway timeout"), "gateway timeout");
    }
}

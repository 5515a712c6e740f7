//! Compose-and-search orchestration

use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::engine::{EngineError, SearchGateway};
use crate::error::Result;
use crate::projection::{self, DisplayResult};
use crate::query::{Composer, SearchConfig, SearchRequest};

/// Probe text sent to inference endpoints when warming them up
const WARM_UP_TEXT: &str = "vector are so much fun";

/// Results together with the request that produced them, so callers can see
/// exactly what was sent to the engine.
#[derive(Debug)]
pub struct SearchOutcome {
    pub results: Vec<DisplayResult>,
    pub request: SearchRequest,
}

/// Ties the composer, gateway, and projector together behind one call. Holds
/// no mutable state; safe to share across concurrent callers.
pub struct SearchService {
    composer: Composer,
    gateway: Arc<dyn SearchGateway>,
    index: String,
    dense_inference_id: String,
    sparse_inference_id: String,
}

impl SearchService {
    pub fn new(config: &Config, gateway: Arc<dyn SearchGateway>) -> Self {
        Self {
            composer: Composer::new(config.schema.clone(), &config.inference),
            gateway,
            index: config.engine.index.clone(),
            dense_inference_id: config.inference.dense_id.clone(),
            sparse_inference_id: config.inference.sparse_id.clone(),
        }
    }

    /// Compose a request, run it, and project the hits.
    pub async fn search(&self, config: &SearchConfig) -> Result<SearchOutcome> {
        let request = self.composer.compose(config)?;
        tracing::debug!(index = %self.index, "executing composed search");

        let hits = self.gateway.execute(&self.index, &request).await?;
        let results = projection::project(&hits)?;

        tracing::debug!(hits = results.len(), "search complete");
        Ok(SearchOutcome { results, request })
    }

    /// Run a caller-supplied query document, sharing only the projector.
    pub async fn search_raw(&self, query: Value) -> Result<Vec<DisplayResult>> {
        let hits = self.gateway.execute_raw(&self.index, query).await?;
        Ok(projection::project(&hits)?)
    }

    /// Probe both semantic models so first queries do not pay a cold start.
    /// The probes run concurrently and are independent; one failing does not
    /// stop the other.
    pub async fn warm_up(&self) -> Vec<(String, std::result::Result<(), EngineError>)> {
        let (dense, sparse) = tokio::join!(
            self.gateway.warm_up(&self.dense_inference_id, WARM_UP_TEXT),
            self.gateway.warm_up(&self.sparse_inference_id, WARM_UP_TEXT),
        );

        vec![
            (self.dense_inference_id.clone(), dense),
            (self.sparse_inference_id.clone(), sparse),
        ]
    }
}

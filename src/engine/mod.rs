//! Boundary to the search engine
//!
//! The gateway owns transport and authentication; callers own retry and
//! timeout policy. Nothing in here retries, caches, or holds resources
//! across calls.

mod client;
mod response;

pub use client::HttpGateway;
pub use response::RawHit;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::query::SearchRequest;

/// Failure surfaced by the search engine or its transport. Never retried by
/// this crate; the engine's message passes through to the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Connection, TLS, or response-decoding failure
    #[error("Engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The engine rejected the request
    #[error("Engine returned HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Client-side setup problems (credentials, endpoint)
    #[error("Engine client error: {0}")]
    Client(String),
}

/// Executes requests against the search engine.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Execute a composed request and return the raw hit list, in the
    /// engine's ranking order.
    async fn execute(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<RawHit>, EngineError>;

    /// Execute a caller-supplied query document as-is, bypassing
    /// composition entirely.
    async fn execute_raw(&self, index: &str, query: Value) -> Result<Vec<RawHit>, EngineError>;

    /// Probe an inference endpoint so its model is loaded before real
    /// queries arrive.
    async fn warm_up(&self, inference_id: &str, input: &str) -> Result<(), EngineError>;
}

/// Attach a human-readable hint to engine messages that point at inference
/// problems. Best-effort substring matching only; callers needing reliable
/// categorization must not parse the annotated text.
pub(crate) fn annotate_engine_message(message: String) -> String {
    let lower = message.to_lowercase();
    if lower.contains("rerank") {
        format!("{message} (is the reranker deployment started?)")
    } else if lower.contains("inference") {
        format!("{message} (are the inference endpoints deployed? `roomrank warm` spins them up)")
    } else {
        message
    }
}

//! Wire shapes of the engine's search response

use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// One scored hit, exactly as the engine returned it. Field values are
/// list-valued and may be absent entirely; the highlight map keeps the
/// engine's field order (serde_json is built with `preserve_order`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,

    /// Engine-reported relevance; null under some sort modes
    #[serde(rename = "_score", default)]
    pub score: Option<Number>,

    #[serde(default)]
    pub fields: Map<String, Value>,

    #[serde(default)]
    pub highlight: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HitsEnvelope {
    pub hits: Vec<RawHit>,
}

//! Query composition: request model, filters, fusion, reranking
//!
//! Turns one [`SearchConfig`] into one engine request document. Composition
//! is pure and synchronous; callers may run it concurrently without
//! coordination since every call works on its own immutable values.

mod composer;
mod filter;
mod rerank;
mod request;
mod retriever;

pub use composer::Composer;
pub use filter::{build_filter, FilterClause, GeoDistance, RatingRange, DEFAULT_GEO_RADIUS_KM};
pub use rerank::apply_reranking;
pub use request::{Highlight, SearchRequest};
pub use retriever::{
    build_fusion, BaseRetriever, LinearFusion, MatchType, MultiMatchQuery, Normalizer,
    QueryClause, RankFusion, RerankStage, Retriever, SemanticQuery, StandardRetriever,
    WeightedRetriever, LINEAR_RANK_WINDOW,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default result page size
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default candidate pool depth for rank fusion
pub const DEFAULT_FUSION_WINDOW: u32 = 20;

/// Default number of fused candidates the reranker rescores
pub const DEFAULT_RERANK_WINDOW: u32 = 20;

/// Default minimum reranker score for a hit to survive
pub const DEFAULT_RERANK_MIN_SCORE: f64 = 0.5;

/// Request rejected before any engine call; never retried
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("query text cannot be empty")]
    EmptyQuery,

    #[error("{signal} weight cannot be negative (got {value})")]
    NegativeWeight { signal: &'static str, value: f64 },

    #[error("{parameter} must be greater than zero")]
    ZeroWindow { parameter: &'static str },

    #[error("latitude and longitude must be provided together")]
    IncompleteGeoPair,

    #[error("{coordinate} out of range: {value}")]
    CoordinateOutOfRange {
        coordinate: &'static str,
        value: f64,
    },

    #[error("geo radius must be greater than zero (got {0})")]
    NonPositiveRadius(f64),

    #[error("at least one lexical search field is required")]
    NoSearchFields,
}

/// Per-signal fusion weights. Zero mutes a signal but keeps its retriever in
/// the combination; only negative weights are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    /// Dense embedding signal (E5)
    #[serde(alias = "ada002")]
    pub dense: f64,

    /// Lexical best-fields signal
    #[serde(alias = "text")]
    pub lexical: f64,

    /// Sparse semantic signal (ELSER)
    #[serde(alias = "elser")]
    pub sparse: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            dense: 2.0,
            lexical: 1.0,
            sparse: 1.5,
        }
    }
}

/// How the three base signals are combined into one ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionMode {
    /// Weighted sum of min-max-normalized per-signal scores
    #[default]
    Linear,
    /// Reciprocal-rank combination over a bounded candidate pool
    Rrf,
}

/// Reranking stage parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankParams {
    /// How many fused candidates are rescored
    #[serde(alias = "rankWindowSize")]
    pub window: u32,

    /// Hits scoring below this are dropped by the reranker
    #[serde(alias = "minScore")]
    pub min_score: f64,
}

impl Default for RerankParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_RERANK_WINDOW,
            min_score: DEFAULT_RERANK_MIN_SCORE,
        }
    }
}

/// Optional geo-radius preference. Latitude and longitude must come together;
/// the radius falls back to [`DEFAULT_GEO_RADIUS_KM`] when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(alias = "radiusKm")]
    pub radius_km: Option<f64>,
}

/// Per-field highlight preference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightField {
    pub field: String,

    /// Semantic-text fields need an explicit highlighter type on the wire
    #[serde(default)]
    pub semantic: bool,

    #[serde(alias = "number_of_fragments")]
    pub fragments: u32,

    #[serde(default)]
    pub order: FragmentOrder,
}

/// Fragment ordering rule inside one highlighted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentOrder {
    /// Most relevant fragment first
    #[default]
    Score,
    /// Document order
    None,
}

/// Immutable input to a single query-build, constructed per incoming request
/// and discarded after the request document is assembled.
///
/// The serde aliases accept the legacy camelCase payload shape, so existing
/// callers keep working unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Free-text query; required, non-empty
    pub query: String,

    #[serde(default)]
    pub weights: SignalWeights,

    #[serde(default, alias = "retrieverType")]
    pub fusion: FusionMode,

    /// Candidate pool depth for rank fusion
    #[serde(default = "default_fusion_window", alias = "rrfRankWindowSize")]
    pub fusion_window: u32,

    /// Result page size
    #[serde(default = "default_page_size", alias = "resultSize")]
    pub size: u32,

    /// Fields the lexical signal matches against
    #[serde(default = "default_search_fields", alias = "selectedFields")]
    pub fields: Vec<String>,

    #[serde(default = "default_highlight", alias = "highlightConfig")]
    pub highlight: Vec<HighlightField>,

    /// Rescore the fused candidates with the neural reranker
    #[serde(default, alias = "enableReranking")]
    pub rerank: bool,

    #[serde(default, alias = "rerankingParams")]
    pub rerank_params: RerankParams,

    #[serde(default)]
    pub geo: GeoParams,

    /// Minimum hotel rating; zero means no rating requirement
    #[serde(default, alias = "minRating")]
    pub min_rating: Option<f64>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_fusion_window() -> u32 {
    DEFAULT_FUSION_WINDOW
}

/// Lexical fields searched when the caller selects none
pub fn default_search_fields() -> Vec<String> {
    vec![
        "HotelName".to_string(),
        "Description".to_string(),
        "Address".to_string(),
        "cityName".to_string(),
        "HotelFacilities".to_string(),
        "Attractions".to_string(),
    ]
}

/// Highlight configuration used when the caller provides none
pub fn default_highlight() -> Vec<HighlightField> {
    fn plain(field: &str, fragments: u32) -> HighlightField {
        HighlightField {
            field: field.to_string(),
            semantic: false,
            fragments,
            order: FragmentOrder::Score,
        }
    }
    fn semantic(field: &str, fragments: u32) -> HighlightField {
        HighlightField {
            semantic: true,
            ..plain(field, fragments)
        }
    }

    vec![
        plain("HotelName", 1),
        plain("Description", 2),
        plain("Address", 1),
        plain("HotelFacilities", 1),
        semantic("semantic_description_e5", 2),
        semantic("semantic_description_elser", 2),
    ]
}

impl SearchConfig {
    /// New configuration with all defaults applied
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            weights: SignalWeights::default(),
            fusion: FusionMode::default(),
            fusion_window: DEFAULT_FUSION_WINDOW,
            size: DEFAULT_PAGE_SIZE,
            fields: default_search_fields(),
            highlight: default_highlight(),
            rerank: false,
            rerank_params: RerankParams::default(),
            geo: GeoParams::default(),
            min_rating: None,
        }
    }

    /// Reject malformed configurations before anything reaches the engine
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.query.trim().is_empty() {
            return Err(RequestError::EmptyQuery);
        }

        for (signal, value) in [
            ("dense", self.weights.dense),
            ("lexical", self.weights.lexical),
            ("sparse", self.weights.sparse),
        ] {
            if value < 0.0 {
                return Err(RequestError::NegativeWeight { signal, value });
            }
        }

        if self.size == 0 {
            return Err(RequestError::ZeroWindow { parameter: "size" });
        }
        if self.fusion == FusionMode::Rrf && self.fusion_window == 0 {
            return Err(RequestError::ZeroWindow {
                parameter: "fusion window",
            });
        }
        if self.rerank && self.rerank_params.window == 0 {
            return Err(RequestError::ZeroWindow {
                parameter: "rerank window",
            });
        }

        if self.fields.is_empty() {
            return Err(RequestError::NoSearchFields);
        }

        if self.geo.lat.is_some() != self.geo.lon.is_some() {
            return Err(RequestError::IncompleteGeoPair);
        }
        if let Some(lat) = self.geo.lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(RequestError::CoordinateOutOfRange {
                    coordinate: "latitude",
                    value: lat,
                });
            }
        }
        if let Some(lon) = self.geo.lon {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(RequestError::CoordinateOutOfRange {
                    coordinate: "longitude",
                    value: lon,
                });
            }
        }
        if let Some(radius) = self.geo.radius_km {
            if radius <= 0.0 {
                return Err(RequestError::NonPositiveRadius(radius));
            }
        }

        Ok(())
    }
}

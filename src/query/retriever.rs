//! Typed retriever tree and the fused combination of the three base signals

use serde::Serialize;

use crate::query::{FilterClause, FusionMode, SearchConfig};

/// Candidate pool for linear fusion. Fixed well above the usual page size so
/// min-max normalization sees enough of each signal's distribution; clamped
/// up when a caller asks for more results than this.
pub const LINEAR_RANK_WINDOW: u32 = 100;

/// Query payload of one base retriever
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClause {
    /// Semantic similarity against an inference-backed field
    Semantic(SemanticQuery),
    /// Term matching over the selected lexical fields
    MultiMatch(MultiMatchQuery),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticQuery {
    pub field: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    pub fields: Vec<String>,
    #[serde(rename = "type")]
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    BestFields,
}

/// One base retriever: a query plus the shared filter when filtering is on.
/// The same clause value is attached to every node so filters apply
/// uniformly across all signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardRetriever {
    pub query: QueryClause,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterClause>,
}

/// The engine supports other retriever kinds (knn, rule); this composer only
/// ever emits standard ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseRetriever {
    Standard(StandardRetriever),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedRetriever {
    pub retriever: BaseRetriever,
    pub weight: f64,
    pub normalizer: Normalizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalizer {
    /// Rescale each signal's scores to [0,1] before weighted summation
    Minmax,
}

/// Weighted linear combination of the three base signals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearFusion {
    pub retrievers: Vec<WeightedRetriever>,
    pub rank_window_size: u32,
}

/// Reciprocal-rank combination of the three base signals, unweighted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankFusion {
    pub retrievers: Vec<BaseRetriever>,
    pub rank_window_size: u32,
}

/// Neural rerank stage wrapping a fused retriever
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RerankStage {
    pub field: String,
    pub inference_id: String,
    pub inference_text: String,
    pub rank_window_size: u32,
    pub min_score: f64,
    pub retriever: Box<Retriever>,
}

/// Top-level retrieval strategy of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Retriever {
    Linear(LinearFusion),
    Rrf(RankFusion),
    TextSimilarityReranker(RerankStage),
}

/// Combine the three base retrievers according to the requested fusion mode.
///
/// Node order is always dense, lexical, sparse in both modes, so the
/// weight-to-signal mapping stays unambiguous for diagnostics and tests. A
/// zero weight mutes its signal but the node stays in the combination.
pub fn build_fusion(
    config: &SearchConfig,
    dense_field: &str,
    sparse_field: &str,
    filter: Option<FilterClause>,
) -> Retriever {
    let nodes = [
        standard(
            QueryClause::Semantic(SemanticQuery {
                field: dense_field.to_string(),
                query: config.query.clone(),
            }),
            filter.clone(),
        ),
        standard(
            QueryClause::MultiMatch(MultiMatchQuery {
                query: config.query.clone(),
                fields: config.fields.clone(),
                match_type: MatchType::BestFields,
            }),
            filter.clone(),
        ),
        standard(
            QueryClause::Semantic(SemanticQuery {
                field: sparse_field.to_string(),
                query: config.query.clone(),
            }),
            filter,
        ),
    ];

    match config.fusion {
        FusionMode::Linear => {
            let weights = [
                config.weights.dense,
                config.weights.lexical,
                config.weights.sparse,
            ];
            Retriever::Linear(LinearFusion {
                retrievers: nodes
                    .into_iter()
                    .zip(weights)
                    .map(|(retriever, weight)| WeightedRetriever {
                        retriever,
                        weight,
                        normalizer: Normalizer::Minmax,
                    })
                    .collect(),
                rank_window_size: LINEAR_RANK_WINDOW.max(config.size),
            })
        }
        FusionMode::Rrf => Retriever::Rrf(RankFusion {
            retrievers: nodes.to_vec(),
            rank_window_size: config.fusion_window.max(config.size),
        }),
    }
}

fn standard(query: QueryClause, filter: Option<FilterClause>) -> BaseRetriever {
    BaseRetriever::Standard(StandardRetriever { query, filter })
}

//! Rerank decoration of a composed request

use crate::query::{RerankParams, RerankStage, Retriever, SearchRequest};

/// Wrap a composed request in a neural rerank stage; no-op when disabled.
///
/// The previous retrieval strategy becomes a nested retriever inside the
/// wrapper, unmodified. Field projection and highlights carry over; source
/// documents stay excluded unless the request already asked for them. The
/// rerank window never drops below the page size so the reranker always sees
/// at least a full page of candidates.
pub fn apply_reranking(
    request: SearchRequest,
    enabled: bool,
    field: &str,
    inference_id: &str,
    query: &str,
    params: RerankParams,
) -> SearchRequest {
    if !enabled {
        return request;
    }

    let size = request.size;
    SearchRequest {
        source: request.source.or(Some(false)),
        fields: request.fields,
        size: request.size,
        highlight: request.highlight,
        retriever: Retriever::TextSimilarityReranker(RerankStage {
            field: field.to_string(),
            inference_id: inference_id.to_string(),
            inference_text: query.to_string(),
            rank_window_size: params.window.max(size),
            min_score: params.min_score,
            retriever: Box::new(request.retriever),
        }),
    }
}

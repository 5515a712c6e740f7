//! Assembles one complete request document per search configuration

use crate::config::{InferenceConfig, SchemaConfig};
use crate::query::{
    apply_reranking, build_filter, build_fusion, Highlight, RequestError, SearchConfig,
    SearchRequest,
};

/// Builds engine requests from search configurations. Holds only index
/// schema and inference identifiers; every call is stateless.
pub struct Composer {
    schema: SchemaConfig,
    reranker_id: String,
}

impl Composer {
    pub fn new(schema: SchemaConfig, inference: &InferenceConfig) -> Self {
        Self {
            schema,
            reranker_id: inference.reranker_id.clone(),
        }
    }

    /// Validate, build the shared filter, fuse the three base signals,
    /// assemble the document, and optionally wrap it in a rerank stage.
    pub fn compose(&self, config: &SearchConfig) -> Result<SearchRequest, RequestError> {
        config.validate()?;

        let filter = build_filter(
            &self.schema.geo_field,
            &self.schema.rating_field,
            &config.geo,
            config.min_rating,
        );
        let retriever = build_fusion(
            config,
            &self.schema.dense_field,
            &self.schema.sparse_field,
            filter,
        );

        tracing::debug!(
            dense = config.weights.dense,
            lexical = config.weights.lexical,
            sparse = config.weights.sparse,
            fusion = ?config.fusion,
            size = config.size,
            rerank = config.rerank,
            "composed retriever"
        );

        let request = SearchRequest {
            source: None,
            fields: self.schema.projected_fields.clone(),
            size: config.size,
            highlight: Highlight {
                fields: config.highlight.clone(),
            },
            retriever,
        };

        Ok(apply_reranking(
            request,
            config.rerank,
            &self.schema.rerank_field,
            &self.reranker_id,
            &config.query,
            config.rerank_params,
        ))
    }
}

//! Integration test: compose, execute against a stub engine, project

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use roomrank::config::Config;
use roomrank::engine::{EngineError, RawHit, SearchGateway};
use roomrank::query::{SearchConfig, SearchRequest};
use roomrank::service::SearchService;

/// Canned engine; returns the same hits for every query.
struct StubGateway {
    hits: Vec<Value>,
    failing_inference: Option<String>,
}

impl StubGateway {
    fn parse_hits(&self) -> Vec<RawHit> {
        self.hits
            .iter()
            .map(|hit| serde_json::from_value(hit.clone()).unwrap())
            .collect()
    }
}

#[async_trait]
impl SearchGateway for StubGateway {
    async fn execute(
        &self,
        _index: &str,
        _request: &SearchRequest,
    ) -> Result<Vec<RawHit>, EngineError> {
        Ok(self.parse_hits())
    }

    async fn execute_raw(&self, _index: &str, _query: Value) -> Result<Vec<RawHit>, EngineError> {
        Ok(self.parse_hits())
    }

    async fn warm_up(&self, inference_id: &str, _input: &str) -> Result<(), EngineError> {
        if self.failing_inference.as_deref() == Some(inference_id) {
            return Err(EngineError::Rejected {
                status: 404,
                message: format!("Inference endpoint not found [{inference_id}]"),
            });
        }
        Ok(())
    }
}

fn service_with(hits: Vec<Value>, failing_inference: Option<String>) -> SearchService {
    let config = Config::default();
    let gateway = Arc::new(StubGateway {
        hits,
        failing_inference,
    });
    SearchService::new(&config, gateway)
}

fn two_beach_hits() -> Vec<Value> {
    vec![
        json!({
            "_id": "h1",
            "_score": 3.25,
            "fields": {
                "HotelName": ["Playa Grande"],
                "Description": ["Right on the sand"],
                "Address": ["1 Ocean Drive"],
                "cityName": ["Valencia"],
                "HotelFacilities": ["Pool; Spa"],
                "HotelRating": [4.5],
                "Attractions": ["Old town nearby"]
            },
            "highlight": {
                "Description": ["Right on the <em>sand</em>"],
                "HotelName": ["<em>Playa</em> Grande"]
            }
        }),
        json!({
            "_id": "h2",
            "_score": 1.0,
            "fields": {
                "HotelName": ["Backstreet Rooms"],
                "HotelRating": []
            }
        }),
    ]
}

#[tokio::test]
async fn pipeline_projects_hits_in_engine_order_with_fallbacks() {
    let service = service_with(two_beach_hits(), None);

    // muted sparse signal, small page: the composed request keeps all three
    // nodes and the projector keeps both hits
    let mut search = SearchConfig::new("beach resort");
    search.weights.sparse = 0.0;
    search.size = 5;

    let outcome = service.search(&search).await.unwrap();

    println!("✓ {} hits projected", outcome.results.len());
    for (i, result) in outcome.results.iter().enumerate() {
        println!("  {}. {} (score {})", i + 1, result.hotel_name, result.score);
    }

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].id, "h1");
    assert_eq!(outcome.results[1].id, "h2");

    assert_eq!(outcome.results[0].hotel_name, "Playa Grande");
    assert_eq!(outcome.results[0].rating, 4.5);
    assert_eq!(
        outcome.results[0].highlights,
        vec!["Right on the <em>sand</em>", "<em>Playa</em> Grande"]
    );

    // absent and empty fields fall back instead of failing
    assert_eq!(outcome.results[1].description, "N/A");
    assert_eq!(outcome.results[1].facilities, "N/A");
    assert_eq!(outcome.results[1].rating, 0.0);
    assert!(outcome.results[1].highlights.is_empty());

    // the composed request rides along for observability
    let request = serde_json::to_value(&outcome.request).unwrap();
    assert_eq!(
        request.pointer("/retriever/linear/retrievers/2/weight"),
        Some(&json!(0.0))
    );
    assert_eq!(request["size"], json!(5));
}

#[tokio::test]
async fn invalid_request_never_reaches_the_gateway() {
    let service = service_with(two_beach_hits(), None);

    let error = service.search(&SearchConfig::new("")).await.unwrap_err();
    assert!(error.to_string().contains("query text cannot be empty"));
}

#[tokio::test]
async fn raw_queries_reuse_the_projector() {
    let service = service_with(two_beach_hits(), None);

    let results = service
        .search_raw(json!({ "query": { "match_all": {} } }))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].hotel_name, "Playa Grande");
    assert_eq!(results[1].description, "N/A");
}

#[tokio::test]
async fn warm_up_statuses_are_independent_per_model() {
    let config = Config::default();
    let sparse_id = config.inference.sparse_id.clone();

    let service = service_with(Vec::new(), Some(sparse_id.clone()));
    let statuses = service.warm_up().await;

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].0, config.inference.dense_id);
    assert!(statuses[0].1.is_ok());
    assert_eq!(statuses[1].0, sparse_id);
    assert!(statuses[1].1.is_err());
}

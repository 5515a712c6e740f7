//! Integration test: composed request documents match the engine wire shape

use roomrank::config::Config;
use roomrank::query::{Composer, FusionMode, SearchConfig};
use serde_json::json;

fn composer() -> Composer {
    let config = Config::default();
    Composer::new(config.schema, &config.inference)
}

#[test]
fn linear_defaults_compose_the_full_wire_document() {
    let request = composer().compose(&SearchConfig::new("beach resort")).unwrap();

    let lexical_fields = json!([
        "HotelName",
        "Description",
        "Address",
        "cityName",
        "HotelFacilities",
        "Attractions"
    ]);

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "fields": [
                "HotelName",
                "Description",
                "Address",
                "cityName",
                "HotelFacilities",
                "HotelRating",
                "Attractions"
            ],
            "size": 20,
            "highlight": {
                "fields": {
                    "HotelName": { "number_of_fragments": 1, "order": "score" },
                    "Description": { "number_of_fragments": 2, "order": "score" },
                    "Address": { "number_of_fragments": 1, "order": "score" },
                    "HotelFacilities": { "number_of_fragments": 1, "order": "score" },
                    "semantic_description_e5": {
                        "type": "semantic",
                        "number_of_fragments": 2,
                        "order": "score"
                    },
                    "semantic_description_elser": {
                        "type": "semantic",
                        "number_of_fragments": 2,
                        "order": "score"
                    }
                }
            },
            "retriever": {
                "linear": {
                    "retrievers": [
                        {
                            "retriever": {
                                "standard": {
                                    "query": {
                                        "semantic": {
                                            "field": "semantic_description_e5",
                                            "query": "beach resort"
                                        }
                                    }
                                }
                            },
                            "weight": 2.0,
                            "normalizer": "minmax"
                        },
                        {
                            "retriever": {
                                "standard": {
                                    "query": {
                                        "multi_match": {
                                            "query": "beach resort",
                                            "fields": lexical_fields,
                                            "type": "best_fields"
                                        }
                                    }
                                }
                            },
                            "weight": 1.0,
                            "normalizer": "minmax"
                        },
                        {
                            "retriever": {
                                "standard": {
                                    "query": {
                                        "semantic": {
                                            "field": "semantic_description_elser",
                                            "query": "beach resort"
                                        }
                                    }
                                }
                            },
                            "weight": 1.5,
                            "normalizer": "minmax"
                        }
                    ],
                    "rank_window_size": 100
                }
            }
        })
    );
}

#[test]
fn muted_sparse_signal_keeps_its_node_with_weight_zero() {
    let mut search = SearchConfig::new("beach resort");
    search.weights.sparse = 0.0;
    search.size = 5;

    let request = composer().compose(&search).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    let retrievers = value
        .pointer("/retriever/linear/retrievers")
        .and_then(|v| v.as_array())
        .unwrap();
    assert_eq!(retrievers.len(), 3);
    assert_eq!(retrievers[2]["weight"], json!(0.0));
    assert_eq!(value["size"], json!(5));
}

#[test]
fn rrf_composes_unweighted_nodes_with_caller_window() {
    let mut search = SearchConfig::new("city break");
    search.fusion = FusionMode::Rrf;
    search.fusion_window = 40;

    let request = composer().compose(&search).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    let rrf = value.pointer("/retriever/rrf").unwrap();
    assert_eq!(rrf["rank_window_size"], json!(40));

    let retrievers = rrf["retrievers"].as_array().unwrap();
    assert_eq!(retrievers.len(), 3);
    // unweighted: plain standard retrievers, no weight/normalizer wrappers
    for node in retrievers {
        assert!(node.get("standard").is_some());
        assert!(node.get("weight").is_none());
    }
    assert_eq!(
        retrievers[0].pointer("/standard/query/semantic/field"),
        Some(&json!("semantic_description_e5"))
    );
    assert!(retrievers[1]
        .pointer("/standard/query/multi_match")
        .is_some());
    assert_eq!(
        retrievers[2].pointer("/standard/query/semantic/field"),
        Some(&json!("semantic_description_elser"))
    );
}

#[test]
fn reranked_request_nests_the_fusion_and_excludes_source() {
    let mut search = SearchConfig::new("spa weekend");
    search.rerank = true;
    search.rerank_params.window = 30;
    search.rerank_params.min_score = 0.4;

    let request = composer().compose(&search).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["_source"], json!(false));

    let stage = value.pointer("/retriever/text_similarity_reranker").unwrap();
    assert_eq!(stage["field"], json!("combined_fields"));
    assert_eq!(stage["inference_id"], json!(".rerank-v1-elasticsearch"));
    assert_eq!(stage["inference_text"], json!("spa weekend"));
    assert_eq!(stage["rank_window_size"], json!(30));
    assert_eq!(stage["min_score"], json!(0.4));

    // the inner fusion is the untouched linear retriever
    let inner = stage.pointer("/retriever/linear/retrievers").unwrap();
    assert_eq!(inner.as_array().unwrap().len(), 3);

    // highlight carries over unchanged
    assert!(value.pointer("/highlight/fields/HotelName").is_some());
}

#[test]
fn both_filters_conjoin_and_attach_to_every_node() {
    let mut search = SearchConfig::new("harbour view");
    search.geo.lat = Some(41.38);
    search.geo.lon = Some(2.17);
    search.min_rating = Some(4.0);

    let request = composer().compose(&search).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    let expected_filter = json!({
        "bool": {
            "filter": [
                {
                    "geo_distance": {
                        "distance": "10km",
                        "location": { "lat": 41.38, "lon": 2.17 }
                    }
                },
                { "range": { "HotelRating": { "gte": 4.0 } } }
            ]
        }
    });

    for i in 0..3 {
        let filter = value
            .pointer(&format!("/retriever/linear/retrievers/{i}/retriever/standard/filter"))
            .unwrap();
        assert_eq!(filter, &expected_filter);
    }
}

#[test]
fn zero_rating_and_no_geo_compose_without_any_filter() {
    let mut search = SearchConfig::new("quiet stay");
    search.min_rating = Some(0.0);

    let request = composer().compose(&search).unwrap();
    let value = serde_json::to_value(&request).unwrap();

    for i in 0..3 {
        let standard = value
            .pointer(&format!("/retriever/linear/retrievers/{i}/retriever/standard"))
            .unwrap();
        assert!(standard.get("filter").is_none());
    }
}

#[test]
fn composition_is_idempotent() {
    let mut search = SearchConfig::new("beach resort");
    search.rerank = true;
    search.geo.lat = Some(41.38);
    search.geo.lon = Some(2.17);
    search.min_rating = Some(3.0);

    let composer = composer();
    let first = composer.compose(&search).unwrap();
    let second = composer.compose(&search).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

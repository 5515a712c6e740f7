//! Projects raw engine hits into display-ready results
//!
//! One result per hit, in the order the engine returned them; the engine's
//! ranking is authoritative and is never re-sorted here. Absent fields fall
//! back to defined defaults instead of failing; only structurally invalid
//! payloads raise an error.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::engine::RawHit;

/// Structurally invalid hit payload. Plain absence of a field is never an
/// error; it takes the fallback value instead.
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Field {field} on hit {id} is not list-valued")]
    MalformedField { id: String, field: String },

    #[error("Rating value on hit {id} is not numeric")]
    MalformedRating { id: String },

    #[error("Highlight fragments for {field} on hit {id} are not strings")]
    MalformedHighlight { id: String, field: String },
}

/// Fallback for display fields the engine returned nothing for
const TEXT_FALLBACK: &str = "N/A";

/// UI-stable projection of one hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayResult {
    /// Relevance as reported by the engine, kept textual so transport never
    /// loses precision
    pub score: String,

    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "HotelName")]
    pub hotel_name: String,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Address")]
    pub address: String,

    #[serde(rename = "HotelFacilities")]
    pub facilities: String,

    #[serde(rename = "HotelRating")]
    pub rating: f64,

    #[serde(rename = "cityName")]
    pub city: String,

    #[serde(rename = "Attractions")]
    pub attractions: String,

    /// All highlight fragments across highlighted fields, flattened in the
    /// order the engine reported them
    pub highlights: Vec<String>,
}

/// Project the full hit list, order-preserving, no truncation. Page size is
/// the request's concern, not the projector's.
pub fn project(hits: &[RawHit]) -> Result<Vec<DisplayResult>, ProjectionError> {
    hits.iter().map(project_hit).collect()
}

fn project_hit(hit: &RawHit) -> Result<DisplayResult, ProjectionError> {
    Ok(DisplayResult {
        score: hit
            .score
            .as_ref()
            .map(|score| score.to_string())
            .unwrap_or_else(|| "0".to_string()),
        id: hit.id.clone(),
        hotel_name: text_field(hit, "HotelName")?,
        description: text_field(hit, "Description")?,
        address: text_field(hit, "Address")?,
        facilities: text_field(hit, "HotelFacilities")?,
        rating: rating_field(hit, "HotelRating")?,
        city: text_field(hit, "cityName")?,
        attractions: text_field(hit, "Attractions")?,
        highlights: flatten_highlights(hit)?,
    })
}

/// First value of a list-valued field, or None when the field is absent or
/// its list is empty.
fn first_value<'a>(hit: &'a RawHit, field: &str) -> Result<Option<&'a Value>, ProjectionError> {
    match hit.fields.get(field) {
        None => Ok(None),
        Some(Value::Array(values)) => Ok(values.first()),
        Some(_) => Err(ProjectionError::MalformedField {
            id: hit.id.clone(),
            field: field.to_string(),
        }),
    }
}

fn text_field(hit: &RawHit, field: &str) -> Result<String, ProjectionError> {
    Ok(match first_value(hit, field)? {
        Some(Value::String(text)) => text.clone(),
        None | Some(Value::Null) => TEXT_FALLBACK.to_string(),
        Some(other) => other.to_string(),
    })
}

fn rating_field(hit: &RawHit, field: &str) -> Result<f64, ProjectionError> {
    match first_value(hit, field)? {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| ProjectionError::MalformedRating { id: hit.id.clone() }),
    }
}

fn flatten_highlights(hit: &RawHit) -> Result<Vec<String>, ProjectionError> {
    let mut fragments = Vec::new();
    if let Some(highlight) = &hit.highlight {
        for (field, value) in highlight {
            match value {
                Value::Array(list) => {
                    for fragment in list {
                        match fragment {
                            Value::String(text) => fragments.push(text.clone()),
                            _ => {
                                return Err(ProjectionError::MalformedHighlight {
                                    id: hit.id.clone(),
                                    field: field.clone(),
                                })
                            }
                        }
                    }
                }
                _ => {
                    return Err(ProjectionError::MalformedHighlight {
                        id: hit.id.clone(),
                        field: field.clone(),
                    })
                }
            }
        }
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(value: serde_json::Value) -> RawHit {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_fields_take_fallbacks() {
        let results = project(&[hit(json!({
            "_id": "h1",
            "_score": 1.5,
            "fields": { "HotelName": ["Sea View"] }
        }))])
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hotel_name, "Sea View");
        assert_eq!(results[0].facilities, "N/A");
        assert_eq!(results[0].description, "N/A");
        assert_eq!(results[0].rating, 0.0);
        assert_eq!(results[0].score, "1.5");
    }

    #[test]
    fn empty_rating_list_projects_zero() {
        let results = project(&[hit(json!({
            "_id": "h1",
            "_score": 0.2,
            "fields": { "HotelRating": [] }
        }))])
        .unwrap();
        assert_eq!(results[0].rating, 0.0);
    }

    #[test]
    fn null_score_projects_textual_zero() {
        let results = project(&[hit(json!({
            "_id": "h1",
            "_score": null
        }))])
        .unwrap();
        assert_eq!(results[0].score, "0");
    }

    #[test]
    fn engine_order_is_preserved() {
        let hits = vec![
            hit(json!({ "_id": "b", "_score": 0.1 })),
            hit(json!({ "_id": "a", "_score": 0.9 })),
        ];
        let results = project(&hits).unwrap();
        assert_eq!(results[0].id, "b");
        assert_eq!(results[1].id, "a");
    }

    #[test]
    fn highlights_flatten_in_engine_field_order() {
        let results = project(&[hit(json!({
            "_id": "h1",
            "_score": 1.0,
            "fields": {},
            "highlight": {
                "Description": ["frag one", "frag two"],
                "HotelName": ["frag three"]
            }
        }))])
        .unwrap();

        assert_eq!(
            results[0].highlights,
            vec!["frag one", "frag two", "frag three"]
        );
    }

    #[test]
    fn scalar_field_value_is_malformed() {
        let error = project(&[hit(json!({
            "_id": "h1",
            "_score": 1.0,
            "fields": { "HotelName": "not a list" }
        }))])
        .unwrap_err();
        assert!(matches!(error, ProjectionError::MalformedField { .. }));
    }

    #[test]
    fn non_numeric_rating_is_malformed() {
        let error = project(&[hit(json!({
            "_id": "h1",
            "_score": 1.0,
            "fields": { "HotelRating": ["five stars"] }
        }))])
        .unwrap_err();
        assert!(matches!(error, ProjectionError::MalformedRating { .. }));
    }

    #[test]
    fn non_string_highlight_is_malformed() {
        let error = project(&[hit(json!({
            "_id": "h1",
            "_score": 1.0,
            "fields": {},
            "highlight": { "Description": [42] }
        }))])
        .unwrap_err();
        assert!(matches!(error, ProjectionError::MalformedHighlight { .. }));
    }
}

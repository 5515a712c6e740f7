//! Final request document and its highlight section

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::query::{HighlightField, Retriever};

/// The complete search-request document. Built fresh per call, sent once,
/// and discarded; structural equality backs the idempotence guarantees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Source-document inclusion. Absent means engine default; reranked
    /// requests force it off unless a caller already asked for sources.
    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<bool>,

    /// Fields projected back on every hit
    pub fields: Vec<String>,

    /// Result page size
    pub size: u32,

    pub highlight: Highlight,

    /// Retrieval strategy: a bare fusion or a rerank wrapper around one
    pub retriever: Retriever,
}

/// Highlight section; one entry per highlighted field
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub fields: Vec<HighlightField>,
}

// The wire shape keys each entry by field name:
//   {"fields": {"<name>": {"type"?: "semantic", "number_of_fragments": N, "order": "score"}}}

impl Serialize for Highlight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("fields", &FieldsMap(&self.fields))?;
        map.end()
    }
}

struct FieldsMap<'a>(&'a [HighlightField]);

impl Serialize for FieldsMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
            kind: Option<&'static str>,
            number_of_fragments: u32,
            order: &'a crate::query::FragmentOrder,
        }

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(
                &field.field,
                &Entry {
                    kind: field.semantic.then_some("semantic"),
                    number_of_fragments: field.fragments,
                    order: &field.order,
                },
            )?;
        }
        map.end()
    }
}

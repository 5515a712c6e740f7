//! Geo and rating filters, AND-composed into one boolean clause

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::query::GeoParams;

/// Radius applied when a geo filter is requested without one, in kilometres
pub const DEFAULT_GEO_RADIUS_KM: f64 = 10.0;

/// Distance filter around a point
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistance {
    pub field: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

/// Minimum-rating filter
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRange {
    pub field: String,
    pub min: f64,
}

/// Boolean filter attached uniformly to every base retriever. A single
/// sub-filter stays unwrapped; two are conjoined.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    Geo(GeoDistance),
    Rating(RatingRange),
    Both {
        geo: GeoDistance,
        rating: RatingRange,
    },
}

/// Build the combined filter for a request, if any preference is set.
///
/// The geo sub-filter needs both coordinates; the rating sub-filter needs a
/// minimum strictly above zero. Zero means "no rating requirement", not
/// "rating at least the default".
pub fn build_filter(
    geo_field: &str,
    rating_field: &str,
    geo: &GeoParams,
    min_rating: Option<f64>,
) -> Option<FilterClause> {
    let geo_clause = match (geo.lat, geo.lon) {
        (Some(lat), Some(lon)) => Some(GeoDistance {
            field: geo_field.to_string(),
            lat,
            lon,
            radius_km: geo.radius_km.unwrap_or(DEFAULT_GEO_RADIUS_KM),
        }),
        _ => None,
    };

    let rating_clause = min_rating
        .filter(|min| *min > 0.0)
        .map(|min| RatingRange {
            field: rating_field.to_string(),
            min,
        });

    match (geo_clause, rating_clause) {
        (Some(geo), Some(rating)) => Some(FilterClause::Both { geo, rating }),
        (Some(geo), None) => Some(FilterClause::Geo(geo)),
        (None, Some(rating)) => Some(FilterClause::Rating(rating)),
        (None, None) => None,
    }
}

// Wire shapes need the field name as a JSON key, so these are hand-rolled:
//   {"geo_distance": {"distance": "10km", "<field>": {"lat": .., "lon": ..}}}
//   {"range": {"<field>": {"gte": ..}}}
//   {"bool": {"filter": [<geo>, <rating>]}}

impl Serialize for FilterClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterClause::Geo(geo) => GeoLeaf(geo).serialize(serializer),
            FilterClause::Rating(rating) => RatingLeaf(rating).serialize(serializer),
            FilterClause::Both { geo, rating } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(
                    "bool",
                    &BoolBody {
                        filter: (GeoLeaf(geo), RatingLeaf(rating)),
                    },
                )?;
                map.end()
            }
        }
    }
}

#[derive(Serialize)]
struct BoolBody<'a> {
    filter: (GeoLeaf<'a>, RatingLeaf<'a>),
}

struct GeoLeaf<'a>(&'a GeoDistance);

impl Serialize for GeoLeaf<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("geo_distance", &GeoBody(self.0))?;
        map.end()
    }
}

struct GeoBody<'a>(&'a GeoDistance);

impl Serialize for GeoBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Point {
            lat: f64,
            lon: f64,
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("distance", &format!("{}km", self.0.radius_km))?;
        map.serialize_entry(
            &self.0.field,
            &Point {
                lat: self.0.lat,
                lon: self.0.lon,
            },
        )?;
        map.end()
    }
}

struct RatingLeaf<'a>(&'a RatingRange);

impl Serialize for RatingLeaf<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("range", &RangeBody(self.0))?;
        map.end()
    }
}

struct RangeBody<'a>(&'a RatingRange);

impl Serialize for RangeBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Gte {
            gte: f64,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.0.field, &Gte { gte: self.0.min })?;
        map.end()
    }
}

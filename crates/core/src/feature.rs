//! Typed feature records for the alignment pipeline
//!
//! The source datasets carry untyped GeoJSON property bags. The fields the
//! pipeline actually reads (`addr:housenumber`, `addr:street`, `addr:unit`)
//! are parsed into explicit optional fields at load time; the full original
//! property map is kept alongside so output features round-trip losslessly.

use geo_types::{Coord, Point, Polygon};
use geojson::JsonObject;
use serde_json::Value;

/// Property key linking an address to its parcel
pub const HOUSENUMBER_KEY: &str = "addr:housenumber";
/// Street name property key
pub const STREET_KEY: &str = "addr:street";
/// Unit/suite property key
pub const UNIT_KEY: &str = "addr:unit";

/// Address tags parsed from the property bag at load time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressTags {
    pub housenumber: Option<String>,
    pub street: Option<String>,
    pub unit: Option<String>,
}

impl AddressTags {
    /// Parse the recognized `addr:*` keys out of a property map.
    pub fn from_properties(properties: &JsonObject) -> Self {
        Self {
            housenumber: string_property(properties, HOUSENUMBER_KEY),
            street: string_property(properties, STREET_KEY),
            unit: string_property(properties, UNIT_KEY),
        }
    }
}

/// An address point awaiting alignment.
///
/// The point geometry is replaced with the matched building's visual center
/// when a match is found; everything else is passed through untouched.
#[derive(Debug, Clone)]
pub struct Address {
    pub point: Point<f64>,
    pub tags: AddressTags,
    pub properties: JsonObject,
}

/// A building footprint polygon.
///
/// The planar area (square feet) is derived at index time, not stored here;
/// building records are never mutated by the pipeline.
#[derive(Debug, Clone)]
pub struct Building {
    pub polygon: Polygon<f64>,
    pub properties: JsonObject,
}

/// A parcel polygon whose housenumber confirms address ownership.
#[derive(Debug, Clone)]
pub struct Parcel {
    pub polygon: Polygon<f64>,
    pub housenumber: Option<String>,
    pub properties: JsonObject,
}

/// Diagnostic line from an address's original coordinate to its matched
/// building center, annotated with the snap distance in the ruler's unit.
#[derive(Debug, Clone)]
pub struct MatchLine {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
    pub distance: f64,
}

/// Read a property as a string, stringifying JSON numbers so numeric and
/// string housenumbers compare equal after load.
pub fn string_property(properties: &JsonObject, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//! GeoJSON reading and writing
//!
//! Whole-file loaders for the three input datasets and writers for the two
//! outputs. A file that is absent or not valid GeoJSON fails the run;
//! individual features with missing or unexpected geometry are skipped with
//! a warning so one bad record cannot abort a batch.

use std::fs;
use std::path::Path;

use geo_types::{LineString, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::feature::{Address, AddressTags, Building, MatchLine, Parcel, HOUSENUMBER_KEY};

/// Read a GeoJSON FeatureCollection from disk.
pub fn read_feature_collection<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let contents = fs::read_to_string(path)?;
    match contents.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        GeoJson::Feature(_) => Err(Error::NotAFeatureCollection("Feature")),
        GeoJson::Geometry(_) => Err(Error::NotAFeatureCollection("Geometry")),
    }
}

/// Serialize a FeatureCollection to disk, overwriting any existing file.
pub fn write_feature_collection<P: AsRef<Path>>(
    path: P,
    collection: &FeatureCollection,
) -> Result<()> {
    let json = serde_json::to_string(collection)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load address points, preserving input order.
///
/// Features without a Point geometry are skipped with a warning.
pub fn load_addresses<P: AsRef<Path>>(path: P) -> Result<Vec<Address>> {
    let fc = read_feature_collection(path)?;
    let mut addresses = Vec::with_capacity(fc.features.len());
    for (index, feature) in fc.features.into_iter().enumerate() {
        let (geometry, properties) = match split_feature(feature, "address", index) {
            Some(parts) => parts,
            None => continue,
        };
        match geo_types::Geometry::<f64>::try_from(geometry.value) {
            Ok(geo_types::Geometry::Point(point)) => {
                let tags = AddressTags::from_properties(&properties);
                addresses.push(Address {
                    point,
                    tags,
                    properties,
                });
            }
            Ok(other) => warn_geometry_type("address", index, &other),
            Err(e) => warn!(feature = index, "skipping address: {}", e),
        }
    }
    Ok(addresses)
}

/// Load building footprints, preserving input order.
///
/// MultiPolygons are split into one building per member polygon.
pub fn load_buildings<P: AsRef<Path>>(path: P) -> Result<Vec<Building>> {
    let fc = read_feature_collection(path)?;
    let mut buildings = Vec::with_capacity(fc.features.len());
    for (index, feature) in fc.features.into_iter().enumerate() {
        let (geometry, properties) = match split_feature(feature, "building", index) {
            Some(parts) => parts,
            None => continue,
        };
        for polygon in polygons_of(geometry, "building", index) {
            buildings.push(Building {
                polygon,
                properties: properties.clone(),
            });
        }
    }
    Ok(buildings)
}

/// Load parcels, preserving input order.
///
/// MultiPolygons are split into one parcel per member polygon; the parsed
/// housenumber is shared by the parts.
pub fn load_parcels<P: AsRef<Path>>(path: P) -> Result<Vec<Parcel>> {
    let fc = read_feature_collection(path)?;
    let mut parcels = Vec::with_capacity(fc.features.len());
    for (index, feature) in fc.features.into_iter().enumerate() {
        let (geometry, properties) = match split_feature(feature, "parcel", index) {
            Some(parts) => parts,
            None => continue,
        };
        let housenumber = crate::feature::string_property(&properties, HOUSENUMBER_KEY);
        for polygon in polygons_of(geometry, "parcel", index) {
            parcels.push(Parcel {
                polygon,
                housenumber: housenumber.clone(),
                properties: properties.clone(),
            });
        }
    }
    Ok(parcels)
}

/// Write the aligned address collection.
pub fn write_addresses<P: AsRef<Path>>(path: P, addresses: &[Address]) -> Result<()> {
    let features = addresses
        .iter()
        .map(|address| Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&address.point))),
            id: None,
            properties: Some(address.properties.clone()),
            foreign_members: None,
        })
        .collect();
    write_feature_collection(path, &collection(features))
}

/// Write the diagnostic snap-line collection.
pub fn write_match_lines<P: AsRef<Path>>(path: P, lines: &[MatchLine]) -> Result<()> {
    let features = lines
        .iter()
        .map(|line| {
            let geometry = LineString::new(vec![line.start, line.end]);
            let mut properties = JsonObject::new();
            properties.insert("distance".to_string(), Value::from(line.distance));
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    write_feature_collection(path, &collection(features))
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Pull geometry and properties out of a feature, warning when the
/// geometry is absent.
fn split_feature(
    feature: Feature,
    what: &str,
    index: usize,
) -> Option<(geojson::Geometry, JsonObject)> {
    let properties = feature.properties.unwrap_or_default();
    match feature.geometry {
        Some(geometry) => Some((geometry, properties)),
        None => {
            warn!(feature = index, "skipping {} without geometry", what);
            None
        }
    }
}

/// Extract the polygons of a polygonal feature, splitting MultiPolygons.
fn polygons_of(geometry: geojson::Geometry, what: &str, index: usize) -> Vec<Polygon<f64>> {
    match geo_types::Geometry::<f64>::try_from(geometry.value) {
        Ok(geo_types::Geometry::Polygon(polygon)) => vec![polygon],
        Ok(geo_types::Geometry::MultiPolygon(multi)) => multi.0,
        Ok(other) => {
            warn_geometry_type(what, index, &other);
            Vec::new()
        }
        Err(e) => {
            warn!(feature = index, "skipping {}: {}", what, e);
            Vec::new()
        }
    }
}

fn warn_geometry_type(what: &str, index: usize, geometry: &geo_types::Geometry<f64>) {
    let name = match geometry {
        geo_types::Geometry::Point(_) => "Point",
        geo_types::Geometry::Line(_) => "Line",
        geo_types::Geometry::LineString(_) => "LineString",
        geo_types::Geometry::Polygon(_) => "Polygon",
        geo_types::Geometry::MultiPoint(_) => "MultiPoint",
        geo_types::Geometry::MultiLineString(_) => "MultiLineString",
        geo_types::Geometry::MultiPolygon(_) => "MultiPolygon",
        _ => "GeometryCollection",
    };
    warn!(
        feature = index,
        "skipping {} with unexpected {} geometry", what, name
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Coord, Point};
    use tempfile::NamedTempFile;

    fn temp() -> NamedTempFile {
        NamedTempFile::with_suffix(".geojson").unwrap()
    }

    #[test]
    fn test_address_round_trip() {
        let mut properties = JsonObject::new();
        properties.insert(
            HOUSENUMBER_KEY.to_string(),
            Value::String("100".to_string()),
        );
        properties.insert("city".to_string(), Value::String("Ottawa".to_string()));
        let address = Address {
            point: Point::new(-75.69123456, 45.42987654),
            tags: AddressTags::from_properties(&properties),
            properties,
        };

        let file = temp();
        write_addresses(file.path(), &[address.clone()]).unwrap();
        let loaded = load_addresses(file.path()).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].point, address.point);
        assert_eq!(loaded[0].properties, address.properties);
        assert_eq!(loaded[0].tags.housenumber.as_deref(), Some("100"));
    }

    #[test]
    fn test_write_is_idempotent() {
        let address = Address {
            point: Point::new(-75.7, 45.4),
            tags: AddressTags::default(),
            properties: JsonObject::new(),
        };
        let first = temp();
        let second = temp();
        write_addresses(first.path(), &[address.clone()]).unwrap();
        write_addresses(second.path(), &[address]).unwrap();
        assert_eq!(
            fs::read(first.path()).unwrap(),
            fs::read(second.path()).unwrap()
        );
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = read_feature_collection("no-such-file.geojson");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_not_a_feature_collection() {
        let file = temp();
        fs::write(
            file.path(),
            r#"{"type":"Point","coordinates":[-75.7,45.4]}"#,
        )
        .unwrap();
        let result = read_feature_collection(file.path());
        assert!(matches!(result, Err(Error::NotAFeatureCollection(_))));
    }

    #[test]
    fn test_multipolygon_split() {
        let file = temp();
        fs::write(
            file.path(),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"addr:housenumber":"12"},
                 "geometry":{"type":"MultiPolygon","coordinates":[
                    [[[0,0],[1,0],[1,1],[0,1],[0,0]]],
                    [[[2,0],[3,0],[3,1],[2,1],[2,0]]]
                 ]}}
            ]}"#,
        )
        .unwrap();
        let parcels = load_parcels(file.path()).unwrap();
        assert_eq!(parcels.len(), 2);
        assert_eq!(parcels[0].housenumber.as_deref(), Some("12"));
        assert_eq!(parcels[1].housenumber.as_deref(), Some("12"));
    }

    #[test]
    fn test_non_point_address_skipped() {
        let file = temp();
        fs::write(
            file.path(),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},
                 "geometry":{"type":"Point","coordinates":[-75.7,45.4]}},
                {"type":"Feature","properties":{},
                 "geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}},
                {"type":"Feature","properties":{},"geometry":null}
            ]}"#,
        )
        .unwrap();
        let addresses = load_addresses(file.path()).unwrap();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].point, Point::new(-75.7, 45.4));
    }

    #[test]
    fn test_match_line_distance_property() {
        let line = MatchLine {
            start: Coord { x: -75.7, y: 45.4 },
            end: Coord { x: -75.69, y: 45.41 },
            distance: 123.5,
        };
        let file = temp();
        write_match_lines(file.path(), &[line]).unwrap();
        let fc = read_feature_collection(file.path()).unwrap();
        assert_eq!(fc.features.len(), 1);
        let properties = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(properties.get("distance"), Some(&Value::from(123.5)));
    }
}

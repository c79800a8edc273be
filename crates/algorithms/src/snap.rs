//! Address-to-building alignment
//!
//! For each address point: find the parcel that contains it and shares its
//! housenumber, collect the indexed buildings sitting inside that parcel
//! (with a small metric tolerance at the boundary), resolve the
//! two-candidate case by footprint area, and snap the address onto the
//! surviving building's visual center. Addresses that cannot be resolved
//! unambiguously pass through unmodified; a non-match is a valid terminal
//! outcome, not an error.

use geo::Contains;
use geo_types::{Coord, Point, Polygon};
use tracing::{info, warn};

use parcelsnap_core::{Address, Building, MatchLine, Parcel, Result};

use crate::index::{BuildingEntry, BuildingIndex, ParcelIndex};
use crate::ruler::PlanarRuler;
use crate::visual_center::visual_center;

/// Matcher tuning knobs
#[derive(Debug, Clone)]
pub struct SnapParams {
    /// Minimum building area (ruler square units) to be index-eligible
    pub min_sqft: f64,
    /// Outward parcel buffer tolerance, meters
    pub max_parcel_buffer: f64,
    /// Building vertices allowed outside the buffered parcel
    pub max_partials: usize,
    /// Visual-center refinement precision, degrees
    pub center_precision: f64,
}

impl Default for SnapParams {
    fn default() -> Self {
        Self {
            min_sqft: 700.0,
            max_parcel_buffer: 3.0,
            max_partials: 0,
            center_precision: 0.00001,
        }
    }
}

/// Result of an alignment run
#[derive(Debug, Default)]
pub struct Alignment {
    /// All input addresses in input order, snapped where matched
    pub addresses: Vec<Address>,
    /// One diagnostic line per successful match
    pub lines: Vec<MatchLine>,
    /// Addresses snapped to a building center
    pub matched: usize,
    /// Addresses skipped due to a per-feature error
    pub skipped: usize,
}

/// Align every address against the parcel and building layers.
///
/// Addresses are processed and emitted in input order. Per-feature failures
/// (degenerate geometry during centering) are logged and counted as
/// skipped; they never abort the run.
pub fn align_addresses(
    addresses: Vec<Address>,
    buildings: &[Building],
    building_index: &BuildingIndex,
    parcels: &[Parcel],
    parcel_index: &ParcelIndex,
    ruler: &PlanarRuler,
    params: &SnapParams,
) -> Alignment {
    let buffer = ruler.unit().from_meters(params.max_parcel_buffer);
    let mut out = Alignment {
        addresses: Vec::with_capacity(addresses.len()),
        ..Alignment::default()
    };

    for (index, mut address) in addresses.into_iter().enumerate() {
        let snapped = snap_address(
            &mut address,
            buildings,
            building_index,
            parcels,
            parcel_index,
            ruler,
            buffer,
            params,
        );
        match snapped {
            Ok(Some(line)) => {
                out.lines.push(line);
                out.matched += 1;
                if out.matched % 5000 == 0 {
                    info!(matched = out.matched, "alignment progress");
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(feature = index, "passing address through unmatched: {}", e);
                out.skipped += 1;
            }
        }
        out.addresses.push(address);
    }

    out
}

/// Try to snap one address; `Ok(None)` is a no-match passthrough.
#[allow(clippy::too_many_arguments)]
fn snap_address(
    address: &mut Address,
    buildings: &[Building],
    building_index: &BuildingIndex,
    parcels: &[Parcel],
    parcel_index: &ParcelIndex,
    ruler: &PlanarRuler,
    buffer: f64,
    params: &SnapParams,
) -> Result<Option<MatchLine>> {
    let point = address.point;

    // Owning parcel: bbox point query, exact containment, then housenumber
    // equality (two absent housenumbers compare equal). First hit in
    // index-iteration order wins.
    let parcel_entry = parcel_index
        .at_point(point)
        .filter(|entry| parcels[entry.index].polygon.contains(&point))
        .find(|entry| parcels[entry.index].housenumber == address.tags.housenumber);
    let parcel_entry = match parcel_entry {
        Some(entry) => entry,
        None => return Ok(None),
    };
    let parcel = &parcels[parcel_entry.index];

    // Candidate buildings: bbox prefilter on the parcel envelope, then at
    // least one vertex strictly inside the parcel, then no more than
    // max_partials vertices outside the buffered parcel.
    let candidates: Vec<&BuildingEntry> = building_index
        .search(&parcel_entry.envelope())
        .filter(|entry| has_vertex_inside(&buildings[entry.index].polygon, &parcel.polygon))
        .filter(|entry| {
            partial_vertices(&buildings[entry.index].polygon, &parcel.polygon, ruler, buffer)
                <= params.max_partials
        })
        .collect();

    let chosen = match candidates.as_slice() {
        [single] => *single,
        // Exactly two survivors: a main building plus an outbuilding, keep
        // the larger footprint
        [first, second] => {
            if first.area > second.area {
                *first
            } else {
                *second
            }
        }
        // Zero or three-plus is ambiguous
        _ => return Ok(None),
    };

    let building = &buildings[chosen.index];
    let center = visual_center(&building.polygon, params.center_precision)?;
    let distance = ruler.distance(point.0, center.0);
    address.point = center;

    Ok(Some(MatchLine {
        start: point.0,
        end: center.0,
        distance,
    }))
}

/// At least one vertex of `building` lies strictly inside `parcel`
fn has_vertex_inside(building: &Polygon<f64>, parcel: &Polygon<f64>) -> bool {
    vertices(building).any(|coord| parcel.contains(&Point::from(coord)))
}

/// Count of `building` vertices outside `parcel` buffered outward by
/// `buffer` (ruler units)
fn partial_vertices(
    building: &Polygon<f64>,
    parcel: &Polygon<f64>,
    ruler: &PlanarRuler,
    buffer: f64,
) -> usize {
    vertices(building)
        .filter(|coord| ruler.distance_to_polygon(Point::from(*coord), parcel) > buffer)
        .count()
}

fn vertices(polygon: &Polygon<f64>) -> impl Iterator<Item = Coord<f64>> + '_ {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(|ring| ring.0.iter().copied())
}

//! Bounding-box spatial indexes over the input layers
//!
//! R-trees store lightweight entries (slice index + cached bounding box)
//! rather than the features themselves; callers resolve entries against the
//! source slices. Both indexes are built once and only read afterwards.
//!
//! Queries are bbox-intersection only: a hit means the entry's bounding box
//! intersects the query box, and callers must post-filter with exact
//! geometric tests.

use geo::BoundingRect;
use geo_types::{Point, Polygon, Rect};
use rstar::{RTree, RTreeObject, AABB};
use tracing::warn;

use parcelsnap_core::{Building, Parcel};

use crate::ruler::PlanarRuler;

/// An indexed building: source slice position, cached planar area and bbox
#[derive(Debug, Clone)]
pub struct BuildingEntry {
    /// Position in the source building slice
    pub index: usize,
    /// Planar area in the ruler's square unit, computed once at build time
    pub area: f64,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BuildingEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over buildings whose planar area exceeds a minimum threshold.
///
/// Sub-threshold buildings are excluded from candidacy entirely, not merely
/// deprioritized.
pub struct BuildingIndex {
    tree: RTree<BuildingEntry>,
}

impl BuildingIndex {
    /// Index every building with `area > min_area` (ruler square units).
    pub fn build(buildings: &[Building], ruler: &PlanarRuler, min_area: f64) -> Self {
        let entries: Vec<BuildingEntry> = buildings
            .iter()
            .enumerate()
            .filter_map(|(index, building)| {
                let envelope = match envelope_of(&building.polygon) {
                    Some(envelope) => envelope,
                    None => {
                        warn!(feature = index, "skipping building with empty geometry");
                        return None;
                    }
                };
                let area = ruler.polygon_area(&building.polygon);
                (area > min_area).then_some(BuildingEntry {
                    index,
                    area,
                    envelope,
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// All entries whose bounding box intersects the query box
    pub fn search<'a>(
        &'a self,
        query: &AABB<[f64; 2]>,
    ) -> impl Iterator<Item = &'a BuildingEntry> + 'a {
        self.tree.locate_in_envelope_intersecting(query)
    }

    /// Number of indexed buildings
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// An indexed parcel: source slice position and cached bbox
#[derive(Debug, Clone)]
pub struct ParcelEntry {
    /// Position in the source parcel slice
    pub index: usize,
    envelope: AABB<[f64; 2]>,
}

impl ParcelEntry {
    /// The parcel's bounding box, exact as of insertion
    pub fn envelope(&self) -> AABB<[f64; 2]> {
        self.envelope
    }
}

impl RTreeObject for ParcelEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over all parcels, indexed unconditionally
pub struct ParcelIndex {
    tree: RTree<ParcelEntry>,
}

impl ParcelIndex {
    pub fn build(parcels: &[Parcel]) -> Self {
        let entries: Vec<ParcelEntry> = parcels
            .iter()
            .enumerate()
            .filter_map(|(index, parcel)| match envelope_of(&parcel.polygon) {
                Some(envelope) => Some(ParcelEntry { index, envelope }),
                None => {
                    warn!(feature = index, "skipping parcel with empty geometry");
                    None
                }
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// All entries whose bounding box contains the point (degenerate bbox
    /// query)
    pub fn at_point(&self, point: Point<f64>) -> impl Iterator<Item = &'_ ParcelEntry> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x(), point.y()]))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

fn envelope_of(polygon: &Polygon<f64>) -> Option<AABB<[f64; 2]>> {
    polygon.bounding_rect().map(rect_to_aabb)
}

fn rect_to_aabb(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [rect.min().x, rect.min().y],
        [rect.max().x, rect.max().y],
    )
}

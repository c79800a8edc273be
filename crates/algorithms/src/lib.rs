//! # parcelsnap Algorithms
//!
//! The geometry side of the address alignment pipeline:
//!
//! - **ruler**: planar distance/area approximation at a reference latitude
//! - **visual_center**: pole-of-inaccessibility solver for polygons
//! - **index**: bounding-box R-trees over the building and parcel layers
//! - **snap**: the matcher that aligns addresses onto building centers

pub mod index;
pub mod ruler;
pub mod snap;
pub mod visual_center;

pub use index::{BuildingEntry, BuildingIndex, ParcelEntry, ParcelIndex};
pub use ruler::{DistanceUnit, PlanarRuler};
pub use snap::{align_addresses, Alignment, SnapParams};
pub use visual_center::visual_center;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::index::{BuildingIndex, ParcelIndex};
    pub use crate::ruler::{DistanceUnit, PlanarRuler};
    pub use crate::snap::{align_addresses, Alignment, SnapParams};
    pub use crate::visual_center::visual_center;
    pub use parcelsnap_core::prelude::*;
}

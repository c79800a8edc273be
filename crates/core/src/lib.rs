//! # parcelsnap Core
//!
//! Core types and I/O for the parcelsnap address alignment pipeline.
//!
//! This crate provides:
//! - Typed feature records (`Address`, `Building`, `Parcel`, `MatchLine`)
//! - GeoJSON FeatureCollection loaders and writers
//! - The shared `Error`/`Result` types

pub mod error;
pub mod feature;
pub mod io;

pub use error::{Error, Result};
pub use feature::{Address, AddressTags, Building, MatchLine, Parcel};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::feature::{Address, AddressTags, Building, MatchLine, Parcel};
}

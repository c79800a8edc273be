//! parcelsnap CLI - align municipal address points to building centers
//!
//! Fire-and-forget batch job: file paths and tuning constants are fixed,
//! there are no flags. Reads the address, building and parcel GeoJSON
//! layers from the working directory, snaps what it can and writes the
//! aligned addresses plus a diagnostic snap-line layer.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use parcelsnap_algorithms::{
    align_addresses, BuildingIndex, DistanceUnit, ParcelIndex, PlanarRuler, SnapParams,
};
use parcelsnap_core::io::{load_addresses, load_buildings, load_parcels, write_addresses, write_match_lines};

// ─── Fixed inputs and outputs ───────────────────────────────────────────

const ADDRESSES_PATH: &str = "ottawa-address.geojson";
const BUILDINGS_PATH: &str = "ottawa-buildings.geojson";
const PARCELS_PATH: &str = "ottawa-parcels.geojson";
const OUTPUT_PATH: &str = "ottawa-address-align.geojson";
const OUTPUT_LINES_PATH: &str = "ottawa-address-align-lines.geojson";

/// Latitude the planar ruler is anchored at (Ottawa)
const REFERENCE_LATITUDE: f64 = 45.34;

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    setup_logging();
    let start = Instant::now();

    let pb = spinner("Reading buildings...");
    let buildings = load_buildings(BUILDINGS_PATH).context("Failed to read buildings")?;
    pb.finish_and_clear();
    println!("Buildings: {}", buildings.len());

    let pb = spinner("Reading parcels...");
    let parcels = load_parcels(PARCELS_PATH).context("Failed to read parcels")?;
    pb.finish_and_clear();
    println!("Parcels: {}", parcels.len());

    let pb = spinner("Reading addresses...");
    let addresses = load_addresses(ADDRESSES_PATH).context("Failed to read addresses")?;
    pb.finish_and_clear();
    println!("Addresses: {}", addresses.len());

    let ruler = PlanarRuler::new(REFERENCE_LATITUDE, DistanceUnit::Feet);
    let params = SnapParams::default();

    let building_index = BuildingIndex::build(&buildings, &ruler, params.min_sqft);
    let parcel_index = ParcelIndex::build(&parcels);
    info!(
        indexed = building_index.len(),
        total = buildings.len(),
        "building index built"
    );
    info!(indexed = parcel_index.len(), "parcel index built");

    let alignment = align_addresses(
        addresses,
        &buildings,
        &building_index,
        &parcels,
        &parcel_index,
        &ruler,
        &params,
    );

    println!("Features: {}", alignment.addresses.len());
    println!("Processed: {}", alignment.matched);
    if alignment.skipped > 0 {
        println!("Skipped: {}", alignment.skipped);
    }

    let pb = spinner("Writing output...");
    write_addresses(OUTPUT_PATH, &alignment.addresses).context("Failed to write addresses")?;
    write_match_lines(OUTPUT_LINES_PATH, &alignment.lines)
        .context("Failed to write match lines")?;
    pb.finish_and_clear();

    println!("Aligned addresses saved to: {}", OUTPUT_PATH);
    println!("Snap lines saved to: {}", OUTPUT_LINES_PATH);
    println!("  Processing time: {:.2?}", start.elapsed());

    Ok(())
}

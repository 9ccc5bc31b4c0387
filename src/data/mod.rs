//! Bundled coefficient tables and accuracy presets
//!
//! Only Earth ships with the crate, as the abridged VSOP87D series. Tables for the
//! other planets are loaded at runtime with [`PlanetTables::from_json`].
//!
//! The bundled presets define `low` and `normal` only. `normal` already keeps
//! every term of the abridged series, so `high` and `fine` have nothing left to
//! add and are not registered; requesting them for Earth fails like any other
//! missing preset. Use `complete` for the full series.

mod earth;

use crate::constants::TABLE_AMPLITUDE_SCALE;
use crate::errors::{Result, VsopError};
use crate::planets::{Planet, PlanetTables};
use crate::series::SeriesModel;
use lazy_static::lazy_static;

/// Accuracy presets matching the bundled Earth tables
pub const EARTH_PRESETS_JSON: &str = include_str!("earth_presets.json");

lazy_static! {
    /// Earth tables, built once on first use
    static ref EARTH_TABLES: std::result::Result<PlanetTables, String> =
        build_earth_tables().map_err(|e| e.to_string());
}

fn build_earth_tables() -> Result<PlanetTables> {
    let l = SeriesModel::from_rows(
        &[earth::L0, earth::L1, earth::L2, earth::L3, earth::L4, earth::L5],
        TABLE_AMPLITUDE_SCALE,
    )?;
    let b = SeriesModel::from_rows(&[earth::B0, earth::B1], TABLE_AMPLITUDE_SCALE)?;
    let r = SeriesModel::from_rows(
        &[earth::R0, earth::R1, earth::R2, earth::R3, earth::R4],
        TABLE_AMPLITUDE_SCALE,
    )?;
    Ok(PlanetTables::new(Planet::Earth, l, b, r))
}

/// The bundled Earth tables
pub fn earth_tables() -> Result<PlanetTables> {
    EARTH_TABLES.clone().map_err(VsopError::DataError)
}

//! Helioseries: truncated VSOP87 planetary positions
//!
//! This crate evaluates heliocentric ecliptic longitude, latitude and distance
//! of a planet from truncated harmonic series, estimates the error of a
//! truncation, derives the smallest truncation meeting an error budget, and
//! memoizes values per observation instant.
//!
//! The layers, from the bottom up:
//! - [`series`]: coefficient tables and the [`TruncationEngine`]
//! - [`cache`]: values keyed by quantity, valid for one clock reading
//! - [`source`]: one model, its truncation and its cache key
//! - [`planets`]: the [`PlanetHecc`] facade over l, b and r

pub mod cache;
pub mod constants;
pub mod data;
pub mod errors;
pub mod planets;
pub mod series;
pub mod source;
pub mod time;

// Re-export commonly used types
pub use errors::{Result, VsopError};
pub use planets::{Accuracy, AccuracyPresets, EclipticSpherical, Planet, PlanetHecc, PlanetTables};
pub use series::{ErrorMode, Quantity, SeriesModel, TruncationConfig, TruncationEngine, TruncationVector};
pub use time::{ObservationTime, Time};

//! Constants module for series evaluation

use std::f64::consts::PI;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian ephemeris date
pub const J2000: f64 = 2_451_545.0;
/// Days in a Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
/// Days in a Julian millennium, the unit of VSOP87 reduced time
pub const DAYS_PER_JULIAN_MILLENNIUM: f64 = 365_250.0;
/// Julian date of the Unix epoch (1970-01-01T00:00:00)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

// Angles
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

// Truncation control
/// Largest |τ| the truncation-error bounds assume (one millennium from J2000)
pub const DEFAULT_DOMAIN_BOUND: f64 = 1.0;
/// Multiplier applied to the domain bound by the `safe` error mode
pub const DEFAULT_SAFETY_FACTOR: f64 = 2.0;

// Units of the bundled coefficient tables
/// Amplitudes in the published abridged tables are given in units of 1e-8
pub const TABLE_AMPLITUDE_SCALE: f64 = 1.0e-8;

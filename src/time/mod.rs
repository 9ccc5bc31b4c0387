//! Time module for series evaluation
//!
//! This module provides the observation-time representation the series engine
//! runs on. There is exactly one time scale here: a continuous Julian Ephemeris
//! Day (JDE, i.e. TT/TDB, the two differ by far less than the truncation noise).
//! No ΔT, leap second or UTC handling is attempted; civil timestamps are read
//! directly on the dynamical scale.
//!
//! Two types live here:
//! - [`Time`]: an immutable, validated instant
//! - [`ObservationTime`]: a shared, mutable observation clock that counts its
//!   own mutations so caches bound to it can tell when they went stale

use crate::constants::{
    DAYS_PER_JULIAN_CENTURY, DAYS_PER_JULIAN_MILLENNIUM, DAY_S, J2000, UNIX_EPOCH_JD,
};
use crate::errors::{Result, VsopError};
use chrono::{DateTime, NaiveDate, Utc};
use std::cell::Cell;
use std::fmt;
use std::ops::{Add, Sub};

/// An instant expressed as a Julian Ephemeris Day
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Time {
    jde: f64,
}

impl Time {
    /// The J2000.0 epoch
    pub const J2000: Time = Time { jde: J2000 };

    /// Create a time from a Julian Ephemeris Day
    ///
    /// Fails with [`VsopError::TimeError`] for NaN or infinite values, since no
    /// reduced time can be derived from them.
    pub fn from_jde(jde: f64) -> Result<Self> {
        if !jde.is_finite() {
            return Err(VsopError::TimeError(format!(
                "Julian ephemeris day must be finite, got {}",
                jde
            )));
        }
        Ok(Self { jde })
    }

    /// Create a time from a proleptic Gregorian calendar date and time of day
    ///
    /// The day-number arithmetic follows the Explanatory Supplement to the
    /// Astronomical Almanac 15.11. The day must exist in the month, leap years
    /// included.
    pub fn from_calendar(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: f64,
    ) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(VsopError::TimeError(format!(
                "Invalid calendar date {:04}-{:02}-{:02}",
                year, month, day
            )));
        }
        if hour > 23 || minute > 59 || !(0.0..61.0).contains(&second) {
            return Err(VsopError::TimeError(format!(
                "Invalid time of day {:02}:{:02}:{}",
                hour, minute, second
            )));
        }

        let janfeb = month <= 2;
        let g = year + 4716 - if janfeb { 1 } else { 0 };
        let f = (month + 9) % 12;
        let e = 1461 * g / 4 + day as i32 - 1402;
        let mut j = e + (153 * f as i32 + 2) / 5;
        j += 38 - (g + 184) / 100 * 3 / 4;

        // Julian day numbers start at noon
        let day_fraction = (hour as f64 * 3600.0 + minute as f64 * 60.0 + second) / DAY_S;
        Self::from_jde(j as f64 - 0.5 + day_fraction)
    }

    /// Create a time from a UTC timestamp, read directly as dynamical time
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let seconds = dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 * 1e-9;
        Self {
            jde: UNIX_EPOCH_JD + seconds / DAY_S,
        }
    }

    /// Get the Julian Ephemeris Day
    pub fn jde(&self) -> f64 {
        self.jde
    }

    /// Julian centuries since J2000.0
    pub fn julian_centuries(&self) -> f64 {
        (self.jde - J2000) / DAYS_PER_JULIAN_CENTURY
    }

    /// Julian millennia since J2000.0, the reduced time τ of VSOP87
    pub fn julian_millennia(&self) -> f64 {
        (self.jde - J2000) / DAYS_PER_JULIAN_MILLENNIUM
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JDE {:.6}", self.jde)
    }
}

/// Offsetting by days goes through [`Time::from_jde`], so a non-finite result is an error
impl Add<f64> for Time {
    type Output = Result<Time>;

    fn add(self, days: f64) -> Self::Output {
        Time::from_jde(self.jde + days)
    }
}

impl Sub<f64> for Time {
    type Output = Result<Time>;

    fn sub(self, days: f64) -> Self::Output {
        Time::from_jde(self.jde - days)
    }
}

impl Sub<Time> for Time {
    type Output = f64;

    fn sub(self, other: Time) -> Self::Output {
        // Difference in days
        self.jde - other.jde
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// A mutable observation clock shared between a caller and the caches bound to it
///
/// Every call to [`ObservationTime::set`] bumps the revision, even when the new
/// instant equals the old one. Caches remember the revision they were filled at
/// and drop their entries as soon as it moves.
#[derive(Debug)]
pub struct ObservationTime {
    time: Cell<Time>,
    revision: Cell<u64>,
}

impl ObservationTime {
    /// Create a clock reading `time`
    pub fn new(time: Time) -> Self {
        Self {
            time: Cell::new(time),
            revision: Cell::new(0),
        }
    }

    /// Create a clock from a Julian Ephemeris Day
    pub fn from_jde(jde: f64) -> Result<Self> {
        Ok(Self::new(Time::from_jde(jde)?))
    }

    /// Current instant
    pub fn time(&self) -> Time {
        self.time.get()
    }

    /// Current instant as a Julian Ephemeris Day
    pub fn jde(&self) -> f64 {
        self.time.get().jde()
    }

    /// Current reduced time τ (Julian millennia from J2000.0)
    pub fn reduced_time(&self) -> f64 {
        self.time.get().julian_millennia()
    }

    /// Move the clock to `time`
    pub fn set(&self, time: Time) {
        self.time.set(time);
        self.revision.set(self.revision.get().wrapping_add(1));
    }

    /// Move the clock to a Julian Ephemeris Day
    pub fn set_jde(&self, jde: f64) -> Result<()> {
        self.set(Time::from_jde(jde)?);
        Ok(())
    }

    /// Number of mutations seen so far
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_from_jde_rejects_non_finite() {
        assert!(Time::from_jde(2451545.0).is_ok());
        assert!(matches!(
            Time::from_jde(f64::NAN),
            Err(VsopError::TimeError(_))
        ));
        assert!(matches!(
            Time::from_jde(f64::INFINITY),
            Err(VsopError::TimeError(_))
        ));
    }

    #[test]
    fn test_calendar_dates() {
        // 1992 October 13.0 TD
        let t = Time::from_calendar(1992, 10, 13, 0, 0, 0.0).unwrap();
        assert_relative_eq!(t.jde(), 2448908.5);

        // J2000.0 is 2000 January 1.5
        let t = Time::from_calendar(2000, 1, 1, 12, 0, 0.0).unwrap();
        assert_relative_eq!(t.jde(), J2000);

        // January and February fall in the previous computational year
        let t = Time::from_calendar(1987, 1, 27, 0, 0, 0.0).unwrap();
        assert_relative_eq!(t.jde(), 2446822.5);

        assert!(Time::from_calendar(2000, 13, 1, 0, 0, 0.0).is_err());
        assert!(Time::from_calendar(2000, 4, 0, 0, 0, 0.0).is_err());
        assert!(Time::from_calendar(2000, 1, 1, 24, 0, 0.0).is_err());
    }

    #[test]
    fn test_calendar_day_must_exist_in_month() {
        assert!(matches!(
            Time::from_calendar(2023, 2, 31, 0, 0, 0.0),
            Err(VsopError::TimeError(_))
        ));
        assert!(Time::from_calendar(2023, 2, 29, 0, 0, 0.0).is_err());
        assert!(Time::from_calendar(2023, 4, 31, 0, 0, 0.0).is_err());
        assert!(Time::from_calendar(1900, 2, 29, 0, 0, 0.0).is_err());

        let leap = Time::from_calendar(2024, 2, 29, 0, 0, 0.0).unwrap();
        let march = Time::from_calendar(2024, 3, 1, 0, 0, 0.0).unwrap();
        assert_relative_eq!(march - leap, 1.0);
    }

    #[test]
    fn test_from_datetime() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let t = Time::from(dt);
        assert_relative_eq!(t.jde(), J2000, epsilon = 1e-9);
    }

    #[test]
    fn test_reduced_time() {
        assert_eq!(Time::J2000.julian_millennia(), 0.0);

        let t = Time::from_jde(J2000 + DAYS_PER_JULIAN_MILLENNIUM).unwrap();
        assert_relative_eq!(t.julian_millennia(), 1.0);
        assert_relative_eq!(t.julian_centuries(), 10.0);
    }

    #[test]
    fn test_time_math() {
        let t = (Time::J2000 + 1.5).unwrap();
        assert_relative_eq!(t.jde(), J2000 + 1.5);
        assert_relative_eq!(t - Time::J2000, 1.5);
        assert_relative_eq!((t - 1.5).unwrap().jde(), J2000);
    }

    #[test]
    fn test_time_math_rejects_non_finite_offsets() {
        assert!(matches!(
            Time::J2000 + f64::NAN,
            Err(VsopError::TimeError(_))
        ));
        assert!(matches!(
            Time::J2000 - f64::INFINITY,
            Err(VsopError::TimeError(_))
        ));
    }

    #[test]
    fn test_clock_revisions() {
        let clock = ObservationTime::from_jde(2448908.5).unwrap();
        assert_eq!(clock.revision(), 0);

        clock.set_jde(2448909.5).unwrap();
        assert_eq!(clock.revision(), 1);
        assert_relative_eq!(clock.jde(), 2448909.5);

        // Setting the same instant still counts as a mutation
        clock.set(clock.time());
        assert_eq!(clock.revision(), 2);

        // A rejected instant leaves the clock untouched
        assert!(clock.set_jde(f64::NAN).is_err());
        assert_eq!(clock.revision(), 2);
        assert_relative_eq!(clock.jde(), 2448909.5);
    }
}

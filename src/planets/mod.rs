//! Heliocentric ecliptic positions of the planets
//!
//! [`PlanetHecc`] is the one facade type for every planet: its behavior comes
//! entirely from the [`PlanetTables`] and [`AccuracyPresets`] it is built with.
//! It composes three [`QuantitySource`]s (l, b, r) over a single
//! [`TimeKeyedCache`] bound to the observation clock.
//!
//! ```
//! use helioseries::planets::PlanetHecc;
//! use helioseries::time::ObservationTime;
//! use std::rc::Rc;
//!
//! let clock = Rc::new(ObservationTime::from_jde(2448908.5).unwrap());
//! let mut earth = PlanetHecc::earth(Rc::clone(&clock)).unwrap();
//! let r = earth.r().unwrap();
//! assert!((r - 0.99760775).abs() < 1e-8);
//! ```

pub mod presets;

pub use presets::{Accuracy, AccuracyPresets};

use crate::cache::TimeKeyedCache;
use crate::constants::TAU;
use crate::data;
use crate::errors::{invalid_arg, Result, VsopError};
use crate::series::{
    ErrorMode, Quantity, SeriesModel, TruncationConfig, TruncationEngine, TruncationVector,
};
use crate::source::QuantitySource;
use crate::time::ObservationTime;
use nalgebra::Vector3;
use serde::Deserialize;
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

/// The eight major planets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
pub enum Planet {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Planet {
    pub const ALL: [Planet; 8] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Earth,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
    ];

    /// Get the planet's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Earth => "Earth",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Planet {
    type Err = VsopError;

    fn from_str(s: &str) -> Result<Self> {
        Planet::ALL
            .iter()
            .copied()
            .find(|planet| planet.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| invalid_arg(format!("Unknown planet {:?}", s)))
    }
}

/// The l, b and r series of one planet
#[derive(Debug, Clone)]
pub struct PlanetTables {
    planet: Planet,
    l: Arc<SeriesModel>,
    b: Arc<SeriesModel>,
    r: Arc<SeriesModel>,
}

#[derive(Deserialize)]
struct RawTables {
    planet: Planet,
    l: SeriesModel,
    b: SeriesModel,
    r: SeriesModel,
}

impl PlanetTables {
    pub fn new(planet: Planet, l: SeriesModel, b: SeriesModel, r: SeriesModel) -> Self {
        Self {
            planet,
            l: Arc::new(l),
            b: Arc::new(b),
            r: Arc::new(r),
        }
    }

    /// The abridged Earth tables bundled with the crate
    pub fn earth() -> Result<Self> {
        data::earth_tables()
    }

    /// Load tables from JSON: `{"planet": "Mars", "l": [...], "b": [...], "r": [...]}`
    /// where each series is a list of degrees, each a list of `[A, B, C]` terms
    /// with amplitudes in radians or AU
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTables = serde_json::from_str(json)
            .map_err(|e| VsopError::DataError(format!("Invalid planet tables: {}", e)))?;
        log::debug!(
            "Loaded {} tables with {} + {} + {} terms",
            raw.planet,
            raw.l.total_terms(),
            raw.b.total_terms(),
            raw.r.total_terms()
        );
        Ok(Self::new(raw.planet, raw.l, raw.b, raw.r))
    }

    /// Load tables from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn planet(&self) -> Planet {
        self.planet
    }

    pub fn l(&self) -> &Arc<SeriesModel> {
        &self.l
    }

    pub fn b(&self) -> &Arc<SeriesModel> {
        &self.b
    }

    pub fn r(&self) -> &Arc<SeriesModel> {
        &self.r
    }

    pub fn model(&self, quantity: Quantity) -> &Arc<SeriesModel> {
        match quantity {
            Quantity::L => &self.l,
            Quantity::B => &self.b,
            Quantity::R => &self.r,
        }
    }
}

/// Heliocentric ecliptic spherical coordinates
///
/// `theta` is the polar angle measured from the ecliptic north pole, `phi` the
/// longitude in [0, 2π).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticSpherical {
    /// Distance from the Sun (AU)
    pub r: f64,
    /// Polar angle (radians)
    pub theta: f64,
    /// Azimuth, the ecliptic longitude (radians)
    pub phi: f64,
}

impl EclipticSpherical {
    /// Build from raw series values: longitude and latitude in radians, distance in AU
    pub fn from_lbr(l: f64, b: f64, r: f64) -> Self {
        // Latitude is brought into [-π/2, 3π/2) before taking the complement
        let b = (b + FRAC_PI_2).rem_euclid(TAU) - FRAC_PI_2;
        Self {
            r,
            theta: FRAC_PI_2 - b,
            phi: l.rem_euclid(TAU),
        }
    }

    /// Ecliptic longitude in radians
    pub fn longitude(&self) -> f64 {
        self.phi
    }

    /// Ecliptic latitude in radians
    pub fn latitude(&self) -> f64 {
        FRAC_PI_2 - self.theta
    }

    /// Heliocentric ecliptic rectangular coordinates (AU)
    pub fn to_cartesian(&self) -> Vector3<f64> {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        Vector3::new(
            self.r * sin_theta * cos_phi,
            self.r * sin_theta * sin_phi,
            self.r * cos_theta,
        )
    }
}

/// Heliocentric ecliptic coordinates of one planet at an observation time
#[derive(Debug)]
pub struct PlanetHecc {
    planet: Planet,
    presets: Arc<AccuracyPresets>,
    accuracy: Accuracy,
    cache: TimeKeyedCache,
    l: QuantitySource,
    b: QuantitySource,
    r: QuantitySource,
}

impl PlanetHecc {
    /// Create a facade over `tables`, observing `ob_time`, at accuracy level `accuracy`
    pub fn new(
        tables: PlanetTables,
        presets: Arc<AccuracyPresets>,
        ob_time: Rc<ObservationTime>,
        accuracy: Accuracy,
    ) -> Result<Self> {
        Self::with_config(tables, presets, ob_time, accuracy, TruncationConfig::default())
    }

    /// Like [`PlanetHecc::new`] with explicit error-bound settings
    pub fn with_config(
        tables: PlanetTables,
        presets: Arc<AccuracyPresets>,
        ob_time: Rc<ObservationTime>,
        accuracy: Accuracy,
        config: TruncationConfig,
    ) -> Result<Self> {
        let engine = TruncationEngine::new(config);
        let mut hecc = Self {
            planet: tables.planet,
            presets,
            accuracy: Accuracy::Complete,
            cache: TimeKeyedCache::new(ob_time),
            l: QuantitySource::new(Quantity::L, tables.l, engine),
            b: QuantitySource::new(Quantity::B, tables.b, engine),
            r: QuantitySource::new(Quantity::R, tables.r, engine),
        };
        hecc.set_accuracy(accuracy)?;
        Ok(hecc)
    }

    /// Earth from the bundled tables and presets at normal accuracy
    pub fn earth(ob_time: Rc<ObservationTime>) -> Result<Self> {
        Self::new(
            PlanetTables::earth()?,
            Arc::new(AccuracyPresets::builtin()?),
            ob_time,
            Accuracy::Normal,
        )
    }

    pub fn planet(&self) -> Planet {
        self.planet
    }

    pub fn config(&self) -> &TruncationConfig {
        self.l.engine().config()
    }

    fn source(&self, quantity: Quantity) -> &QuantitySource {
        match quantity {
            Quantity::L => &self.l,
            Quantity::B => &self.b,
            Quantity::R => &self.r,
        }
    }

    fn parts_mut(&mut self, quantity: Quantity) -> (&mut QuantitySource, &mut TimeKeyedCache) {
        let source = match quantity {
            Quantity::L => &mut self.l,
            Quantity::B => &mut self.b,
            Quantity::R => &mut self.r,
        };
        (source, &mut self.cache)
    }

    /// Raw value of a quantity at the observation time
    pub fn value(&mut self, quantity: Quantity) -> Result<f64> {
        let (source, cache) = self.parts_mut(quantity);
        source.value(cache)
    }

    /// Heliocentric ecliptic longitude in radians (not reduced to one turn)
    pub fn l(&mut self) -> Result<f64> {
        self.value(Quantity::L)
    }

    /// Heliocentric ecliptic latitude in radians
    pub fn b(&mut self) -> Result<f64> {
        self.value(Quantity::B)
    }

    /// Heliocentric distance in AU
    pub fn r(&mut self) -> Result<f64> {
        self.value(Quantity::R)
    }

    /// Heliocentric ecliptic spherical coordinates
    pub fn sc(&mut self) -> Result<EclipticSpherical> {
        let l = self.l()?;
        let b = self.b()?;
        let r = self.r()?;
        Ok(EclipticSpherical::from_lbr(l, b, r))
    }

    /// Number of series evaluations performed for a quantity so far
    pub fn evaluations(&self, quantity: Quantity) -> u64 {
        self.source(quantity).evaluations()
    }

    /// The observation clock
    pub fn ob_time(&self) -> &Rc<ObservationTime> {
        self.cache.time()
    }

    /// Observe another clock; every cached value is discarded
    pub fn set_ob_time(&mut self, ob_time: Rc<ObservationTime>) {
        self.cache.rebind(ob_time);
    }

    pub fn truncation(&self, quantity: Quantity) -> &TruncationVector {
        self.source(quantity).truncation()
    }

    /// Set the truncation of one quantity; the accuracy level becomes `Custom`
    pub fn set_truncation(&mut self, quantity: Quantity, truncation: TruncationVector) -> Result<()> {
        let (source, cache) = self.parts_mut(quantity);
        source.set_truncation(cache, truncation)?;
        self.accuracy = Accuracy::Custom;
        Ok(())
    }

    /// Estimated error of a quantity's current truncation
    pub fn max_error(&self, quantity: Quantity, mode: ErrorMode) -> Result<f64> {
        self.source(quantity).current_error(mode)
    }

    /// Truncate a quantity to the fewest terms meeting `max_error`; the accuracy
    /// level becomes `Custom`
    ///
    /// Deriving a truncation costs far more than one evaluation, so prefer
    /// [`PlanetHecc::set_accuracy`] or [`PlanetHecc::set_truncation`] when this
    /// would run often.
    pub fn set_max_error(&mut self, quantity: Quantity, max_error: f64, mode: ErrorMode) -> Result<()> {
        let (source, cache) = self.parts_mut(quantity);
        source.set_max_error(cache, max_error, mode)?;
        self.accuracy = Accuracy::Custom;
        Ok(())
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Apply a named accuracy level to all three quantities
    ///
    /// Every vector is resolved and validated before any is applied, so a failure
    /// leaves the facade unchanged.
    pub fn set_accuracy(&mut self, accuracy: Accuracy) -> Result<()> {
        let mut resolved = Vec::with_capacity(Quantity::ALL.len());
        for quantity in Quantity::ALL {
            let model = self.source(quantity).model();
            let truncation = match accuracy {
                Accuracy::Custom => {
                    return Err(invalid_arg(
                        "The custom accuracy level is reached through set_truncation or set_max_error",
                    ))
                }
                Accuracy::Complete => TruncationVector::full(model),
                level => self.presets.get(self.planet, quantity, level)?.clone(),
            };
            truncation.validate(model)?;
            resolved.push((quantity, truncation));
        }

        for (quantity, truncation) in resolved {
            let (source, cache) = self.parts_mut(quantity);
            source.set_truncation(cache, truncation)?;
        }

        log::debug!(
            "{} accuracy set to {} (l {}, b {}, r {})",
            self.planet,
            accuracy,
            self.l.truncation(),
            self.b.truncation(),
            self.r.truncation()
        );
        self.accuracy = accuracy;
        Ok(())
    }
}

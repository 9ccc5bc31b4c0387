//! Harmonic series models
//!
//! A VSOP87-style quantity (heliocentric longitude, latitude or distance) is
//! a polynomial in reduced time τ whose coefficients are sums of cosines:
//!
//! ```text
//! X(τ) = Σ_d τ^d Σ_i A_di · cos(B_di + C_di · τ)
//! ```
//!
//! Each inner sum is a [`Degree`], each summand a [`Term`]. Terms within a degree
//! are stored by non-increasing absolute amplitude, so keeping the first `n` of
//! them keeps the `n` largest. A [`TruncationVector`] records how many leading
//! terms of every degree an evaluation uses.

pub mod engine;

pub use engine::{ErrorMode, TruncationConfig, TruncationEngine};

use crate::errors::{domain_err, invalid_arg, Result, VsopError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One harmonic term `amplitude · cos(phase + frequency · τ)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Term {
    /// Amplitude, in the unit of the quantity (radians or AU)
    pub amplitude: f64,
    /// Phase in radians
    pub phase: f64,
    /// Frequency in radians per Julian millennium
    pub frequency: f64,
}

impl Term {
    pub fn new(amplitude: f64, phase: f64, frequency: f64) -> Self {
        Self {
            amplitude,
            phase,
            frequency,
        }
    }

    /// Instantaneous contribution at reduced time `tau`
    #[inline]
    pub fn at(&self, tau: f64) -> f64 {
        self.amplitude * (self.phase + self.frequency * tau).cos()
    }
}

impl From<[f64; 3]> for Term {
    fn from(row: [f64; 3]) -> Self {
        Term::new(row[0], row[1], row[2])
    }
}

impl From<Term> for [f64; 3] {
    fn from(term: Term) -> Self {
        [term.amplitude, term.phase, term.frequency]
    }
}

/// The terms multiplied by one power of τ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degree {
    terms: Vec<Term>,
}

impl Degree {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sum of the first `count` terms at reduced time `tau`
    pub fn partial_sum(&self, count: usize, tau: f64) -> f64 {
        self.terms[..count].iter().map(|term| term.at(tau)).sum()
    }

    /// Whether absolute amplitudes never increase along the degree
    pub fn is_amplitude_sorted(&self) -> bool {
        self.terms
            .windows(2)
            .all(|pair| pair[0].amplitude.abs() >= pair[1].amplitude.abs())
    }
}

/// The harmonic coefficient tables for one quantity of one planet
///
/// Immutable once built. Shared between sources via `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Degree>", into = "Vec<Degree>")]
pub struct SeriesModel {
    degrees: Vec<Degree>,
}

impl SeriesModel {
    /// Build a model from its degrees, lowest power of τ first
    ///
    /// Fails with [`VsopError::DomainError`] if any coefficient is not finite.
    pub fn new(degrees: Vec<Degree>) -> Result<Self> {
        for (d, degree) in degrees.iter().enumerate() {
            for (i, term) in degree.terms().iter().enumerate() {
                if !(term.amplitude.is_finite() && term.phase.is_finite() && term.frequency.is_finite())
                {
                    return Err(domain_err(format!(
                        "Term {} of degree {} has a non-finite coefficient",
                        i, d
                    )));
                }
            }
        }

        let model = Self { degrees };
        if !model.is_amplitude_sorted() {
            log::debug!("Series model terms are not sorted by amplitude; truncation will be sub-optimal");
        }
        Ok(model)
    }

    /// Build a model from `[amplitude, phase, frequency]` table rows
    ///
    /// Amplitudes are multiplied by `amplitude_scale`, which lets published tables
    /// in units of 1e-8 be used verbatim.
    pub fn from_rows(rows: &[&[[f64; 3]]], amplitude_scale: f64) -> Result<Self> {
        let degrees = rows
            .iter()
            .map(|degree| {
                Degree::new(
                    degree
                        .iter()
                        .map(|row| Term::new(row[0] * amplitude_scale, row[1], row[2]))
                        .collect(),
                )
            })
            .collect();
        Self::new(degrees)
    }

    pub fn degrees(&self) -> &[Degree] {
        &self.degrees
    }

    /// Number of degrees (highest power of τ plus one)
    pub fn degree_count(&self) -> usize {
        self.degrees.len()
    }

    /// Number of terms in every degree
    pub fn term_counts(&self) -> Vec<usize> {
        self.degrees.iter().map(Degree::len).collect()
    }

    /// Total number of terms across all degrees
    pub fn total_terms(&self) -> usize {
        self.degrees.iter().map(Degree::len).sum()
    }

    pub fn is_amplitude_sorted(&self) -> bool {
        self.degrees.iter().all(Degree::is_amplitude_sorted)
    }
}

impl TryFrom<Vec<Degree>> for SeriesModel {
    type Error = VsopError;

    fn try_from(degrees: Vec<Degree>) -> Result<Self> {
        Self::new(degrees)
    }
}

impl From<SeriesModel> for Vec<Degree> {
    fn from(model: SeriesModel) -> Self {
        model.degrees
    }
}

/// Per-degree count of leading terms kept during evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TruncationVector(Vec<usize>);

impl TruncationVector {
    pub fn new(counts: Vec<usize>) -> Self {
        Self(counts)
    }

    /// The vector keeping every term of `model`
    pub fn full(model: &SeriesModel) -> Self {
        Self(model.term_counts())
    }

    /// The vector keeping no term of `model`
    pub fn empty(model: &SeriesModel) -> Self {
        Self(vec![0; model.degree_count()])
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Terms kept for degree `degree`; absent entries keep nothing
    pub fn get(&self, degree: usize) -> usize {
        self.0.get(degree).copied().unwrap_or(0)
    }

    /// Total number of kept terms
    pub fn total_terms(&self) -> usize {
        self.0.iter().sum()
    }

    /// Check the vector can drive an evaluation of `model`
    ///
    /// The vector may be shorter than the model (missing degrees keep no terms) but
    /// not longer, and no entry may exceed its degree's term count.
    pub fn check_entries(&self, model: &SeriesModel) -> Result<()> {
        if self.0.len() > model.degree_count() {
            return Err(domain_err(format!(
                "Truncation vector has {} entries but the model has only {} degrees",
                self.0.len(),
                model.degree_count()
            )));
        }
        for (d, (&count, degree)) in self.0.iter().zip(model.degrees()).enumerate() {
            if count > degree.len() {
                return Err(domain_err(format!(
                    "Truncation entry {} for degree {} exceeds its {} terms",
                    count,
                    d,
                    degree.len()
                )));
            }
        }
        Ok(())
    }

    /// Check the vector can be bound to `model`: one entry per degree, each in range
    pub fn validate(&self, model: &SeriesModel) -> Result<()> {
        if self.0.len() != model.degree_count() {
            return Err(domain_err(format!(
                "Truncation vector must have exactly {} entries, got {}",
                model.degree_count(),
                self.0.len()
            )));
        }
        self.check_entries(model)
    }
}

impl From<Vec<usize>> for TruncationVector {
    fn from(counts: Vec<usize>) -> Self {
        Self(counts)
    }
}

impl fmt::Display for TruncationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// The three quantities of a heliocentric ecliptic position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    /// Heliocentric ecliptic longitude (radians)
    #[serde(rename = "l")]
    L,
    /// Heliocentric ecliptic latitude (radians)
    #[serde(rename = "b")]
    B,
    /// Heliocentric distance (AU)
    #[serde(rename = "r")]
    R,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [Quantity::L, Quantity::B, Quantity::R];

    /// Get the quantity's key as a string
    pub fn name(&self) -> &'static str {
        match self {
            Quantity::L => "l",
            Quantity::B => "b",
            Quantity::R => "r",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quantity {
    type Err = VsopError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "l" | "L" => Ok(Quantity::L),
            "b" | "B" => Ok(Quantity::B),
            "r" | "R" => Ok(Quantity::R),
            other => Err(invalid_arg(format!(
                "Quantity should be l, b or r, got {:?}",
                other
            ))),
        }
    }
}

//! Truncated evaluation and truncation-error control
//!
//! The engine evaluates a [`SeriesModel`] under a [`TruncationVector`], bounds the
//! error introduced by dropping the remaining terms, and derives the smallest
//! vector whose bound fits a requested budget.
//!
//! Error bounds never look at the phases of omitted terms. A term of amplitude
//! `A` in degree `d` contributes at most `|A| · |τ|^d`, so every bound is built
//! from `|A| · β^d`, where `β` is the largest |τ| the bound has to hold for.

use crate::constants::{DEFAULT_DOMAIN_BOUND, DEFAULT_SAFETY_FACTOR};
use crate::errors::{domain_err, invalid_arg, Result, VsopError};
use crate::series::{Degree, SeriesModel, TruncationVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How omitted terms are combined into an error estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorMode {
    /// Linear sum of omitted amplitudes over the nominal domain: a hard bound
    #[default]
    Worst,
    /// Root-sum-of-squares of omitted amplitudes per degree: the typical error
    /// when omitted phases are independent and uniformly distributed
    Mean,
    /// Worst-case bound over the domain enlarged by the safety factor
    Safe,
}

impl ErrorMode {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorMode::Worst => "true",
            ErrorMode::Mean => "mean",
            ErrorMode::Safe => "safe",
        }
    }
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorMode {
    type Err = VsopError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "true" | "worst" => Ok(ErrorMode::Worst),
            "mean" => Ok(ErrorMode::Mean),
            "safe" => Ok(ErrorMode::Safe),
            _ => Err(invalid_arg(format!(
                "Error mode should be true, mean or safe, got {:?}",
                s
            ))),
        }
    }
}

/// Validity-domain settings of the error bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationConfig {
    /// Largest |τ| (Julian millennia from J2000) the bounds hold for
    pub domain_bound: f64,
    /// Multiplier on `domain_bound` used by [`ErrorMode::Safe`]
    pub safety_factor: f64,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            domain_bound: DEFAULT_DOMAIN_BOUND,
            safety_factor: DEFAULT_SAFETY_FACTOR,
        }
    }
}

impl TruncationConfig {
    /// Create a validated configuration
    pub fn new(domain_bound: f64, safety_factor: f64) -> Result<Self> {
        let config = Self {
            domain_bound,
            safety_factor,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VsopError::DataError(format!("Invalid truncation config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.domain_bound.is_finite() && self.domain_bound > 0.0) {
            return Err(invalid_arg(format!(
                "Domain bound must be a positive number, got {}",
                self.domain_bound
            )));
        }
        if !(self.safety_factor.is_finite() && self.safety_factor >= 1.0) {
            return Err(invalid_arg(format!(
                "Safety factor must be at least 1, got {}",
                self.safety_factor
            )));
        }
        Ok(())
    }

    /// The |τ| bound a given mode evaluates its estimate at
    pub fn bound_for(&self, mode: ErrorMode) -> f64 {
        match mode {
            ErrorMode::Worst | ErrorMode::Mean => self.domain_bound,
            ErrorMode::Safe => self.domain_bound * self.safety_factor,
        }
    }
}

/// Pure evaluation and truncation functions over series models
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TruncationEngine {
    config: TruncationConfig,
}

impl TruncationEngine {
    pub fn new(config: TruncationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TruncationConfig {
        &self.config
    }

    /// Evaluate `model` at reduced time `tau`, keeping the leading
    /// `truncation[d]` terms of every degree `d`
    pub fn evaluate(&self, model: &SeriesModel, truncation: &TruncationVector, tau: f64) -> Result<f64> {
        truncation.check_entries(model)?;

        let mut result = 0.0;
        for (d, degree) in model.degrees().iter().enumerate() {
            let count = truncation.get(d);
            if count == 0 {
                continue;
            }
            result += degree.partial_sum(count, tau) * tau.powi(d as i32);
        }

        Ok(result)
    }

    /// Bound the magnitude of what `truncation` leaves out of `model`
    pub fn estimate_max_error(
        &self,
        model: &SeriesModel,
        truncation: &TruncationVector,
        mode: ErrorMode,
    ) -> Result<f64> {
        truncation.check_entries(model)?;
        let tails = TailErrors::new(model, mode, self.config.bound_for(mode));
        Ok(tails.bound(truncation.as_slice()))
    }

    /// Derive the smallest truncation whose estimated error is at most `max_error`
    ///
    /// Terms are added greedily, always taking the largest remaining bound
    /// contribution `|A| · β^d` across all degrees. For the additive bounds this
    /// reaches the budget with the fewest terms; for [`ErrorMode::Mean`] the same
    /// order is a good heuristic. When even the full series misses the budget the
    /// full vector is returned.
    ///
    /// Tail errors are tabulated once, so each step costs one lookup per degree.
    pub fn make_truncation_nums(
        &self,
        model: &SeriesModel,
        max_error: f64,
        mode: ErrorMode,
    ) -> Result<TruncationVector> {
        if max_error.is_nan() || max_error < 0.0 {
            return Err(domain_err(format!(
                "Maximum error must be non-negative, got {}",
                max_error
            )));
        }

        let beta = self.config.bound_for(mode);
        let tails = TailErrors::new(model, mode, beta);
        let mut counts = vec![0usize; model.degree_count()];

        while tails.bound(&counts) > max_error {
            let mut best: Option<(usize, f64)> = None;
            for (d, degree) in model.degrees().iter().enumerate() {
                if let Some(term) = degree.terms().get(counts[d]) {
                    let contribution = term.amplitude.abs() * tails.scales[d];
                    if best.map_or(true, |(_, c)| contribution > c) {
                        best = Some((d, contribution));
                    }
                }
            }

            match best {
                Some((d, _)) => counts[d] += 1,
                None => break,
            }
        }

        let truncation = TruncationVector::new(counts);
        log::debug!(
            "Derived truncation {} ({} of {} terms) for max error {:e} ({} mode)",
            truncation,
            truncation.total_terms(),
            model.total_terms(),
            max_error,
            mode
        );
        Ok(truncation)
    }
}

/// Per-degree error of every possible tail of a model
///
/// `tails[d][k]` is the error of dropping terms `k..` of degree `d`, so the
/// bound for any kept counts is one lookup per degree.
struct TailErrors {
    tails: Vec<Vec<f64>>,
    scales: Vec<f64>,
}

impl TailErrors {
    fn new(model: &SeriesModel, mode: ErrorMode, beta: f64) -> Self {
        let tails = model
            .degrees()
            .iter()
            .map(|degree| tail_errors(degree, mode))
            .collect();
        let scales = (0..model.degree_count())
            .map(|d| beta.powi(d as i32))
            .collect();
        Self { tails, scales }
    }

    /// Error estimate for kept counts, assumed already checked against the model
    fn bound(&self, counts: &[usize]) -> f64 {
        let mut total = 0.0;
        for (d, (tail, scale)) in self.tails.iter().zip(&self.scales).enumerate() {
            let kept = counts.get(d).copied().unwrap_or(0);
            total += tail[kept] * scale;
        }
        total
    }
}

fn tail_errors(degree: &Degree, mode: ErrorMode) -> Vec<f64> {
    let terms = degree.terms();
    let mut tails = vec![0.0; terms.len() + 1];
    let mut acc: f64 = 0.0;
    for (k, term) in terms.iter().enumerate().rev() {
        acc += match mode {
            ErrorMode::Worst | ErrorMode::Safe => term.amplitude.abs(),
            ErrorMode::Mean => term.amplitude * term.amplitude,
        };
        tails[k] = match mode {
            ErrorMode::Worst | ErrorMode::Safe => acc,
            ErrorMode::Mean => acc.sqrt(),
        };
    }
    tails
}

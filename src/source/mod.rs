//! Cached quantity sources
//!
//! A [`QuantitySource`] owns everything needed to produce one quantity: the
//! series model, the truncation vector currently applied to it and the engine
//! that evaluates it. The cache is shared by the sources of one planet and is
//! passed in on every call.
//!
//! Per quantity the state machine is:
//!
//! ```text
//!   Uncomputed --value()--> Cached
//!   Cached --set_truncation / set_max_error / clock mutation / rebind--> Uncomputed
//! ```

use crate::cache::TimeKeyedCache;
use crate::errors::Result;
use crate::series::{ErrorMode, Quantity, SeriesModel, TruncationEngine, TruncationVector};
use std::sync::Arc;

/// Whether a source's value is available without evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uncomputed,
    Cached,
}

/// One quantity of one planet: a model, its truncation and its cache key
#[derive(Debug, Clone)]
pub struct QuantitySource {
    quantity: Quantity,
    model: Arc<SeriesModel>,
    truncation: TruncationVector,
    engine: TruncationEngine,
    evaluations: u64,
}

impl QuantitySource {
    /// Create a source keeping every term of `model`
    pub fn new(quantity: Quantity, model: Arc<SeriesModel>, engine: TruncationEngine) -> Self {
        let truncation = TruncationVector::full(&model);
        Self {
            quantity,
            model,
            truncation,
            engine,
            evaluations: 0,
        }
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn model(&self) -> &Arc<SeriesModel> {
        &self.model
    }

    pub fn truncation(&self) -> &TruncationVector {
        &self.truncation
    }

    pub fn engine(&self) -> &TruncationEngine {
        &self.engine
    }

    /// Number of times the series has been evaluated for this source
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn state(&self, cache: &mut TimeKeyedCache) -> CacheState {
        if cache.has(self.quantity) {
            CacheState::Cached
        } else {
            CacheState::Uncomputed
        }
    }

    /// Value of the quantity at the cache clock's current instant
    ///
    /// Returns the cached value when there is one; otherwise evaluates the
    /// series at the clock's reduced time and caches the result.
    pub fn value(&mut self, cache: &mut TimeKeyedCache) -> Result<f64> {
        if let Some(value) = cache.get(self.quantity) {
            log::trace!("Cache hit for {}", self.quantity);
            return Ok(value);
        }

        let tau = cache.reduced_time();
        let value = self.engine.evaluate(&self.model, &self.truncation, tau)?;
        self.evaluations += 1;
        log::trace!(
            "Cache miss for {}: evaluated {} terms at tau = {}",
            self.quantity,
            self.truncation.total_terms(),
            tau
        );

        cache.set(self.quantity, value);
        Ok(value)
    }

    /// Replace the truncation vector and invalidate this quantity's cached value
    ///
    /// The vector must have one entry per degree of the model, each within the
    /// degree's term count. On error nothing changes.
    pub fn set_truncation(
        &mut self,
        cache: &mut TimeKeyedCache,
        truncation: TruncationVector,
    ) -> Result<()> {
        truncation.validate(&self.model)?;
        self.truncation = truncation;
        cache.remove(self.quantity);
        Ok(())
    }

    /// Apply the smallest truncation whose estimated error is at most `max_error`
    pub fn set_max_error(
        &mut self,
        cache: &mut TimeKeyedCache,
        max_error: f64,
        mode: ErrorMode,
    ) -> Result<()> {
        let truncation = self
            .engine
            .make_truncation_nums(&self.model, max_error, mode)?;
        self.set_truncation(cache, truncation)
    }

    /// Estimated error of the current truncation
    pub fn current_error(&self, mode: ErrorMode) -> Result<f64> {
        self.engine
            .estimate_max_error(&self.model, &self.truncation, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VsopError;
    use crate::time::ObservationTime;
    use approx::assert_relative_eq;
    use std::rc::Rc;

    fn model() -> Arc<SeriesModel> {
        Arc::new(
            SeriesModel::from_rows(
                &[
                    &[[1.0, 0.0, 0.0], [0.5, 1.0, 10.0], [0.25, 2.0, 20.0]],
                    &[[0.2, 0.3, 5.0], [0.1, 0.7, 9.0]],
                ],
                1.0,
            )
            .unwrap(),
        )
    }

    fn setup() -> (Rc<ObservationTime>, TimeKeyedCache, QuantitySource) {
        let time = Rc::new(ObservationTime::from_jde(2451545.0 + 36525.0).unwrap());
        let cache = TimeKeyedCache::new(Rc::clone(&time));
        let source = QuantitySource::new(Quantity::L, model(), TruncationEngine::default());
        (time, cache, source)
    }

    #[test]
    fn test_defaults_to_full_truncation() {
        let (_, _, source) = setup();
        assert_eq!(source.truncation().as_slice(), &[3, 2]);
        assert_eq!(source.current_error(ErrorMode::Worst).unwrap(), 0.0);
    }

    #[test]
    fn test_value_is_cached() {
        let (_, mut cache, mut source) = setup();
        assert_eq!(source.state(&mut cache), CacheState::Uncomputed);

        let first = source.value(&mut cache).unwrap();
        assert_eq!(source.state(&mut cache), CacheState::Cached);
        let second = source.value(&mut cache).unwrap();

        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(source.evaluations(), 1);

        let engine = TruncationEngine::default();
        let expected = engine
            .evaluate(&model(), &TruncationVector::full(&model()), 0.1)
            .unwrap();
        assert_relative_eq!(first, expected, epsilon = 1e-15);
    }

    #[test]
    fn test_set_truncation_invalidates_only_its_key() {
        let (_, mut cache, mut source) = setup();
        source.value(&mut cache).unwrap();
        cache.set(Quantity::R, 1.0);

        source
            .set_truncation(&mut cache, TruncationVector::new(vec![1, 0]))
            .unwrap();
        assert_eq!(source.state(&mut cache), CacheState::Uncomputed);
        assert_eq!(cache.get(Quantity::R), Some(1.0));

        assert_relative_eq!(source.value(&mut cache).unwrap(), 1.0);
        assert_eq!(source.evaluations(), 2);
    }

    #[test]
    fn test_rejected_truncation_keeps_state() {
        let (_, mut cache, mut source) = setup();
        source.value(&mut cache).unwrap();

        let longer = TruncationVector::new(vec![1, 1, 1]);
        assert!(matches!(
            source.set_truncation(&mut cache, longer),
            Err(VsopError::DomainError(_))
        ));
        let shorter = TruncationVector::new(vec![1]);
        assert!(matches!(
            source.set_truncation(&mut cache, shorter),
            Err(VsopError::DomainError(_))
        ));

        assert_eq!(source.truncation().as_slice(), &[3, 2]);
        assert_eq!(source.state(&mut cache), CacheState::Cached);
    }

    #[test]
    fn test_set_max_error() {
        let (_, mut cache, mut source) = setup();
        source.value(&mut cache).unwrap();

        source
            .set_max_error(&mut cache, 0.4, ErrorMode::Worst)
            .unwrap();
        assert_eq!(source.truncation().as_slice(), &[3, 0]);
        assert!(source.current_error(ErrorMode::Worst).unwrap() <= 0.4);
        assert_eq!(source.state(&mut cache), CacheState::Uncomputed);

        assert!(matches!(
            source.set_max_error(&mut cache, -0.1, ErrorMode::Worst),
            Err(VsopError::DomainError(_))
        ));
        assert_eq!(source.truncation().as_slice(), &[3, 0]);
    }

    #[test]
    fn test_clock_mutation_forces_recompute() {
        let (time, mut cache, mut source) = setup();
        let before = source.value(&mut cache).unwrap();

        time.set(time.time());
        assert_eq!(source.state(&mut cache), CacheState::Uncomputed);
        let after = source.value(&mut cache).unwrap();

        assert_eq!(before.to_bits(), after.to_bits());
        assert_eq!(source.evaluations(), 2);
    }
}

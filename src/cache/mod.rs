//! Time-keyed memoization of computed quantities
//!
//! A [`TimeKeyedCache`] stores the last raw value of each [`Quantity`] and is
//! bound to exactly one [`ObservationTime`]. It never computes anything itself.
//! Whoever fills it is responsible for removing an entry when the truncation
//! behind it changes; time changes are tracked here.
//!
//! The clock counts its own mutations. The cache remembers the count it last saw
//! and drops every entry the first time it notices a different one, which is how
//! it is "notified" of mutations without callbacks.

use crate::series::Quantity;
use crate::time::ObservationTime;
use std::collections::HashMap;
use std::rc::Rc;

/// Last computed value per quantity, valid for one observation instant
#[derive(Debug)]
pub struct TimeKeyedCache {
    time: Rc<ObservationTime>,
    seen_revision: u64,
    entries: HashMap<Quantity, f64>,
}

impl TimeKeyedCache {
    /// Create an empty cache bound to `time`
    pub fn new(time: Rc<ObservationTime>) -> Self {
        let seen_revision = time.revision();
        Self {
            time,
            seen_revision,
            entries: HashMap::new(),
        }
    }

    /// Drop every entry if the bound clock moved since the last access
    fn sync(&mut self) {
        let revision = self.time.revision();
        if revision != self.seen_revision {
            if !self.entries.is_empty() {
                log::trace!(
                    "Observation time changed to {}, dropping {} cached values",
                    self.time.time(),
                    self.entries.len()
                );
            }
            self.entries.clear();
            self.seen_revision = revision;
        }
    }

    pub fn has(&mut self, key: Quantity) -> bool {
        self.sync();
        self.entries.contains_key(&key)
    }

    pub fn get(&mut self, key: Quantity) -> Option<f64> {
        self.sync();
        self.entries.get(&key).copied()
    }

    /// Store `value` for `key` at the current instant
    pub fn set(&mut self, key: Quantity, value: f64) {
        self.sync();
        self.entries.insert(key, value);
    }

    /// Forget the value for `key`, returning it if there was one
    pub fn remove(&mut self, key: Quantity) -> Option<f64> {
        self.sync();
        self.entries.remove(&key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen_revision = self.time.revision();
    }

    /// Bind the cache to another clock, discarding every entry
    pub fn rebind(&mut self, time: Rc<ObservationTime>) {
        log::debug!(
            "Rebinding cache from {} to {}",
            self.time.time(),
            time.time()
        );
        self.time = time;
        self.clear();
    }

    /// The clock this cache is bound to
    pub fn time(&self) -> &Rc<ObservationTime> {
        &self.time
    }

    /// Reduced time τ of the bound clock
    pub fn reduced_time(&self) -> f64 {
        self.time.reduced_time()
    }

    /// Number of live entries
    pub fn len(&mut self) -> usize {
        self.sync();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(jde: f64) -> Rc<ObservationTime> {
        Rc::new(ObservationTime::from_jde(jde).unwrap())
    }

    #[test]
    fn test_basic_operations() {
        let mut cache = TimeKeyedCache::new(clock(2451545.0));
        assert!(cache.is_empty());
        assert!(!cache.has(Quantity::L));

        cache.set(Quantity::L, 1.5);
        cache.set(Quantity::R, 0.98);
        assert!(cache.has(Quantity::L));
        assert_eq!(cache.get(Quantity::L), Some(1.5));
        assert_eq!(cache.get(Quantity::B), None);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.remove(Quantity::L), Some(1.5));
        assert!(!cache.has(Quantity::L));
        assert!(cache.has(Quantity::R));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clock_mutation_invalidates_everything() {
        let time = clock(2451545.0);
        let mut cache = TimeKeyedCache::new(Rc::clone(&time));
        cache.set(Quantity::L, 1.0);
        cache.set(Quantity::B, 0.1);

        // Moving the clock to the very same instant still invalidates
        time.set(time.time());
        assert!(!cache.has(Quantity::L));
        assert!(!cache.has(Quantity::B));

        // Values stored after the mutation survive until the next one
        cache.set(Quantity::L, 2.0);
        assert_eq!(cache.get(Quantity::L), Some(2.0));
        time.set_jde(2451546.0).unwrap();
        assert_eq!(cache.get(Quantity::L), None);
    }

    #[test]
    fn test_rebind() {
        let first = clock(2451545.0);
        let second = clock(2448908.5);
        let mut cache = TimeKeyedCache::new(Rc::clone(&first));
        cache.set(Quantity::R, 1.0);

        cache.rebind(Rc::clone(&second));
        assert!(!cache.has(Quantity::R));
        assert!(Rc::ptr_eq(cache.time(), &second));

        // The old clock no longer affects the cache
        cache.set(Quantity::R, 0.99);
        first.set_jde(2451600.0).unwrap();
        assert_eq!(cache.get(Quantity::R), Some(0.99));

        second.set_jde(2448909.5).unwrap();
        assert_eq!(cache.get(Quantity::R), None);
    }

    #[test]
    fn test_reduced_time_follows_clock() {
        let time = clock(2451545.0);
        let cache = TimeKeyedCache::new(Rc::clone(&time));
        assert_eq!(cache.reduced_time(), 0.0);
        time.set_jde(2451545.0 + 365250.0).unwrap();
        assert_eq!(cache.reduced_time(), 1.0);
    }
}

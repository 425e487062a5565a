//! Speed limit override table
//!
//! Some roads report a regulatory limit that the driver wants displayed
//! differently (the classic example being 120 shown as 110). [`SpeedMapper`]
//! is a small mutable table from observed limit to displayed limit, read on
//! every normalization pass and written from the configuration path.
//!
//! The table is internally synchronized so one shared instance can serve
//! both paths; atomicity is per entry, there are no cross-entry transactions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::RwLock;

/// Mutable original-limit to displayed-limit override table.
///
/// At most one entry per original value. A companion "last original speed
/// seen" scalar is kept for introspection only and carries no correctness
/// obligation.
#[derive(Debug, Default)]
pub struct SpeedMapper {
    map: RwLock<HashMap<i32, i32>>,
    last_original: AtomicI32,
}

impl SpeedMapper {
    /// Create an empty table.
    pub fn new() -> Self {
        SpeedMapper::default()
    }

    /// Record `shown` as the displayed value for `original`.
    ///
    /// A non-positive `shown`, or `shown == original`, clears any existing
    /// entry for `original` instead.
    pub fn set_mapping(&self, original: i32, shown: i32) {
        let mut map = self.map.write().unwrap();
        if shown > 0 && shown != original {
            map.insert(original, shown);
        } else {
            map.remove(&original);
        }
    }

    /// Remove any override for `original`.
    pub fn clear_mapping(&self, original: i32) {
        self.map.write().unwrap().remove(&original);
    }

    /// Map an observed speed limit to its displayed value.
    ///
    /// The raw observation is recorded for introspection before anything
    /// else, including non-positive values that are returned unchanged.
    pub fn apply(&self, observed: i32) -> i32 {
        self.last_original.store(observed, Ordering::Relaxed);
        if observed <= 0 {
            return observed;
        }
        let map = self.map.read().unwrap();
        map.get(&observed).copied().unwrap_or(observed)
    }

    /// Snapshot of the current override entries.
    pub fn mappings(&self) -> HashMap<i32, i32> {
        self.map.read().unwrap().clone()
    }

    /// The most recent raw value passed to [`apply`](Self::apply).
    pub fn last_original_speed(&self) -> i32 {
        self.last_original.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_applied() {
        let mapper = SpeedMapper::new();
        mapper.set_mapping(120, 110);
        assert_eq!(mapper.apply(120), 110);
        assert_eq!(mapper.apply(100), 100); // no entry: unchanged
    }

    #[test]
    fn test_identity_and_zero_clear() {
        let mapper = SpeedMapper::new();
        mapper.set_mapping(120, 110);

        // shown == original clears
        mapper.set_mapping(120, 120);
        assert_eq!(mapper.apply(120), 120);

        mapper.set_mapping(80, 70);
        // non-positive shown clears
        mapper.set_mapping(80, 0);
        assert_eq!(mapper.apply(80), 80);
        assert!(mapper.mappings().is_empty());
    }

    #[test]
    fn test_non_positive_observed_passes_through() {
        let mapper = SpeedMapper::new();
        mapper.set_mapping(120, 110);
        assert_eq!(mapper.apply(0), 0);
        assert_eq!(mapper.apply(-7), -7);
    }

    #[test]
    fn test_last_original_recorded_unconditionally() {
        let mapper = SpeedMapper::new();
        mapper.apply(120);
        assert_eq!(mapper.last_original_speed(), 120);

        // Recorded even when the value is rejected downstream.
        mapper.apply(-1);
        assert_eq!(mapper.last_original_speed(), -1);
    }

    #[test]
    fn test_clear_mapping() {
        let mapper = SpeedMapper::new();
        mapper.set_mapping(100, 90);
        mapper.clear_mapping(100);
        assert_eq!(mapper.apply(100), 100);
    }
}

//! Warm pool model.
//!
//! A function type is warm on a worker at time `t` iff it was invoked there before and `t - last <= warm_window`.
//! Only the latest invocation time of each (function type, worker) pair is kept.
use crate::util::FxIndexMap;

pub const DEFAULT_WARM_WINDOW: f64 = 300.0;

pub struct WarmPoolTracker {
    warm_window: f64,
    // function type -> worker id -> last invocation time
    last_invocation: FxIndexMap<usize, FxIndexMap<usize, f64>>,
}

impl WarmPoolTracker {
    pub fn new(warm_window: f64) -> Self {
        Self {
            warm_window,
            last_invocation: Default::default(),
        }
    }

    pub fn warm_window(&self) -> f64 {
        self.warm_window
    }

    /// Time of the latest recorded invocation of the function type on the worker.
    pub fn last_invocation(&self, function_type: usize, worker_id: usize) -> Option<f64> {
        self.last_invocation
            .get(&function_type)
            .and_then(|m| m.get(&worker_id))
            .copied()
    }

    /// Checks whether the function type is warm on the worker. Pairs that were never invoked are cold.
    pub fn is_warm(&self, function_type: usize, worker_id: usize, at_time: f64) -> bool {
        match self.last_invocation(function_type, worker_id) {
            Some(last) => at_time - last <= self.warm_window,
            None => false,
        }
    }

    /// Overwrites the last invocation time of the pair.
    ///
    /// Must be called after the warm/cold decision for the same invocation was taken, otherwise the invocation
    /// would see itself as warm.
    pub fn record_invocation(&mut self, function_type: usize, worker_id: usize, at_time: f64) {
        self.last_invocation
            .entry(function_type)
            .or_default()
            .insert(worker_id, at_time);
    }

    /// Returns warm function types (ascending) for each of the given workers, in the given order.
    pub fn status_snapshot(
        &self,
        at_time: f64,
        workers: impl IntoIterator<Item = usize>,
    ) -> FxIndexMap<usize, Vec<usize>> {
        let mut function_types: Vec<usize> = self.last_invocation.keys().copied().collect();
        function_types.sort_unstable();
        workers
            .into_iter()
            .map(|worker_id| {
                let warm = function_types
                    .iter()
                    .copied()
                    .filter(|&f| self.is_warm(f, worker_id, at_time))
                    .collect();
                (worker_id, warm)
            })
            .collect()
    }
}

impl Default for WarmPoolTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WARM_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cold_by_default() {
        let tracker = WarmPoolTracker::new(5.0);
        assert!(!tracker.is_warm(0, 0, 0.0));
        assert!(!tracker.is_warm(42, 3, 100.0));
        assert_eq!(tracker.last_invocation(0, 0), None);
    }

    #[test]
    fn test_window_is_closed() {
        let mut tracker = WarmPoolTracker::new(5.0);
        tracker.record_invocation(1, 0, 2.0);
        assert!(tracker.is_warm(1, 0, 2.0));
        assert!(tracker.is_warm(1, 0, 7.0));
        assert!(!tracker.is_warm(1, 0, 7.0 + 1e-9));
        assert!(!tracker.is_warm(1, 1, 3.0));
        assert!(!tracker.is_warm(2, 0, 3.0));
    }

    #[test]
    fn test_record_overwrites() {
        let mut tracker = WarmPoolTracker::new(5.0);
        tracker.record_invocation(1, 0, 0.0);
        tracker.record_invocation(1, 0, 4.0);
        assert_eq!(tracker.last_invocation(1, 0), Some(4.0));
        assert!(tracker.is_warm(1, 0, 9.0));
    }

    #[test]
    fn test_status_snapshot() {
        let mut tracker = WarmPoolTracker::new(5.0);
        tracker.record_invocation(2, 0, 1.0);
        tracker.record_invocation(1, 0, 0.0);
        tracker.record_invocation(1, 1, 2.0);
        tracker.record_invocation(3, 1, -10.0);
        let snapshot = tracker.status_snapshot(2.0, [1, 0, 5]);
        assert_eq!(snapshot.keys().copied().collect::<Vec<_>>(), vec![1, 0, 5]);
        assert_eq!(snapshot[&0], vec![1, 2]);
        assert_eq!(snapshot[&1], vec![1]);
        assert!(snapshot[&5].is_empty());
        assert_eq!(tracker.last_invocation(1, 0), Some(0.0));
    }
}

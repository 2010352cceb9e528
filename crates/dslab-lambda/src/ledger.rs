//! Per-worker memory occupancy ledger.
//!
//! The ledger is append-only: events are never removed during a run. Occupancy at time `t` is the sum of all
//! allocations minus all releases with timestamp `<= t`, so an event at exactly `t` is already counted.
use serde::Serialize;

use crate::error::{Result, SchedulingError};
use crate::util::FxIndexMap;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LedgerEvent {
    pub timestamp: f64,
    pub worker_id: usize,
    /// Memory in MB, always non-negative.
    pub amount: f64,
    pub is_allocate: bool,
}

impl LedgerEvent {
    fn signed_amount(&self) -> f64 {
        if self.is_allocate {
            self.amount
        } else {
            -self.amount
        }
    }
}

#[derive(Clone, Default)]
pub struct TimelineLedger {
    events: FxIndexMap<usize, Vec<LedgerEvent>>,
}

impl TimelineLedger {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records one event. Fails only if `amount` is negative (or NaN).
    pub fn append(&mut self, worker_id: usize, timestamp: f64, amount: f64, is_allocate: bool) -> Result<()> {
        if amount.is_nan() || amount < 0.0 {
            return Err(SchedulingError::InvalidAmount { worker_id, amount });
        }
        self.events.entry(worker_id).or_default().push(LedgerEvent {
            timestamp,
            worker_id,
            amount,
            is_allocate,
        });
        Ok(())
    }

    /// Memory in use on the worker at `timestamp`. Workers without events use nothing.
    pub fn usage_at(&self, worker_id: usize, timestamp: f64) -> f64 {
        self.worker_events(worker_id)
            .iter()
            .filter(|e| e.timestamp <= timestamp)
            .map(|e| e.signed_amount())
            .sum()
    }

    /// Fraction of `total_memory` in use at `timestamp`.
    pub fn utilization_at(&self, worker_id: usize, timestamp: f64, total_memory: u64) -> f64 {
        if total_memory == 0 {
            return 0.;
        }
        self.usage_at(worker_id, timestamp) / (total_memory as f64)
    }

    /// Maximum occupancy ever reached on the worker.
    pub fn peak_usage(&self, worker_id: usize) -> f64 {
        let mut events: Vec<_> = self.worker_events(worker_id).to_vec();
        // releases go before allocations at equal timestamps: back-to-back invocations do not overlap
        events.sort_by(|a, b| {
            a.timestamp
                .total_cmp(&b.timestamp)
                .then(a.is_allocate.cmp(&b.is_allocate))
        });
        let mut curr = 0.;
        let mut peak: f64 = 0.;
        for e in events.iter() {
            curr += e.signed_amount();
            peak = peak.max(curr);
        }
        peak
    }

    /// Events of the worker in insertion order.
    pub fn worker_events(&self, worker_id: usize) -> &[LedgerEvent] {
        self.events.get(&worker_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Total number of events over all workers.
    pub fn len(&self) -> usize {
        self.events.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut ledger = TimelineLedger::new();
        assert_eq!(ledger.usage_at(0, 0.0), 0.);
        ledger.append(0, 1.0, 128., true).unwrap();
        ledger.append(0, 3.0, 128., false).unwrap();
        assert_eq!(ledger.usage_at(0, 0.5), 0.);
        assert_eq!(ledger.usage_at(0, 1.0), 128.);
        assert_eq!(ledger.usage_at(0, 2.9), 128.);
        assert_eq!(ledger.usage_at(0, 3.0), 0.);
    }

    #[test]
    fn test_workers_are_isolated() {
        let mut ledger = TimelineLedger::new();
        ledger.append(0, 0.0, 100., true).unwrap();
        ledger.append(1, 0.0, 50., true).unwrap();
        ledger.append(1, 0.0, 25., true).unwrap();
        assert_eq!(ledger.usage_at(0, 10.0), 100.);
        assert_eq!(ledger.usage_at(1, 10.0), 75.);
        assert_eq!(ledger.usage_at(2, 10.0), 0.);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.worker_events(1).len(), 2);
    }

    #[test]
    fn test_negative_amount() {
        let mut ledger = TimelineLedger::new();
        assert!(matches!(
            ledger.append(4, 0.0, -1., true),
            Err(SchedulingError::InvalidAmount { worker_id: 4, .. })
        ));
        assert!(ledger.append(4, 0.0, f64::NAN, false).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_peak_and_utilization() {
        let mut ledger = TimelineLedger::new();
        ledger.append(0, 0.0, 128., true).unwrap();
        ledger.append(0, 5.0, 128., false).unwrap();
        ledger.append(0, 2.0, 128., true).unwrap();
        ledger.append(0, 7.0, 128., false).unwrap();
        ledger.append(0, 7.0, 64., true).unwrap();
        ledger.append(0, 8.0, 64., false).unwrap();
        assert_eq!(ledger.peak_usage(0), 256.);
        assert_eq!(ledger.utilization_at(0, 3.0, 512), 0.5);
        assert_eq!(ledger.utilization_at(0, 3.0, 0), 0.);
    }
}

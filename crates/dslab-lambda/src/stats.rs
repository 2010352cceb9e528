use std::ops::AddAssign;

use num::{ToPrimitive, Zero};

use crate::invocation::InvocationOutcome;
use crate::util::FxIndexMap;

#[derive(Clone, Debug, Default)]
pub struct SampleMetric<T> {
    data: Vec<T>,
}

impl<T> SampleMetric<T> {
    pub fn add(&mut self, x: T) {
        self.data.push(x);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> SampleMetric<T>
where
    T: Copy + PartialOrd,
{
    pub fn min(&self) -> Option<T> {
        self.data
            .iter()
            .copied()
            .fold(None, |acc, x| match acc {
                Some(m) if m <= x => Some(m),
                _ => Some(x),
            })
    }

    pub fn max(&self) -> Option<T> {
        self.data
            .iter()
            .copied()
            .fold(None, |acc, x| match acc {
                Some(m) if m >= x => Some(m),
                _ => Some(x),
            })
    }
}

impl<T> SampleMetric<T>
where
    T: AddAssign + Copy + Zero,
{
    pub fn sum(&self) -> T {
        let mut s = T::zero();
        for x in self.data.iter().copied() {
            s += x;
        }
        s
    }
}

impl<T> SampleMetric<T>
where
    T: AddAssign + Copy + Zero + ToPrimitive,
{
    /// Mean value, NaN for an empty metric.
    pub fn mean(&self) -> f64 {
        self.sum().to_f64().unwrap_or(f64::NAN) / (self.data.len() as f64)
    }

    /// Linearly interpolated quantile, `q` in [0, 1]. NaN for an empty metric.
    pub fn quantile(&self, q: f64) -> f64 {
        let mut values: Vec<f64> = self.data.iter().filter_map(|x| x.to_f64()).collect();
        if values.is_empty() {
            return f64::NAN;
        }
        let pos = q.clamp(0., 1.) * ((values.len() - 1) as f64);
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let lo_value = *order_stat::kth_by(&mut values, lo, |a, b| a.total_cmp(b));
        let hi_value = *order_stat::kth_by(&mut values, hi, |a, b| a.total_cmp(b));
        lo_value + (hi_value - lo_value) * (pos - lo as f64)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InvocationStats {
    pub invocations: u64,
    pub cold_starts: u64,
    pub execution_length: SampleMetric<f64>,
}

impl InvocationStats {
    pub fn update(&mut self, outcome: &InvocationOutcome) {
        self.invocations += 1;
        if outcome.is_cold() {
            self.cold_starts += 1;
        }
        if let Some(len) = outcome.execution_length {
            self.execution_length.add(len);
        }
    }

    pub fn warm_starts(&self) -> u64 {
        self.invocations - self.cold_starts
    }

    /// Share of warm starts, zero if there were no invocations.
    pub fn warm_ratio(&self) -> f64 {
        if self.invocations == 0 {
            return 0.;
        }
        (self.warm_starts() as f64) / (self.invocations as f64)
    }
}

/// Aggregated run statistics. Per-function and per-worker maps keep first-seen order.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub global: InvocationStats,
    pub by_function: FxIndexMap<usize, InvocationStats>,
    pub by_worker: FxIndexMap<usize, InvocationStats>,
}

impl Stats {
    /// Accumulates finalized outcomes, others are skipped.
    pub fn from_outcomes(outcomes: &[InvocationOutcome]) -> Self {
        let mut stats: Self = Default::default();
        for outcome in outcomes.iter().filter(|o| o.is_finalized()) {
            stats.update(outcome);
        }
        stats
    }

    pub fn update(&mut self, outcome: &InvocationOutcome) {
        self.global.update(outcome);
        self.by_function
            .entry(outcome.request.function_type)
            .or_default()
            .update(outcome);
        if let Some(worker_id) = outcome.worker_id {
            self.by_worker.entry(worker_id).or_default().update(outcome);
        }
    }
}

//! Synthetic trace generator.
use std::boxed::Box;

use rand::prelude::*;
use rand_distr::Exp;
use rand_pcg::Pcg64;

use crate::error::{Result, SchedulingError};
use crate::trace::{RequestData, ScheduleTrace};

/// Type erased version of rand::Distribution trait.
pub trait ErasedDistribution<T> {
    /// Generate a random value of T, using rng as the source of randomness.
    fn sample(&self, rng: &mut dyn rand::RngCore) -> T;
}

impl<T, D: Distribution<T> + ?Sized> ErasedDistribution<T> for D {
    fn sample(&self, rng: &mut dyn rand::RngCore) -> T {
        <Self as Distribution<T>>::sample(self, rng)
    }
}

/// Generator of invocation arrival times.
pub enum ArrivalGenerator {
    /// Random inter-arrival times.
    Random(Box<dyn ErasedDistribution<f64> + Send + Sync>),
    /// Generates equally spaced arrival times with given interval between consecutive arrivals.
    EquallySpaced(f64),
    /// Explicitly given arrivals.
    Fixed(Vec<f64>),
}

impl ArrivalGenerator {
    /// Poisson process with the given rate (arrivals per second).
    pub fn poisson(rate: f64) -> Result<Self> {
        let dist = Exp::new(rate)
            .map_err(|e| SchedulingError::InvalidConfig(format!("bad arrival rate {}: {}", rate, e)))?;
        Ok(ArrivalGenerator::Random(Box::new(dist)))
    }
}

/// Function type generation settings.
pub struct SyntheticTraceFunctionConfig {
    /// Time interval that will contain all arrival times.
    pub activity_window: (f64, f64),
    /// Arrival times generator.
    pub arrival_generator: ArrivalGenerator,
}

/// Synthetic trace generation settings. Function type `i` is described by `functions[i]`.
pub struct SyntheticTraceConfig {
    pub functions: Vec<SyntheticTraceFunctionConfig>,
    /// Random generator seed.
    pub random_seed: u64,
}

/// Generates synthetic trace, requests are ordered by time.
pub fn generate_synthetic_trace(mut config: SyntheticTraceConfig) -> Result<ScheduleTrace> {
    let mut gen = Pcg64::seed_from_u64(config.random_seed);
    let mut requests = Vec::new();
    for (function_type, function_config) in config.functions.drain(..).enumerate() {
        let (win_l, win_r) = function_config.activity_window;
        if win_l.is_nan() || win_r.is_nan() || win_l < 0. || win_l > win_r {
            return Err(SchedulingError::InvalidConfig(format!(
                "bad activity window ({}, {})",
                win_l, win_r
            )));
        }
        let mut arrivals = Vec::new();
        match function_config.arrival_generator {
            ArrivalGenerator::Random(dist) => {
                let mut t = win_l;
                while t < win_r + 1e-9 {
                    arrivals.push(t);
                    t += dist.sample(&mut gen);
                }
            }
            ArrivalGenerator::EquallySpaced(step) => {
                if step.is_nan() || step <= 0. {
                    return Err(SchedulingError::InvalidConfig(format!("bad arrival step {}", step)));
                }
                let mut t = win_l;
                while t < win_r + 1e-9 {
                    arrivals.push(t);
                    t += step;
                }
            }
            ArrivalGenerator::Fixed(vec) => {
                arrivals = vec;
            }
        }
        requests.extend(arrivals.into_iter().map(|time| RequestData { function_type, time }));
    }
    requests.sort();
    Ok(ScheduleTrace::new(requests))
}

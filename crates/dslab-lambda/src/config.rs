use std::boxed::Box;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::placement::{default_placement_policy_resolver, ModuloHashPolicy, PlacementPolicy};
use crate::warmpool::DEFAULT_WARM_WINDOW;
use crate::worker::{Worker, WorkerPool};

pub const DEFAULT_COLD_START_DURATION: f64 = 50.0;
pub const DEFAULT_WARM_START_DURATION: f64 = 50.0;
pub const DEFAULT_MEMORY_FOOTPRINT: u64 = 128;

/// Memory that one invocation occupies on its worker while it runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryFootprint {
    /// Fixed amount in MB.
    Fixed(u64),
    /// Share of the worker's total memory, in (0, 1].
    Fraction(f64),
}

impl MemoryFootprint {
    pub fn resolve(&self, worker: &Worker) -> f64 {
        match self {
            MemoryFootprint::Fixed(mb) => *mb as f64,
            MemoryFootprint::Fraction(share) => share * (worker.total_memory as f64),
        }
    }
}

impl Default for MemoryFootprint {
    fn default() -> Self {
        MemoryFootprint::Fixed(DEFAULT_MEMORY_FOOTPRINT)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkerConfig {
    /// Memory capacity in MB.
    pub total_memory: u64,
    pub cpu_capacity: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            total_memory: 512,
            cpu_capacity: 1000,
        }
    }
}

fn default_one() -> u32 {
    1
}

fn default_cpu_capacity() -> u64 {
    1000
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RawWorkerConfig {
    pub total_memory: u64,
    #[serde(default = "default_cpu_capacity")]
    pub cpu_capacity: u64,
    #[serde(default = "default_one")]
    pub count: u32,
}

/// YAML-serializable config
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub warm_window: Option<f64>,
    #[serde(default)]
    pub cold_start_duration: Option<f64>,
    #[serde(default)]
    pub warm_start_duration: Option<f64>,
    #[serde(default)]
    pub memory_footprint: Option<MemoryFootprint>,
    #[serde(default)]
    pub placement_policy: String,
    #[serde(default)]
    pub workers: Vec<RawWorkerConfig>,
}

pub fn parse_options(s: &str) -> HashMap<String, String> {
    let mut ans = HashMap::new();
    for t in s.split(',') {
        let val = t.split_once('=');
        if let Some((l, r)) = val {
            ans.insert(l.to_string(), r.to_string());
        }
    }
    ans
}

pub struct ConfigParamResolvers {
    pub placement_policy_resolver: Box<dyn Fn(&str) -> Result<Box<dyn PlacementPolicy>> + Send + Sync>,
}

impl Default for ConfigParamResolvers {
    fn default() -> Self {
        Self {
            placement_policy_resolver: Box::new(default_placement_policy_resolver),
        }
    }
}

/// This is scheduler config. It implements Default trait (see below) so that you can create
/// default config and change only the fields you need.
pub struct Config {
    /// Maximum idle time after which a function type stops being warm on a worker.
    pub warm_window: f64,
    /// Execution length of a cold start (loading + initialization + run).
    pub cold_start_duration: f64,
    /// Execution length of a warm start, initialization is skipped.
    pub warm_start_duration: f64,
    pub memory_footprint: MemoryFootprint,
    pub placement_policy: Box<dyn PlacementPolicy>,
    /// Worker `i` of the pool gets id `i`.
    pub workers: Vec<WorkerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warm_window: DEFAULT_WARM_WINDOW,
            cold_start_duration: DEFAULT_COLD_START_DURATION,
            warm_start_duration: DEFAULT_WARM_START_DURATION,
            memory_footprint: Default::default(),
            placement_policy: Box::new(ModuloHashPolicy {}),
            workers: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_raw(raw: RawConfig, resolvers: &ConfigParamResolvers) -> Result<Self> {
        Self::from_raw_with_resolver(raw, resolvers.placement_policy_resolver.as_ref())
    }

    pub fn from_raw_with_resolver(
        raw: RawConfig,
        placement_policy_resolver: &(dyn Fn(&str) -> Result<Box<dyn PlacementPolicy>> + Send + Sync),
    ) -> Result<Self> {
        let mut me: Self = Default::default();
        if let Some(window) = raw.warm_window {
            me.warm_window = window;
        }
        if let Some(duration) = raw.cold_start_duration {
            me.cold_start_duration = duration;
        }
        if let Some(duration) = raw.warm_start_duration {
            me.warm_start_duration = duration;
        }
        if let Some(footprint) = raw.memory_footprint {
            me.memory_footprint = footprint;
        }
        if !raw.placement_policy.is_empty() {
            me.placement_policy = placement_policy_resolver(&raw.placement_policy)?;
        }
        for worker in raw.workers {
            for _ in 0..worker.count {
                me.workers.push(WorkerConfig {
                    total_memory: worker.total_memory,
                    cpu_capacity: worker.cpu_capacity,
                });
            }
        }
        me.validate()?;
        Ok(me)
    }

    pub fn from_yaml(path: &Path, resolvers: &ConfigParamResolvers) -> Result<Self> {
        let f = File::open(path)?;
        Self::from_raw(serde_yaml::from_reader(f)?, resolvers)
    }

    pub fn from_yaml_str(s: &str, resolvers: &ConfigParamResolvers) -> Result<Self> {
        Self::from_raw(serde_yaml::from_str(s)?, resolvers)
    }

    /// Checks durations, warm window and memory footprint. Pool emptiness is checked by the scheduler.
    pub fn validate(&self) -> Result<()> {
        if self.warm_window.is_nan() || self.warm_window < 0. {
            return Err(SchedulingError::InvalidConfig(format!(
                "warm window must be non-negative, got {}",
                self.warm_window
            )));
        }
        if self.warm_start_duration.is_nan() || self.warm_start_duration < 0. {
            return Err(SchedulingError::InvalidConfig(format!(
                "warm start duration must be non-negative, got {}",
                self.warm_start_duration
            )));
        }
        if self.cold_start_duration.is_nan() || self.warm_start_duration > self.cold_start_duration {
            return Err(SchedulingError::InvalidConfig(format!(
                "warm start duration {} exceeds cold start duration {}",
                self.warm_start_duration, self.cold_start_duration
            )));
        }
        if let MemoryFootprint::Fraction(share) = self.memory_footprint {
            if share.is_nan() || share <= 0. || share > 1. {
                return Err(SchedulingError::InvalidConfig(format!(
                    "memory fraction must be in (0, 1], got {}",
                    share
                )));
            }
        }
        Ok(())
    }

    pub fn worker_pool(&self) -> Result<WorkerPool> {
        WorkerPool::new(
            self.workers
                .iter()
                .enumerate()
                .map(|(id, w)| Worker::new(id, w.total_memory, w.cpu_capacity))
                .collect(),
        )
    }
}

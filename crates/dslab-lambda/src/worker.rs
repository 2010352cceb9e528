//! Worker (VM) model.
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// A simulated VM that executes invocations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: usize,
    /// Memory capacity in MB.
    pub total_memory: u64,
    /// CPU capacity in MIPS.
    pub cpu_capacity: u64,
}

impl Worker {
    pub fn new(id: usize, total_memory: u64, cpu_capacity: u64) -> Self {
        Self {
            id,
            total_memory,
            cpu_capacity,
        }
    }
}

/// Fixed-size, non-empty pool of workers. Placement policies return indices into this pool.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Creates a pool, worker ids must be unique.
    pub fn new(workers: Vec<Worker>) -> Result<Self> {
        if workers.is_empty() {
            return Err(SchedulingError::EmptyWorkerPool);
        }
        for (i, worker) in workers.iter().enumerate() {
            if workers[..i].iter().any(|w| w.id == worker.id) {
                return Err(SchedulingError::InvalidConfig(format!("duplicate worker id {}", worker.id)));
            }
        }
        Ok(Self { workers })
    }

    /// Creates a pool of `count` identical workers with ids `0..count`.
    pub fn uniform(count: usize, total_memory: u64, cpu_capacity: u64) -> Result<Self> {
        Self::new(
            (0..count)
                .map(|id| Worker::new(id, total_memory, cpu_capacity))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Worker> {
        self.workers.get(index)
    }

    /// Looks a worker up by its id (not by its index in the pool).
    pub fn find(&self, worker_id: usize) -> Result<&Worker> {
        self.workers
            .iter()
            .find(|w| w.id == worker_id)
            .ok_or(SchedulingError::UnknownWorker(worker_id))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Worker> {
        self.workers.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.workers.iter().map(|w| w.id)
    }
}

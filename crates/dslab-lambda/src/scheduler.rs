//! Invocation scheduler.
//!
//! The scheduler owns all mutable state of one run: placement policy, warm pool tracker and memory ledger.
//! Requests are processed one by one in ascending arrival time (ties broken by request id), every request passes
//! through `Pending -> Placed -> Classified -> Finalized` before the next one starts, because warm/cold
//! classification of a request depends on the tracker updates made by all earlier requests.
//!
//! Independent runs share nothing and can be executed in parallel, see [`crate::parallel`].
use std::cmp::Ordering;

use crate::config::{Config, MemoryFootprint};
use crate::error::{Result, SchedulingError};
use crate::invocation::{InvocationOutcome, InvocationRequest};
use crate::ledger::TimelineLedger;
use crate::placement::PlacementPolicy;
use crate::stats::Stats;
use crate::trace::Trace;
use crate::util::{Counter, FxIndexMap, FxIndexSet};
use crate::warmpool::WarmPoolTracker;
use crate::worker::WorkerPool;
use crate::{log_debug, log_info, log_trace};

const LOG_NAME: &str = "scheduler";

pub struct InvocationScheduler {
    cold_start_duration: f64,
    warm_start_duration: f64,
    memory_footprint: MemoryFootprint,
    placement_policy: Box<dyn PlacementPolicy>,
    pool: WorkerPool,
    tracker: WarmPoolTracker,
    ledger: TimelineLedger,
    pending: Vec<InvocationRequest>,
    outcomes: Vec<InvocationOutcome>,
    known_ids: FxIndexSet<u64>,
    request_ctr: Counter,
    last_finalized: Option<InvocationRequest>,
}

impl InvocationScheduler {
    /// Creates a scheduler over the workers listed in the config.
    pub fn new(config: Config) -> Result<Self> {
        let pool = config.worker_pool()?;
        Self::with_pool(config, pool)
    }

    /// Creates a scheduler over an explicit pool, `config.workers` is ignored.
    pub fn with_pool(config: Config, pool: WorkerPool) -> Result<Self> {
        config.validate()?;
        if pool.is_empty() {
            return Err(SchedulingError::EmptyWorkerPool);
        }
        log_info!(
            0.,
            LOG_NAME,
            "{} workers, placement policy {}, warm window {}",
            pool.len(),
            config.placement_policy.name(),
            config.warm_window
        );
        Ok(Self {
            cold_start_duration: config.cold_start_duration,
            warm_start_duration: config.warm_start_duration,
            memory_footprint: config.memory_footprint,
            placement_policy: config.placement_policy,
            pool,
            tracker: WarmPoolTracker::new(config.warm_window),
            ledger: Default::default(),
            pending: Vec::new(),
            outcomes: Vec::new(),
            known_ids: Default::default(),
            request_ctr: Default::default(),
            last_finalized: None,
        })
    }

    /// Queues a request with an explicit id.
    ///
    /// Requests may be submitted in any order, but must not precede the last already processed one in
    /// (arrival time, id) order.
    pub fn submit(&mut self, request: InvocationRequest) -> Result<()> {
        let time = request.arrival_time;
        let precedes_processed = matches!(
            self.last_finalized,
            Some(last) if request.processing_order(&last) == Ordering::Less
        );
        if time.is_nan() || time < 0. || precedes_processed {
            return Err(SchedulingError::InvalidArrivalTime {
                request_id: request.id,
                time,
            });
        }
        if !self.known_ids.insert(request.id) {
            return Err(SchedulingError::DuplicateRequestId(request.id));
        }
        self.pending.push(request);
        Ok(())
    }

    /// Queues a request with the next free id and returns that id.
    pub fn send_invocation_request(&mut self, function_type: usize, time: f64) -> Result<u64> {
        let mut id = self.request_ctr.increment();
        while self.known_ids.contains(&id) {
            id = self.request_ctr.increment();
        }
        self.submit(InvocationRequest::new(id, function_type, time))?;
        Ok(id)
    }

    pub fn load_trace(&mut self, trace: &dyn Trace) -> Result<()> {
        for request in trace.request_iter() {
            self.send_invocation_request(request.function_type, request.time)?;
        }
        Ok(())
    }

    /// Processes all queued requests and returns every outcome produced so far.
    pub fn run(&mut self) -> Result<&[InvocationOutcome]> {
        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_by(|a, b| a.processing_order(b));
        let mut cold_starts = 0;
        let count = pending.len();
        for request in pending {
            let outcome = self.process(request)?;
            if outcome.is_cold() {
                cold_starts += 1;
            }
            self.outcomes.push(outcome);
        }
        log_info!(
            self.last_finalized.map_or(0., |r| r.arrival_time),
            LOG_NAME,
            "processed {} requests, {} cold starts",
            count,
            cold_starts
        );
        Ok(&self.outcomes)
    }

    fn process(&mut self, request: InvocationRequest) -> Result<InvocationOutcome> {
        let time = request.arrival_time;
        let mut outcome = InvocationOutcome::new(request);

        let index = self.placement_policy.select(&request, &self.pool);
        let worker = self
            .pool
            .get(index)
            .ok_or(SchedulingError::PlacementOutOfRange {
                index,
                pool_size: self.pool.len(),
            })?;
        let worker_id = worker.id;
        let memory = self.memory_footprint.resolve(worker);
        outcome.place(worker_id)?;

        let is_warm = self.tracker.is_warm(request.function_type, worker_id, time);
        let execution_length = if is_warm {
            self.warm_start_duration
        } else {
            self.cold_start_duration
        };
        outcome.classify(is_warm, execution_length)?;
        self.tracker.record_invocation(request.function_type, worker_id, time);
        log_debug!(
            time,
            LOG_NAME,
            "request {} of function {} placed on worker {} ({})",
            request.id,
            request.function_type,
            worker_id,
            if is_warm { "warm" } else { "cold" }
        );

        self.ledger.append(worker_id, time, memory, true)?;
        self.ledger.append(worker_id, time + execution_length, memory, false)?;
        let finish_time = outcome.finalize()?;
        log_trace!(
            time,
            LOG_NAME,
            "request {} finishes at {:.3}, worker {} uses {} MB",
            request.id,
            finish_time,
            worker_id,
            self.ledger.usage_at(worker_id, time)
        );
        self.last_finalized = Some(request);
        Ok(outcome)
    }

    pub fn outcomes(&self) -> &[InvocationOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<InvocationOutcome> {
        self.outcomes
    }

    /// Requests submitted but not processed yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn ledger(&self) -> &TimelineLedger {
        &self.ledger
    }

    pub fn tracker(&self) -> &WarmPoolTracker {
        &self.tracker
    }

    /// Memory in use on the worker at the given time.
    pub fn usage_at(&self, worker_id: usize, time: f64) -> Result<f64> {
        self.pool.find(worker_id)?;
        Ok(self.ledger.usage_at(worker_id, time))
    }

    /// Warm function types of every worker in the pool at the given time.
    pub fn status_snapshot(&self, time: f64) -> FxIndexMap<usize, Vec<usize>> {
        self.tracker.status_snapshot(time, self.pool.ids())
    }

    pub fn stats(&self) -> Stats {
        Stats::from_outcomes(&self.outcomes)
    }
}

/// Runs a closed list of requests through a fresh scheduler.
pub fn schedule(config: Config, pool: WorkerPool, requests: Vec<InvocationRequest>) -> Result<Vec<InvocationOutcome>> {
    let mut scheduler = InvocationScheduler::with_pool(config, pool)?;
    for request in requests {
        scheduler.submit(request)?;
    }
    scheduler.run()?;
    Ok(scheduler.into_outcomes())
}

//! Utilities for running multiple independent scheduling runs in parallel (e.g. parameter sweeps).
//!
//! Every run gets its own scheduler, tracker and ledger, only the read-only traces are shared between threads.
use std::boxed::Box;
use std::fs::File;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use itertools::izip;
use threadpool::ThreadPool;

use crate::config::{Config, ConfigParamResolvers, RawConfig};
use crate::error::{Result, SchedulingError};
use crate::invocation::InvocationOutcome;
use crate::placement::PlacementPolicy;
use crate::scheduler::InvocationScheduler;
use crate::stats::Stats;
use crate::trace::Trace;

/// Outcomes and statistics of one finished run.
#[derive(Clone, Debug)]
pub struct RunResult {
    pub outcomes: Vec<InvocationOutcome>,
    pub stats: Stats,
}

fn run_single(config: Config, trace: &dyn Trace) -> Result<RunResult> {
    let mut scheduler = InvocationScheduler::new(config)?;
    scheduler.load_trace(trace)?;
    scheduler.run()?;
    let stats = scheduler.stats();
    Ok(RunResult {
        outcomes: scheduler.into_outcomes(),
        stats,
    })
}

fn share_traces(
    mut traces: Vec<Box<dyn Trace + Send + Sync>>,
    len: usize,
) -> Result<Vec<Arc<dyn Trace + Send + Sync>>> {
    if traces.len() != 1 && traces.len() != len {
        return Err(SchedulingError::InvalidConfig(format!(
            "there should be one trace for each config or one trace for all configs, got {} traces for {} configs",
            traces.len(),
            len
        )));
    }
    let mut traces_arc: Vec<Arc<dyn Trace + Send + Sync>> = Vec::with_capacity(len);
    if traces.len() == 1 {
        let ptr: Arc<dyn Trace + Send + Sync> = Arc::from(traces.remove(0));
        for _ in 0..len {
            traces_arc.push(ptr.clone())
        }
    } else {
        for trace in traces.drain(..) {
            traces_arc.push(Arc::from(trace));
        }
    }
    Ok(traces_arc)
}

// runs whose thread died without sending a result are reported as aborted
fn collect_results(rx: Receiver<(usize, Result<RunResult>)>, len: usize) -> Vec<Result<RunResult>> {
    let mut results: Vec<Result<RunResult>> = (0..len).map(|id| Err(SchedulingError::RunAborted(id))).collect();
    for (id, result) in rx.iter().take(len) {
        results[id] = result;
    }
    results
}

/// Runs each config in a thread pool with `n_workers` worker threads. Results are in config order.
///
/// There must be either one trace shared by all configs or one trace per config.
pub fn parallel_simulation_n_workers(
    mut configs: Vec<Config>,
    traces: Vec<Box<dyn Trace + Send + Sync>>,
    n_workers: usize,
) -> Result<Vec<Result<RunResult>>> {
    let len = configs.len();
    let mut traces_arc = share_traces(traces, len)?;
    let pool = ThreadPool::new(n_workers.max(1));
    let (tx, rx) = channel();
    for (id, config, trace) in izip!(0..len, configs.drain(..), traces_arc.drain(..)) {
        let tx = tx.clone();
        pool.execute(move || {
            let _ = tx.send((id, run_single(config, trace.as_ref())));
        });
    }
    drop(tx);
    Ok(collect_results(rx, len))
}

/// Runs each config in a thread pool with a separate worker for each config.
pub fn parallel_simulation(
    configs: Vec<Config>,
    traces: Vec<Box<dyn Trace + Send + Sync>>,
) -> Result<Vec<Result<RunResult>>> {
    let n_workers = configs.len();
    parallel_simulation_n_workers(configs, traces, n_workers)
}

/// Similar to [`parallel_simulation_n_workers`], but for raw configs. Configs are resolved inside the worker threads.
pub fn parallel_simulation_raw_n_workers(
    mut configs: Vec<RawConfig>,
    resolvers: ConfigParamResolvers,
    traces: Vec<Box<dyn Trace + Send + Sync>>,
    n_workers: usize,
) -> Result<Vec<Result<RunResult>>> {
    let len = configs.len();
    let mut traces_arc = share_traces(traces, len)?;
    let placement_policy_resolver1: Arc<dyn Fn(&str) -> Result<Box<dyn PlacementPolicy>> + Send + Sync> =
        Arc::from(resolvers.placement_policy_resolver);
    let pool = ThreadPool::new(n_workers.max(1));
    let (tx, rx) = channel();
    for (id, raw_config, trace) in izip!(0..len, configs.drain(..), traces_arc.drain(..)) {
        let tx = tx.clone();
        let placement_policy_resolver = placement_policy_resolver1.clone();
        pool.execute(move || {
            let result = Config::from_raw_with_resolver(raw_config, placement_policy_resolver.as_ref())
                .and_then(|config| run_single(config, trace.as_ref()));
            let _ = tx.send((id, result));
        });
    }
    drop(tx);
    Ok(collect_results(rx, len))
}

/// Similar to [`parallel_simulation_raw_n_workers`], but for YAML configs. Unreadable files fail the whole call.
pub fn parallel_simulation_yaml_n_workers(
    configs: Vec<&Path>,
    resolvers: ConfigParamResolvers,
    traces: Vec<Box<dyn Trace + Send + Sync>>,
    n_workers: usize,
) -> Result<Vec<Result<RunResult>>> {
    let mut raw: Vec<RawConfig> = Vec::with_capacity(configs.len());
    for path in configs {
        let f = File::open(path)?;
        raw.push(serde_yaml::from_reader(f)?);
    }
    parallel_simulation_raw_n_workers(raw, resolvers, traces, n_workers)
}

use thiserror::Error;

use crate::invocation::InvocationStatus;

/// Errors produced by the scheduling core.
///
/// All of them indicate a caller bug or a broken configuration, there is nothing transient to retry.
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("worker pool is empty")]
    EmptyWorkerPool,

    #[error("invalid memory amount {amount} for worker {worker_id}")]
    InvalidAmount { worker_id: usize, amount: f64 },

    #[error("unknown worker: {0}")]
    UnknownWorker(usize),

    #[error("invalid arrival time {time} of request {request_id}")]
    InvalidArrivalTime { request_id: u64, time: f64 },

    #[error("duplicate request id: {0}")]
    DuplicateRequestId(u64),

    #[error("illegal transition of request {request_id} from {from:?} to {to:?}")]
    IllegalTransition {
        request_id: u64,
        from: InvocationStatus,
        to: InvocationStatus,
    },

    #[error("placement policy chose index {index} in a pool of {pool_size} workers")]
    PlacementOutOfRange { index: usize, pool_size: usize },

    #[error("unknown placement policy: {0}")]
    UnknownPlacementPolicy(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("run {0} was aborted")]
    RunAborted(usize),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SchedulingError>;

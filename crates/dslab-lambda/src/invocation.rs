use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{Result, SchedulingError};

/// Request to run one function, immutable once built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InvocationRequest {
    /// Unique request id, also used to break arrival time ties.
    pub id: u64,
    /// Function type (category), any non-negative integer is valid.
    pub function_type: usize,
    /// Arrival time in simulated seconds.
    pub arrival_time: f64,
}

impl InvocationRequest {
    pub fn new(id: u64, function_type: usize, arrival_time: f64) -> Self {
        Self {
            id,
            function_type,
            arrival_time,
        }
    }

    /// Processing order: ascending arrival time, ties broken by ascending id.
    pub fn processing_order(&self, other: &Self) -> Ordering {
        self.arrival_time
            .total_cmp(&other.arrival_time)
            .then(self.id.cmp(&other.id))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InvocationStatus {
    /// Request is accepted, but no worker is chosen yet.
    Pending,
    /// Worker is chosen.
    Placed,
    /// Warm or cold start is decided, execution length is known.
    Classified,
    /// Ledger events are recorded and finish time is fixed.
    Finalized,
}

/// Result of scheduling a single invocation.
///
/// Fields are filled in strictly in the order of [`InvocationStatus`] transitions: worker first, then warm flag
/// and execution length, then finish time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvocationOutcome {
    pub request: InvocationRequest,
    pub status: InvocationStatus,
    pub worker_id: Option<usize>,
    pub is_warm: Option<bool>,
    pub execution_length: Option<f64>,
    pub finish_time: Option<f64>,
}

impl InvocationOutcome {
    pub fn new(request: InvocationRequest) -> Self {
        Self {
            request,
            status: InvocationStatus::Pending,
            worker_id: None,
            is_warm: None,
            execution_length: None,
            finish_time: None,
        }
    }

    fn transition(&mut self, from: InvocationStatus, to: InvocationStatus) -> Result<()> {
        if self.status != from {
            return Err(SchedulingError::IllegalTransition {
                request_id: self.request.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// `Pending -> Placed`.
    pub fn place(&mut self, worker_id: usize) -> Result<()> {
        self.transition(InvocationStatus::Pending, InvocationStatus::Placed)?;
        self.worker_id = Some(worker_id);
        Ok(())
    }

    /// `Placed -> Classified`.
    pub fn classify(&mut self, is_warm: bool, execution_length: f64) -> Result<()> {
        self.transition(InvocationStatus::Placed, InvocationStatus::Classified)?;
        self.is_warm = Some(is_warm);
        self.execution_length = Some(execution_length);
        Ok(())
    }

    /// `Classified -> Finalized`, returns the finish time.
    pub fn finalize(&mut self) -> Result<f64> {
        self.transition(InvocationStatus::Classified, InvocationStatus::Finalized)?;
        let finish_time = self.request.arrival_time + self.execution_length.unwrap_or_default();
        self.finish_time = Some(finish_time);
        Ok(finish_time)
    }

    pub fn is_finalized(&self) -> bool {
        self.status == InvocationStatus::Finalized
    }

    /// Returns whether the invocation was a cold start. Only meaningful after classification.
    pub fn is_cold(&self) -> bool {
        self.is_warm == Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_in_order() {
        let mut outcome = InvocationOutcome::new(InvocationRequest::new(7, 1, 2.0));
        outcome.place(3).unwrap();
        outcome.classify(true, 1.5).unwrap();
        let finish = outcome.finalize().unwrap();
        assert_eq!(finish, 3.5);
        assert_eq!(outcome.worker_id, Some(3));
        assert!(outcome.is_finalized());
        assert!(!outcome.is_cold());
    }

    #[test]
    fn test_illegal_transitions() {
        let mut outcome = InvocationOutcome::new(InvocationRequest::new(7, 1, 2.0));
        assert!(matches!(
            outcome.classify(false, 1.0),
            Err(SchedulingError::IllegalTransition {
                request_id: 7,
                from: InvocationStatus::Pending,
                to: InvocationStatus::Classified,
            })
        ));
        outcome.place(0).unwrap();
        assert!(outcome.place(1).is_err());
        assert_eq!(outcome.worker_id, Some(0));
        assert!(outcome.finalize().is_err());
    }

    #[test]
    fn test_processing_order() {
        let a = InvocationRequest::new(2, 0, 1.0);
        let b = InvocationRequest::new(1, 5, 1.0);
        let c = InvocationRequest::new(0, 0, 3.0);
        let mut v = vec![c, a, b];
        v.sort_by(|x, y| x.processing_order(y));
        assert_eq!(v.iter().map(|x| x.id).collect::<Vec<_>>(), vec![1, 2, 0]);
    }
}

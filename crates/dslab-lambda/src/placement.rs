use crate::config::parse_options;
use crate::error::{Result, SchedulingError};
use crate::invocation::InvocationRequest;
use crate::worker::WorkerPool;

/*
 * Placement policy chooses a worker
 * to run new invocation of some function type.
 * The result is an index into the worker pool.
 */
pub trait PlacementPolicy: Send {
    fn select(&mut self, request: &InvocationRequest, pool: &WorkerPool) -> usize;

    fn name(&self) -> String {
        "STUB PLACEMENT POLICY NAME".to_string()
    }
}

/* ModuloHashPolicy maps every function type
 * to a fixed worker: function_type mod pool size.
 */
#[derive(Default)]
pub struct ModuloHashPolicy {}

impl PlacementPolicy for ModuloHashPolicy {
    fn select(&mut self, request: &InvocationRequest, pool: &WorkerPool) -> usize {
        request.function_type % pool.len()
    }

    fn name(&self) -> String {
        "ModuloHash".to_string()
    }
}

/* RoundRobinPolicy cycles through the pool
 * with a single cursor shared by all function types.
 */
#[derive(Default)]
pub struct RoundRobinPolicy {
    cursor: usize,
}

impl RoundRobinPolicy {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Starts the cursor at an arbitrary position (taken modulo pool size on the first call).
    pub fn with_offset(offset: usize) -> Self {
        Self { cursor: offset }
    }
}

impl PlacementPolicy for RoundRobinPolicy {
    fn select(&mut self, _request: &InvocationRequest, pool: &WorkerPool) -> usize {
        self.cursor %= pool.len();
        let chosen = self.cursor;
        self.cursor = (self.cursor + 1) % pool.len();
        chosen
    }

    fn name(&self) -> String {
        "RoundRobin".to_string()
    }
}

/// Resolves `ModuloHash`, `RoundRobin` and `RoundRobin[offset=N]`.
pub fn default_placement_policy_resolver(s: &str) -> Result<Box<dyn PlacementPolicy>> {
    if s == "ModuloHash" {
        Ok(Box::new(ModuloHashPolicy {}))
    } else if s == "RoundRobin" {
        Ok(Box::new(RoundRobinPolicy::new()))
    } else if s.len() > 11 && &s[0..11] == "RoundRobin[" && s.ends_with(']') {
        let opts = parse_options(&s[11..s.len() - 1]);
        let offset = opts
            .get("offset")
            .and_then(|x| x.parse::<usize>().ok())
            .ok_or_else(|| SchedulingError::UnknownPlacementPolicy(s.to_string()))?;
        Ok(Box::new(RoundRobinPolicy::with_offset(offset)))
    } else {
        Err(SchedulingError::UnknownPlacementPolicy(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(function_type: usize) -> InvocationRequest {
        InvocationRequest::new(0, function_type, 0.0)
    }

    #[test]
    fn test_modulo_hash() {
        let pool = WorkerPool::uniform(3, 512, 1000).unwrap();
        let mut policy = ModuloHashPolicy {};
        assert_eq!(policy.select(&request(0), &pool), 0);
        assert_eq!(policy.select(&request(4), &pool), 1);
        assert_eq!(policy.select(&request(4), &pool), 1);
        assert_eq!(policy.select(&request(8), &pool), 2);
    }

    #[test]
    fn test_round_robin_ignores_function_type() {
        let pool = WorkerPool::uniform(3, 512, 1000).unwrap();
        let mut policy = RoundRobinPolicy::new();
        let chosen: Vec<_> = (0..7).map(|_| policy.select(&request(1), &pool)).collect();
        assert_eq!(chosen, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_round_robin_fairness() {
        for pool_size in 1..6 {
            let pool = WorkerPool::uniform(pool_size, 512, 1000).unwrap();
            let mut policy = RoundRobinPolicy::new();
            let n = 23;
            let mut counts = vec![0; pool_size];
            for i in 0..n {
                counts[policy.select(&request(i % 4), &pool)] += 1;
            }
            for c in counts {
                assert!(c == n / pool_size || c == (n + pool_size - 1) / pool_size);
            }
        }
    }

    #[test]
    fn test_resolver() {
        assert_eq!(default_placement_policy_resolver("ModuloHash").unwrap().name(), "ModuloHash");
        assert_eq!(default_placement_policy_resolver("RoundRobin").unwrap().name(), "RoundRobin");
        let pool = WorkerPool::uniform(4, 512, 1000).unwrap();
        let mut shifted = default_placement_policy_resolver("RoundRobin[offset=6]").unwrap();
        assert_eq!(shifted.select(&request(0), &pool), 2);
        assert_eq!(shifted.select(&request(0), &pool), 3);
        assert!(matches!(
            default_placement_policy_resolver("Random"),
            Err(SchedulingError::UnknownPlacementPolicy(_))
        ));
        assert!(default_placement_policy_resolver("RoundRobin[offset=x]").is_err());
    }
}

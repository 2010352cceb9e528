//! Invocation request sources.
use std::cmp::Ordering;

#[derive(Default, Clone, Copy, Debug)]
pub struct RequestData {
    pub function_type: usize,
    pub time: f64,
}

impl PartialEq for RequestData {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}

impl Eq for RequestData {}

impl PartialOrd for RequestData {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RequestData {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.total_cmp(&other.time)
    }
}

pub trait Trace {
    fn request_iter(&self) -> Box<dyn Iterator<Item = RequestData> + '_>;
    /// Indicates whether the requests produced by `request_iter` are ordered in increasing order
    /// by time.
    fn is_ordered_by_time(&self) -> bool;
}

/// Explicit list of requests.
#[derive(Clone, Default)]
pub struct ScheduleTrace {
    requests: Vec<RequestData>,
}

impl ScheduleTrace {
    pub fn new(requests: Vec<RequestData>) -> Self {
        Self { requests }
    }

    /// Request `i` invokes function type `i % function_types` at time `i * interval`.
    pub fn periodic(count: usize, function_types: usize, interval: f64) -> Self {
        let requests = (0..count)
            .map(|i| RequestData {
                function_type: i % function_types.max(1),
                time: (i as f64) * interval,
            })
            .collect();
        Self { requests }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl Trace for ScheduleTrace {
    fn request_iter(&self) -> Box<dyn Iterator<Item = RequestData> + '_> {
        Box::new(self.requests.iter().copied())
    }

    fn is_ordered_by_time(&self) -> bool {
        self.requests.windows(2).all(|w| w[0] <= w[1])
    }
}

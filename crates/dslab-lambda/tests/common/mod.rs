#![allow(dead_code)]

use dslab_lambda::config::{Config, WorkerConfig};
use dslab_lambda::placement::PlacementPolicy;

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps);
}

pub fn uniform_config(workers: usize, warm_window: f64, placement_policy: Box<dyn PlacementPolicy>) -> Config {
    Config {
        warm_window,
        placement_policy,
        workers: vec![WorkerConfig::default(); workers],
        ..Default::default()
    }
}

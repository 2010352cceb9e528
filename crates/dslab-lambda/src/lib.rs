//! A library for studying invocation placement and warm starts in FaaS platforms.
//!
//! The core is [`scheduler::InvocationScheduler`]: it processes a closed list of invocation requests in arrival
//! order, places each one on a worker with a [`placement::PlacementPolicy`], classifies it as a warm or cold
//! start with [`warmpool::WarmPoolTracker`] and records its memory occupancy in [`ledger::TimelineLedger`].
//!
//! ## Demos
//!
//! - `demos/lambda-sim`: runs the periodic schedule of ten invocations over five workers and prints placements,
//! warm status and memory usage.

#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod extra;
pub mod invocation;
pub mod ledger;
pub mod log;
pub mod parallel;
pub mod placement;
pub mod scheduler;
pub mod stats;
pub mod trace;
pub mod util;
pub mod warmpool;
pub mod worker;

pub use colored;

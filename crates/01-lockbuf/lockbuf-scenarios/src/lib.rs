#![allow(missing_docs)]

mod checks;
mod config;
mod engine;
mod handle;
mod stats;

pub use checks::{
    verify_misuse_probe, verify_reader_fanout, verify_writer_cycle, CheckResult, RunReport,
};
pub use config::{ScenarioKind, ScenarioType, TestConfig};
pub use engine::LockScenarioEngine;
pub use handle::LockHandle;
pub use stats::{ArcStatsSink, ScenarioStats, StatsSink};

/// Buffer capacity the stock scenarios are written against.
pub const SCENARIO_CAPACITY: usize = 1024;

/// Utility to update stats counters with wrapping arithmetic.
#[inline]
fn wrapping_add(base: u32, delta: u32) -> u32 {
    base.wrapping_add(delta)
}

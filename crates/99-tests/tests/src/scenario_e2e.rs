//! Scenario engines driven to completion against shared buffer handles,
//! with the outcome checked through both the scenario stats and the sync
//! layer's own operation counters.

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

use lockbuf::LockedBuffer;
use lockbuf_scenarios::{
    verify_misuse_probe, verify_reader_fanout, verify_writer_cycle, ArcStatsSink,
    LockScenarioEngine, RunReport, ScenarioKind, ScenarioStats, TestConfig, SCENARIO_CAPACITY,
};
use lockbuf_sync::{BufferHandle, SharedBuffer};

const POLL_BUDGET: usize = 10_000;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run_engine_until_complete(
    mut engine: LockScenarioEngine<BufferHandle, ArcStatsSink>,
) -> thread::JoinHandle<LockScenarioEngine<BufferHandle, ArcStatsSink>> {
    thread::spawn(move || {
        let mut polls = 0usize;
        while !engine.is_complete() {
            let work = engine.poll();
            polls += 1;
            assert!(
                polls < POLL_BUDGET,
                "{} scenario failed to complete within the poll budget",
                engine.name()
            );
            if work == 0 {
                thread::yield_now();
            }
        }
        engine
    })
}

#[test]
fn reader_fanout_scenario_end_to_end() {
    init_logging();
    const READERS: u32 = 64;

    let shared = SharedBuffer::new(SCENARIO_CAPACITY).expect("create shared buffer");
    let handle = shared.handle();
    let stats = Arc::new(Mutex::new(ScenarioStats::default()));
    let kind = TestConfig::reader_fanout(READERS)
        .scenario_kind()
        .expect("valid scenario config");
    let engine =
        LockScenarioEngine::new(shared.handle(), ArcStatsSink::new(Arc::clone(&stats)), kind)
            .expect("create scenario engine");

    let engine = run_engine_until_complete(engine)
        .join()
        .expect("scenario thread");

    let stats_guard = stats.lock();
    let report = RunReport {
        seen_views: engine.seen_views(),
        final_state: handle.state(),
        transferred: handle.transferred(),
    };
    verify_reader_fanout(&report, &stats_guard, READERS, SCENARIO_CAPACITY as u32)
        .expect("reader fanout verification");

    let metrics = shared.metrics();
    assert_eq!(metrics.reads_granted, READERS);
    assert_eq!(metrics.writes_granted, 1);
    assert_eq!(metrics.unlocks, READERS + 1);
    assert_eq!(metrics.transfers, 1);
    assert_eq!(metrics.rejections, 0);
}

#[test]
fn writer_cycle_scenario_end_to_end() {
    init_logging();
    const CYCLES: u32 = 500;

    let shared = SharedBuffer::new(SCENARIO_CAPACITY).expect("create shared buffer");
    let handle = shared.handle();
    let stats = Arc::new(Mutex::new(ScenarioStats::default()));
    let kind = TestConfig::writer_cycle(CYCLES)
        .scenario_kind()
        .expect("valid scenario config");
    let engine =
        LockScenarioEngine::new(shared.handle(), ArcStatsSink::new(Arc::clone(&stats)), kind)
            .expect("create scenario engine");

    let engine = run_engine_until_complete(engine)
        .join()
        .expect("scenario thread");

    let stats_guard = stats.lock();
    let report = RunReport {
        seen_views: engine.seen_views(),
        final_state: handle.state(),
        transferred: handle.transferred(),
    };
    verify_writer_cycle(&report, &stats_guard, CYCLES, SCENARIO_CAPACITY as u32)
        .expect("writer cycle verification");

    let metrics = shared.metrics();
    assert_eq!(metrics.reads_granted, 0);
    assert_eq!(metrics.writes_granted, CYCLES);
    assert_eq!(metrics.unlocks, CYCLES);
    assert_eq!(metrics.transfers, 1);
    assert_eq!(metrics.rejections, 0);
}

#[test]
fn misuse_probe_scenario_end_to_end() {
    init_logging();
    const ROUNDS: u32 = 32;

    let shared = SharedBuffer::new(SCENARIO_CAPACITY).expect("create shared buffer");
    let handle = shared.handle();
    let stats = Arc::new(Mutex::new(ScenarioStats::default()));
    let kind = TestConfig::misuse_probe(ROUNDS)
        .scenario_kind()
        .expect("valid scenario config");
    let engine =
        LockScenarioEngine::new(shared.handle(), ArcStatsSink::new(Arc::clone(&stats)), kind)
            .expect("create scenario engine");

    let engine = run_engine_until_complete(engine)
        .join()
        .expect("scenario thread");

    let stats_guard = stats.lock();
    let report = RunReport {
        seen_views: engine.seen_views(),
        final_state: handle.state(),
        transferred: handle.transferred(),
    };
    verify_misuse_probe(&report, &stats_guard, ROUNDS, SCENARIO_CAPACITY as u32)
        .expect("misuse probe verification");

    // Every grant, payout, and rejection flowed through the shared handle.
    let metrics = shared.metrics();
    assert_eq!(metrics.reads_granted, ROUNDS);
    assert_eq!(metrics.writes_granted, ROUNDS);
    assert_eq!(metrics.unlocks, ROUNDS * 2);
    assert_eq!(metrics.transfers, 1);
    assert_eq!(metrics.rejections, ROUNDS * 6 + 3);
}

/// The engine also runs single-threaded over a bare state machine.
#[test]
fn writer_cycle_runs_against_bare_buffer() {
    init_logging();
    const CYCLES: u32 = 50;

    let mut buffer = LockedBuffer::new(SCENARIO_CAPACITY).expect("create buffer");
    let stats = Arc::new(Mutex::new(ScenarioStats::default()));
    let mut engine = LockScenarioEngine::new(
        &mut buffer,
        ArcStatsSink::new(Arc::clone(&stats)),
        ScenarioKind::WriterCycle { cycles: CYCLES },
    )
    .expect("create scenario engine");

    let mut polls = 0usize;
    while !engine.is_complete() {
        engine.poll();
        polls += 1;
        assert!(
            polls < POLL_BUDGET,
            "scenario failed to complete within the poll budget"
        );
    }
    let seen = engine.seen_views().to_vec();
    drop(engine);

    let stats_guard = stats.lock();
    let report = RunReport {
        seen_views: &seen,
        final_state: buffer.state(),
        transferred: buffer.transferred(),
    };
    verify_writer_cycle(&report, &stats_guard, CYCLES, SCENARIO_CAPACITY as u32)
        .expect("writer cycle verification");
}

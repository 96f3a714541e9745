//! Test suite for the locked-buffer workspace.

#[cfg(test)]
mod scenario_e2e;

#[cfg(test)]
mod walkthrough;

#[cfg(test)]
mod tests {
    use lockbuf_scenarios::{ScenarioKind, ScenarioType, TestConfig};
    use lockbuf_sync::SharedBuffer;
    use std::thread;

    #[test]
    fn shared_buffer_build_smoke() {
        let shared = SharedBuffer::new(1024).expect("create shared buffer");
        let handle = shared.handle();

        let mut reader = handle.read().expect("read");
        let payout = handle.unlock(&mut reader).expect("unlock");
        assert_eq!(payout.len(), 1024);

        let storage = handle.transfer().expect("transfer");
        assert_eq!(storage.len(), 1024);
        assert!(handle.transferred());
    }

    #[test]
    fn scenario_config_round_trip() {
        assert_eq!(
            TestConfig::reader_fanout(8).scenario_kind(),
            Some(ScenarioKind::ReaderFanout { readers: 8 })
        );
        assert_eq!(
            TestConfig::writer_cycle(3).scenario_kind(),
            Some(ScenarioKind::WriterCycle { cycles: 3 })
        );
        assert_eq!(
            TestConfig::misuse_probe(5).scenario_kind(),
            Some(ScenarioKind::MisuseProbe { rounds: 5 })
        );
        assert_eq!(ScenarioType::from_u32(99), None);

        let bogus = TestConfig {
            test_type: 99,
            param1: 0,
            param2: 0,
        };
        assert_eq!(bogus.scenario_kind(), None);
    }

    // Example slow test: deep exploration or heavy workload
    // Must be marked #[ignore] and prefixed with "slow_"
    #[test]
    #[ignore]
    fn slow_stress_contended_handles() {
        const READER_THREADS: u32 = 4;
        const ITERATIONS: u32 = 25_000;
        const WRITER_ROUNDS: u32 = 5_000;

        let shared = SharedBuffer::new(4096).expect("create shared buffer");

        let readers: Vec<_> = (0..READER_THREADS)
            .map(|_| {
                let handle = shared.handle();
                thread::spawn(move || {
                    let mut grants = 0u32;
                    for _ in 0..ITERATIONS {
                        match handle.read() {
                            Ok(mut view) => {
                                grants += 1;
                                handle.unlock(&mut view).expect("unlock own read view");
                            }
                            Err(_) => thread::yield_now(),
                        }
                    }
                    grants
                })
            })
            .collect();

        let writer = {
            let handle = shared.handle();
            thread::spawn(move || {
                let mut grants = 0u32;
                for _ in 0..WRITER_ROUNDS {
                    match handle.write() {
                        Ok(mut view) => {
                            grants += 1;
                            handle.unlock(&mut view).expect("unlock own write view");
                        }
                        Err(_) => thread::yield_now(),
                    }
                }
                grants
            })
        };

        let read_grants: u32 = readers
            .into_iter()
            .map(|worker| worker.join().expect("reader thread"))
            .sum();
        let write_grants = writer.join().expect("writer thread");

        let storage = shared.handle().transfer().expect("transfer after stress");
        assert_eq!(storage.len(), 4096);

        let metrics = shared.metrics();
        assert_eq!(metrics.reads_granted, read_grants);
        assert_eq!(metrics.writes_granted, write_grants);
        assert_eq!(metrics.unlocks, read_grants + write_grants);
        assert_eq!(metrics.transfers, 1);
        assert!(write_grants > 0, "writer should land at least one grant");
    }
}

use crate::config::ScenarioKind;
use crate::handle::LockHandle;
use crate::stats::StatsSink;
use crate::wrapping_add;
use lockbuf::{AccessMode, LockResult, LockedBuffer, Region, SharedView, ViewId};
use log::{debug, trace};

const OPS_PER_POLL: usize = 100;

/// Identity probes never touch the decoy's bytes, so its size is arbitrary.
const DECOY_CAPACITY: usize = 64;

pub struct LockScenarioEngine<H, S> {
    handle: H,
    stats: S,
    state: ScenarioState,
    seen: Vec<ViewId>,
}

enum ScenarioState {
    ReaderFanout {
        readers: u32,
        acquired: u32,
        held: Vec<SharedView>,
        write_round_done: bool,
    },
    WriterCycle {
        cycles: u32,
        completed: u32,
    },
    MisuseProbe {
        rounds: u32,
        completed: u32,
        decoy: LockedBuffer,
        stale: Option<SharedView>,
        probed_after_transfer: bool,
    },
}

impl<H, S> LockScenarioEngine<H, S>
where
    H: LockHandle,
    S: StatsSink,
{
    pub fn new(handle: H, stats: S, kind: ScenarioKind) -> LockResult<Self> {
        let state = match kind {
            ScenarioKind::ReaderFanout { readers } => ScenarioState::ReaderFanout {
                readers,
                acquired: 0,
                held: Vec::new(),
                write_round_done: false,
            },
            ScenarioKind::WriterCycle { cycles } => ScenarioState::WriterCycle {
                cycles,
                completed: 0,
            },
            ScenarioKind::MisuseProbe { rounds } => ScenarioState::MisuseProbe {
                rounds,
                completed: 0,
                decoy: LockedBuffer::new(DECOY_CAPACITY)?,
                stale: None,
                probed_after_transfer: false,
            },
        };

        Ok(Self {
            handle,
            stats,
            state,
            seen: Vec::new(),
        })
    }

    /// Every view token this engine was ever granted, in grant order.
    pub fn seen_views(&self) -> &[ViewId] {
        &self.seen
    }

    fn acquire(handle: &mut H, stats: &S, mode: AccessMode) -> Option<SharedView> {
        let result = match mode {
            AccessMode::Read => handle.read(),
            AccessMode::Write => handle.write(),
        };
        match result {
            Ok(view) => {
                stats.with_stats(|stats| match mode {
                    AccessMode::Read => {
                        stats.reads_granted = wrapping_add(stats.reads_granted, 1);
                    }
                    AccessMode::Write => {
                        stats.writes_granted = wrapping_add(stats.writes_granted, 1);
                    }
                });
                Some(view)
            }
            Err(err) => {
                trace!("{mode} acquisition rejected: {err}");
                stats.with_stats(|stats| {
                    stats.rejected_acquires = wrapping_add(stats.rejected_acquires, 1);
                });
                None
            }
        }
    }

    fn retire(handle: &mut H, stats: &S, view: &mut SharedView) -> Option<Region> {
        match handle.unlock(view) {
            Ok(region) => {
                stats.with_stats(|stats| {
                    stats.unlocks = wrapping_add(stats.unlocks, 1);
                    stats.relocated_bytes =
                        wrapping_add(stats.relocated_bytes, region.len() as u32);
                });
                Some(region)
            }
            Err(err) => {
                trace!("unlock of {} rejected: {err}", view.id());
                stats.with_stats(|stats| {
                    stats.rejected_unlocks = wrapping_add(stats.rejected_unlocks, 1);
                });
                None
            }
        }
    }

    fn hand_off(handle: &mut H, stats: &S) -> bool {
        match handle.transfer() {
            Ok(region) => {
                stats.with_stats(|stats| {
                    stats.transfers = wrapping_add(stats.transfers, 1);
                    stats.relocated_bytes =
                        wrapping_add(stats.relocated_bytes, region.len() as u32);
                });
                true
            }
            Err(err) => {
                trace!("transfer rejected: {err}");
                stats.with_stats(|stats| {
                    stats.rejected_transfers = wrapping_add(stats.rejected_transfers, 1);
                });
                false
            }
        }
    }

    /// Acquisition expected to be rejected; an unexpected grant is retired
    /// immediately so the run cannot wedge, and the skewed counters surface
    /// in verification.
    fn probe_acquire(handle: &mut H, stats: &S, mode: AccessMode) {
        if let Some(mut unexpected) = Self::acquire(handle, stats, mode) {
            let _ = Self::retire(handle, stats, &mut unexpected);
        }
    }

    pub fn poll(&mut self) -> usize {
        let stats = &self.stats;
        let handle = &mut self.handle;
        let seen = &mut self.seen;
        match &mut self.state {
            ScenarioState::ReaderFanout {
                readers,
                acquired,
                held,
                write_round_done,
            } => {
                let mut work = 0usize;
                while *acquired < *readers {
                    if work >= OPS_PER_POLL {
                        return work;
                    }
                    let Some(view) = Self::acquire(handle, stats, AccessMode::Read) else {
                        return work;
                    };
                    seen.push(view.id());
                    held.push(view);
                    *acquired += 1;
                    work += 1;
                    if *acquired == *readers {
                        debug!("reader-fanout: {} read views outstanding", held.len());
                    }
                }
                while let Some(view) = held.last_mut() {
                    if work >= OPS_PER_POLL {
                        return work;
                    }
                    if Self::retire(handle, stats, view).is_none() {
                        return work;
                    }
                    held.pop();
                    work += 1;
                }
                if !*write_round_done {
                    let Some(mut writer) = Self::acquire(handle, stats, AccessMode::Write) else {
                        return work;
                    };
                    seen.push(writer.id());
                    if Self::retire(handle, stats, &mut writer).is_none() {
                        return work;
                    }
                    *write_round_done = true;
                    work += 2;
                }
                if !handle.transferred() && Self::hand_off(handle, stats) {
                    debug!("reader-fanout: storage handed off");
                    work += 1;
                }
                work
            }
            ScenarioState::WriterCycle { cycles, completed } => {
                let mut work = 0usize;
                while *completed < *cycles {
                    if work >= OPS_PER_POLL {
                        return work;
                    }
                    let expected = handle.byte_len();
                    let Some(mut writer) = Self::acquire(handle, stats, AccessMode::Write) else {
                        return work;
                    };
                    seen.push(writer.id());
                    let Some(payout) = Self::retire(handle, stats, &mut writer) else {
                        return work;
                    };
                    if payout.len() != expected || payout.as_slice().iter().any(|&b| b != 0) {
                        debug!("writer-cycle: round {completed} payout failed verification");
                        return work;
                    }
                    *completed += 1;
                    work += 2;
                }
                if !handle.transferred() && Self::hand_off(handle, stats) {
                    debug!("writer-cycle: storage handed off after {completed} rounds");
                    work += 1;
                }
                work
            }
            ScenarioState::MisuseProbe {
                rounds,
                completed,
                decoy,
                stale,
                probed_after_transfer,
            } => {
                if *completed < *rounds {
                    let mut work = 0usize;
                    let Some(mut reader) = Self::acquire(handle, stats, AccessMode::Read) else {
                        return work;
                    };
                    seen.push(reader.id());
                    work += 1;
                    Self::probe_acquire(handle, stats, AccessMode::Write);
                    work += 1;
                    let _ = Self::retire(handle, stats, &mut reader);
                    work += 1;

                    let Some(mut writer) = Self::acquire(handle, stats, AccessMode::Write) else {
                        return work;
                    };
                    seen.push(writer.id());
                    work += 1;
                    Self::probe_acquire(handle, stats, AccessMode::Read);
                    Self::probe_acquire(handle, stats, AccessMode::Write);
                    let _ = Self::hand_off(handle, stats);
                    work += 3;
                    let _ = Self::retire(handle, stats, &mut writer);
                    work += 1;
                    let _ = Self::retire(handle, stats, &mut writer);
                    work += 1;
                    if let Ok(mut foreign) = decoy.read() {
                        let _ = Self::retire(handle, stats, &mut foreign);
                        let _ = decoy.unlock(&mut foreign);
                        work += 1;
                    }
                    *stale = Some(writer);
                    *completed += 1;
                    trace!("misuse-probe: round {completed} of {rounds} complete");
                    work
                } else if !*probed_after_transfer {
                    let mut work = 0usize;
                    if !handle.transferred() {
                        if !Self::hand_off(handle, stats) {
                            return work;
                        }
                        debug!("misuse-probe: storage handed off");
                        work += 1;
                    }
                    Self::probe_acquire(handle, stats, AccessMode::Read);
                    work += 1;
                    if let Some(view) = stale.as_mut() {
                        let _ = Self::retire(handle, stats, view);
                        work += 1;
                    }
                    let _ = Self::hand_off(handle, stats);
                    work += 1;
                    *probed_after_transfer = true;
                    work
                } else {
                    0
                }
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        match &self.state {
            ScenarioState::MisuseProbe {
                probed_after_transfer,
                ..
            } => *probed_after_transfer,
            _ => self.handle.transferred(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.state {
            ScenarioState::ReaderFanout { .. } => "reader-fanout",
            ScenarioState::WriterCycle { .. } => "writer-cycle",
            ScenarioState::MisuseProbe { .. } => "misuse-probe",
        }
    }
}

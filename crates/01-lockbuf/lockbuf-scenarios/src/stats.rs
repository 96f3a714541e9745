use parking_lot::Mutex;
use std::sync::Arc;

#[repr(C)]
#[derive(Clone, Copy, Default, Debug)]
pub struct ScenarioStats {
    pub reads_granted: u32,
    pub writes_granted: u32,
    pub unlocks: u32,
    pub transfers: u32,
    pub rejected_acquires: u32,
    pub rejected_unlocks: u32,
    pub rejected_transfers: u32,
    pub relocated_bytes: u32,
}

impl ScenarioStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub trait StatsSink: Clone + Send + 'static {
    fn with_stats<R>(&self, f: impl FnOnce(&mut ScenarioStats) -> R) -> R;
}

#[derive(Clone, Default)]
pub struct ArcStatsSink(pub Arc<Mutex<ScenarioStats>>);

impl ArcStatsSink {
    pub fn new(stats: Arc<Mutex<ScenarioStats>>) -> Self {
        Self(stats)
    }
}

impl StatsSink for ArcStatsSink {
    fn with_stats<R>(&self, f: impl FnOnce(&mut ScenarioStats) -> R) -> R {
        let mut guard = self.0.lock();
        f(&mut *guard)
    }
}

impl StatsSink for Arc<Mutex<ScenarioStats>> {
    fn with_stats<R>(&self, f: impl FnOnce(&mut ScenarioStats) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }
}

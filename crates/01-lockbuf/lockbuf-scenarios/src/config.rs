#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioType {
    ReaderFanout = 0,
    WriterCycle = 1,
    MisuseProbe = 2,
}

impl ScenarioType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(ScenarioType::ReaderFanout),
            1 => Some(ScenarioType::WriterCycle),
            2 => Some(ScenarioType::MisuseProbe),
            _ => None,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct TestConfig {
    pub test_type: u32,
    pub param1: u32,
    pub param2: u32,
}

impl TestConfig {
    pub fn reader_fanout(readers: u32) -> Self {
        Self {
            test_type: ScenarioType::ReaderFanout as u32,
            param1: readers,
            param2: 0,
        }
    }

    pub fn writer_cycle(cycles: u32) -> Self {
        Self {
            test_type: ScenarioType::WriterCycle as u32,
            param1: cycles,
            param2: 0,
        }
    }

    pub fn misuse_probe(rounds: u32) -> Self {
        Self {
            test_type: ScenarioType::MisuseProbe as u32,
            param1: rounds,
            param2: 0,
        }
    }

    pub fn scenario_kind(&self) -> Option<ScenarioKind> {
        let ty = ScenarioType::from_u32(self.test_type)?;
        Some(match ty {
            ScenarioType::ReaderFanout => ScenarioKind::ReaderFanout {
                readers: self.param1,
            },
            ScenarioType::WriterCycle => ScenarioKind::WriterCycle {
                cycles: self.param1,
            },
            ScenarioType::MisuseProbe => ScenarioKind::MisuseProbe {
                rounds: self.param1,
            },
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioKind {
    ReaderFanout { readers: u32 },
    WriterCycle { cycles: u32 },
    MisuseProbe { rounds: u32 },
}

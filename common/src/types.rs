#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPointState {
    AdjustUp,
    AdjustDown,
    Idle,
}

impl SetPointState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdjustUp => "ADJUST_UP",
            Self::AdjustDown => "ADJUST_DOWN",
            Self::Idle => "IDLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatState {
    On,
    Off,
    Wait,
}

impl HeatState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Wait => "WAIT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportState {
    Update,
    Wait,
}

impl ReportState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Update => "UPDATE",
            Self::Wait => "WAIT",
        }
    }
}

/// The closed set of periodic responsibilities the scheduler dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    SetPoint,
    HeatControl,
    StatusReport,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetPoint => "set-point",
            Self::HeatControl => "heat-control",
            Self::StatusReport => "status-report",
        }
    }

    pub fn initial_state(self) -> TaskState {
        match self {
            Self::SetPoint => TaskState::SetPoint(SetPointState::Idle),
            Self::HeatControl => TaskState::HeatControl(HeatState::Wait),
            Self::StatusReport => TaskState::StatusReport(ReportState::Wait),
        }
    }
}

/// Current state of one task. The variant doubles as the dispatch tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    SetPoint(SetPointState),
    HeatControl(HeatState),
    StatusReport(ReportState),
}

impl TaskState {
    pub fn kind(self) -> TaskKind {
        match self {
            Self::SetPoint(_) => TaskKind::SetPoint,
            Self::HeatControl(_) => TaskKind::HeatControl,
            Self::StatusReport(_) => TaskKind::StatusReport,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetPoint(state) => state.as_str(),
            Self::HeatControl(state) => state.as_str(),
            Self::StatusReport(state) => state.as_str(),
        }
    }
}

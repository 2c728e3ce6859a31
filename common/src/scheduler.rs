//! Fixed-period cooperative dispatch driven by a single tick source.
//!
//! Every tick, each task's elapsed counter advances by the tick period; a
//! task whose counter has reached its period runs once and its counter goes
//! back to zero. Tasks run in list order and never preempt each other. A task
//! that blocks stalls the whole loop.

use log::debug;

use crate::{
    config::ThermostatConfig,
    types::{TaskKind, TaskState},
};

pub const TASK_COUNT: usize = 3;

/// Performs the state transitions for the scheduler.
pub trait TaskRunner {
    fn advance(&mut self, state: TaskState) -> TaskState;

    /// Called once per tick before any task is dispatched.
    fn on_tick(&mut self, _tick_period_ms: u32) {}
}

/// Periodic notification the loop blocks on.
pub trait TickSource {
    /// Block until the next tick. Returns `false` once the source has stopped
    /// for good.
    fn wait_for_tick(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    state: TaskState,
    period_ms: u32,
    elapsed_ms: u32,
}

impl Task {
    pub fn new(kind: TaskKind, period_ms: u32) -> Self {
        Self {
            state: kind.initial_state(),
            period_ms,
            elapsed_ms: 0,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.state.kind()
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

pub struct Scheduler<const N: usize> {
    tasks: [Task; N],
    tick_period_ms: u32,
    ticks: u64,
}

impl Scheduler<TASK_COUNT> {
    /// Set-point, heat-control, and status-report tasks, in that order.
    pub fn from_config(config: &ThermostatConfig) -> Self {
        Self::new(
            [
                Task::new(TaskKind::SetPoint, config.set_point_period_ms),
                Task::new(TaskKind::HeatControl, config.heat_period_ms),
                Task::new(TaskKind::StatusReport, config.report_period_ms),
            ],
            config.tick_period_ms,
        )
    }
}

impl<const N: usize> Scheduler<N> {
    pub fn new(tasks: [Task; N], tick_period_ms: u32) -> Self {
        Self {
            tasks,
            tick_period_ms,
            ticks: 0,
        }
    }

    pub fn tasks(&self) -> &[Task; N] {
        &self.tasks
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One dispatch pass. Returns how many tasks ran.
    pub fn tick<R: TaskRunner>(&mut self, runner: &mut R) -> usize {
        self.ticks = self.ticks.saturating_add(1);
        runner.on_tick(self.tick_period_ms);

        let mut dispatched = 0;
        for task in &mut self.tasks {
            task.elapsed_ms = task.elapsed_ms.saturating_add(self.tick_period_ms);
            if task.elapsed_ms >= task.period_ms {
                task.state = runner.advance(task.state);
                task.elapsed_ms = 0;
                dispatched += 1;
            }
        }

        dispatched
    }

    /// Dispatch one pass per tick until the tick source stops.
    pub fn run<R, T>(&mut self, runner: &mut R, ticks: &mut T)
    where
        R: TaskRunner,
        T: TickSource,
    {
        while ticks.wait_for_tick() {
            self.tick(runner);
        }
        debug!("tick source stopped after {} ticks", self.ticks);
    }
}

use std::io::Write;

use embedded_hal::{digital::OutputPin, i2c::I2c};
use log::{debug, warn};

use crate::{
    context::ThermostatContext,
    display,
    report::{Console, StatusLine},
    scheduler::TaskRunner,
    sensor::TemperatureSensor,
    setpoint,
    types::{ReportState, TaskState},
};

/// Everything the tasks touch: the identified sensor, the heat indicator,
/// the serial console, and the shared context.
pub struct Board<I2C, LED, W> {
    pub(crate) sensor: TemperatureSensor<I2C>,
    pub(crate) indicator: LED,
    pub(crate) console: Console<W>,
    pub(crate) ctx: ThermostatContext,
}

impl<I2C, LED, W> Board<I2C, LED, W>
where
    I2C: I2c,
    LED: OutputPin,
    W: Write,
{
    /// Assemble the board and drive the indicator off.
    pub fn new(
        sensor: TemperatureSensor<I2C>,
        indicator: LED,
        console: Console<W>,
        ctx: ThermostatContext,
    ) -> Self {
        let mut board = Self {
            sensor,
            indicator,
            console,
            ctx,
        };
        board.drive_indicator(false);
        board
    }

    pub fn context(&self) -> &ThermostatContext {
        &self.ctx
    }

    pub fn sensor(&self) -> &TemperatureSensor<I2C> {
        &self.sensor
    }

    pub fn console(&self) -> &Console<W> {
        &self.console
    }

    pub fn status_line(&self) -> StatusLine {
        StatusLine {
            temperature: self.ctx.temperature,
            set_point: self.ctx.set_point,
            heat_on: self.ctx.heat_on,
            seconds: self.ctx.seconds(),
        }
    }

    pub(crate) fn drive_indicator(&mut self, on: bool) {
        let result = if on {
            self.indicator.set_high()
        } else {
            self.indicator.set_low()
        };

        if let Err(err) = result {
            warn!("failed to drive heat indicator: {err:?}");
        }
    }

    fn report_status(&mut self, _current: ReportState) -> ReportState {
        let line = self.status_line();
        display!(self.console, "{line}");
        ReportState::Wait
    }
}

impl<I2C, LED, W> TaskRunner for Board<I2C, LED, W>
where
    I2C: I2c,
    LED: OutputPin,
    W: Write,
{
    fn advance(&mut self, state: TaskState) -> TaskState {
        debug!("{} task leaving {}", state.kind().as_str(), state.as_str());

        match state {
            TaskState::SetPoint(current) => {
                TaskState::SetPoint(setpoint::advance(current, &mut self.ctx))
            }
            TaskState::HeatControl(current) => TaskState::HeatControl(self.control_heat(current)),
            TaskState::StatusReport(current) => {
                TaskState::StatusReport(self.report_status(current))
            }
        }
    }

    fn on_tick(&mut self, tick_period_ms: u32) {
        self.ctx.advance_clock(tick_period_ms);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        mock::harness,
        types::{HeatState, SetPointState},
    };

    #[test]
    fn new_board_turns_indicator_off() {
        let h = harness(20, [0x0C, 0x80]);

        assert_eq!(h.led.get(), Some(false));
        assert!(!h.board.context().is_heat_on());
    }

    #[test]
    fn report_task_writes_one_status_line() {
        let mut h = harness(22, [0x0C, 0x80]);
        for _ in 0..30 {
            h.board.on_tick(100);
        }
        h.board.advance(TaskState::HeatControl(HeatState::Wait));

        let next = h.board.advance(TaskState::StatusReport(ReportState::Update));

        assert_eq!(next, TaskState::StatusReport(ReportState::Wait));
        assert_eq!(
            String::from_utf8(h.board.console().writer().clone()).unwrap(),
            "<25, 22, 0, 0003>\r\n"
        );
    }

    #[test]
    fn dispatch_keeps_each_task_in_its_own_machine() {
        let mut h = harness(20, [0x0C, 0x80]);
        h.board.context().requests().request_increase();

        let next = h.board.advance(TaskState::SetPoint(SetPointState::Idle));

        assert_eq!(next, TaskState::SetPoint(SetPointState::Idle));
        assert_eq!(h.board.context().set_point(), 21);
        assert_eq!(h.bus.borrow().registers_written.len(), 1);
    }
}

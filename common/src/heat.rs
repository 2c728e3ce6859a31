use std::io::Write;

use embedded_hal::{digital::OutputPin, i2c::I2c};
use log::info;

use crate::{board::Board, display, temperature::Temperature, types::HeatState};

/// Bang-bang decision: heat until the reading reaches the set-point.
pub fn decide(temperature: Temperature, set_point: i32) -> HeatState {
    if temperature.at_or_above(set_point) {
        HeatState::Off
    } else {
        HeatState::On
    }
}

impl<I2C, LED, W> Board<I2C, LED, W>
where
    I2C: I2c,
    LED: OutputPin,
    W: Write,
{
    /// One heat-control invocation: a single sensor read, a decision, and
    /// one indicator write. A failed read falls back to the held value.
    pub(crate) fn control_heat(&mut self, _current: HeatState) -> HeatState {
        let temperature = match self.sensor.read() {
            Ok(temperature) => temperature,
            Err(err) => {
                display!(self.console, "Error reading temperature sensor ({err})\r\n");
                display!(
                    self.console,
                    "Please power cycle your board by unplugging USB and plugging back in.\r\n"
                );
                self.sensor.last_reading()
            }
        };
        self.ctx.temperature = temperature;

        let decision = decide(temperature, self.ctx.set_point);
        let heat_on = decision == HeatState::On;
        if heat_on != self.ctx.heat_on {
            info!(
                "heat {} at {temperature} (set-point {})",
                decision.as_str(),
                self.ctx.set_point
            );
        }

        self.ctx.heat_on = heat_on;
        self.drive_indicator(heat_on);

        HeatState::Wait
    }
}

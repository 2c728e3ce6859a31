use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use embedded_hal::{
    digital::{self, OutputPin},
    i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation},
};
use tracing::debug;

use thermostat_common::temperature::DEGREES_PER_LSB;

/// Rise per read while the heater is on: 0.25 °C.
const HEATING_STEP: i32 = 32;
/// Fall per read while the heater is off: 0.125 °C.
const COOLING_STEP: i32 = 16;

#[derive(Debug)]
pub struct SimError(ErrorKind);

impl i2c::Error for SimError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// A single temperature sensor on an otherwise empty bus. Each read moves the
/// room temperature toward or away from warm depending on the heater line.
pub struct SimulatedBus {
    address: u8,
    raw: i32,
    heater: Arc<AtomicBool>,
    reads: u64,
    fail_every: Option<u64>,
}

impl SimulatedBus {
    pub fn new(
        address: u8,
        start_celsius: f32,
        heater: Arc<AtomicBool>,
        fail_every: Option<u64>,
    ) -> Self {
        let raw = (start_celsius / DEGREES_PER_LSB).round() as i32;
        Self {
            address,
            raw: raw.clamp(i32::from(i16::MIN), i32::from(i16::MAX)),
            heater,
            reads: 0,
            fail_every: fail_every.filter(|every| *every > 0),
        }
    }

    fn sample(&mut self) -> Result<[u8; 2], SimError> {
        self.reads = self.reads.saturating_add(1);
        if let Some(every) = self.fail_every {
            if self.reads % every == 0 {
                return Err(SimError(ErrorKind::Bus));
            }
        }

        let step = if self.heater.load(Ordering::Relaxed) {
            HEATING_STEP
        } else {
            -COOLING_STEP
        };
        self.raw = (self.raw + step).clamp(i32::from(i16::MIN), i32::from(i16::MAX));

        let raw = i16::try_from(self.raw).unwrap_or(i16::MAX);
        Ok(raw.to_be_bytes())
    }
}

impl i2c::ErrorType for SimulatedBus {
    type Error = SimError;
}

impl I2c for SimulatedBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(SimError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            )));
        }

        for operation in operations {
            if let Operation::Read(buffer) = operation {
                let bytes = self.sample()?;
                let len = buffer.len().min(bytes.len());
                buffer[..len].copy_from_slice(&bytes[..len]);
            }
        }
        Ok(())
    }
}

/// Heat indicator that feeds the simulated room.
pub struct SimulatedIndicator {
    heater: Arc<AtomicBool>,
}

impl SimulatedIndicator {
    pub fn new(heater: Arc<AtomicBool>) -> Self {
        Self { heater }
    }

    fn drive(&mut self, on: bool) {
        if self.heater.swap(on, Ordering::Relaxed) != on {
            debug!(on, "heat indicator toggled");
        }
    }
}

impl digital::ErrorType for SimulatedIndicator {
    type Error = Infallible;
}

impl OutputPin for SimulatedIndicator {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

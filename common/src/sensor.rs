use std::io::Write;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::{info, warn};
use thiserror::Error;

use crate::{display, report::Console, temperature::Temperature};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorCandidate {
    pub address: u8,
    pub result_register: u8,
    pub label: &'static str,
}

/// Boards ship with one of these parts; probed in order at start-up.
pub const SENSOR_CANDIDATES: [SensorCandidate; 3] = [
    SensorCandidate {
        address: 0x48,
        result_register: 0x00,
        label: "11X",
    },
    SensorCandidate {
        address: 0x49,
        result_register: 0x00,
        label: "116",
    },
    SensorCandidate {
        address: 0x41,
        result_register: 0x01,
        label: "006",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("bus transfer to 0x{address:02x} failed: {kind:?}")]
    Transfer { address: u8, kind: ErrorKind },
    #[error("no temperature sensor answered ({probed} candidate address(es) probed)")]
    NotFound { probed: usize },
}

/// The identified sensor. Holds the last good reading.
pub struct TemperatureSensor<I2C> {
    bus: I2C,
    candidate: SensorCandidate,
    last: Temperature,
    read_failures: u32,
}

impl<I2C: I2c> TemperatureSensor<I2C> {
    /// Probe each candidate in order and adopt the first one that acknowledges
    /// a write of its result register. Candidates after the match are never
    /// touched. Progress is narrated on `console`.
    pub fn identify<W: Write>(
        mut bus: I2C,
        candidates: &[SensorCandidate],
        console: &mut Console<W>,
    ) -> Result<Self, SensorError> {
        for candidate in candidates {
            display!(console, "Is this TMP{}? ", candidate.label);

            match bus.write(candidate.address, &[candidate.result_register]) {
                Ok(()) => {
                    display!(console, "Found\r\n");
                    display!(
                        console,
                        "Detected TMP{} I2C address: {:x}\r\n",
                        candidate.label,
                        candidate.address
                    );
                    info!(
                        "temperature sensor TMP{} at 0x{:02x}",
                        candidate.label, candidate.address
                    );
                    return Ok(Self {
                        bus,
                        candidate: *candidate,
                        last: Temperature::ZERO,
                        read_failures: 0,
                    });
                }
                Err(err) => {
                    display!(console, "No\r\n");
                    info!(
                        "no TMP{} at 0x{:02x}: {:?}",
                        candidate.label,
                        candidate.address,
                        err.kind()
                    );
                }
            }
        }

        display!(console, "Temperature sensor not found\r\n");
        Err(SensorError::NotFound {
            probed: candidates.len(),
        })
    }

    /// Read the result register. On failure the held value is left as it was
    /// and stays available through [`last_reading`](Self::last_reading).
    pub fn read(&mut self) -> Result<Temperature, SensorError> {
        let mut rx = [0_u8; 2];
        let address = self.candidate.address;

        match self
            .bus
            .write_read(address, &[self.candidate.result_register], &mut rx)
        {
            Ok(()) => {
                self.last = Temperature::from_be_bytes(rx);
                Ok(self.last)
            }
            Err(err) => {
                self.read_failures = self.read_failures.saturating_add(1);
                warn!(
                    "temperature read from 0x{address:02x} failed ({} so far): {:?}",
                    self.read_failures,
                    err.kind()
                );
                Err(SensorError::Transfer {
                    address,
                    kind: err.kind(),
                })
            }
        }
    }

    pub fn last_reading(&self) -> Temperature {
        self.last
    }

    pub fn candidate(&self) -> &SensorCandidate {
        &self.candidate
    }

    pub fn read_failures(&self) -> u32 {
        self.read_failures
    }
}

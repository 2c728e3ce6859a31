use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{
    digital::{ErrorType as PinErrorType, OutputPin},
    i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation},
};

use crate::{
    board::Board,
    config::SetPointLimits,
    context::ThermostatContext,
    report::Console,
    sensor::{TemperatureSensor, SENSOR_CANDIDATES},
};

#[derive(Debug, Default)]
pub(crate) struct MockBusState {
    pub present: Vec<u8>,
    pub reading: [u8; 2],
    pub fail_reads: Option<ErrorKind>,
    pub touched: Vec<u8>,
    pub registers_written: Vec<u8>,
}

pub(crate) struct MockBus {
    state: Rc<RefCell<MockBusState>>,
}

impl MockBus {
    pub fn new(present: &[u8]) -> (Self, Rc<RefCell<MockBusState>>) {
        let state = Rc::new(RefCell::new(MockBusState {
            present: present.to_vec(),
            ..MockBusState::default()
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }
}

#[derive(Debug)]
pub(crate) struct MockBusError(ErrorKind);

impl i2c::Error for MockBusError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

impl ErrorType for MockBus {
    type Error = MockBusError;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.touched.push(address);

        if !state.present.contains(&address) {
            return Err(MockBusError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            )));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    state.registers_written.extend_from_slice(bytes);
                }
                Operation::Read(buffer) => {
                    if let Some(kind) = state.fail_reads {
                        return Err(MockBusError(kind));
                    }
                    let len = buffer.len().min(2);
                    buffer[..len].copy_from_slice(&state.reading[..len]);
                }
            }
        }

        Ok(())
    }
}

pub(crate) struct MockLed {
    level: Rc<Cell<Option<bool>>>,
}

impl MockLed {
    pub fn new() -> (Self, Rc<Cell<Option<bool>>>) {
        let level = Rc::new(Cell::new(None));
        (
            Self {
                level: Rc::clone(&level),
            },
            level,
        )
    }
}

impl PinErrorType for MockLed {
    type Error = Infallible;
}

impl OutputPin for MockLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(Some(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.set(Some(true));
        Ok(())
    }
}

pub(crate) struct Harness {
    pub board: Board<MockBus, MockLed, Vec<u8>>,
    pub bus: Rc<RefCell<MockBusState>>,
    pub led: Rc<Cell<Option<bool>>>,
}

/// Board with a sensor answering at 0x49 and a fresh console.
pub(crate) fn harness(set_point: i32, reading: [u8; 2]) -> Harness {
    let (bus, bus_state) = MockBus::new(&[0x49]);
    bus_state.borrow_mut().reading = reading;

    let mut probe_console = Console::new(Vec::new());
    let sensor = TemperatureSensor::identify(bus, &SENSOR_CANDIDATES, &mut probe_console)
        .expect("mock sensor answers at 0x49");
    let (led, level) = MockLed::new();
    let ctx = ThermostatContext::new(SetPointLimits {
        default: set_point,
        ..SetPointLimits::default()
    });

    Harness {
        board: Board::new(sensor, led, Console::new(Vec::new()), ctx),
        bus: bus_state,
        led: level,
    }
}

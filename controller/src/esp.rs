use std::{io, num::NonZeroU32, sync::Arc, thread, time::Duration};

use anyhow::Context;
use esp_idf_hal::{
    delay::BLOCK,
    gpio::{AnyIOPin, AnyInputPin, Input, InputPin, InterruptType, PinDriver, Pull},
    i2c::{I2cConfig, I2cDriver},
    peripherals::Peripherals,
    task::notification::Notification,
    timer::{config::Config as TimerConfig, TimerDriver, TIMER00},
    uart::{config::Config as UartConfig, UartDriver},
    units::Hertz,
};
use esp_idf_svc::log::EspLogger;
use log::{error, info, warn};

use thermostat_common::{
    display, Board, Console, RequestFlags, Scheduler, TemperatureSensor, ThermostatConfig,
    ThermostatContext, TickSource, SENSOR_CANDIDATES,
};

const TICK_BIT: NonZeroU32 = NonZeroU32::MIN;

/// Blocking writer over the serial link.
struct UartConsole(UartDriver<'static>);

impl io::Write for UartConsole {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.wait_tx_done(BLOCK).map_err(io::Error::other)
    }
}

/// Timer-alarm notifications. Button interrupts are disabled by the driver
/// after each delivery, so every pass re-arms them.
struct EspTicks {
    notification: Notification,
    buttons: [PinDriver<'static, AnyInputPin, Input>; 2],
    _timer: TimerDriver<'static>,
}

impl TickSource for EspTicks {
    fn wait_for_tick(&mut self) -> bool {
        self.notification.wait(BLOCK);

        for button in &mut self.buttons {
            if let Err(err) = button.enable_interrupt() {
                warn!("failed to re-arm button interrupt: {err}");
            }
        }
        true
    }
}

/// Bring the board up and run the scheduler. Never returns: a start-up
/// failure parks the board with its diagnostic instead of rebooting.
pub fn run() -> ! {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    let mut config = ThermostatConfig::default();
    config.sanitize();

    let Peripherals {
        pins,
        uart0,
        i2c0,
        timer00,
        ..
    } = match Peripherals::take() {
        Ok(peripherals) => peripherals,
        Err(err) => halt_logged(anyhow::Error::from(err).context("failed to take peripherals")),
    };

    let uart = match UartDriver::new(
        uart0,
        pins.gpio1,
        pins.gpio3,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.uart_baud)),
    ) {
        Ok(uart) => uart,
        Err(err) => halt_logged(anyhow::Error::from(err).context("failed to open serial console")),
    };
    let mut console = Console::new(UartConsole(uart));

    let indicator = match PinDriver::output(pins.gpio2)
        .and_then(|mut pin| pin.set_low().map(|()| pin))
        .context("failed to configure heat indicator")
    {
        Ok(indicator) => indicator,
        Err(err) => halt_on_console(&mut console, err),
    };

    display!(console, "Initializing I2C Driver - ");
    let bus = match I2cDriver::new(
        i2c0,
        pins.gpio21,
        pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(config.i2c_bitrate_khz * 1_000)),
    ) {
        Ok(bus) => {
            display!(console, "Passed\r\n");
            bus
        }
        Err(err) => {
            display!(console, "Failed\r\n");
            halt_logged(anyhow::Error::from(err).context("I2C driver init failed"));
        }
    };

    let sensor = match TemperatureSensor::identify(bus, &SENSOR_CANDIDATES, &mut console) {
        Ok(sensor) => sensor,
        Err(err) => halt_logged(err.into()),
    };

    let ctx = ThermostatContext::new(config.set_point);
    let buttons = match arm_buttons(
        pins.gpio0.downgrade_input(),
        pins.gpio4.downgrade_input(),
        ctx.requests(),
    ) {
        Ok(buttons) => buttons,
        Err(err) => halt_on_console(&mut console, err),
    };

    let notification = Notification::new();
    let timer = match start_tick_timer(timer00, config.tick_period_ms, &notification)
        .context("failed to start tick timer")
    {
        Ok(timer) => timer,
        Err(err) => halt_on_console(&mut console, err),
    };
    let mut ticks = EspTicks {
        notification,
        buttons,
        _timer: timer,
    };

    let mut board = Board::new(sensor, indicator, console, ctx);
    let mut scheduler = Scheduler::from_config(&config);
    info!("scheduler started, tick every {}ms", config.tick_period_ms);
    scheduler.run(&mut board, &mut ticks);

    // `EspTicks` never reports a stop.
    error!("scheduler loop exited");
    halt();
}

fn arm_buttons(
    up: AnyInputPin,
    down: AnyInputPin,
    requests: Arc<RequestFlags>,
) -> anyhow::Result<[PinDriver<'static, AnyInputPin, Input>; 2]> {
    let raise = Arc::clone(&requests);
    let up = arm_button(up, move || raise.request_increase())
        .context("failed to arm increase button")?;
    let down = arm_button(down, move || requests.request_decrease())
        .context("failed to arm decrease button")?;
    Ok([up, down])
}

fn arm_button<F>(
    pin: AnyInputPin,
    on_press: F,
) -> anyhow::Result<PinDriver<'static, AnyInputPin, Input>>
where
    F: FnMut() + Send + 'static,
{
    let mut button = PinDriver::input(pin)?;
    button.set_pull(Pull::Up)?;
    button.set_interrupt_type(InterruptType::NegEdge)?;
    unsafe {
        button.subscribe(on_press)?;
    }
    button.enable_interrupt()?;
    Ok(button)
}

fn start_tick_timer(
    timer: TIMER00,
    period_ms: u32,
    notification: &Notification,
) -> anyhow::Result<TimerDriver<'static>> {
    let mut timer = TimerDriver::new(timer, &TimerConfig::new().auto_reload(true))?;
    timer.set_alarm(timer.tick_hz() * u64::from(period_ms) / 1_000)?;

    let notifier = notification.notifier();
    unsafe {
        timer.subscribe(move || {
            notifier.notify_and_yield(TICK_BIT);
        })?;
    }

    timer.enable_interrupt()?;
    timer.enable_alarm(true)?;
    timer.enable(true)?;
    Ok(timer)
}

/// Before the serial console exists the logger is the only way out.
fn halt_logged(err: anyhow::Error) -> ! {
    error!("start-up halted: {err:#}");
    halt();
}

fn halt_on_console<W: io::Write>(console: &mut Console<W>, err: anyhow::Error) -> ! {
    console.halt_notice(&err);
    halt_logged(err);
}

/// Start-up failures leave the board parked with its diagnostic on screen.
fn halt() -> ! {
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

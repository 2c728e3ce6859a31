use std::{
    io::BufRead,
    path::PathBuf,
    sync::{atomic::AtomicBool, Arc},
    thread,
    time::Duration,
};

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};

use thermostat_common::{
    display, Board, Console, RequestFlags, Scheduler, TemperatureSensor, ThermostatConfig,
    ThermostatContext, TickSource, SENSOR_CANDIDATES,
};

use crate::sim::{SimulatedBus, SimulatedIndicator};

const DEFAULT_SIM_ADDRESS: u8 = 0x49;
const DEFAULT_SIM_START_C: f32 = 18.0;
const TICK_QUEUE_DEPTH: usize = 8;

/// Ticks delivered by the async timer to the blocking scheduler thread.
struct ChannelTicks(mpsc::Receiver<()>);

impl TickSource for ChannelTicks {
    fn wait_for_tick(&mut self) -> bool {
        self.0.blocking_recv().is_some()
    }
}

pub async fn run() -> anyhow::Result<()> {
    // stdout carries the serial link; keep diagnostics off it.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config().unwrap_or_else(|err| {
        warn!("failed to load thermostat config: {err:#}");
        ThermostatConfig::default()
    });
    config.sanitize();

    info!(
        "config: tick={}ms set-point={}ms heat={}ms report={}ms limits={}..={} default={}",
        config.tick_period_ms,
        config.set_point_period_ms,
        config.heat_period_ms,
        config.report_period_ms,
        config.set_point.min,
        config.set_point.max,
        config.set_point.default,
    );

    let sim_address = std::env::var("SIM_SENSOR_ADDR")
        .ok()
        .and_then(|value| parse_address(&value))
        .unwrap_or(DEFAULT_SIM_ADDRESS);
    let sim_start = std::env::var("SIM_START_TEMP_C")
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(DEFAULT_SIM_START_C);
    let sim_fail_every = std::env::var("SIM_READ_FAILURE_EVERY")
        .ok()
        .and_then(|value| value.parse::<u64>().ok());

    let heater = Arc::new(AtomicBool::new(false));
    let mut console = Console::new(std::io::stdout());

    display!(console, "Initializing I2C Driver - ");
    let bus = SimulatedBus::new(sim_address, sim_start, Arc::clone(&heater), sim_fail_every);
    display!(console, "Passed\r\n");
    info!(
        "simulated sensor at 0x{sim_address:02x}, starting at {sim_start:.2}°C, bus {} kHz",
        config.i2c_bitrate_khz
    );

    let sensor = TemperatureSensor::identify(bus, &SENSOR_CANDIDATES, &mut console)
        .context("start-up halted")?;

    let ctx = ThermostatContext::new(config.set_point);
    spawn_button_reader(ctx.requests());
    let mut board = Board::new(sensor, SimulatedIndicator::new(heater), console, ctx);

    let (tick_tx, tick_rx) = mpsc::channel(TICK_QUEUE_DEPTH);
    let ticker = spawn_ticker(config.tick_period_ms, tick_tx);

    let mut scheduler_task = tokio::task::spawn_blocking(move || {
        let mut scheduler = Scheduler::from_config(&config);
        scheduler.run(&mut board, &mut ChannelTicks(tick_rx));
    });

    info!("thermostat running; type `+` or `-` and press enter to adjust the set-point");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            info!("shutting down");
        }
        joined = &mut scheduler_task => {
            joined.context("scheduler thread failed")?;
            return Ok(());
        }
    }

    ticker.abort();
    scheduler_task.await.context("scheduler thread failed")?;
    Ok(())
}

fn load_config() -> anyhow::Result<ThermostatConfig> {
    let Some(path) = std::env::var_os("THERMOSTAT_CONFIG").map(PathBuf::from) else {
        return Ok(ThermostatConfig::default());
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_address(value: &str) -> Option<u8> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn spawn_ticker(period_ms: u32, ticks: mpsc::Sender<()>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(u64::from(period_ms)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            if ticks.send(()).await.is_err() {
                break;
            }
        }
    })
}

/// Each `+` or `-` on stdin stands in for one button edge. Runs on a plain
/// thread so a pending read never holds up runtime shutdown.
fn spawn_button_reader(requests: Arc<RequestFlags>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("stdin closed: {err}");
                    break;
                }
            };
            for press in line.chars().filter(|ch| !ch.is_whitespace()) {
                match press {
                    '+' => requests.request_increase(),
                    '-' => requests.request_decrease(),
                    other => warn!("ignoring `{other}`; use `+` or `-`"),
                }
            }
        }
    });
}

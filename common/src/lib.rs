pub mod board;
pub mod config;
pub mod context;
pub mod heat;
pub mod report;
pub mod scheduler;
pub mod sensor;
pub mod setpoint;
pub mod temperature;
pub mod types;

#[cfg(test)]
mod mock;

pub use board::Board;
pub use config::{SetPointLimits, ThermostatConfig};
pub use context::{RequestFlags, ThermostatContext};
pub use report::{Console, StatusLine};
pub use scheduler::{Scheduler, Task, TaskRunner, TickSource, TASK_COUNT};
pub use sensor::{SensorCandidate, SensorError, TemperatureSensor, SENSOR_CANDIDATES};
pub use temperature::Temperature;
pub use types::{HeatState, ReportState, SetPointState, TaskKind, TaskState};

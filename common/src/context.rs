//! Process-wide thermostat state.
//!
//! Field ownership is single-writer:
//!
//! | field         | written by                  | read by                     |
//! |---------------|-----------------------------|-----------------------------|
//! | `set_point`   | set-point task              | heat-control, status report |
//! | `temperature` | heat-control (sensor read)  | status report               |
//! | `heat_on`     | heat-control task           | status report, indicator    |
//! | `uptime_ms`   | scheduler                   | status report               |
//! | request flags | edge callbacks (set) / set-point task (clear) | set-point task |
//!
//! Only the request flags are touched from interrupt context, so they are the
//! only atomics. Everything else is plain data owned by the scheduler thread.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{config::SetPointLimits, temperature::Temperature};

/// Sticky increase/decrease requests raised by the button edge callbacks.
#[derive(Debug, Default)]
pub struct RequestFlags {
    increase: AtomicBool,
    decrease: AtomicBool,
}

impl RequestFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edge callback for the increase button. Safe to call from an ISR.
    pub fn request_increase(&self) {
        self.increase.store(true, Ordering::Release);
    }

    /// Edge callback for the decrease button. Safe to call from an ISR.
    pub fn request_decrease(&self) {
        self.decrease.store(true, Ordering::Release);
    }

    pub fn increase_requested(&self) -> bool {
        self.increase.load(Ordering::Acquire)
    }

    pub fn decrease_requested(&self) -> bool {
        self.decrease.load(Ordering::Acquire)
    }

    pub(crate) fn clear_increase(&self) {
        self.increase.store(false, Ordering::Release);
    }

    pub(crate) fn clear_decrease(&self) {
        self.decrease.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct ThermostatContext {
    pub(crate) set_point: i32,
    pub(crate) limits: SetPointLimits,
    pub(crate) temperature: Temperature,
    pub(crate) heat_on: bool,
    pub(crate) uptime_ms: u64,
    pub(crate) requests: Arc<RequestFlags>,
}

impl ThermostatContext {
    pub fn new(limits: SetPointLimits) -> Self {
        Self {
            set_point: limits.default.max(limits.min).min(limits.max),
            limits,
            temperature: Temperature::ZERO,
            heat_on: false,
            uptime_ms: 0,
            requests: Arc::new(RequestFlags::new()),
        }
    }

    /// Handle for the edge callbacks; clone it into each button's handler.
    pub fn requests(&self) -> Arc<RequestFlags> {
        Arc::clone(&self.requests)
    }

    pub fn request_flags(&self) -> &RequestFlags {
        &self.requests
    }

    pub fn set_point(&self) -> i32 {
        self.set_point
    }

    pub fn limits(&self) -> SetPointLimits {
        self.limits
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn is_heat_on(&self) -> bool {
        self.heat_on
    }

    pub fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    pub fn seconds(&self) -> u32 {
        u32::try_from(self.uptime_ms / 1_000).unwrap_or(u32::MAX)
    }

    pub(crate) fn advance_clock(&mut self, elapsed_ms: u32) {
        self.uptime_ms = self.uptime_ms.saturating_add(u64::from(elapsed_ms));
    }
}

use serde::{Deserialize, Serialize};

pub const DEFAULT_TICK_PERIOD_MS: u32 = 100;

/// Hard bounds on any configured set-point limit, in whole °C.
pub const SET_POINT_FLOOR: i32 = 10;
pub const SET_POINT_CEILING: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetPointLimits {
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl Default for SetPointLimits {
    fn default() -> Self {
        Self {
            min: SET_POINT_FLOOR,
            max: SET_POINT_CEILING,
            default: 20,
        }
    }
}

impl SetPointLimits {
    pub fn contains(&self, set_point: i32) -> bool {
        (self.min..=self.max).contains(&set_point)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermostatConfig {
    pub tick_period_ms: u32,
    pub set_point_period_ms: u32,
    pub heat_period_ms: u32,
    pub report_period_ms: u32,
    pub set_point: SetPointLimits,
    pub uart_baud: u32,
    pub i2c_bitrate_khz: u32,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            set_point_period_ms: 200,
            heat_period_ms: 500,
            report_period_ms: 1_000,
            set_point: SetPointLimits::default(),
            uart_baud: 115_200,
            i2c_bitrate_khz: 400,
        }
    }
}

impl ThermostatConfig {
    pub fn sanitize(&mut self) {
        self.tick_period_ms = self.tick_period_ms.max(1);

        let tick = self.tick_period_ms;
        self.set_point_period_ms = self.set_point_period_ms.max(tick);
        self.heat_period_ms = self.heat_period_ms.max(tick);
        self.report_period_ms = self.report_period_ms.max(tick);

        let defaults = SetPointLimits::default();
        self.set_point.min = self.set_point.min.clamp(SET_POINT_FLOOR, SET_POINT_CEILING);
        self.set_point.max = self.set_point.max.clamp(SET_POINT_FLOOR, SET_POINT_CEILING);
        if self.set_point.min > self.set_point.max {
            self.set_point.min = defaults.min;
            self.set_point.max = defaults.max;
        }
        self.set_point.default = self
            .set_point
            .default
            .clamp(self.set_point.min, self.set_point.max);

        if self.uart_baud == 0 {
            self.uart_baud = 115_200;
        }
        self.i2c_bitrate_khz = self.i2c_bitrate_khz.clamp(10, 1_000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_board_constants() {
        let config = ThermostatConfig::default();

        assert_eq!(config.tick_period_ms, 100);
        assert_eq!(
            (
                config.set_point_period_ms,
                config.heat_period_ms,
                config.report_period_ms
            ),
            (200, 500, 1_000)
        );
        assert_eq!(
            config.set_point,
            SetPointLimits {
                min: 10,
                max: 40,
                default: 20
            }
        );
    }

    #[test]
    fn sanitize_raises_periods_to_tick_and_clamps_default() {
        let mut config = ThermostatConfig {
            tick_period_ms: 0,
            set_point_period_ms: 0,
            heat_period_ms: 0,
            report_period_ms: 0,
            set_point: SetPointLimits {
                min: 15,
                max: 25,
                default: 90,
            },
            uart_baud: 0,
            i2c_bitrate_khz: 5_000,
        };

        config.sanitize();

        assert_eq!(config.tick_period_ms, 1);
        assert_eq!(config.set_point_period_ms, 1);
        assert_eq!(config.heat_period_ms, 1);
        assert_eq!(config.report_period_ms, 1);
        assert_eq!(config.set_point.default, 25);
        assert_eq!(config.uart_baud, 115_200);
        assert_eq!(config.i2c_bitrate_khz, 1_000);
    }

    #[test]
    fn sanitize_restores_inverted_limits() {
        let mut config = ThermostatConfig::default();
        config.set_point.min = 50;
        config.set_point.max = 5;

        config.sanitize();

        assert_eq!(config.set_point, SetPointLimits::default());
    }

    #[test]
    fn sanitize_pulls_configured_limits_inside_hard_bounds() {
        let mut config: ThermostatConfig =
            serde_json::from_str(r#"{"set_point":{"min":-5,"max":60,"default":45}}"#).unwrap();

        config.sanitize();

        assert_eq!(
            config.set_point,
            SetPointLimits {
                min: 10,
                max: 40,
                default: 40
            }
        );
    }

    #[test]
    fn sanitize_keeps_narrower_limits() {
        let mut config = ThermostatConfig::default();
        config.set_point = SetPointLimits {
            min: 16,
            max: 24,
            default: 20,
        };

        config.sanitize();

        assert_eq!(config.set_point.min, 16);
        assert_eq!(config.set_point.max, 24);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let parsed: ThermostatConfig =
            serde_json::from_str(r#"{"tick_period_ms":50,"set_point":{"max":30}}"#).unwrap();

        assert_eq!(parsed.tick_period_ms, 50);
        assert_eq!(parsed.heat_period_ms, 500);
        assert_eq!(
            parsed.set_point,
            SetPointLimits {
                min: 10,
                max: 30,
                default: 20
            }
        );
    }
}

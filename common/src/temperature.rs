use core::fmt;

/// Degrees Celsius per least-significant bit of the sensor result register.
pub const DEGREES_PER_LSB: f32 = 0.007_812_5;

const LSB_PER_DEGREE: i32 = 128;

/// Signed fixed-point temperature, 1/128 °C per step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temperature(i16);

impl Temperature {
    pub const ZERO: Self = Self(0);

    pub const fn from_raw(raw: i16) -> Self {
        Self(raw)
    }

    /// Decode the two result bytes, high byte first. A set sign bit in the
    /// high byte makes the 16-bit value a negative two's-complement quantity.
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(i16::from_be_bytes(bytes))
    }

    pub fn from_whole_degrees(degrees: i16) -> Self {
        Self(degrees.saturating_mul(LSB_PER_DEGREE as i16))
    }

    pub const fn raw(self) -> i16 {
        self.0
    }

    pub fn celsius(self) -> f32 {
        f32::from(self.0) * DEGREES_PER_LSB
    }

    /// Integer degrees, truncated toward zero.
    pub fn whole_degrees(self) -> i32 {
        i32::from(self.0) / LSB_PER_DEGREE
    }

    /// True when this reading has reached `set_point` whole degrees.
    pub fn at_or_above(self, set_point: i32) -> bool {
        i32::from(self.0) >= set_point.saturating_mul(LSB_PER_DEGREE)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°C", self.celsius())
    }
}

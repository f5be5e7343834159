//! Angular units used by calibration records

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of encoder ticks in one revolution of a leader arm servo.
pub const TICKS_PER_REV: f64 = 4096.0;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Unit of the offsets stored in a record and of the raw readings mapped through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    /// Radians
    Rad,

    /// Degrees
    Deg,

    /// Servo encoder ticks, [`TICKS_PER_REV`] per revolution
    Ticks,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AngleUnit {
    /// Convert a value in this unit into radians.
    pub fn to_rad(self, value: f64) -> f64 {
        match self {
            AngleUnit::Rad => value,
            AngleUnit::Deg => value.to_radians(),
            AngleUnit::Ticks => value * TAU / TICKS_PER_REV,
        }
    }

    /// Convert a value in radians into this unit.
    pub fn from_rad(self, value_rad: f64) -> f64 {
        match self {
            AngleUnit::Rad => value_rad,
            AngleUnit::Deg => value_rad.to_degrees(),
            AngleUnit::Ticks => value_rad * TICKS_PER_REV / TAU,
        }
    }

    /// Convert a value from this unit into another.
    pub fn convert(self, value: f64, to: AngleUnit) -> f64 {
        if self == to {
            value
        } else {
            to.from_rad(self.to_rad(value))
        }
    }
}

impl Default for AngleUnit {
    fn default() -> Self {
        AngleUnit::Deg
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AngleUnit::Rad => "rad",
            AngleUnit::Deg => "deg",
            AngleUnit::Ticks => "ticks",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_conversions() {
        assert!((AngleUnit::Deg.to_rad(180.0) - PI).abs() < 1e-12);
        assert!((AngleUnit::Ticks.to_rad(2048.0) - PI).abs() < 1e-12);
        assert!((AngleUnit::Ticks.from_rad(PI / 2.0) - 1024.0).abs() < 1e-9);
        assert!((AngleUnit::Deg.convert(90.0, AngleUnit::Ticks) - 1024.0).abs() < 1e-9);
        assert_eq!(AngleUnit::Rad.convert(1.25, AngleUnit::Rad), 1.25);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&AngleUnit::Ticks).unwrap(), "\"ticks\"");
        let u: AngleUnit = serde_json::from_str("\"rad\"").unwrap();
        assert_eq!(u, AngleUnit::Rad);
        assert_eq!(AngleUnit::default(), AngleUnit::Deg);
    }
}

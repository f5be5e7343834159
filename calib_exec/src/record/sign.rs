//! Joint direction sign

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Relative direction of a leader joint with respect to the matching follower joint.
///
/// Persisted as the integers `1` and `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum JointSign {
    Positive,
    Negative,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointSign {
    pub fn as_f64(self) -> f64 {
        match self {
            JointSign::Positive => 1.0,
            JointSign::Negative => -1.0,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            JointSign::Positive => 1,
            JointSign::Negative => -1,
        }
    }
}

impl Default for JointSign {
    fn default() -> Self {
        JointSign::Positive
    }
}

impl TryFrom<i64> for JointSign {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(JointSign::Positive),
            -1 => Ok(JointSign::Negative),
            v => Err(format!("sign must be 1 or -1, found {}", v)),
        }
    }
}

impl From<JointSign> for i64 {
    fn from(sign: JointSign) -> Self {
        sign.as_i64()
    }
}

impl fmt::Display for JointSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_try_from() {
        assert_eq!(JointSign::try_from(1), Ok(JointSign::Positive));
        assert_eq!(JointSign::try_from(-1), Ok(JointSign::Negative));
        assert!(JointSign::try_from(0).is_err());
        assert!(JointSign::try_from(2).is_err());
    }

    #[test]
    fn test_serde_as_integer() {
        let s = serde_json::to_string(&vec![JointSign::Positive, JointSign::Negative]).unwrap();
        assert_eq!(s, "[1,-1]");

        assert!(serde_json::from_str::<JointSign>("0").is_err());
    }
}

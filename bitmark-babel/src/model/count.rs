//! Occurrence counts for tag cardinality

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A maximum occurrence count, finite or unbounded.
///
/// In the tables `"infinity"` and `-1` both mean unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Count {
    Finite(u32),
    Infinity,
}

impl Count {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Count::Infinity)
    }

    /// True when `seen` occurrences exceed this count
    pub fn exceeded_by(&self, seen: u32) -> bool {
        match self {
            Count::Finite(max) => seen > *max,
            Count::Infinity => false,
        }
    }

    /// True when the count allows at least one occurrence
    pub fn allows_any(&self) -> bool {
        !matches!(self, Count::Finite(0))
    }
}

impl Default for Count {
    fn default() -> Self {
        Count::Finite(1)
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Finite(n) => write!(f, "{n}"),
            Count::Infinity => f.write_str("infinity"),
        }
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Count::Finite(n) => serializer.serialize_u32(*n),
            Count::Infinity => serializer.serialize_str("infinity"),
        }
    }
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(-1) => Ok(Count::Infinity),
            Raw::Number(n) => u32::try_from(n)
                .map(Count::Finite)
                .map_err(|_| de::Error::custom(format!("invalid count {n}"))),
            Raw::Text(s) if s == "infinity" => Ok(Count::Infinity),
            Raw::Text(s) => Err(de::Error::custom(format!("invalid count '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_infinity_spellings() {
        let a: Count = serde_json::from_str("\"infinity\"").unwrap();
        let b: Count = serde_json::from_str("-1").unwrap();
        let c: Count = serde_json::from_str("3").unwrap();
        assert_eq!(a, Count::Infinity);
        assert_eq!(b, Count::Infinity);
        assert_eq!(c, Count::Finite(3));
    }

    #[test]
    fn exceeded_only_past_finite_max() {
        assert!(Count::Finite(2).exceeded_by(3));
        assert!(!Count::Finite(2).exceeded_by(2));
        assert!(!Count::Infinity.exceeded_by(1000));
        assert!(!Count::Finite(0).allows_any());
    }
}

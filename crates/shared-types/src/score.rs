//! # Chain Score
//!
//! 128-bit cumulative chain weight.
//!
//! The score is the metric used to pick the best of competing chain
//! histories: a candidate chain replaces the local chain only when its
//! score is strictly greater. Arithmetic wraps per 128-bit semantics;
//! real chain scores never approach 2^128.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// 128-bit unsigned cumulative chain score.
///
/// Serialized as two unsigned 64-bit words (high, low).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainScore(u128);

impl ChainScore {
    /// Create a score from a 64-bit value.
    pub const fn new(score: u64) -> Self {
        Self(score as u128)
    }

    /// Create a score from two 64-bit halves.
    pub const fn from_parts(high: u64, low: u64) -> Self {
        Self(((high as u128) << 64) | low as u128)
    }

    /// Split into (high, low) 64-bit halves for serialization.
    pub const fn to_parts(self) -> [u64; 2] {
        [(self.0 >> 64) as u64, self.0 as u64]
    }

    /// The raw 128-bit value.
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Whether the score is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Saturating subtraction; clamps at zero instead of wrapping.
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl From<u128> for ChainScore {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl Add for ChainScore {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for ChainScore {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for ChainScore {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for ChainScore {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl fmt::Display for ChainScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ChainScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_parts().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChainScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [high, low] = <[u64; 2]>::deserialize(deserializer)?;
        Ok(Self::from_parts(high, low))
    }
}

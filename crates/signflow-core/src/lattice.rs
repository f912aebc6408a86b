//! Sign lattice for divide-by-zero analysis
//!
//! Implements the six-point lattice over sign classes:
//!
//! ```text
//!             Top
//!           /  |
//!     Nonzero  |
//!      /   \   |
//! Positive Negative Zero
//!      \     |     /
//!          Bottom
//! ```
//!
//! `Positive` and `Negative` are incomparable; `Zero` is comparable only
//! with `Top` and `Bottom`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A point in the sign lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    /// No information - any integer or float value
    Top,
    /// Unreachable or contradictory information
    Bottom,
    /// Provably exactly zero
    Zero,
    /// Provably not zero, sign unknown
    Nonzero,
    /// Provably strictly greater than zero
    Positive,
    /// Provably strictly less than zero
    Negative,
}

impl Sign {
    /// Every lattice point, for exhaustive table checks.
    pub const ALL: [Sign; 6] = [
        Sign::Top,
        Sign::Bottom,
        Sign::Zero,
        Sign::Nonzero,
        Sign::Positive,
        Sign::Negative,
    ];

    /// Check if this point is at or below `other` in the lattice order.
    pub fn leq(self, other: Sign) -> bool {
        match (self, other) {
            (Sign::Bottom, _) => true,
            (_, Sign::Top) => true,
            (a, b) if a == b => true,
            (Sign::Positive | Sign::Negative, Sign::Nonzero) => true,
            _ => false,
        }
    }

    /// Join operation (least upper bound).
    pub fn join(self, other: Sign) -> Sign {
        match (self, other) {
            // Bottom is identity for join
            (Sign::Bottom, s) | (s, Sign::Bottom) => s,
            // Top absorbs everything
            (Sign::Top, _) | (_, Sign::Top) => Sign::Top,
            (a, b) if a == b => a,
            // Positive and Negative share Nonzero as their least upper bound
            (Sign::Positive | Sign::Negative | Sign::Nonzero, Sign::Positive | Sign::Negative | Sign::Nonzero) => {
                Sign::Nonzero
            }
            // Zero meets the nonzero classes only at Top
            _ => Sign::Top,
        }
    }

    /// Meet operation (greatest lower bound).
    pub fn meet(self, other: Sign) -> Sign {
        match (self, other) {
            // Top is identity for meet
            (Sign::Top, s) | (s, Sign::Top) => s,
            // Bottom absorbs everything
            (Sign::Bottom, _) | (_, Sign::Bottom) => Sign::Bottom,
            (a, b) if a == b => a,
            (Sign::Positive, Sign::Nonzero) | (Sign::Nonzero, Sign::Positive) => Sign::Positive,
            (Sign::Negative, Sign::Nonzero) | (Sign::Nonzero, Sign::Negative) => Sign::Negative,
            _ => Sign::Bottom,
        }
    }

    /// Classify a concrete integer constant.
    pub fn of_i64(value: i64) -> Sign {
        match value.cmp(&0) {
            Ordering::Less => Sign::Negative,
            Ordering::Equal => Sign::Zero,
            Ordering::Greater => Sign::Positive,
        }
    }

    /// Classify a concrete float constant. NaN carries no usable sign and
    /// classifies as `Top`; both signed zeros classify as `Zero`.
    pub fn of_f64(value: f64) -> Sign {
        if value.is_nan() {
            Sign::Top
        } else if value == 0.0 {
            Sign::Zero
        } else if value > 0.0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }

    /// True when the class rules out zero - the divisor condition a safe
    /// division needs.
    pub fn excludes_zero(self) -> bool {
        matches!(self, Sign::Nonzero | Sign::Positive | Sign::Negative)
    }
}

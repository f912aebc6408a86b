//! Transfer functions over the sign lattice
//!
//! Two families: [`arithmetic`] computes the result class of a binary
//! arithmetic expression from its operand classes, and [`refine`] narrows an
//! operand's class under the assumption that a comparison held. Both are pure
//! case tables; every entry is a soundness obligation, since one wrong entry
//! either rejects safe code or misses a real divide-by-zero.

use serde::{Deserialize, Serialize};

use crate::lattice::Sign;

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    /// Operators whose right-hand side must be provably nonzero.
    pub fn requires_nonzero_rhs(self) -> bool {
        matches!(self, ArithOp::Div | ArithOp::Rem)
    }
}

/// Comparison operator guarding a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// `x op y` == `y flip(op) x`
    pub fn flip(self) -> Comparison {
        match self {
            Comparison::Eq => Comparison::Eq,
            Comparison::Ne => Comparison::Ne,
            Comparison::Lt => Comparison::Gt,
            Comparison::Le => Comparison::Ge,
            Comparison::Gt => Comparison::Lt,
            Comparison::Ge => Comparison::Le,
        }
    }

    /// `x op y` == `!(x negate(op) y)`
    pub fn negate(self) -> Comparison {
        match self {
            Comparison::Eq => Comparison::Ne,
            Comparison::Ne => Comparison::Eq,
            Comparison::Lt => Comparison::Ge,
            Comparison::Le => Comparison::Gt,
            Comparison::Gt => Comparison::Le,
            Comparison::Ge => Comparison::Lt,
        }
    }
}

/// Result class of `lhs op rhs` given the operand classes.
///
/// The divide and remainder tables classify the *result* only; whether the
/// divisor can be zero is a separate question answered by the check pass
/// against the divisor's own class.
pub fn arithmetic(op: ArithOp, lhs: Sign, rhs: Sign) -> Sign {
    match op {
        ArithOp::Add => add(lhs, rhs),
        ArithOp::Sub => sub(lhs, rhs),
        ArithOp::Mul => mul(lhs, rhs),
        ArithOp::Div => div(lhs, rhs),
        ArithOp::Rem => rem(lhs),
    }
}

fn add(lhs: Sign, rhs: Sign) -> Sign {
    match (lhs, rhs) {
        (Sign::Zero, Sign::Zero) => Sign::Zero,
        (Sign::Zero, Sign::Nonzero) | (Sign::Nonzero, Sign::Zero) => Sign::Nonzero,
        (Sign::Zero, Sign::Positive) | (Sign::Positive, Sign::Zero) => Sign::Positive,
        (Sign::Zero, Sign::Negative) | (Sign::Negative, Sign::Zero) => Sign::Negative,
        (Sign::Positive, Sign::Positive) => Sign::Positive,
        (Sign::Negative, Sign::Negative) => Sign::Negative,
        // Mixed signs can cancel to anything, including zero
        _ => Sign::Top,
    }
}

fn sub(lhs: Sign, rhs: Sign) -> Sign {
    match (lhs, rhs) {
        (Sign::Zero, Sign::Zero) => Sign::Zero,
        (Sign::Nonzero, Sign::Zero) | (Sign::Zero, Sign::Nonzero) => Sign::Nonzero,
        (Sign::Positive, Sign::Zero) => Sign::Positive,
        (Sign::Negative, Sign::Zero) => Sign::Negative,
        (Sign::Zero, Sign::Positive) => Sign::Negative,
        (Sign::Zero, Sign::Negative) => Sign::Positive,
        (Sign::Positive, Sign::Negative) => Sign::Positive,
        (Sign::Negative, Sign::Positive) => Sign::Negative,
        // Same-sign subtraction can cancel to zero; no refinement links two
        // occurrences of the same variable, so even `x - x` stays Top
        _ => Sign::Top,
    }
}

fn mul(lhs: Sign, rhs: Sign) -> Sign {
    match (lhs, rhs) {
        // A zero factor dominates everything else we know
        (Sign::Zero, _) | (_, Sign::Zero) => Sign::Zero,
        (Sign::Positive, Sign::Positive) | (Sign::Negative, Sign::Negative) => Sign::Positive,
        (Sign::Positive, Sign::Negative) | (Sign::Negative, Sign::Positive) => Sign::Negative,
        (Sign::Nonzero, Sign::Nonzero | Sign::Positive | Sign::Negative)
        | (Sign::Positive | Sign::Negative, Sign::Nonzero) => Sign::Nonzero,
        _ => Sign::Top,
    }
}

fn div(lhs: Sign, rhs: Sign) -> Sign {
    match (lhs, rhs) {
        (Sign::Zero, _) => Sign::Zero,
        (Sign::Nonzero, _) => Sign::Nonzero,
        (Sign::Positive, Sign::Positive) | (Sign::Negative, Sign::Negative) => Sign::Positive,
        (Sign::Positive, Sign::Negative) | (Sign::Negative, Sign::Positive) => Sign::Negative,
        (Sign::Positive | Sign::Negative, Sign::Nonzero) => Sign::Nonzero,
        _ => Sign::Top,
    }
}

fn rem(lhs: Sign) -> Sign {
    // Remainder scrambles sign information across language semantics; only a
    // zero dividend survives
    if lhs == Sign::Zero {
        Sign::Zero
    } else {
        Sign::Top
    }
}

/// Narrowed class for `lhs` assuming `lhs cmp rhs` held.
///
/// The learned fact is met with the incoming class, so the result is always
/// at or below `lhs` in the lattice; a guard contradicting what is already
/// known yields `Bottom`.
pub fn refine(cmp: Comparison, lhs: Sign, rhs: Sign) -> Sign {
    let learned = match (cmp, rhs) {
        (Comparison::Eq, _) => rhs,
        (Comparison::Ne, Sign::Zero) => Sign::Nonzero,
        (Comparison::Ne, Sign::Positive) => Sign::Negative,
        (Comparison::Ne, Sign::Negative) => Sign::Positive,
        (Comparison::Lt, Sign::Zero | Sign::Negative) => Sign::Negative,
        (Comparison::Le, Sign::Negative) => Sign::Negative,
        (Comparison::Gt, Sign::Zero | Sign::Positive) => Sign::Positive,
        (Comparison::Ge, Sign::Positive) => Sign::Positive,
        // Nothing to learn from the remaining pairs
        _ => Sign::Top,
    };
    lhs.meet(learned)
}

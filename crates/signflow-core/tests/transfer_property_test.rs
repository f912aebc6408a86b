//! Soundness property tests for the arithmetic transfer tables
//!
//! For concrete operands `a` and `b` and any abstraction of them, the
//! concrete result of `a op b` must belong to the class the table returns.
//! Addition, subtraction and multiplication are checked under integer
//! semantics; division under real semantics, since the sign of an exact
//! quotient is what the table tracks (whether the divisor may be zero is the
//! check pass's question, not the table's).

use proptest::prelude::*;
use signflow_core::prelude::*;

/// Does the concrete integer belong to the class?
fn contains(sign: Sign, value: i64) -> bool {
    match sign {
        Sign::Top => true,
        Sign::Bottom => false,
        Sign::Zero => value == 0,
        Sign::Nonzero => value != 0,
        Sign::Positive => value > 0,
        Sign::Negative => value < 0,
    }
}

fn contains_f(sign: Sign, value: f64) -> bool {
    match sign {
        Sign::Top => true,
        Sign::Bottom => false,
        Sign::Zero => value == 0.0,
        Sign::Nonzero => value != 0.0,
        Sign::Positive => value > 0.0,
        Sign::Negative => value < 0.0,
    }
}

/// Every class that legally describes the concrete value.
fn abstractions(value: i64) -> Vec<Sign> {
    Sign::ALL.into_iter().filter(|s| contains(*s, value)).collect()
}

proptest! {
    #[test]
    fn prop_add_sub_mul_tables_sound(a in -2000i64..=2000, b in -2000i64..=2000) {
        for (op, concrete) in [
            (ArithOp::Add, a + b),
            (ArithOp::Sub, a - b),
            (ArithOp::Mul, a * b),
        ] {
            for lhs in abstractions(a) {
                for rhs in abstractions(b) {
                    let class = arithmetic(op, lhs, rhs);
                    prop_assert!(
                        contains(class, concrete),
                        "{a} {op:?} {b} = {concrete} escapes {class:?} for ({lhs:?}, {rhs:?})"
                    );
                }
            }
        }
    }

    #[test]
    fn prop_div_table_sound_for_exact_quotients(a in -1000i64..=1000, b in -1000i64..=1000) {
        prop_assume!(b != 0);
        let quotient = a as f64 / b as f64;
        for lhs in abstractions(a) {
            for rhs in abstractions(b) {
                let class = arithmetic(ArithOp::Div, lhs, rhs);
                prop_assert!(
                    contains_f(class, quotient),
                    "{a} / {b} = {quotient} escapes {class:?} for ({lhs:?}, {rhs:?})"
                );
            }
        }
    }

    #[test]
    fn prop_rem_table_sound(a in -1000i64..=1000, b in -1000i64..=1000) {
        prop_assume!(b != 0);
        let remainder = a % b;
        for lhs in abstractions(a) {
            for rhs in abstractions(b) {
                let class = arithmetic(ArithOp::Rem, lhs, rhs);
                prop_assert!(
                    contains(class, remainder),
                    "{a} % {b} = {remainder} escapes {class:?} for ({lhs:?}, {rhs:?})"
                );
            }
        }
    }

    #[test]
    fn prop_join_preserves_membership(value in -2000i64..=2000, other_idx in 0..6usize) {
        // Widening by join never loses a value the narrower class described
        let other = Sign::ALL[other_idx];
        for sign in abstractions(value) {
            prop_assert!(contains(sign.join(other), value));
        }
    }
}

#[test]
fn test_every_table_entry_sound_on_fixed_samples() {
    // Deterministic sweep of all 6x6 operand pairs per operator against
    // representative members of each class
    fn samples(sign: Sign) -> &'static [i64] {
        match sign {
            Sign::Top => &[0, 1, -1, 7, -9, 1000],
            Sign::Bottom => &[],
            Sign::Zero => &[0],
            Sign::Nonzero => &[1, -1, 3, -17, 250],
            Sign::Positive => &[1, 2, 42, 999],
            Sign::Negative => &[-1, -2, -42, -999],
        }
    }

    for lhs in Sign::ALL {
        for rhs in Sign::ALL {
            for &a in samples(lhs) {
                for &b in samples(rhs) {
                    for (op, concrete) in [
                        (ArithOp::Add, Some(a + b)),
                        (ArithOp::Sub, Some(a - b)),
                        (ArithOp::Mul, Some(a * b)),
                        (ArithOp::Rem, (b != 0).then(|| a % b)),
                    ] {
                        let Some(concrete) = concrete else { continue };
                        let class = arithmetic(op, lhs, rhs);
                        assert!(
                            contains(class, concrete),
                            "{a} {op:?} {b} = {concrete} escapes {class:?} for ({lhs:?}, {rhs:?})"
                        );
                    }
                    if b != 0 {
                        let class = arithmetic(ArithOp::Div, lhs, rhs);
                        assert!(
                            contains_f(class, a as f64 / b as f64),
                            "{a} / {b} escapes {class:?} for ({lhs:?}, {rhs:?})"
                        );
                    }
                }
            }
        }
    }
}

//! Lattice-law and involution properties, quickcheck edition

use quickcheck::{quickcheck, Arbitrary, Gen};
use signflow_core::prelude::*;

#[derive(Debug, Clone, Copy)]
struct AnySign(Sign);

impl Arbitrary for AnySign {
    fn arbitrary(g: &mut Gen) -> Self {
        AnySign(*g.choose(&Sign::ALL).unwrap())
    }
}

const COMPARISONS: [Comparison; 6] = [
    Comparison::Eq,
    Comparison::Ne,
    Comparison::Lt,
    Comparison::Le,
    Comparison::Gt,
    Comparison::Ge,
];

#[derive(Debug, Clone, Copy)]
struct AnyComparison(Comparison);

impl Arbitrary for AnyComparison {
    fn arbitrary(g: &mut Gen) -> Self {
        AnyComparison(*g.choose(&COMPARISONS).unwrap())
    }
}

quickcheck! {
    fn prop_join_commutative(a: AnySign, b: AnySign) -> bool {
        a.0.join(b.0) == b.0.join(a.0)
    }

    fn prop_meet_commutative(a: AnySign, b: AnySign) -> bool {
        a.0.meet(b.0) == b.0.meet(a.0)
    }

    fn prop_join_associative(a: AnySign, b: AnySign, c: AnySign) -> bool {
        a.0.join(b.0).join(c.0) == a.0.join(b.0.join(c.0))
    }

    fn prop_meet_associative(a: AnySign, b: AnySign, c: AnySign) -> bool {
        a.0.meet(b.0).meet(c.0) == a.0.meet(b.0.meet(c.0))
    }

    fn prop_join_meet_idempotent(a: AnySign) -> bool {
        a.0.join(a.0) == a.0 && a.0.meet(a.0) == a.0
    }

    fn prop_join_identities(a: AnySign) -> bool {
        a.0.join(Sign::Bottom) == a.0 && a.0.join(Sign::Top) == Sign::Top
    }

    fn prop_meet_identities(a: AnySign) -> bool {
        a.0.meet(Sign::Top) == a.0 && a.0.meet(Sign::Bottom) == Sign::Bottom
    }

    fn prop_absorption(a: AnySign, b: AnySign) -> bool {
        a.0.join(a.0.meet(b.0)) == a.0 && a.0.meet(a.0.join(b.0)) == a.0
    }

    fn prop_refine_never_widens(cmp: AnyComparison, lhs: AnySign, rhs: AnySign) -> bool {
        refine(cmp.0, lhs.0, rhs.0).leq(lhs.0)
    }

    fn prop_flip_involution(cmp: AnyComparison) -> bool {
        cmp.0.flip().flip() == cmp.0
    }

    fn prop_negate_involution(cmp: AnyComparison) -> bool {
        cmp.0.negate().negate() == cmp.0
    }

    fn prop_flip_negate_commute(cmp: AnyComparison) -> bool {
        cmp.0.flip().negate() == cmp.0.negate().flip()
    }
}

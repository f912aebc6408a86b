//! Per-program-point variable stores
//!
//! A [`SignStore`] maps front-end-supplied variable identities to lattice
//! points at a single program point. Identities are opaque to the engine;
//! anything the front end can name stably (a local, a field path) works.

use std::collections::HashMap;

use crate::lattice::Sign;

/// Sign knowledge about every tracked variable at one program point.
///
/// Canonical form: an absent binding means `Top`, and `Top` is never stored
/// explicitly, so store equality is exactly fixpoint equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignStore {
    bindings: HashMap<String, Sign>,
}

impl SignStore {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Get the sign of a variable. Unconstrained variables are `Top`.
    pub fn get(&self, var: &str) -> Sign {
        self.bindings.get(var).copied().unwrap_or(Sign::Top)
    }

    /// Bind a variable in place. Storing `Top` erases the binding; storing
    /// `Bottom` marks the binding contradictory under this path.
    pub fn insert(&mut self, var: impl Into<String>, sign: Sign) {
        let var = var.into();
        if sign == Sign::Top {
            self.bindings.remove(&var);
        } else {
            self.bindings.insert(var, sign);
        }
    }

    /// Copy-on-write update, for callers that need independent then/else
    /// stores from a shared starting point.
    pub fn set(&self, var: &str, sign: Sign) -> SignStore {
        let mut updated = self.clone();
        updated.insert(var, sign);
        updated
    }

    /// Pointwise join over the union of keys; a key absent on either side is
    /// `Top` for that side. Used to combine stores at control-flow joins.
    pub fn merge(&self, other: &SignStore) -> SignStore {
        let mut merged = SignStore::new();
        // A key missing from `other` joins with Top and vanishes, so only
        // keys present on both sides can survive.
        for (var, sign) in &self.bindings {
            if let Some(theirs) = other.bindings.get(var) {
                merged.insert(var.clone(), sign.join(*theirs));
            }
        }
        merged
    }

    /// All explicit bindings (everything not known to be `Top`).
    pub fn bindings(&self) -> impl Iterator<Item = (&str, Sign)> {
        self.bindings.iter().map(|(var, sign)| (var.as_str(), *sign))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Sign)> for SignStore {
    fn from_iter<T: IntoIterator<Item = (S, Sign)>>(iter: T) -> Self {
        let mut store = SignStore::new();
        for (var, sign) in iter {
            store.insert(var, sign);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_top() {
        let store = SignStore::new();
        assert_eq!(store.get("x"), Sign::Top);
    }

    #[test]
    fn test_top_is_not_stored() {
        let mut store = SignStore::new();
        store.insert("x", Sign::Positive);
        store.insert("x", Sign::Top);
        assert!(store.is_empty());
        assert_eq!(store.get("x"), Sign::Top);
    }

    #[test]
    fn test_set_leaves_original_untouched() {
        let mut base = SignStore::new();
        base.insert("y", Sign::Top);
        let refined = base.set("y", Sign::Nonzero);
        assert_eq!(base.get("y"), Sign::Top);
        assert_eq!(refined.get("y"), Sign::Nonzero);
    }

    #[test]
    fn test_merge_joins_pointwise() {
        let a: SignStore = [("x", Sign::Positive), ("y", Sign::Zero)].into_iter().collect();
        let b: SignStore = [("x", Sign::Negative), ("y", Sign::Zero)].into_iter().collect();
        let merged = a.merge(&b);
        assert_eq!(merged.get("x"), Sign::Nonzero);
        assert_eq!(merged.get("y"), Sign::Zero);
    }

    #[test]
    fn test_merge_drops_one_sided_keys() {
        let a: SignStore = [("x", Sign::Positive)].into_iter().collect();
        let b = SignStore::new();
        // x is Top on the b side, so the join is Top
        let merged = a.merge(&b);
        assert_eq!(merged.get("x"), Sign::Top);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_canonical_equality() {
        let a: SignStore = [("x", Sign::Positive)].into_iter().collect();
        let b: SignStore = [("x", Sign::Zero)].into_iter().collect();
        // join(Positive, Zero) = Top, which must not linger as a binding
        assert_eq!(a.merge(&b), SignStore::new());
    }
}

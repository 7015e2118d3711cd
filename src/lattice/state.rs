//! The atom lattice (spec §3): `initialized`, `uninitialized`, or
//! `consumed(by: S)`.

use crate::collections::Set;
use crate::ir::ids::InstId;

/// The state of a single (indivisible, for this node) object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// The object holds a live value.
    Initialized,
    /// Storage exists but holds no value.
    Uninitialized,
    /// The value was moved; `by` is the non-empty set of instructions that
    /// consumed it (more than one only after a merge unifies divergent
    /// consumers).
    Consumed(Set<InstId>),
}

impl State {
    pub fn consumed_by(instruction: InstId) -> Self {
        State::Consumed(Set::from([instruction]))
    }

    /// The conservative merge (`⊓`) from spec §3's table.
    ///
    /// This is *not* a classical lattice join: `initialized` is the
    /// identity, so an object live on only one predecessor path is
    /// conservatively treated as whatever the other path says (including
    /// `uninitialized`, never promoted back to `initialized`). That
    /// asymmetry is required to distinguish "use of partially consumed
    /// object" from "use of partially initialized object" with path
    /// precision, and must be preserved exactly (spec §9).
    pub fn merge(&self, other: &State) -> State {
        use State::*;
        match (self, other) {
            (Initialized, Initialized) => Initialized,
            (Initialized, Uninitialized) | (Uninitialized, Initialized) | (Uninitialized, Uninitialized) => {
                Uninitialized
            }
            (Initialized, Consumed(b)) | (Uninitialized, Consumed(b)) => Consumed(b.clone()),
            (Consumed(a), Initialized) | (Consumed(a), Uninitialized) => Consumed(a.clone()),
            (Consumed(a), Consumed(b)) => Consumed(a.union(b).cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(ids: &[u32]) -> State {
        State::Consumed(ids.iter().map(|&a| InstId::new(crate::ir::ids::BlockId(0), a)).collect())
    }

    #[test]
    fn merge_table_matches_spec() {
        use State::*;
        assert_eq!(Initialized.merge(&Initialized), Initialized);
        assert_eq!(Initialized.merge(&Uninitialized), Uninitialized);
        assert_eq!(Uninitialized.merge(&Initialized), Uninitialized);
        assert_eq!(Uninitialized.merge(&Uninitialized), Uninitialized);
        assert_eq!(Initialized.merge(&c(&[1])), c(&[1]));
        assert_eq!(c(&[1]).merge(&Initialized), c(&[1]));
        assert_eq!(Uninitialized.merge(&c(&[1])), c(&[1]));
        assert_eq!(c(&[1]).merge(&Uninitialized), c(&[1]));
        assert_eq!(c(&[1]).merge(&c(&[2])), c(&[1, 2]));
    }

    #[test]
    fn merge_is_commutative_and_associative() {
        let values = [Initialized, Uninitialized, c(&[1]), c(&[2])];
        for a in &values {
            for b in &values {
                assert_eq!(a.merge(b), b.merge(a), "commutativity: {a:?} vs {b:?}");
                for cc in &values {
                    assert_eq!(
                        a.merge(b).merge(cc),
                        a.merge(&b.merge(cc)),
                        "associativity: {a:?}, {b:?}, {cc:?}"
                    );
                }
            }
        }
    }
}

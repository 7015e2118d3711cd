//! The `Value` lattice (spec §3): either one `State` shared by every byte
//! of an object (`full`), or one `Value` per sub-object slot (`partial`).

use super::state::State;

/// An object's abstract value.
///
/// `Partial` nodes whose children are all `Full(s)` for the same `s` are
/// non-canonical; [`Value::canonicalize`] collapses them. All lattice
/// operations (merge, path queries) are defined only on canonical values,
/// and every constructor in this crate canonicalizes before returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Full(State),
    Partial(Vec<Value>),
}

impl Value {
    pub fn initialized() -> Value {
        Value::Full(State::Initialized)
    }

    pub fn uninitialized() -> Value {
        Value::Full(State::Uninitialized)
    }

    pub fn consumed_by(instruction: crate::ir::ids::InstId) -> Value {
        Value::Full(State::consumed_by(instruction))
    }

    /// Collapses a `partial([full(s), ..., full(s)])` into `full(s)`.
    /// Recurses first so a value built bottom-up is canonical throughout.
    pub fn canonicalize(self) -> Value {
        let result = match self {
            Value::Partial(children) => {
                let children: Vec<Value> =
                    children.into_iter().map(Value::canonicalize).collect();
                if let Some(Value::Full(first)) = children.first() {
                    if children[1..]
                        .iter()
                        .all(|c| matches!(c, Value::Full(s) if s == first))
                    {
                        Value::Full(first.clone())
                    } else {
                        Value::Partial(children)
                    }
                } else {
                    Value::Partial(children)
                }
            }
            full => full,
        };
        debug_assert!(result.is_canonical(), "canonicalize produced a non-canonical value: {result:?}");
        result
    }

    /// True iff this value has no `Partial` node with non-uniform children
    /// -- i.e. it is exactly what [`Value::canonicalize`] would produce.
    pub fn is_canonical(&self) -> bool {
        match self {
            Value::Full(_) => true,
            Value::Partial(children) => {
                let all_same_full = children.first().is_some_and(|first| {
                    matches!(first, Value::Full(s) if children[1..].iter().all(|c| matches!(c, Value::Full(t) if t == s)))
                });
                !all_same_full && children.iter().all(Value::is_canonical)
            }
        }
    }

    /// The conservative merge (`⊓`) lifted from [`State::merge`] pointwise
    /// over sub-object slots. A value that is `Full` on one side is treated
    /// as uniformly repeating that state across the other side's slots --
    /// this is what lets an object fully live on one predecessor path merge
    /// sensibly against a value already split by a divergent path.
    pub fn merge(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Full(a), Value::Full(b)) => Value::Full(a.merge(b)),
            (Value::Partial(a), Value::Partial(b)) => {
                if a.len() != b.len() {
                    crate::bug::precondition_failure(
                        "Value::merge",
                        "partial values with mismatched slot counts",
                    );
                }
                Value::Partial(a.iter().zip(b).map(|(x, y)| x.merge(y)).collect())
                    .canonicalize()
            }
            (Value::Full(a), Value::Partial(b)) => {
                let broadcast = Value::Full(a.clone());
                Value::Partial(b.iter().map(|c| broadcast.merge(c)).collect()).canonicalize()
            }
            (Value::Partial(_), Value::Full(_)) => other.merge(self),
        }
    }
}

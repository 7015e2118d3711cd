//! The abstract machine state a transfer function interprets against
//! (spec §3, §4.2): `locals` bind SSA names to either an object value or a
//! set of locations, `memory` holds the value at every live root location.

use crate::bug::bug;
use crate::collections::{Map, Set};
use crate::ir::ids::FunctionLocal;
use crate::ir::layout::{AbstractTypeLayout, Type};
use crate::ir::location::Location;
use crate::lattice::Value;

/// What an SSA local is bound to: a plain object value, or -- for results
/// of pointer/address-typed instructions -- the set of locations it may
/// denote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Object(Value),
    Locations(Set<Location>),
}

impl Entry {
    /// The `⊓` on `Entry` from spec §4.2. Mixing `Object` and `Locations`
    /// at the same local across predecessors is a pass invariant
    /// violation, not a user error.
    pub fn merge(&self, other: &Entry) -> Entry {
        match (self, other) {
            (Entry::Object(a), Entry::Object(b)) => Entry::Object(a.merge(b)),
            (Entry::Locations(a), Entry::Locations(b)) => {
                Entry::Locations(a.union(b).cloned().collect())
            }
            _ => bug!("Entry::merge", "mixed Object/Locations entries for the same local"),
        }
    }
}

/// The pair `(locals, memory)` a transfer function reads and mutates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub locals: Map<FunctionLocal, Entry>,
    /// Keyed only by *root* locations (`Argument`/`Instruction`); an
    /// `Extend` location is resolved by stripping its path and navigating
    /// into the root's value (see [`Context::value_at`] /
    /// [`Context::write_at`]).
    pub memory: Map<Location, (Type, Value)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    fn root_entry(&self, root: &Location) -> &(Type, Value) {
        self.memory.get(root).unwrap_or_else(|| {
            bug!(
                "Context::root_entry",
                "location {root:?} is not live in memory"
            )
        })
    }

    /// The value at `loc`, navigating from its root through its slot path.
    /// A `Full` node found partway down the path is treated as uniformly
    /// repeating that state at every deeper slot -- reading never needs to
    /// materialize the split that writing does.
    pub fn value_at(&self, loc: &Location) -> Value {
        let (root, path) = loc.root_and_path();
        let (_, value) = self.root_entry(&root);
        navigate(value, &path)
    }

    /// Overwrites the value at `loc`, splitting `Full` nodes into `Partial`
    /// as needed to isolate the written slot, and re-canonicalizing
    /// afterward (spec §4.5: "the implementation must canonicalize after
    /// every write"). `layout` answers the `AbstractTypeLayout(of: type)`
    /// query (spec §6) used to size a freshly split slot.
    pub fn write_at(&mut self, loc: &Location, new_value: Value, layout: &dyn AbstractTypeLayout) {
        let (root, path) = loc.root_and_path();
        let ty = self.root_entry(&root).0.clone();
        let entry = self.memory.get_mut(&root).unwrap_or_else(|| {
            bug!("Context::write_at", "location {root:?} is not live in memory")
        });
        write(&mut entry.1, &ty, &path, new_value, layout);
        let value = std::mem::replace(&mut entry.1, Value::uninitialized());
        entry.1 = value.canonicalize();
    }

    /// The type at `loc`, navigating from its root through its slot path the
    /// same way [`Context::value_at`] does.
    pub fn type_at(&self, loc: &Location) -> Type {
        let (root, path) = loc.root_and_path();
        let mut ty = self.root_entry(&root).0.clone();
        for &index in &path {
            ty = ty.field_type(index).clone();
        }
        ty
    }

    /// Reads the value shared by every location in `locations`, asserting
    /// (per invariant 4) that they all agree -- divergence indicates a
    /// borrow-discipline violation upstream of this pass, which is a
    /// compiler bug, not a user error.
    pub fn common_value(&self, locations: &Set<Location>) -> Value {
        let mut values = locations.iter().map(|l| self.value_at(l));
        let first = values.next().unwrap_or_else(|| {
            bug!("Context::common_value", "empty location set")
        });
        for other in values {
            if other != first {
                bug!(
                    "Context::common_value",
                    "locations in the same set disagree on value: {first:?} vs {other:?}"
                );
            }
        }
        first
    }

    /// The merge at a join block (spec §4.2): locals are merged via
    /// `Entry::merge`; a memory location survives only if it is present
    /// (live) in every one of `contexts`, since a location absent from
    /// some predecessor did not dominate the join.
    pub fn merge_all<'a>(contexts: impl IntoIterator<Item = &'a Context>) -> Context {
        let mut iter = contexts.into_iter();
        let Some(first) = iter.next() else {
            return Context::new();
        };
        let mut result = first.clone();
        for next in iter {
            let mut merged_locals = Map::new();
            for (k, v) in &result.locals {
                if let Some(other) = next.locals.get(k) {
                    merged_locals.insert(k.clone(), v.merge(other));
                }
            }
            result.locals = merged_locals;

            let mut merged_memory = Map::new();
            for (loc, (ty, value)) in &result.memory {
                if let Some((_, other_value)) = next.memory.get(loc) {
                    merged_memory.insert(loc.clone(), (ty.clone(), value.merge(other_value)));
                }
            }
            result.memory = merged_memory;
        }
        result
    }
}

fn navigate(value: &Value, path: &[u32]) -> Value {
    match path.split_first() {
        None => value.clone(),
        Some((&index, rest)) => match value {
            Value::Full(_) => value.clone(),
            Value::Partial(children) => navigate(
                children.get(index as usize).unwrap_or_else(|| {
                    bug!("Context::value_at", "slot {index} out of range")
                }),
                rest,
            ),
        },
    }
}

fn write(value: &mut Value, ty: &Type, path: &[u32], new_value: Value, layout: &dyn AbstractTypeLayout) {
    match path.split_first() {
        None => *value = new_value,
        Some((&index, rest)) => {
            if let Value::Full(state) = value {
                let arity = ty_arity(ty, layout);
                *value = Value::Partial(vec![Value::Full(state.clone()); arity]);
            }
            match value {
                Value::Partial(children) => {
                    let child_ty = ty.field_type(index);
                    let child = children.get_mut(index as usize).unwrap_or_else(|| {
                        bug!("Context::write_at", "slot {index} out of range")
                    });
                    write(child, child_ty, rest, new_value, layout);
                }
                Value::Full(_) => unreachable!("just split into Partial above"),
            }
        }
    }
}

/// The number of sub-object slots `ty` splits into, per the
/// `AbstractTypeLayout(of: type)` query (spec §6).
fn ty_arity(ty: &Type, layout: &dyn AbstractTypeLayout) -> usize {
    let slots = layout.layout(ty).slot_count();
    if slots == 0 {
        bug!("Context::write_at", "cannot descend into slots of non-record type {ty:?}");
    }
    slots
}

//! Path queries on `Value` (spec §4.5): the three views transfer functions
//! and the rewriter use to find which sub-objects are initialized.

use super::state::State;
use super::value::Value;
use crate::collections::Set;

/// A slot-path vector, e.g. `[0, 1]` means "field 0, then field 1 within
/// that". The empty vector denotes the whole value.
pub type Path = Vec<u32>;

/// Every slot path whose leaf is `full(initialized)`. If the whole value is
/// `full(initialized)`, the single path returned is the empty vector.
pub fn initialized_paths(value: &Value) -> Vec<Path> {
    let mut out = Vec::new();
    let mut prefix = Path::new();
    collect(value, State::Initialized, &mut prefix, &mut out);
    out
}

fn collect(value: &Value, want: State, prefix: &mut Path, out: &mut Vec<Path>) {
    match value {
        Value::Full(s) if std::mem::discriminant(s) == std::mem::discriminant(&want) => {
            out.push(prefix.clone());
        }
        Value::Full(_) => {}
        Value::Partial(children) => {
            for (i, child) in children.iter().enumerate() {
                prefix.push(i as u32);
                collect(child, want.clone(), prefix, out);
                prefix.pop();
            }
        }
    }
}

/// The `{initialized, uninitialized, consumed}` partition of a value's leaf
/// paths, populated only when the value is `partial` (spec §4.5: returns
/// `None` for a `full` value, since there the single "path" is the whole
/// object and the caller already knows its one state).
#[derive(Debug, Default, Clone)]
pub struct PathsView {
    pub initialized: Vec<Path>,
    pub uninitialized: Vec<Path>,
    pub consumed: Vec<Path>,
}

pub fn paths_view(value: &Value) -> Option<PathsView> {
    match value {
        Value::Full(_) => None,
        Value::Partial(_) => {
            let mut view = PathsView::default();
            let mut prefix = Path::new();
            fill_view(value, &mut prefix, &mut view);
            Some(view)
        }
    }
}

fn fill_view(value: &Value, prefix: &mut Path, view: &mut PathsView) {
    match value {
        Value::Full(State::Initialized) => view.initialized.push(prefix.clone()),
        Value::Full(State::Uninitialized) => view.uninitialized.push(prefix.clone()),
        Value::Full(State::Consumed(_)) => view.consumed.push(prefix.clone()),
        Value::Partial(children) => {
            for (i, child) in children.iter().enumerate() {
                prefix.push(i as u32);
                fill_view(child, prefix, view);
                prefix.pop();
            }
        }
    }
}

/// Paths initialized in `a` but not in `b` (spec §4.5), used when a
/// `set`-borrow's acquisition encounters memory that is only partially
/// initialized.
pub fn difference(a: &Value, b: &Value) -> Vec<Path> {
    let in_b: Set<Path> = initialized_paths(b).into_iter().collect();
    initialized_paths(a)
        .into_iter()
        .filter(|p| !in_b.contains(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ids::{BlockId, InstId};

    fn inst(a: u32) -> InstId {
        InstId::new(BlockId(0), a)
    }

    #[test]
    fn full_initialized_has_single_empty_path() {
        assert_eq!(initialized_paths(&Value::initialized()), vec![Path::new()]);
        assert!(initialized_paths(&Value::uninitialized()).is_empty());
    }

    #[test]
    fn partial_collects_leaf_paths() {
        let v = Value::Partial(vec![
            Value::initialized(),
            Value::Partial(vec![Value::uninitialized(), Value::initialized()]),
        ]);
        assert_eq!(initialized_paths(&v), vec![vec![0], vec![1, 1]]);

        let view = paths_view(&v).unwrap();
        assert_eq!(view.initialized, vec![vec![0], vec![1, 1]]);
        assert_eq!(view.uninitialized, vec![vec![1, 0]]);
        assert!(view.consumed.is_empty());
    }

    #[test]
    fn full_value_has_no_paths_view() {
        assert!(paths_view(&Value::initialized()).is_none());
    }

    #[test]
    fn difference_excludes_common_paths() {
        let a = Value::Partial(vec![Value::initialized(), Value::initialized()]);
        let b = Value::Partial(vec![Value::initialized(), Value::uninitialized()]);
        assert_eq!(difference(&a, &b), vec![vec![1]]);
        assert!(difference(&b, &a).is_empty());
    }

    #[test]
    fn consumed_state_is_distinguished() {
        let v = Value::consumed_by(inst(0));
        assert!(initialized_paths(&v).is_empty());
        assert!(paths_view(&v).is_none());
    }
}

//! Map/Set aliases used throughout the pass.
//!
//! `BTreeMap`/`BTreeSet` are used rather than hash-based collections so that
//! block traversal, merge, and diagnostic emission order are deterministic
//! and independent of hasher state -- the driver's ordering guarantees
//! (spec §5) depend on this.

pub use std::collections::{BTreeMap as Map, BTreeSet as Set};

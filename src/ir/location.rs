//! Abstract locations (spec §3): opaque identifiers for storage. Two
//! operations observing the same location are known to alias; two
//! observing different locations are known not to alias.

use super::ids::InstId;

/// An abstract location.
///
/// `Argument` and `Instruction` locations are *roots* -- they are what
/// [`crate::context::Context::memory`] actually keys on. `Extend` locations
/// are views into a root's value at a sub-object path, produced by
/// `element-addr`; they never appear as `memory` keys themselves, only as
/// the argument navigated from a root by [`crate::context::Context::value_at`]
/// and [`crate::context::Context::write_at`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// A function parameter's storage.
    Argument(u32),
    /// Storage created by an `alloc-stack` at this instruction.
    Instruction(InstId),
    /// A sub-object of `parent`, reached by `element-addr`'s slot path.
    Extend(Box<Location>, Vec<u32>),
}

impl Location {
    pub fn extend(self, path: Vec<u32>) -> Location {
        if path.is_empty() {
            self
        } else {
            Location::Extend(Box::new(self), path)
        }
    }

    /// Splits this location into its root (`Argument` or `Instruction`) and
    /// the slot path from that root, flattening nested `Extend`s.
    pub fn root_and_path(&self) -> (Location, Vec<u32>) {
        match self {
            Location::Extend(parent, path) => {
                let (root, mut prefix) = parent.root_and_path();
                prefix.extend(path.iter().copied());
                (root, prefix)
            }
            root => (root.clone(), Vec::new()),
        }
    }
}

//! Ambient configuration for a single run of the pass.
//!
//! Generalizes the single ad hoc `join_type` flag threaded through the
//! reference analysis crate's `AbstractEnv::join_with` into one value handed
//! to [`crate::normalize_object_states`] once per run, rather than plumbed
//! through every transfer function call.

/// Tunables for [`crate::normalize_object_states`].
///
/// None of these affect the *result* the pass computes on well-formed input
/// -- they only affect diagnostic bookkeeping and defensive limits on the
/// driver itself.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeConfig {
    /// Suppress duplicate diagnostics for the same `(instruction, site,
    /// kind)` triple. Without this, a block revisited by the fixed-point
    /// driver can report the same use-of-uninitialized-object diagnostic
    /// once per revisit (spec §9, open question on diagnostic duplication).
    /// Default: `true`.
    pub dedupe_diagnostics: bool,

    /// If set, the driver treats exceeding this many revisits of a single
    /// block as an internal error rather than looping. This is a debugging
    /// aid, not a correctness requirement: spec §4.1 already proves
    /// termination from the lattice's finite height. Default: `None`
    /// (unbounded).
    pub max_block_revisits: Option<u32>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            dedupe_diagnostics: true,
            max_block_revisits: None,
        }
    }
}

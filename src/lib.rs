//! Object-state normalization: a forward dataflow pass over an SSA
//! control-flow graph that checks definite initialization and exclusive
//! consumption of every object before use, inserts implicit
//! deinitialization at points where storage is reused or freed, and folds
//! statically decidable branches.
//!
//! The entry point is [`normalize_object_states`] (or
//! [`normalize_object_states_with_config`] for non-default tunables).

pub mod bug;
pub mod collections;
pub mod config;
pub mod context;
pub mod deinit;
pub mod diagnostics;
pub mod driver;
pub mod ir;
pub mod lattice;
pub mod rewriter;
pub mod transfer;

pub use config::NormalizeConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSet};
pub use ir::ids::FunctionId;
pub use ir::module::Module;

/// Runs the pass on `function` with the default [`NormalizeConfig`].
///
/// Postcondition (spec §6): if `diagnostics` reports no errors after this
/// call, `function` contains explicit `deinit` instructions at every point
/// where an object's storage is overwritten or freed, and is free of
/// decidable `static-branch` instructions. If any diagnostic was emitted,
/// later stages should not rely on the rewrite being semantically correct.
pub fn normalize_object_states(module: &mut Module, function: FunctionId, diagnostics: &mut DiagnosticSet) {
    normalize_object_states_with_config(module, function, &NormalizeConfig::default(), diagnostics)
}

/// [`normalize_object_states`] with an explicit [`NormalizeConfig`].
pub fn normalize_object_states_with_config(
    module: &mut Module,
    function: FunctionId,
    config: &NormalizeConfig,
    diagnostics: &mut DiagnosticSet,
) {
    driver::run(module, function, config, diagnostics)
}

//! IR rewriting triggered by the driver (spec §4.1, `static-branch` case):
//! folding a decidable branch and dropping its dead arm.

use crate::ir::ids::{BlockId, FunctionId, InstId};
use crate::ir::module::Module;
use crate::ir::Opcode;

/// Replaces the `static-branch` at `inst` with an unconditional branch to
/// `keep`, then deletes the `remove` block entirely. The caller is
/// responsible for purging `remove` from the work list and for recomputing
/// the CFG and dominator tree afterward (spec §4.1).
pub fn fold_static_branch(module: &mut Module, f: FunctionId, inst: InstId, keep: BlockId, remove: BlockId) {
    log::debug!("folding static-branch at {inst} to {keep}, removing {remove}");
    module.replace(f, inst, Opcode::Branch { target: keep });
    module.remove_block(f, remove);
}

//! Deinitialization-sequence insertion (spec §4.6): splicing an
//! `element-addr; load; deinit` triple in front of the instruction whose
//! overwrite or free discovered live content at that path.
//!
//! Spec §4.6 says these inserted instructions "are themselves interpreted on
//! the next iteration of the driver". This crate instead interprets them
//! synchronously, right after splicing them in, against the same `ctx` the
//! caller is already mutating -- behaviorally equivalent (the driver would
//! reach the identical fixed point either way, since nothing else touches
//! `root`'s storage between insertion and the caller's own transfer step)
//! and considerably simpler than threading a pending-reinterpretation queue
//! through the driver. See `DESIGN.md`.

use crate::context::Context;
use crate::diagnostics::{DiagnosticSet, SourceRange};
use crate::ir::ids::{FunctionId, FunctionLocal, InstId};
use crate::ir::module::Module;
use crate::ir::{AddressOperand, Opcode, Operand};
use crate::lattice::Path;

/// Inserts a deinitialization sequence for each path in `paths`, in order,
/// immediately before `before`, anchored at `site`. `root` addresses the
/// object the paths are relative to -- the same address operand the caller
/// (a `set`-borrow acquisition or a `dealloc-stack`) already resolved.
pub fn insert_before(
    module: &mut Module,
    f: FunctionId,
    ctx: &mut Context,
    root: AddressOperand,
    paths: &[Path],
    site: SourceRange,
    before: InstId,
    diagnostics: &mut DiagnosticSet,
) {
    for path in paths {
        let element_addr = module.insert_before(
            f,
            before,
            site,
            Opcode::ElementAddr {
                base: root.clone(),
                path: path.clone(),
            },
        );
        interpret(module, f, ctx, element_addr, diagnostics);

        let load = module.insert_before(
            f,
            before,
            site,
            Opcode::Load {
                addr: AddressOperand::Location(FunctionLocal::Result(element_addr, 0)),
            },
        );
        interpret(module, f, ctx, load, diagnostics);

        let deinit = module.insert_before(
            f,
            before,
            site,
            Opcode::Deinit {
                operand: Operand::Value(FunctionLocal::Result(load, 0)),
            },
        );
        interpret(module, f, ctx, deinit, diagnostics);
    }
}

fn interpret(
    module: &mut Module,
    f: FunctionId,
    ctx: &mut Context,
    id: InstId,
    diagnostics: &mut DiagnosticSet,
) {
    let inst = module.instruction(f, id).clone();
    // None of `element-addr`, `load`, or `deinit` can fold a static branch.
    let _ = crate::transfer::apply(module, f, ctx, &inst, diagnostics);
}

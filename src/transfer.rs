//! One transfer function per opcode (spec §4.4), plus the shared `consume`
//! helper. Each function takes the `Instruction` it interprets and mutates
//! `ctx` in place; folding a `static-branch` is signaled back to the driver
//! through [`Effect`] rather than performed here, since it also requires
//! purging the work list and recomputing the CFG.

use crate::bug::bug;
use crate::collections::Set;
use crate::context::{Context, Entry};
use crate::deinit;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSet, SourceRange};
use crate::ir::ids::{BlockId, FunctionId, FunctionLocal, InstId, ParameterConvention};
use crate::ir::location::Location;
use crate::ir::module::Module;
use crate::ir::{AddressOperand, Instruction, Opcode, Operand, StaticBranchPredicate};
use crate::lattice::{paths, State, Value};

/// What the driver must do after a transfer function runs, beyond updating
/// `ctx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// A `static-branch` was folded: `remove` is now statically dead and
    /// must be dropped from the work list; the instruction itself has
    /// already been replaced with an unconditional branch to `keep`.
    FoldStaticBranch { keep: BlockId, remove: BlockId },
}

/// Interprets `inst` against `ctx`, mutating it and `module` (for inserted
/// deinitialization sequences) and `diagnostics` as needed.
pub fn apply(
    module: &mut Module,
    f: FunctionId,
    ctx: &mut Context,
    inst: &Instruction,
    diagnostics: &mut DiagnosticSet,
) -> Effect {
    let id = inst.id;
    let site = inst.site;
    match &inst.opcode {
        Opcode::AllocStack { ty } => {
            let loc = Location::Instruction(id);
            if ctx.memory.contains_key(&loc) {
                bug!("transfer::alloc_stack", "location {loc:?} is already live (stack leak)");
            }
            ctx.memory.insert(loc.clone(), (ty.clone(), Value::uninitialized()));
            bind_locations(ctx, inst.result(0), Set::from([loc]));
            Effect::None
        }

        Opcode::Borrow { convention, addr } => {
            let locs = addr_locations(ctx, addr, "transfer::borrow");
            let value = ctx.common_value(&locs);
            match convention {
                ParameterConvention::Let | ParameterConvention::Inout => {
                    check_fully_initialized(&value, id, site, diagnostics);
                }
                ParameterConvention::Set => {
                    let initialized = paths::initialized_paths(&value);
                    if !initialized.is_empty() {
                        deinit::insert_before(
                            module,
                            f,
                            ctx,
                            addr.clone(),
                            &initialized,
                            site,
                            id,
                            diagnostics,
                        );
                    }
                    for loc in &locs {
                        ctx.write_at(loc, Value::uninitialized(), &*module);
                    }
                }
                ParameterConvention::Sink | ParameterConvention::Yielded => {
                    bug!("transfer::borrow", "{convention:?} is invalid as a borrow convention")
                }
            }
            bind_locations(ctx, inst.result(0), locs);
            Effect::None
        }

        Opcode::Branch { .. } => Effect::None,

        Opcode::CondBranch { condition, .. } => {
            consume(ctx, condition, id, site, diagnostics);
            Effect::None
        }

        Opcode::Call {
            callee,
            sink_callee,
            args,
            results,
        } => {
            if *sink_callee {
                consume(ctx, callee, id, site, diagnostics);
            }
            for arg in args {
                apply_call_argument(&*module, ctx, arg, id, site, diagnostics);
            }
            for n in 0..*results {
                bind_object(ctx, FunctionLocal::Result(id, n), Value::initialized());
            }
            Effect::None
        }

        Opcode::DeallocStack { addr } => {
            let locs = addr_locations(ctx, addr, "transfer::dealloc_stack");
            if locs.len() != 1 {
                bug!(
                    "transfer::dealloc_stack",
                    "dealloc-stack address must resolve to exactly one location, got {}",
                    locs.len()
                );
            }
            let loc = locs.into_iter().next().unwrap();
            let value = ctx.value_at(&loc);
            let initialized = paths::initialized_paths(&value);
            if !initialized.is_empty() {
                deinit::insert_before(module, f, ctx, addr.clone(), &initialized, site, id, diagnostics);
            }
            let (root, path) = loc.root_and_path();
            if !path.is_empty() {
                bug!("transfer::dealloc_stack", "dealloc-stack address is not a root location");
            }
            ctx.memory.remove(&root);
            Effect::None
        }

        Opcode::Deinit { operand } => {
            consume(ctx, operand, id, site, diagnostics);
            Effect::None
        }

        Opcode::Destructure { whole, results } => {
            consume(ctx, whole, id, site, diagnostics);
            for n in 0..*results {
                bind_object(ctx, FunctionLocal::Result(id, n), Value::initialized());
            }
            Effect::None
        }

        Opcode::ElementAddr { base, path } => {
            let locs = addr_locations(ctx, base, "transfer::element_addr");
            let extended = locs.into_iter().map(|l| l.extend(path.clone())).collect();
            bind_locations(ctx, inst.result(0), extended);
            Effect::None
        }

        Opcode::EndBorrow { .. } => Effect::None,

        Opcode::LlvmOp { results, .. } => {
            // TODO: operand checks for llvm-op (e.g. consuming sink-convention
            // operands) are unimplemented upstream; mirrored here as a no-op.
            for n in 0..*results {
                bind_object(ctx, FunctionLocal::Result(id, n), Value::initialized());
            }
            Effect::None
        }

        Opcode::Load { addr } => {
            let locs = addr_locations(ctx, addr, "transfer::load");
            let value = ctx.common_value(&locs);
            if matches!(value, Value::Full(State::Initialized)) {
                for loc in &locs {
                    ctx.write_at(loc, Value::consumed_by(id), &*module);
                }
            } else {
                check_fully_initialized(&value, id, site, diagnostics);
            }
            bind_object(ctx, inst.result(0), Value::initialized());
            Effect::None
        }

        Opcode::Record { operands } => {
            for operand in operands {
                consume(ctx, operand, id, site, diagnostics);
            }
            bind_object(ctx, inst.result(0), Value::initialized());
            Effect::None
        }

        Opcode::Return { operand } => {
            consume(ctx, operand, id, site, diagnostics);
            Effect::None
        }

        Opcode::StaticBranch {
            predicate,
            subject,
            if_true,
            if_false,
        } => {
            if !matches!(predicate, StaticBranchPredicate::Initialized) {
                bug!("transfer::static_branch", "predicate {predicate:?} is not implemented");
            }
            let locs = addr_locations(ctx, subject, "transfer::static_branch");
            let value = ctx.common_value(&locs);
            match value {
                Value::Full(State::Initialized) => Effect::FoldStaticBranch {
                    keep: *if_true,
                    remove: *if_false,
                },
                Value::Full(State::Uninitialized) => Effect::FoldStaticBranch {
                    keep: *if_false,
                    remove: *if_true,
                },
                other => bug!(
                    "transfer::static_branch",
                    "static-branch on non-decidable value {other:?} is not implemented"
                ),
            }
        }

        Opcode::Store { source, target } => {
            consume(ctx, source, id, site, diagnostics);
            let locs = addr_locations(ctx, target, "transfer::store");
            for loc in &locs {
                require_overwritable(ctx, loc, "transfer::store");
                ctx.write_at(loc, Value::initialized(), &*module);
            }
            Effect::None
        }

        Opcode::Unreachable => Effect::None,
    }
}

fn apply_call_argument(
    module: &Module,
    ctx: &mut Context,
    arg: &crate::ir::CallArgument,
    id: InstId,
    site: SourceRange,
    diagnostics: &mut DiagnosticSet,
) {
    match arg.convention {
        ParameterConvention::Let | ParameterConvention::Inout => {
            // Read-only access; nothing to update in `ctx`.
        }
        ParameterConvention::Set => {
            let locs = addr_locations(ctx, &as_address(&arg.operand), "transfer::call");
            for loc in &locs {
                require_overwritable(ctx, loc, "transfer::call");
                ctx.write_at(loc, Value::initialized(), module);
            }
        }
        ParameterConvention::Sink => consume(ctx, &arg.operand, id, site, diagnostics),
        ParameterConvention::Yielded => {
            bug!("transfer::call", "yielded is invalid as a call argument convention")
        }
    }
}

/// `set`-convention call arguments denote addresses even though
/// `CallArgument::operand` is typed as a plain `Operand` (spec §4.4 treats
/// every non-`sink` convention as addressing memory); this bridges the two
/// without widening `CallArgument`'s own shape.
fn as_address(operand: &Operand) -> AddressOperand {
    match operand {
        Operand::Constant => AddressOperand::Constant,
        Operand::Value(local) => AddressOperand::Location(local.clone()),
    }
}

/// Asserts that `loc` holds no live content outside of a built-in type,
/// where overwrite-without-deinit is permitted. A violation here means a
/// `store` or `set` call argument reached memory that should have gone
/// through a `set`-borrow or `dealloc-stack` first -- malformed IR, not a
/// user error.
fn require_overwritable(ctx: &Context, loc: &Location, where_: &str) {
    let ty = ctx.type_at(loc);
    if ty.is_builtin() {
        return;
    }
    let value = ctx.value_at(loc);
    if !paths::initialized_paths(&value).is_empty() {
        bug!(
            where_,
            "overwrite of live non-builtin storage at {loc:?} without an intervening deinitialization"
        );
    }
}

fn addr_locations(ctx: &Context, addr: &AddressOperand, where_: &str) -> Set<Location> {
    match addr {
        AddressOperand::Location(local) => match ctx.locals.get(local) {
            Some(Entry::Locations(locs)) => locs.clone(),
            Some(Entry::Object(_)) => {
                bug!(where_, "local {local} is bound to an object, not a location set")
            }
            None => bug!(where_, "local {local} has no binding in this context"),
        },
        AddressOperand::Constant => {
            bug!(where_, "constant address operands are not implemented")
        }
    }
}

fn bind_object(ctx: &mut Context, local: FunctionLocal, value: Value) {
    ctx.locals.insert(local, Entry::Object(value));
}

fn bind_locations(ctx: &mut Context, local: FunctionLocal, locs: Set<Location>) {
    ctx.locals.insert(local, Entry::Locations(locs));
}

/// Checks that `value` is `full(initialized)`, emitting the matching
/// diagnostic (spec §4.4, `borrow let|inout`) if not. Returns whether the
/// check passed.
fn check_fully_initialized(
    value: &Value,
    id: InstId,
    site: SourceRange,
    diagnostics: &mut DiagnosticSet,
) -> bool {
    match value {
        Value::Full(State::Initialized) => true,
        Value::Full(State::Uninitialized) => {
            diagnostics.insert(Diagnostic::new(DiagnosticKind::UseOfUninitializedObject, id, site));
            false
        }
        Value::Full(State::Consumed(_)) => {
            diagnostics.insert(Diagnostic::new(DiagnosticKind::UseOfConsumedObject, id, site));
            false
        }
        Value::Partial(_) => {
            let view = paths::paths_view(value).unwrap_or_else(|| {
                bug!("transfer::check_fully_initialized", "partial value has no paths view")
            });
            let kind = if !view.consumed.is_empty() {
                DiagnosticKind::UseOfPartiallyConsumedObject
            } else {
                DiagnosticKind::UseOfPartiallyInitializedObject
            };
            diagnostics.insert(Diagnostic::new(kind, id, site));
            false
        }
    }
}

/// The shared consume helper (spec §4.4). A constant operand is never
/// consumed; an already-consumed or uninitialized object is an illegal
/// move, not a silent no-op.
pub fn consume(
    ctx: &mut Context,
    operand: &Operand,
    id: InstId,
    site: SourceRange,
    diagnostics: &mut DiagnosticSet,
) {
    let local = match operand {
        Operand::Constant => return,
        Operand::Value(local) => local.clone(),
    };
    let value = match ctx.locals.get(&local) {
        Some(Entry::Object(v)) => v.clone(),
        Some(Entry::Locations(_)) => {
            bug!("transfer::consume", "local {local} is bound to a location set, not an object")
        }
        None => bug!("transfer::consume", "local {local} has no binding in this context"),
    };
    if matches!(value, Value::Full(State::Initialized)) {
        bind_object(ctx, local, Value::consumed_by(id));
    } else {
        diagnostics.insert(Diagnostic::new(DiagnosticKind::IllegalMove, id, site));
    }
}

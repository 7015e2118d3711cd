//! The six seed scenarios from spec.md §8, built by hand against the `ir`
//! module API (no textual IR parser -- parsing is an explicit Non-goal).

use pretty_assertions::assert_eq;

use objnorm::diagnostics::{DiagnosticKind, DiagnosticSet, SourceRange};
use objnorm::ir::ids::{FunctionLocal, ParameterConvention};
use objnorm::ir::layout::Type;
use objnorm::ir::module::Module;
use objnorm::ir::{AddressOperand, Function, Opcode, Operand, Parameter, StaticBranchPredicate};
use objnorm::normalize_object_states;

fn site() -> SourceRange {
    SourceRange::new(0, 0)
}

fn result(id: objnorm::ir::ids::InstId) -> FunctionLocal {
    FunctionLocal::Result(id, 0)
}

/// `alloc s:Int; b = borrow let from s; load b; return`
#[test]
fn scenario_1_uninitialized_use() {
    let mut module = Module::new();
    let mut function = Function::new();
    let entry = function.entry;

    let alloc = function.block_mut(entry).push(entry, site(), Opcode::AllocStack { ty: Type::int() });
    let s = result(alloc);

    let borrow = function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Borrow {
            convention: ParameterConvention::Let,
            addr: AddressOperand::Location(s.clone()),
        },
    );
    let b = result(borrow);

    let load = function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Load {
            addr: AddressOperand::Location(b),
        },
    );

    function.block_mut(entry).push(entry, site(), Opcode::Return { operand: Operand::Constant });

    let f = module.add_function(function);
    let mut diagnostics = DiagnosticSet::default();
    normalize_object_states(&mut module, f, &mut diagnostics);

    let reported: Vec<_> = diagnostics.iter().collect();
    assert_eq!(reported.len(), 2, "expected one report per use of the uninitialized object: {reported:?}");
    assert_eq!(reported[0].kind, DiagnosticKind::UseOfUninitializedObject);
    assert_eq!(reported[0].instruction, borrow);
    assert_eq!(reported[1].kind, DiagnosticKind::UseOfUninitializedObject);
    assert_eq!(reported[1].instruction, load);

    // No deinitialization is owed for storage that was never initialized.
    assert_eq!(module.function(f).block(entry).instructions.len(), 4);
}

/// `alloc s:Int; store 1 -> s; b = borrow set from s; store 2 -> b`
#[test]
fn scenario_2_overwrite_with_initialized_content_inserts_one_deinit() {
    let mut module = Module::new();
    let mut function = Function::new();
    let entry = function.entry;

    let alloc = function.block_mut(entry).push(entry, site(), Opcode::AllocStack { ty: Type::int() });
    let s = result(alloc);

    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Store {
            source: Operand::Constant,
            target: AddressOperand::Location(s.clone()),
        },
    );

    let borrow = function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Borrow {
            convention: ParameterConvention::Set,
            addr: AddressOperand::Location(s.clone()),
        },
    );
    let b = result(borrow);

    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Store {
            source: Operand::Constant,
            target: AddressOperand::Location(b),
        },
    );
    function.block_mut(entry).push(entry, site(), Opcode::Return { operand: Operand::Constant });

    let f = module.add_function(function);
    let mut diagnostics = DiagnosticSet::default();
    normalize_object_states(&mut module, f, &mut diagnostics);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());

    let instrs = &module.function(f).block(entry).instructions;
    let borrow_index = instrs.iter().position(|i| i.id == borrow).unwrap();
    assert!(borrow_index >= 3, "expected a deinit triple spliced in before the set-borrow");

    let inserted = &instrs[borrow_index - 3..borrow_index];
    assert!(matches!(inserted[0].opcode, Opcode::ElementAddr { ref path, .. } if path.is_empty()));
    assert!(matches!(inserted[1].opcode, Opcode::Load { .. }));
    assert!(matches!(inserted[2].opcode, Opcode::Deinit { .. }));

    // No second deinit triple anywhere else in the block.
    let deinit_count = instrs.iter().filter(|i| matches!(i.opcode, Opcode::Deinit { .. })).count();
    assert_eq!(deinit_count, 1);
}

/// Two-slot record; one arm consumes slot 0, the other leaves it alone; the
/// merge block reads the whole record.
#[test]
fn scenario_3_partial_consume_on_one_path() {
    let mut module = Module::new();
    let mut function = Function::new();
    let entry = function.entry;

    function.params.push(Parameter {
        convention: ParameterConvention::Sink,
        ty: Type::bool(),
    });
    let cond = FunctionLocal::Argument(0);

    let record_ty = Type::Record(vec![Type::int(), Type::int()]);
    let alloc = function.block_mut(entry).push(entry, site(), Opcode::AllocStack { ty: record_ty });
    let s = result(alloc);

    let addr0 = function.block_mut(entry).push(
        entry,
        site(),
        Opcode::ElementAddr { base: AddressOperand::Location(s.clone()), path: vec![0] },
    );
    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Store { source: Operand::Constant, target: AddressOperand::Location(result(addr0)) },
    );
    let addr1 = function.block_mut(entry).push(
        entry,
        site(),
        Opcode::ElementAddr { base: AddressOperand::Location(s.clone()), path: vec![1] },
    );
    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Store { source: Operand::Constant, target: AddressOperand::Location(result(addr1)) },
    );

    let true_bb = function.new_block();
    let false_bb = function.new_block();
    let merge_bb = function.new_block();

    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::CondBranch { condition: Operand::Value(cond), if_true: true_bb, if_false: false_bb },
    );

    let true_addr0 = function.block_mut(true_bb).push(
        true_bb,
        site(),
        Opcode::ElementAddr { base: AddressOperand::Location(s.clone()), path: vec![0] },
    );
    function.block_mut(true_bb).push(
        true_bb,
        site(),
        Opcode::Load { addr: AddressOperand::Location(result(true_addr0)) },
    );
    function.block_mut(true_bb).push(true_bb, site(), Opcode::Branch { target: merge_bb });

    function.block_mut(false_bb).push(false_bb, site(), Opcode::Branch { target: merge_bb });

    let merge_load = function.block_mut(merge_bb).push(
        merge_bb,
        site(),
        Opcode::Load { addr: AddressOperand::Location(s) },
    );
    function.block_mut(merge_bb).push(merge_bb, site(), Opcode::Return { operand: Operand::Constant });

    let f = module.add_function(function);
    let mut diagnostics = DiagnosticSet::default();
    normalize_object_states(&mut module, f, &mut diagnostics);

    let reported: Vec<_> = diagnostics.iter().collect();
    assert_eq!(reported.len(), 1, "{reported:?}");
    assert_eq!(reported[0].kind, DiagnosticKind::UseOfPartiallyConsumedObject);
    assert_eq!(reported[0].instruction, merge_load);
}

/// `alloc s; store x -> s; static-branch initialized(s) -> t1 | t2`
#[test]
fn scenario_4_static_branch_folding() {
    let mut module = Module::new();
    let mut function = Function::new();
    let entry = function.entry;

    let alloc = function.block_mut(entry).push(entry, site(), Opcode::AllocStack { ty: Type::int() });
    let s = result(alloc);
    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Store { source: Operand::Constant, target: AddressOperand::Location(s.clone()) },
    );

    let t1 = function.new_block();
    let t2 = function.new_block();
    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::StaticBranch {
            predicate: StaticBranchPredicate::Initialized,
            subject: AddressOperand::Location(s),
            if_true: t1,
            if_false: t2,
        },
    );
    function.block_mut(t1).push(t1, site(), Opcode::Return { operand: Operand::Constant });
    function.block_mut(t2).push(t2, site(), Opcode::Return { operand: Operand::Constant });

    let f = module.add_function(function);
    let mut diagnostics = DiagnosticSet::default();
    normalize_object_states(&mut module, f, &mut diagnostics);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());
    assert!(module.function(f).blocks.get(&t2).is_none(), "dead arm must be removed");
    assert!(module.function(f).blocks.get(&t1).is_some());

    let terminator = &module.function(f).block(entry).terminator().opcode;
    assert!(matches!(terminator, Opcode::Branch { target } if *target == t1));
}

/// `alloc s; store x -> s; dealloc s`
#[test]
fn scenario_5_dealloc_with_live_content() {
    let mut module = Module::new();
    let mut function = Function::new();
    let entry = function.entry;

    let alloc = function.block_mut(entry).push(entry, site(), Opcode::AllocStack { ty: Type::int() });
    let s = result(alloc);
    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Store { source: Operand::Constant, target: AddressOperand::Location(s.clone()) },
    );
    let dealloc = function.block_mut(entry).push(
        entry,
        site(),
        Opcode::DeallocStack { addr: AddressOperand::Location(s) },
    );
    function.block_mut(entry).push(entry, site(), Opcode::Return { operand: Operand::Constant });

    let f = module.add_function(function);
    let mut diagnostics = DiagnosticSet::default();
    normalize_object_states(&mut module, f, &mut diagnostics);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());

    let instrs = &module.function(f).block(entry).instructions;
    let dealloc_index = instrs.iter().position(|i| i.id == dealloc).unwrap();
    assert!(dealloc_index >= 3);
    let inserted = &instrs[dealloc_index - 3..dealloc_index];
    assert!(matches!(inserted[0].opcode, Opcode::ElementAddr { ref path, .. } if path.is_empty()));
    assert!(matches!(inserted[1].opcode, Opcode::Load { .. }));
    assert!(matches!(inserted[2].opcode, Opcode::Deinit { .. }));
}

/// `%t = load addr; %u = load addr`, both against the same location.
#[test]
fn scenario_6_illegal_double_move() {
    let mut module = Module::new();
    let mut function = Function::new();
    let entry = function.entry;

    let alloc = function.block_mut(entry).push(entry, site(), Opcode::AllocStack { ty: Type::int() });
    let s = result(alloc);
    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Store { source: Operand::Constant, target: AddressOperand::Location(s.clone()) },
    );
    let borrow = function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Borrow { convention: ParameterConvention::Let, addr: AddressOperand::Location(s) },
    );
    let addr = result(borrow);

    function.block_mut(entry).push(entry, site(), Opcode::Load { addr: AddressOperand::Location(addr.clone()) });
    let second_load = function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Load { addr: AddressOperand::Location(addr) },
    );
    function.block_mut(entry).push(entry, site(), Opcode::Return { operand: Operand::Constant });

    let f = module.add_function(function);
    let mut diagnostics = DiagnosticSet::default();
    normalize_object_states(&mut module, f, &mut diagnostics);

    let reported: Vec<_> = diagnostics.iter().collect();
    assert_eq!(reported.len(), 1, "{reported:?}");
    assert_eq!(reported[0].kind, DiagnosticKind::UseOfConsumedObject);
    assert_eq!(reported[0].instruction, second_load);
}

/// An object live on only one predecessor path is conservatively treated as
/// the *other* path's state (spec §3, §9): initialized on the true arm,
/// untouched (still uninitialized) on the false arm, the merge block must
/// report the object as uninitialized, never as initialized.
#[test]
fn scenario_7_join_asymmetry_treats_one_sided_liveness_as_uninitialized() {
    let mut module = Module::new();
    let mut function = Function::new();
    let entry = function.entry;

    function.params.push(Parameter {
        convention: ParameterConvention::Sink,
        ty: Type::bool(),
    });
    let cond = FunctionLocal::Argument(0);

    let alloc = function.block_mut(entry).push(entry, site(), Opcode::AllocStack { ty: Type::int() });
    let s = result(alloc);

    let true_bb = function.new_block();
    let false_bb = function.new_block();
    let merge_bb = function.new_block();

    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::CondBranch { condition: Operand::Value(cond), if_true: true_bb, if_false: false_bb },
    );

    function.block_mut(true_bb).push(
        true_bb,
        site(),
        Opcode::Store { source: Operand::Constant, target: AddressOperand::Location(s.clone()) },
    );
    function.block_mut(true_bb).push(true_bb, site(), Opcode::Branch { target: merge_bb });

    function.block_mut(false_bb).push(false_bb, site(), Opcode::Branch { target: merge_bb });

    let merge_borrow = function.block_mut(merge_bb).push(
        merge_bb,
        site(),
        Opcode::Borrow { convention: ParameterConvention::Let, addr: AddressOperand::Location(s) },
    );
    function.block_mut(merge_bb).push(merge_bb, site(), Opcode::Return { operand: Operand::Constant });

    let f = module.add_function(function);
    let mut diagnostics = DiagnosticSet::default();
    normalize_object_states(&mut module, f, &mut diagnostics);

    let reported: Vec<_> = diagnostics.iter().collect();
    assert_eq!(reported.len(), 1, "{reported:?}");
    assert_eq!(reported[0].kind, DiagnosticKind::UseOfUninitializedObject);
    assert_eq!(reported[0].instruction, merge_borrow);
}

/// A loop whose condition is recomputed every iteration (via a fresh `call`
/// inside the header) reaches a stable fixed point with no diagnostics: the
/// driver must follow the back edge from the loop body to the header without
/// looping forever or re-reporting anything once the header's context
/// stabilizes.
#[test]
fn scenario_8_loop_reaches_fixed_point_without_diagnostics() {
    let mut module = Module::new();
    let mut function = Function::new();
    let entry = function.entry;

    let alloc = function.block_mut(entry).push(entry, site(), Opcode::AllocStack { ty: Type::int() });
    let s = result(alloc);
    function.block_mut(entry).push(
        entry,
        site(),
        Opcode::Store { source: Operand::Constant, target: AddressOperand::Location(s.clone()) },
    );

    let header = function.new_block();
    let body = function.new_block();
    let exit = function.new_block();

    function.block_mut(entry).push(entry, site(), Opcode::Branch { target: header });

    let cond_call = function.block_mut(header).push(
        header,
        site(),
        Opcode::Call {
            callee: Operand::Constant,
            sink_callee: false,
            args: Vec::new(),
            results: 1,
        },
    );
    function.block_mut(header).push(
        header,
        site(),
        Opcode::CondBranch {
            condition: Operand::Value(result(cond_call)),
            if_true: body,
            if_false: exit,
        },
    );

    // `borrow let` + `end-borrow`, never `load`: the loop must read `s`
    // without moving it, or reusing it on the next iteration would be an
    // illegal double move (scenario 6) rather than a clean fixed point.
    let borrow = function.block_mut(body).push(
        body,
        site(),
        Opcode::Borrow { convention: ParameterConvention::Let, addr: AddressOperand::Location(s.clone()) },
    );
    function.block_mut(body).push(body, site(), Opcode::EndBorrow { borrow: result(borrow) });
    function.block_mut(body).push(body, site(), Opcode::Branch { target: header });

    function.block_mut(exit).push(exit, site(), Opcode::Return { operand: Operand::Constant });

    let f = module.add_function(function);
    let mut diagnostics = DiagnosticSet::default();
    normalize_object_states(&mut module, f, &mut diagnostics);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());
}

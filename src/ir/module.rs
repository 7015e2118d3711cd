//! The `Module` consumed interface from spec §6: instruction indexing and
//! the IR-editing primitives (`insert`, `replace`, `removeBlock`, the
//! `make*` constructors) the rewriter uses. Treated by spec §1 as an
//! external collaborator the pass mutates but does not own the lifetime of;
//! here it is the concrete owner since this crate runs standalone.

use super::cfg::Cfg;
use super::ids::{BlockId, FunctionId, InstId};
use super::layout::{AbstractTypeLayout, Layout, Type, TypeLayout};
use super::{Function, Instruction, Opcode};
use crate::collections::Map;
use crate::diagnostics::SourceRange;

/// A module: a set of functions, plus the (trivial, closed) type universe
/// they share.
#[derive(Debug, Default)]
pub struct Module {
    pub functions: Map<FunctionId, Function>,
    layout: TypeLayout,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, f: Function) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.insert(id, f);
        id
    }

    pub fn function(&self, f: FunctionId) -> &Function {
        self.functions.get(&f).unwrap_or_else(|| {
            crate::bug::precondition_failure("Module::function", format!("no such function {f}"))
        })
    }

    pub fn function_mut(&mut self, f: FunctionId) -> &mut Function {
        self.functions.get_mut(&f).unwrap_or_else(|| {
            crate::bug::precondition_failure(
                "Module::function_mut",
                format!("no such function {f}"),
            )
        })
    }

    pub fn cfg(&self, f: FunctionId) -> Cfg {
        Cfg::build(self.function(f))
    }

    pub fn instruction(&self, f: FunctionId, id: InstId) -> &Instruction {
        self.function(f).instruction(id)
    }

    /// Inserts `opcode` immediately before `before`, returning the new
    /// instruction's id. The new instruction's address is freshly minted
    /// from the block's counter, never reusing `before`'s or any existing
    /// address (spec §3, location lifecycle).
    pub fn insert_before(
        &mut self,
        f: FunctionId,
        before: InstId,
        site: SourceRange,
        opcode: Opcode,
    ) -> InstId {
        let block = self.function_mut(f).block_mut(before.block);
        let id = InstId::new(before.block, block.id_counter);
        block.id_counter += 1;
        let index = block
            .instructions
            .iter()
            .position(|i| i.id == before)
            .unwrap_or_else(|| {
                crate::bug::precondition_failure(
                    "Module::insert_before",
                    format!("instruction {before} not found in its own block"),
                )
            });
        block
            .instructions
            .insert(index, Instruction { id, opcode, site });
        id
    }

    /// Replaces the instruction at `at` in place, preserving its id and
    /// site.
    pub fn replace(&mut self, f: FunctionId, at: InstId, opcode: Opcode) {
        let block = self.function_mut(f).block_mut(at.block);
        let instr = block
            .instructions
            .iter_mut()
            .find(|i| i.id == at)
            .unwrap_or_else(|| {
                crate::bug::precondition_failure(
                    "Module::replace",
                    format!("instruction {at} not found in its own block"),
                )
            });
        instr.opcode = opcode;
    }

    /// Removes a block entirely. Used by the rewriter to delete the
    /// statically-dead arm of a folded `static-branch` (spec §4.4).
    pub fn remove_block(&mut self, f: FunctionId, block: BlockId) {
        self.function_mut(f).blocks.remove(&block);
    }
}

/// `Module` owns the (trivial, closed) type universe its functions share, so
/// it is the `AbstractTypeLayout` the transfer functions and `Context` query
/// when splitting a `Full` value into `Partial` slots (spec §6).
impl AbstractTypeLayout for Module {
    fn layout(&self, ty: &Type) -> Layout {
        self.layout.layout(ty)
    }
}

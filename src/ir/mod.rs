//! A minimal SSA IR sufficient to drive the object-state normalization
//! pass. Construction, verification, and pretty-printing of this IR belong
//! to the frontend and driver that spec §1 places out of scope; this module
//! provides just enough surface for `normalize_object_states` to run
//! against and for tests to build functions by hand.

pub mod cfg;
pub mod dominance;
pub mod ids;
pub mod layout;
pub mod location;
pub mod module;

use crate::diagnostics::SourceRange;
use ids::{BlockId, FunctionLocal, InstId, ParameterConvention};
use layout::Type;

/// An operand that denotes an ordinary (non-address) SSA value, or a
/// constant. Constants are never consumed (spec §4.4, consume helper).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Constant,
    Value(FunctionLocal),
}

/// An operand that denotes an address (a location set). Per spec §4.4's
/// shared precondition, a constant here is an unimplemented, fatal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressOperand {
    Location(FunctionLocal),
    Constant,
}

/// The predicate a `static-branch` tests. Only `Initialized` is implemented
/// (spec §4.4, §9); any other variant is fatal when reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticBranchPredicate {
    Initialized,
    Other(&'static str),
}

/// One argument to a `call`, paired with the convention it's passed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    pub convention: ParameterConvention,
    pub operand: Operand,
}

/// The opcodes transfer functions exist for (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    AllocStack {
        ty: Type,
    },
    Borrow {
        convention: ParameterConvention,
        addr: AddressOperand,
    },
    Branch {
        target: BlockId,
    },
    CondBranch {
        condition: Operand,
        if_true: BlockId,
        if_false: BlockId,
    },
    Call {
        callee: Operand,
        /// Whether `callee` is consumed as a `sink`-convention receiver.
        sink_callee: bool,
        args: Vec<CallArgument>,
        results: u16,
    },
    DeallocStack {
        addr: AddressOperand,
    },
    Deinit {
        operand: Operand,
    },
    Destructure {
        whole: Operand,
        results: u16,
    },
    ElementAddr {
        base: AddressOperand,
        path: Vec<u32>,
    },
    EndBorrow {
        borrow: FunctionLocal,
    },
    LlvmOp {
        operands: Vec<Operand>,
        results: u16,
    },
    Load {
        addr: AddressOperand,
    },
    Record {
        operands: Vec<Operand>,
    },
    Return {
        operand: Operand,
    },
    StaticBranch {
        predicate: StaticBranchPredicate,
        subject: AddressOperand,
        if_true: BlockId,
        if_false: BlockId,
    },
    Store {
        source: Operand,
        target: AddressOperand,
    },
    Unreachable,
}

impl Opcode {
    /// How many SSA results this opcode produces, for binding
    /// `FunctionLocal::Result(id, 0..n)`.
    pub fn result_count(&self) -> u16 {
        match self {
            Opcode::AllocStack { .. }
            | Opcode::Borrow { .. }
            | Opcode::Call { results: 1, .. }
            | Opcode::ElementAddr { .. }
            | Opcode::Load { .. }
            | Opcode::Record { .. } => 1,
            Opcode::Call { results, .. }
            | Opcode::Destructure { results, .. }
            | Opcode::LlvmOp { results, .. } => *results,
            Opcode::Branch { .. }
            | Opcode::CondBranch { .. }
            | Opcode::DeallocStack { .. }
            | Opcode::Deinit { .. }
            | Opcode::EndBorrow { .. }
            | Opcode::Return { .. }
            | Opcode::StaticBranch { .. }
            | Opcode::Store { .. }
            | Opcode::Unreachable => 0,
        }
    }

    /// Is this opcode a block terminator (the last instruction in a block,
    /// determining CFG edges)?
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Opcode::Branch { .. }
                | Opcode::CondBranch { .. }
                | Opcode::StaticBranch { .. }
                | Opcode::Return { .. }
                | Opcode::Unreachable
        )
    }
}

/// A single instruction, anchored at a source site for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub id: InstId,
    pub opcode: Opcode,
    pub site: SourceRange,
}

impl Instruction {
    pub fn result(&self, index: u16) -> FunctionLocal {
        FunctionLocal::Result(self.id, index)
    }
}

/// A basic block: a straight-line sequence of instructions ending in a
/// terminator.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub id_counter: u32,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction, assigning it the next address in this block.
    /// Addresses are never reused, even across rewriter insertions (spec
    /// §3, location lifecycle).
    pub fn push(&mut self, block: BlockId, site: SourceRange, opcode: Opcode) -> InstId {
        let id = InstId::new(block, self.id_counter);
        self.id_counter += 1;
        self.instructions.push(Instruction { id, opcode, site });
        id
    }

    pub fn terminator(&self) -> &Instruction {
        self.instructions
            .last()
            .filter(|i| i.opcode.is_terminator())
            .unwrap_or_else(|| {
                crate::bug::precondition_failure(
                    "BasicBlock::terminator",
                    "block has no terminator instruction",
                )
            })
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub convention: ParameterConvention,
    pub ty: Type,
}

/// A function body: parameters plus a CFG of basic blocks.
#[derive(Debug, Clone, Default)]
pub struct Function {
    pub params: Vec<Parameter>,
    pub entry: BlockId,
    pub blocks: crate::collections::Map<BlockId, BasicBlock>,
    next_block: u32,
}

impl Function {
    pub fn new() -> Self {
        let mut f = Function {
            params: Vec::new(),
            entry: BlockId(0),
            blocks: crate::collections::Map::new(),
            next_block: 0,
        };
        let entry = f.new_block();
        f.entry = entry;
        f
    }

    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        self.blocks.insert(id, BasicBlock::new());
        id
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        self.blocks.get(&id).unwrap_or_else(|| {
            crate::bug::precondition_failure("Function::block", format!("no such block {id}"))
        })
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        self.blocks.get_mut(&id).unwrap_or_else(|| {
            crate::bug::precondition_failure(
                "Function::block_mut",
                format!("no such block {id}"),
            )
        })
    }

    pub fn instruction(&self, id: InstId) -> &Instruction {
        self.block(id.block)
            .instructions
            .iter()
            .find(|i| i.id == id)
            .unwrap_or_else(|| {
                crate::bug::precondition_failure(
                    "Function::instruction",
                    format!("no such instruction {id}"),
                )
            })
    }
}

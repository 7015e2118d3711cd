//! Identifiers used across the IR: blocks, instructions, SSA names, and
//! parameter-passing conventions.

use std::fmt;

use derive_more::Display;

/// A basic block in a function's CFG.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display(fmt = "bb{}", _0)]
pub struct BlockId(pub u32);

/// A function in the module.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display(fmt = "fn{}", _0)]
pub struct FunctionId(pub u32);

/// The address of an instruction within its block: the `(block, address)`
/// pair from the `instruction(block, address)` location variant (spec §3).
///
/// `address` is assigned from a per-block monotonic counter at the time an
/// instruction is created, and is never reassigned or reused -- including
/// for instructions spliced in by the rewriter -- so that an
/// `instruction(block, address)` location stays a stable, non-aliasing
/// identifier for the lifetime of the function.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display(fmt = "{}.{}", block, address)]
pub struct InstId {
    pub block: BlockId,
    pub address: u32,
}

impl InstId {
    pub const fn new(block: BlockId, address: u32) -> Self {
        Self { block, address }
    }
}

/// An SSA name: either a function parameter or the `n`th result of an
/// instruction (spec glossary, `FunctionLocal`).
///
/// Most opcodes produce a single result (`n == 0`); `destructure` and
/// multi-result `call`/`llvm-op` forms produce more.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FunctionLocal {
    Argument(u32),
    Result(InstId, u16),
}

impl fmt::Display for FunctionLocal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionLocal::Argument(i) => write!(f, "%arg{i}"),
            FunctionLocal::Result(id, 0) => write!(f, "%{id}"),
            FunctionLocal::Result(id, n) => write!(f, "%{id}#{n}"),
        }
    }
}

/// Parameter-passing / borrow conventions (spec §3, §4.3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterConvention {
    /// Read-only access to a live object; storage is not owned by the callee.
    Let,
    /// Read-write access to a live object; left initialized on return.
    Inout,
    /// Write-only access to possibly-uninitialized storage; obliged to
    /// leave it initialized (spec glossary, "set-borrow").
    Set,
    /// Ownership transfers into the callee; the argument is consumed.
    Sink,
    /// Valid only as a borrow result convention, never at a function
    /// boundary or as a call argument convention.
    Yielded,
}

//! The `cfg(f)` consumed interface from spec §6, made concrete.
//!
//! Modeled directly on the reference analysis crate's `Cfg`: successor and
//! predecessor edges kept as explicit `Map<BlockId, Set<BlockId>>`s, built
//! once from a function's terminators and queried by the driver.

use super::ids::BlockId;
use super::Function;
use crate::collections::{Map, Set};

/// The control-flow graph of a single function.
#[derive(Debug, Clone)]
pub struct Cfg {
    pub entry: BlockId,
    blocks: Vec<BlockId>,
    succ_edges: Map<BlockId, Set<BlockId>>,
    pred_edges: Map<BlockId, Set<BlockId>>,
}

impl Cfg {
    /// Builds the CFG of `function` by scanning each block's terminator.
    pub fn build(function: &Function) -> Self {
        use super::Opcode::*;

        let mut succ_edges: Map<BlockId, Set<BlockId>> = Map::new();
        let mut pred_edges: Map<BlockId, Set<BlockId>> = Map::new();
        let mut blocks: Vec<BlockId> = function.blocks.keys().copied().collect();
        blocks.sort();

        for &id in &blocks {
            succ_edges.entry(id).or_default();
            pred_edges.entry(id).or_default();
        }

        let mut add_edge = |from: BlockId, to: BlockId| {
            succ_edges.entry(from).or_default().insert(to);
            pred_edges.entry(to).or_default().insert(from);
        };

        for &id in &blocks {
            match &function.block(id).terminator().opcode {
                Branch { target } => add_edge(id, *target),
                CondBranch {
                    if_true, if_false, ..
                } => {
                    add_edge(id, *if_true);
                    add_edge(id, *if_false);
                }
                StaticBranch {
                    if_true, if_false, ..
                } => {
                    add_edge(id, *if_true);
                    add_edge(id, *if_false);
                }
                Return { .. } | Unreachable => {}
                other => crate::bug::precondition_failure(
                    "Cfg::build",
                    format!("block {id} ends in non-terminator opcode {other:?}"),
                ),
            }
        }

        Cfg {
            entry: function.entry,
            blocks,
            succ_edges,
            pred_edges,
        }
    }

    pub fn succ(&self, b: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.succ_edges
            .get(&b)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    pub fn pred(&self, b: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.pred_edges
            .get(&b)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().copied()
    }

    /// Reverse postorder over the CFG from the entry block; the standard
    /// traversal order for computing dominance.
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        let mut postorder = Vec::new();
        let mut visited: Set<BlockId> = Set::new();
        self.post_visit(self.entry, &mut visited, &mut postorder);
        postorder.reverse();
        postorder
    }

    fn post_visit(&self, b: BlockId, visited: &mut Set<BlockId>, out: &mut Vec<BlockId>) {
        if !visited.insert(b) {
            return;
        }
        for s in self.succ(b) {
            self.post_visit(s, visited, out);
        }
        out.push(b);
    }
}

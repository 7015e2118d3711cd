//! The `DominatorTree(function, cfg, in: module)` consumed interface from
//! spec §6, made concrete with the standard iterative dominance algorithm
//! (Cooper, Harvey & Kennedy, "A Simple, Fast Dominance Algorithm").
//!
//! This stands in for a production compiler's dominator-tree service
//! (spec §1 treats dominator-tree construction as an external collaborator);
//! it is intentionally simple rather than general-purpose, since the
//! functions this pass analyzes are small and it is recomputed from scratch
//! after every rewrite anyway (spec §4.1).

use super::cfg::Cfg;
use super::ids::BlockId;
use crate::collections::Map;
use std::collections::VecDeque;

/// The dominator tree of one function's CFG.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    entry: BlockId,
    idom: Map<BlockId, BlockId>,
    children: Map<BlockId, Vec<BlockId>>,
}

impl DominatorTree {
    pub fn compute(cfg: &Cfg) -> Self {
        let rpo = cfg.reverse_postorder();
        let rpo_number: Map<BlockId, usize> =
            rpo.iter().enumerate().map(|(i, &b)| (b, i)).collect();

        let mut idom: Map<BlockId, BlockId> = Map::new();
        idom.insert(cfg.entry, cfg.entry);

        let mut changed = true;
        while changed {
            changed = false;
            for &b in rpo.iter().filter(|&&b| b != cfg.entry) {
                let mut new_idom: Option<BlockId> = None;
                for p in cfg.pred(b) {
                    if !idom.contains_key(&p) {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => p,
                        Some(cur) => intersect(&idom, &rpo_number, cur, p),
                    });
                }
                let Some(new_idom) = new_idom else { continue };
                if idom.get(&b) != Some(&new_idom) {
                    idom.insert(b, new_idom);
                    changed = true;
                }
            }
        }

        let mut children: Map<BlockId, Vec<BlockId>> = Map::new();
        for (&b, &parent) in &idom {
            if b != cfg.entry {
                children.entry(parent).or_default().push(b);
            }
        }
        for kids in children.values_mut() {
            kids.sort();
        }

        DominatorTree {
            entry: cfg.entry,
            idom,
            children,
        }
    }

    pub fn entry(&self) -> BlockId {
        self.entry
    }

    /// The immediate dominator of `b`, or `None` for the entry block.
    pub fn immediate_dominator(&self, b: BlockId) -> Option<BlockId> {
        if b == self.entry {
            None
        } else {
            self.idom.get(&b).copied()
        }
    }

    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        let mut cur = b;
        loop {
            if cur == a {
                return true;
            }
            if cur == self.entry {
                return a == self.entry;
            }
            cur = self.idom[&cur];
        }
    }

    /// Breadth-first order over the dominator tree starting at the entry
    /// block, used by the driver to seed its work list (spec §4.1).
    pub fn bfs(&self) -> Vec<BlockId> {
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.entry);
        while let Some(b) = queue.pop_front() {
            order.push(b);
            if let Some(kids) = self.children.get(&b) {
                queue.extend(kids.iter().copied());
            }
        }
        order
    }
}

fn intersect(
    idom: &Map<BlockId, BlockId>,
    rpo_number: &Map<BlockId, usize>,
    mut a: BlockId,
    mut b: BlockId,
) -> BlockId {
    while a != b {
        while rpo_number[&a] > rpo_number[&b] {
            a = idom[&a];
        }
        while rpo_number[&b] > rpo_number[&a] {
            b = idom[&b];
        }
    }
    a
}

//! The fixed-point work-list driver (spec §4.1).
//!
//! This follows the reference analysis crate's `forward_analysis` shape
//! directly: a FIFO work list seeded from the dominator tree, a per-block
//! `after` context once it has been computed, merging over whichever
//! predecessors have produced one so far, and requeuing successors whenever
//! a block's `after` context changes. This is a deliberate simplification
//! of the driver's literal algorithm (a visitability gate, a `done` set,
//! five per-block termination conditions) down to the classical monotone
//! worklist iteration that reaches the identical fixed point with far less
//! bookkeeping; see `DESIGN.md`.

use std::collections::VecDeque;

use crate::bug::bug;
use crate::config::NormalizeConfig;
use crate::context::{Context, Entry};
use crate::diagnostics::DiagnosticSet;
use crate::ir::ids::{BlockId, FunctionId, FunctionLocal, ParameterConvention};
use crate::ir::location::Location;
use crate::ir::module::Module;
use crate::lattice::Value;
use crate::{collections::Set, rewriter, transfer};

/// Runs the pass on `function` within `module`, appending diagnostics to
/// `diagnostics`. On return, if `diagnostics` reports no errors, `function`
/// has explicit `deinit`s at every overwrite/free point and no decidable
/// `static-branch` left (spec §6 postcondition).
pub fn run(module: &mut Module, function: FunctionId, config: &NormalizeConfig, diagnostics: &mut DiagnosticSet) {
    diagnostics.set_dedupe(config.dedupe_diagnostics);

    let mut cfg = module.cfg(function);
    let mut dom = crate::ir::dominance::DominatorTree::compute(&cfg);

    let mut queue: VecDeque<BlockId> = dom.bfs().into_iter().collect();
    let mut queued: Set<BlockId> = queue.iter().copied().collect();
    let mut after: crate::collections::Map<BlockId, Context> = crate::collections::Map::new();
    let mut revisits: crate::collections::Map<BlockId, u32> = crate::collections::Map::new();

    while let Some(b) = queue.pop_front() {
        queued.remove(&b);
        log::trace!("dequeued {b}");

        let before = if b == dom.entry() {
            entry_context(module, function)
        } else {
            let predecessor_afters: Vec<&Context> = cfg.pred(b).filter_map(|p| after.get(&p)).collect();
            if predecessor_afters.is_empty() {
                // No predecessor has run yet; this block will be requeued by
                // whichever predecessor produces an `after` first.
                continue;
            }
            Context::merge_all(predecessor_afters)
        };

        let count = revisits.entry(b).or_insert(0);
        *count += 1;
        if let Some(limit) = config.max_block_revisits {
            if *count > limit {
                bug!("driver::run", "{b} exceeded its revisit limit ({limit})");
            }
        }

        let instructions = module.function(function).block(b).instructions.clone();
        let mut ctx = before;
        let mut fold: Option<(crate::ir::ids::InstId, BlockId, BlockId)> = None;

        for inst in &instructions {
            let effect = transfer::apply(module, function, &mut ctx, inst, diagnostics);
            if let transfer::Effect::FoldStaticBranch { keep, remove } = effect {
                fold = Some((inst.id, keep, remove));
                break;
            }
        }

        if let Some((inst_id, keep, remove)) = fold {
            rewriter::fold_static_branch(module, function, inst_id, keep, remove);
            queue.retain(|&x| x != remove);
            queued.remove(&remove);
            after.remove(&remove);
            revisits.remove(&remove);
            cfg = module.cfg(function);
            dom = crate::ir::dominance::DominatorTree::compute(&cfg);
            log::debug!("recomputed cfg/dominator tree after folding static-branch at {inst_id}");
        }

        let changed = after.get(&b) != Some(&ctx);
        after.insert(b, ctx);

        if changed {
            for succ in cfg.succ(b) {
                if queued.insert(succ) {
                    queue.push_back(succ);
                }
            }
        }
    }
}

/// Builds the entry block's `before` context from the function signature
/// (spec §4.3).
fn entry_context(module: &Module, function: FunctionId) -> Context {
    let mut ctx = Context::new();
    for (index, param) in module.function(function).params.iter().enumerate() {
        let index = index as u32;
        let local = FunctionLocal::Argument(index);
        match param.convention {
            ParameterConvention::Let | ParameterConvention::Inout => {
                let loc = Location::Argument(index);
                ctx.memory.insert(loc.clone(), (param.ty.clone(), Value::initialized()));
                ctx.locals.insert(local, Entry::Locations(Set::from([loc])));
            }
            ParameterConvention::Set => {
                let loc = Location::Argument(index);
                ctx.memory.insert(loc.clone(), (param.ty.clone(), Value::uninitialized()));
                ctx.locals.insert(local, Entry::Locations(Set::from([loc])));
            }
            ParameterConvention::Sink => {
                ctx.locals.insert(local, Entry::Object(Value::initialized()));
            }
            ParameterConvention::Yielded => {
                bug!("driver::entry_context", "yielded is invalid as a parameter convention")
            }
        }
    }
    ctx
}

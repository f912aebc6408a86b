//! Forward worklist fixpoint engine
//!
//! Propagates [`SignStore`]s through the CFG until nothing changes. Stores
//! travel on edges: a branch terminator refines its comparison operands and
//! sends *different* stores down its true and false edges, and a block's
//! input is the pointwise join of every store that has reached it so far.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace};

use crate::cfg::{BasicBlock, BlockId, Cfg, Compare, Expr, Instr, Number, Terminator};
use crate::error::AnalysisError;
use crate::lattice::Sign;
use crate::store::SignStore;
use crate::transfer::{arithmetic, refine};

/// Default circuit-breaker for the fixpoint loop, counted in block visits.
/// Far above what the finite lattice height allows a monotone analysis to
/// need.
pub const MAX_ITERATIONS: usize = 10_000;

/// Converged analysis state.
///
/// Blocks never reached from the entry have no entry in `in_stores` or
/// `out_stores`; an absent block is unreachable, not unconstrained.
#[derive(Debug, Clone)]
pub struct FixpointResult {
    /// Store at each reached block's entry, after joining its incoming edges.
    pub in_stores: HashMap<BlockId, SignStore>,
    /// Store after each reached block's instructions.
    pub out_stores: HashMap<BlockId, SignStore>,
    /// Store carried by each traversed edge; the two edges out of a branch
    /// carry independently refined stores.
    pub edge_stores: HashMap<(BlockId, BlockId), SignStore>,
    /// Block visits needed to converge.
    pub iterations: usize,
}

/// Worklist-based fixpoint solver.
#[derive(Debug, Clone)]
pub struct FixpointSolver {
    max_iterations: usize,
}

impl FixpointSolver {
    pub fn new() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
        }
    }

    /// Override the defensive iteration cap.
    pub fn with_max_iterations(mut self, cap: usize) -> Self {
        self.max_iterations = cap;
        self
    }

    /// Run the analysis to a fixpoint. `entry_store` carries externally
    /// supplied preconditions; pass an empty store for "no information".
    pub fn solve(&self, cfg: &Cfg, entry_store: &SignStore) -> Result<FixpointResult, AnalysisError> {
        cfg.validate()?;

        let mut in_stores: HashMap<BlockId, SignStore> = HashMap::new();
        let mut out_stores: HashMap<BlockId, SignStore> = HashMap::new();
        let mut edge_stores: HashMap<(BlockId, BlockId), SignStore> = HashMap::new();

        let mut worklist: VecDeque<BlockId> = VecDeque::new();
        let mut queued: HashSet<BlockId> = HashSet::new();
        worklist.push_back(cfg.entry);
        queued.insert(cfg.entry);

        let mut iterations = 0;
        while let Some(block_id) = worklist.pop_front() {
            queued.remove(&block_id);
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(AnalysisError::NonConvergence {
                    iterations: self.max_iterations,
                });
            }

            let block = match cfg.block(block_id) {
                Some(b) => b,
                None => continue,
            };

            // Input: join of every store that has reached this block. The
            // entry additionally receives the caller's preconditions.
            let reached: Vec<&SignStore> = block
                .predecessors
                .iter()
                .filter_map(|pred| edge_stores.get(&(*pred, block_id)))
                .collect();
            let new_in = if block_id == cfg.entry {
                reached.iter().fold(entry_store.clone(), |acc, s| acc.merge(s))
            } else {
                match reached.split_first() {
                    // Queued before any edge reached it; try again later
                    None => continue,
                    Some((first, rest)) => rest.iter().fold((*first).clone(), |acc, s| acc.merge(s)),
                }
            };

            let new_out = transfer_block(block, &new_in);
            trace!(?block_id, bindings = new_out.len(), "block transferred");

            let changed = in_stores.get(&block_id) != Some(&new_in)
                || out_stores.get(&block_id) != Some(&new_out);
            if !changed {
                continue;
            }

            propagate_edges(block, &new_out, &mut edge_stores);
            in_stores.insert(block_id, new_in);
            out_stores.insert(block_id, new_out);

            for &succ in &block.successors {
                if queued.insert(succ) {
                    worklist.push_back(succ);
                }
            }
        }

        debug!(iterations, blocks = in_stores.len(), "sign analysis converged");
        Ok(FixpointResult {
            in_stores,
            out_stores,
            edge_stores,
            iterations,
        })
    }
}

impl Default for FixpointSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate an expression's sign class against a store. Unknown shapes do
/// not exist (the expression grammar is closed); unknown variables are `Top`.
pub fn eval(expr: &Expr, store: &SignStore) -> Sign {
    match expr {
        Expr::Literal(Number::Int(v)) => Sign::of_i64(*v),
        Expr::Literal(Number::Float(v)) => Sign::of_f64(*v),
        Expr::Var(name) => store.get(name),
        Expr::Binary { op, lhs, rhs } => arithmetic(*op, eval(lhs, store), eval(rhs, store)),
    }
}

/// Apply one instruction to a store.
pub(crate) fn apply_instr(instr: &Instr, store: &mut SignStore) {
    match instr {
        Instr::Assign { target, value } => {
            let sign = eval(value, store);
            store.insert(target.clone(), sign);
        }
        // Evaluation for effect leaves the store unchanged
        Instr::Eval(_) => {}
    }
}

fn transfer_block(block: &BasicBlock, input: &SignStore) -> SignStore {
    let mut store = input.clone();
    for instr in &block.instrs {
        apply_instr(instr, &mut store);
    }
    store
}

/// Split a store on a branch condition: refine both operands under the
/// assumption the comparison held (true edge) and under its negation (false
/// edge). Only variable operands have a stable store identity to refine;
/// compound operands pass through untouched.
pub(crate) fn split_on(cond: &Compare, store: &SignStore) -> (SignStore, SignStore) {
    let lhs_sign = eval(&cond.lhs, store);
    let rhs_sign = eval(&cond.rhs, store);
    let mut then_store = store.clone();
    let mut else_store = store.clone();
    let op = cond.op;

    if let Expr::Var(name) = &cond.lhs {
        then_store.insert(name.clone(), refine(op, lhs_sign, rhs_sign));
        else_store.insert(name.clone(), refine(op.negate(), lhs_sign, rhs_sign));
    }
    if let Expr::Var(name) = &cond.rhs {
        then_store.insert(name.clone(), refine(op.flip(), rhs_sign, lhs_sign));
        else_store.insert(name.clone(), refine(op.negate().flip(), rhs_sign, lhs_sign));
    }
    (then_store, else_store)
}

fn propagate_edges(
    block: &BasicBlock,
    out: &SignStore,
    edge_stores: &mut HashMap<(BlockId, BlockId), SignStore>,
) {
    match &block.terminator {
        Some(Terminator::Goto(target)) => {
            edge_stores.insert((block.id, *target), out.clone());
        }
        Some(Terminator::Branch {
            cond,
            then_block,
            else_block,
        }) => {
            let (then_store, else_store) = split_on(cond, out);
            if then_block == else_block {
                // Degenerate branch; the single edge sees both outcomes
                edge_stores.insert((block.id, *then_block), then_store.merge(&else_store));
            } else {
                edge_stores.insert((block.id, *then_block), then_store);
                edge_stores.insert((block.id, *else_block), else_store);
            }
        }
        Some(Terminator::Return) | None => {}
    }
}

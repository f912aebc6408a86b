//! Division-safety verdicts over the converged analysis
//!
//! After the fixpoint, every division and remainder site is judged by the
//! class of its divisor at that point: a class that rules out zero is safe,
//! anything that admits zero is flagged, and sites in unreached code get no
//! diagnostic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cfg::{BlockId, Cfg, Expr, Instr, Terminator};
use crate::error::AnalysisError;
use crate::lattice::Sign;
use crate::solver::{apply_instr, eval, FixpointResult, FixpointSolver};
use crate::store::SignStore;
use crate::transfer::ArithOp;

/// Location of a division/remainder site.
///
/// `instr` is the index within the block; sites inside the terminator's
/// comparison use the index one past the last instruction. `ordinal` counts
/// sites within one instruction in evaluation order, for nested divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteId {
    pub block: BlockId,
    pub instr: usize,
    pub ordinal: usize,
}

/// Safety verdict for one division/remainder site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The divisor is provably nonzero
    Safe,
    /// The divisor may be zero
    Unsafe,
    /// The site sits in unreachable code; no verdict applies
    Unreachable,
}

/// One judged division/remainder site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionReport {
    pub site: SiteId,
    pub op: ArithOp,
    pub divisor_sign: Sign,
    pub verdict: Verdict,
}

impl DivisionReport {
    pub fn is_unsafe(&self) -> bool {
        self.verdict == Verdict::Unsafe
    }
}

/// Judge every division/remainder site in the graph against the converged
/// stores. Sites are reported in deterministic block/instruction/evaluation
/// order.
pub fn check_divisions(cfg: &Cfg, fixpoint: &FixpointResult) -> Vec<DivisionReport> {
    let mut reports = Vec::new();
    for block in cfg.blocks.values() {
        // Replay the block so each site sees the store in effect right
        // before it executes; unreached blocks have no store and their
        // sites are enumerated without judging them
        let mut store = fixpoint.in_stores.get(&block.id).cloned();
        for (idx, instr) in block.instrs.iter().enumerate() {
            let mut ordinal = 0;
            match instr {
                Instr::Assign { value, .. } | Instr::Eval(value) => {
                    scan_expr(value, store.as_ref(), block.id, idx, &mut ordinal, &mut reports);
                }
            }
            if let Some(store) = store.as_mut() {
                apply_instr(instr, store);
            }
        }
        if let Some(Terminator::Branch { cond, .. }) = &block.terminator {
            let mut ordinal = 0;
            let idx = block.instrs.len();
            scan_expr(&cond.lhs, store.as_ref(), block.id, idx, &mut ordinal, &mut reports);
            scan_expr(&cond.rhs, store.as_ref(), block.id, idx, &mut ordinal, &mut reports);
        }
    }
    for report in reports.iter().filter(|r| r.is_unsafe()) {
        debug!(site = ?report.site, sign = ?report.divisor_sign, "potential divide-by-zero");
    }
    reports
}

/// Walk an expression in evaluation order (operands before the operation)
/// and judge every division/remainder against the current store. `None`
/// means the surrounding block is unreachable.
fn scan_expr(
    expr: &Expr,
    store: Option<&SignStore>,
    block: BlockId,
    instr: usize,
    ordinal: &mut usize,
    reports: &mut Vec<DivisionReport>,
) {
    if let Expr::Binary { op, lhs, rhs } = expr {
        scan_expr(lhs, store, block, instr, ordinal, reports);
        scan_expr(rhs, store, block, instr, ordinal, reports);
        if op.requires_nonzero_rhs() {
            let (divisor_sign, verdict) = match store {
                None => (Sign::Bottom, Verdict::Unreachable),
                Some(store) => {
                    let sign = eval(rhs, store);
                    let verdict = if sign == Sign::Bottom {
                        Verdict::Unreachable
                    } else if sign.excludes_zero() {
                        Verdict::Safe
                    } else {
                        Verdict::Unsafe
                    };
                    (sign, verdict)
                }
            };
            reports.push(DivisionReport {
                site: SiteId {
                    block,
                    instr,
                    ordinal: *ordinal,
                },
                op: *op,
                divisor_sign,
                verdict,
            });
            *ordinal += 1;
        }
    }
}

/// Whole-run facade: fixpoint plus division verdicts.
#[derive(Debug, Clone, Default)]
pub struct SignAnalysis {
    entry_store: SignStore,
    max_iterations: Option<usize>,
}

impl SignAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply preconditions for the entry block (e.g. known parameter signs).
    pub fn with_entry_store(mut self, store: SignStore) -> Self {
        self.entry_store = store;
        self
    }

    /// Override the fixpoint circuit-breaker.
    pub fn with_max_iterations(mut self, cap: usize) -> Self {
        self.max_iterations = Some(cap);
        self
    }

    pub fn run(&self, cfg: &Cfg) -> Result<AnalysisOutcome, AnalysisError> {
        let mut solver = FixpointSolver::new();
        if let Some(cap) = self.max_iterations {
            solver = solver.with_max_iterations(cap);
        }
        let fixpoint = solver.solve(cfg, &self.entry_store)?;
        let reports = check_divisions(cfg, &fixpoint);
        Ok(AnalysisOutcome { reports, fixpoint })
    }
}

/// Everything a caller can ask of a finished run: the verdicts, and the
/// converged stores for ad-hoc sign queries at any program point.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub reports: Vec<DivisionReport>,
    pub fixpoint: FixpointResult,
}

impl AnalysisOutcome {
    /// Sites the external reporter should diagnose.
    pub fn unsafe_sites(&self) -> impl Iterator<Item = &DivisionReport> {
        self.reports.iter().filter(|r| r.is_unsafe())
    }

    /// True when no division in the program can be shown unsafe.
    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(|r| !r.is_unsafe())
    }

    /// Inferred class of `var` on entry to `block`. Unreached blocks answer
    /// `Bottom`; reached blocks answer `Top` for unconstrained variables.
    pub fn sign_on_entry(&self, block: BlockId, var: &str) -> Sign {
        match self.fixpoint.in_stores.get(&block) {
            Some(store) => store.get(var),
            None => Sign::Bottom,
        }
    }
}

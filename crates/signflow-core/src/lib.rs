//! # Signflow Core
//!
//! Flow-sensitive sign analysis over a control-flow graph, precise enough to
//! prove divisors nonzero and flag every division or remainder it cannot
//! prove safe.
//!
//! The front end parses source and hands this crate a [`cfg::Cfg`]; the
//! engine runs a forward worklist fixpoint, threading per-variable
//! [`lattice::Sign`] stores through the graph and splitting them at branch
//! conditions, then judges every division site against its divisor's
//! converged class.
//!
//! ## Modules
//!
//! - **[`lattice`]** - The six-point sign lattice and its join/meet operators
//! - **[`store`]** - Per-program-point variable stores
//! - **[`transfer`]** - Arithmetic and comparison-refinement transfer functions
//! - **[`cfg`]** - The graph the front end builds and the engine consumes
//! - **[`solver`]** - The worklist fixpoint engine
//! - **[`check`]** - Division verdicts and the whole-run API
//!
//! ## Quick Start
//!
//! ```rust
//! use signflow_core::prelude::*;
//!
//! // if (y != 0) { x = 1 / y; }
//! let mut cfg = Cfg::new();
//! let guarded = cfg.new_block();
//! let done = cfg.new_block();
//! cfg.set_terminator(
//!     cfg.entry,
//!     Terminator::Branch {
//!         cond: Compare {
//!             op: Comparison::Ne,
//!             lhs: Expr::var("y"),
//!             rhs: Expr::lit_int(0),
//!         },
//!         then_block: guarded,
//!         else_block: done,
//!     },
//! );
//! cfg.add_edge(cfg.entry, guarded);
//! cfg.add_edge(cfg.entry, done);
//! cfg.push_instr(
//!     guarded,
//!     Instr::Assign {
//!         target: "x".into(),
//!         value: Expr::binary(ArithOp::Div, Expr::lit_int(1), Expr::var("y")),
//!     },
//! );
//! cfg.set_terminator(guarded, Terminator::Goto(done));
//! cfg.add_edge(guarded, done);
//! cfg.set_terminator(done, Terminator::Return);
//!
//! let outcome = SignAnalysis::new().run(&cfg)?;
//! assert!(outcome.is_clean());
//! assert_eq!(outcome.sign_on_entry(guarded, "y"), Sign::Nonzero);
//! # Ok::<(), signflow_core::AnalysisError>(())
//! ```

pub mod cfg;
pub mod check;
pub mod error;
pub mod lattice;
pub mod solver;
pub mod store;
pub mod transfer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cfg::{BasicBlock, BlockId, Cfg, Compare, Expr, Instr, Number, Terminator};
    pub use crate::check::{AnalysisOutcome, DivisionReport, SignAnalysis, SiteId, Verdict};
    pub use crate::error::AnalysisError;
    pub use crate::lattice::Sign;
    pub use crate::solver::{FixpointResult, FixpointSolver};
    pub use crate::store::SignStore;
    pub use crate::transfer::{arithmetic, refine, ArithOp, Comparison};
}

// Re-export main types at crate root for convenience
pub use cfg::{BlockId, Cfg, Compare, Expr, Instr, Number, Terminator};
pub use check::{check_divisions, AnalysisOutcome, DivisionReport, SignAnalysis, SiteId, Verdict};
pub use error::AnalysisError;
pub use lattice::Sign;
pub use solver::{FixpointResult, FixpointSolver, MAX_ITERATIONS};
pub use store::SignStore;
pub use transfer::{arithmetic, refine, ArithOp, Comparison};

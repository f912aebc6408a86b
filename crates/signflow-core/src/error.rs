//! Analysis error taxonomy
//!
//! Missing operand information is not an error anywhere in the engine; it
//! degrades to `Top`. The variants here are internal-consistency faults that
//! lawful input can never produce.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The fixpoint circuit-breaker tripped. The lattice has finite height,
    /// so this indicates a monotonicity bug in a transfer function, not a
    /// property of the input program.
    #[error("fixpoint did not converge within {iterations} block visits")]
    NonConvergence { iterations: usize },

    /// The caller supplied an inconsistent graph (dangling edge, terminator
    /// target without a matching edge).
    #[error("malformed control-flow graph: {0}")]
    MalformedCfg(String),
}

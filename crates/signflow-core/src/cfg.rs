//! Control-flow graph consumed by the sign analysis
//!
//! The graph is supplied by an external front end through this construction
//! API and read-only thereafter: blocks of instructions, a terminator per
//! block, and directed edges. A branch terminator carries the comparison
//! whose outcome splits the store along its two labeled edges.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::AnalysisError;
use crate::transfer::{ArithOp, Comparison};

/// Unique identifier for a basic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub usize);

/// A numeric literal as the front end saw it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Expression tree of an instruction operand.
///
/// Two syntactically identical subtrees are distinct values; nothing links
/// separate occurrences of the same expression shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Number),
    Var(String),
    Binary {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn lit_int(value: i64) -> Expr {
        Expr::Literal(Number::Int(value))
    }

    pub fn lit_float(value: f64) -> Expr {
        Expr::Literal(Number::Float(value))
    }

    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Var(name.into())
    }

    pub fn binary(op: ArithOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// The comparison guarding a branch terminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compare {
    pub op: Comparison,
    pub lhs: Expr,
    pub rhs: Expr,
}

/// A single instruction inside a basic block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instr {
    /// `target := value`
    Assign { target: String, value: Expr },
    /// Expression evaluated for effect only; a bare division here still gets
    /// a verdict
    Eval(Expr),
}

/// How a basic block hands control to its successors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Terminator {
    /// Unconditional jump
    Goto(BlockId),
    /// Two-way branch on a comparison; the true edge goes to `then_block`,
    /// the false edge to `else_block`
    Branch {
        cond: Compare,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// Leave the graph
    Return,
}

/// A basic block in the CFG.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,
    pub instrs: Vec<Instr>,
    pub terminator: Option<Terminator>,
    pub predecessors: SmallVec<[BlockId; 2]>,
    pub successors: SmallVec<[BlockId; 2]>,
}

impl BasicBlock {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            instrs: Vec::new(),
            terminator: None,
            predecessors: SmallVec::new(),
            successors: SmallVec::new(),
        }
    }
}

/// Control-flow graph.
#[derive(Debug, Clone)]
pub struct Cfg {
    pub blocks: IndexMap<BlockId, BasicBlock>,
    pub entry: BlockId,
    next_block_id: usize,
}

impl Cfg {
    /// Create a graph containing only its entry block.
    pub fn new() -> Self {
        let mut cfg = Self {
            blocks: IndexMap::new(),
            entry: BlockId(0),
            next_block_id: 0,
        };
        cfg.entry = cfg.new_block();
        cfg
    }

    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, BasicBlock::new(id));
        id
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        if let Some(block) = self.blocks.get_mut(&from) {
            if !block.successors.contains(&to) {
                block.successors.push(to);
            }
        }
        if let Some(block) = self.blocks.get_mut(&to) {
            if !block.predecessors.contains(&from) {
                block.predecessors.push(from);
            }
        }
    }

    pub fn set_terminator(&mut self, block: BlockId, terminator: Terminator) {
        if let Some(b) = self.blocks.get_mut(&block) {
            b.terminator = Some(terminator);
        }
    }

    pub fn push_instr(&mut self, block: BlockId, instr: Instr) {
        if let Some(b) = self.blocks.get_mut(&block) {
            b.instrs.push(instr);
        }
    }

    /// Blocks in reverse postorder - the traversal order that minimizes
    /// re-visits for a forward analysis.
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        let mut visited = std::collections::HashSet::new();
        let mut postorder = Vec::new();
        self.dfs_postorder(self.entry, &mut visited, &mut postorder);
        postorder.reverse();
        postorder
    }

    fn dfs_postorder(
        &self,
        block: BlockId,
        visited: &mut std::collections::HashSet<BlockId>,
        postorder: &mut Vec<BlockId>,
    ) {
        if !visited.insert(block) {
            return;
        }
        if let Some(b) = self.blocks.get(&block) {
            for &succ in &b.successors {
                self.dfs_postorder(succ, visited, postorder);
            }
        }
        postorder.push(block);
    }

    /// Check the structural invariants the engine relies on. Violations are
    /// caller contract bugs, reported rather than recovered from.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for block in self.blocks.values() {
            for &succ in &block.successors {
                if !self.blocks.contains_key(&succ) {
                    return Err(AnalysisError::MalformedCfg(format!(
                        "block {:?} has an edge to missing block {:?}",
                        block.id, succ
                    )));
                }
            }
            for &pred in &block.predecessors {
                if !self.blocks.contains_key(&pred) {
                    return Err(AnalysisError::MalformedCfg(format!(
                        "block {:?} lists missing predecessor {:?}",
                        block.id, pred
                    )));
                }
            }
            match &block.terminator {
                Some(Terminator::Goto(target)) => {
                    if !block.successors.contains(target) {
                        return Err(AnalysisError::MalformedCfg(format!(
                            "block {:?} jumps to {:?} without a matching edge",
                            block.id, target
                        )));
                    }
                }
                Some(Terminator::Branch {
                    then_block,
                    else_block,
                    ..
                }) => {
                    for target in [then_block, else_block] {
                        if !block.successors.contains(target) {
                            return Err(AnalysisError::MalformedCfg(format!(
                                "block {:?} branches to {:?} without a matching edge",
                                block.id, target
                            )));
                        }
                    }
                }
                Some(Terminator::Return) | None => {}
            }
        }
        Ok(())
    }
}

impl Default for Cfg {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cfg_has_entry() {
        let cfg = Cfg::new();
        assert!(cfg.blocks.contains_key(&cfg.entry));
        assert_eq!(cfg.blocks.len(), 1);
    }

    #[test]
    fn test_add_edge_links_both_sides() {
        let mut cfg = Cfg::new();
        let b = cfg.new_block();
        cfg.add_edge(cfg.entry, b);
        cfg.add_edge(cfg.entry, b); // duplicate edges collapse
        let entry = cfg.block(cfg.entry).unwrap();
        let block = cfg.block(b).unwrap();
        assert_eq!(entry.successors.as_slice(), &[b]);
        assert_eq!(block.predecessors.as_slice(), &[cfg.entry]);
    }

    #[test]
    fn test_reverse_postorder_starts_at_entry() {
        let mut cfg = Cfg::new();
        let a = cfg.new_block();
        let b = cfg.new_block();
        cfg.add_edge(cfg.entry, a);
        cfg.add_edge(a, b);
        let rpo = cfg.reverse_postorder();
        assert_eq!(rpo, vec![cfg.entry, a, b]);
    }

    #[test]
    fn test_validate_rejects_dangling_goto() {
        let mut cfg = Cfg::new();
        let b = cfg.new_block();
        cfg.set_terminator(cfg.entry, Terminator::Goto(b));
        // no matching edge was added
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_branch_with_edges() {
        let mut cfg = Cfg::new();
        let t = cfg.new_block();
        let e = cfg.new_block();
        cfg.set_terminator(
            cfg.entry,
            Terminator::Branch {
                cond: Compare {
                    op: Comparison::Ne,
                    lhs: Expr::var("y"),
                    rhs: Expr::lit_int(0),
                },
                then_block: t,
                else_block: e,
            },
        );
        cfg.add_edge(cfg.entry, t);
        cfg.add_edge(cfg.entry, e);
        assert!(cfg.validate().is_ok());
    }
}

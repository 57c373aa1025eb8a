//! An `Instruction` defines a single SSA value.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A binary operator, arithmetic or comparison.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    /// Returns true for the six comparison operators.
    pub fn is_comparison(&self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::Lt | Op::Le | Op::Gt | Op::Ge)
    }

    /// Returns true for the strict orderings `<` and `>`.
    pub fn is_strict(&self) -> bool {
        matches!(self, Op::Lt | Op::Gt)
    }

    /// The comparison holding on the false branch of a conditional on
    /// `self`: `< ↔ ≥`, `> ↔ ≤`, `= ↔ ≠`.
    pub fn invert(&self) -> Result<Op, Error> {
        match *self {
            Op::Lt => Ok(Op::Ge),
            Op::Gt => Ok(Op::Le),
            Op::Eq => Ok(Op::Ne),
            Op::Ne => Ok(Op::Eq),
            Op::Ge => Ok(Op::Lt),
            Op::Le => Ok(Op::Gt),
            _ => Err(Error::UnsupportedComparison(*self)),
        }
    }

    /// The comparison as seen with its operands swapped: `a self b` holds
    /// iff `b self.mirror() a` holds. Non-comparison operators are returned
    /// unchanged.
    pub fn mirror(&self) -> Op {
        match *self {
            Op::Lt => Op::Gt,
            Op::Gt => Op::Lt,
            Op::Le => Op::Ge,
            Op::Ge => Op::Le,
            other => other,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Rem => "%",
            Op::Shl => "<<",
            Op::Shr => ">>",
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// A single SSA instruction. Every instruction defines exactly one value.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Instruction {
    /// A type conversion of `x`.
    Convert { result: usize, x: usize },
    /// A binary operation `x op y`.
    BinOp {
        result: usize,
        op: Op,
        x: usize,
        y: usize,
    },
    /// A φ-node merging one incoming value per predecessor.
    Phi { result: usize, incoming: Vec<usize> },
    /// A σ-node renaming `x` on one successor of a conditional branch.
    /// `branch` is true when the σ sits on the then-successor.
    Sigma {
        result: usize,
        x: usize,
        branch: bool,
    },
    /// A slice `x[low..high]`; either bound may be absent.
    Slice {
        result: usize,
        x: usize,
        low: Option<usize>,
        high: Option<usize>,
    },
}

impl Instruction {
    /// The SSA value this instruction defines.
    pub fn result(&self) -> usize {
        match *self {
            Instruction::Convert { result, .. }
            | Instruction::BinOp { result, .. }
            | Instruction::Phi { result, .. }
            | Instruction::Sigma { result, .. }
            | Instruction::Slice { result, .. } => result,
        }
    }

    /// The SSA values this instruction reads, in order.
    pub fn operands(&self) -> Vec<usize> {
        match *self {
            Instruction::Convert { x, .. } => vec![x],
            Instruction::BinOp { x, y, .. } => vec![x, y],
            Instruction::Phi { ref incoming, .. } => incoming.clone(),
            Instruction::Sigma { x, .. } => vec![x],
            Instruction::Slice { x, low, high, .. } => {
                let mut operands = vec![x];
                operands.extend(low);
                operands.extend(high);
                operands
            }
        }
    }
}

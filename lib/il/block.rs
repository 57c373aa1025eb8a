//! A `Block` is a linear sequence of `Instruction` closed by a `Terminator`.
//!
//! A `Block` must belong to a `Function`. To create a `Block`, call
//! `Function::add_block`.

use crate::il::*;
use serde::{Deserialize, Serialize};

/// How control leaves a `Block`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Terminator {
    /// Branch on `condition` to `then_target` or `else_target`.
    CondBranch {
        condition: usize,
        then_target: usize,
        else_target: usize,
    },
    /// Branch unconditionally to `target`.
    Branch { target: usize },
    /// Return from the function.
    Return,
}

impl Terminator {
    /// The indices of the successor blocks.
    pub fn targets(&self) -> Vec<usize> {
        match *self {
            Terminator::CondBranch {
                then_target,
                else_target,
                ..
            } => vec![then_target, else_target],
            Terminator::Branch { target } => vec![target],
            Terminator::Return => Vec::new(),
        }
    }
}

/// A basic block in SSA form.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Block {
    /// The index of the block.
    index: usize,
    /// The instructions for this block.
    instructions: Vec<Instruction>,
    /// The indices of this block's predecessors.
    predecessors: Vec<usize>,
    /// How control leaves this block.
    terminator: Option<Terminator>,
}

impl Block {
    pub(crate) fn new(index: usize) -> Block {
        Block {
            index,
            instructions: Vec::new(),
            predecessors: Vec::new(),
            terminator: None,
        }
    }

    /// Returns the index of this `Block`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the instructions for this `Block`.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub(crate) fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Returns the indices of this block's predecessors.
    pub fn predecessors(&self) -> &[usize] {
        &self.predecessors
    }

    pub(crate) fn add_predecessor(&mut self, predecessor: usize) {
        self.predecessors.push(predecessor);
    }

    /// Returns the terminator of this `Block`, if one has been set.
    pub fn terminator(&self) -> Option<&Terminator> {
        self.terminator.as_ref()
    }

    pub(crate) fn set_terminator(&mut self, terminator: Terminator) {
        self.terminator = Some(terminator);
    }
}

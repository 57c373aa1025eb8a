//! A `Function` owns the SSA values and blocks under analysis.

use crate::il::*;
use crate::Error;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A function in SSA form: an arena of values and an arena of blocks.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Function {
    name: String,
    values: Vec<Value>,
    blocks: Vec<Block>,
}

impl Function {
    pub fn new<S: Into<String>>(name: S) -> Function {
        Function {
            name: name.into(),
            values: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// The name of this `Function`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create a fresh SSA value of the given type, and return its index.
    pub fn add_value<S: Into<String>>(&mut self, name: S, typ: Type) -> usize {
        let index = self.values.len();
        self.values.push(Value::new(index, name, typ));
        index
    }

    /// Create a constant SSA value carrying the given literal, and return
    /// its index.
    pub fn add_constant(&mut self, literal: BigInt, typ: Type) -> usize {
        let index = self.values.len();
        self.values.push(Value::new_constant(index, literal, typ));
        index
    }

    /// Fetch a `Value` by index.
    pub fn value(&self, index: usize) -> Result<&Value, Error> {
        self.values.get(index).ok_or(Error::ValueNotFound(index))
    }

    /// All values of this `Function`.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Create an empty block and return its index.
    pub fn add_block(&mut self) -> usize {
        let index = self.blocks.len();
        self.blocks.push(Block::new(index));
        index
    }

    /// Fetch a `Block` by index.
    pub fn block(&self, index: usize) -> Result<&Block, Error> {
        self.blocks.get(index).ok_or(Error::BlockNotFound(index))
    }

    fn block_mut(&mut self, index: usize) -> Result<&mut Block, Error> {
        self.blocks
            .get_mut(index)
            .ok_or(Error::BlockNotFound(index))
    }

    /// All blocks of this `Function`.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Append an instruction to the given block.
    pub fn push_instruction(
        &mut self,
        block: usize,
        instruction: Instruction,
    ) -> Result<(), Error> {
        self.block_mut(block)?.push(instruction);
        Ok(())
    }

    /// Set the terminator of the given block, recording the block as a
    /// predecessor of each branch target. Set the terminator once per block.
    pub fn set_terminator(&mut self, block: usize, terminator: Terminator) -> Result<(), Error> {
        for target in terminator.targets() {
            self.block_mut(target)?.add_predecessor(block);
        }
        self.block_mut(block)?.set_terminator(terminator);
        Ok(())
    }

    /// The instruction defining `value`, or `None` for constants and values
    /// without a definition (such as function parameters).
    pub fn definition(&self, value: usize) -> Option<&Instruction> {
        self.blocks
            .iter()
            .flat_map(|block| block.instructions().iter())
            .find(|instruction| instruction.result() == value)
    }
}

//! Kestrel: value range propagation for SSA programs.
//!
//! Kestrel computes a conservative interval `[lo, hi]` (with extended bounds
//! `-∞`, `+∞`) for every integer-typed SSA value in a function. The results
//! are sound over-approximations of the values a variable may take at
//! runtime, and are meant to feed downstream consumers such as bounds-check
//! elimination or dead-branch detection. A quick synopsis of Kestrel's
//! modules:
//!
//! * **analysis** - The constraint graph and the widening/narrowing fixpoint
//! solver over its strongly connected components.
//! * **il** - The minimal SSA intermediate language the solver consumes,
//! including σ-nodes for branch-sensitive refinement.
//!
//! ```
//! use kestrel::analysis::vrp;
//! use kestrel::il;
//!
//! # fn example() -> Result<(), kestrel::Error> {
//! let mut function = il::Function::new("sum");
//! let block = function.add_block();
//! let a = function.add_constant(3.into(), il::int(64));
//! let b = function.add_constant(5.into(), il::int(64));
//! let c = function.add_value("c", il::int(64));
//! function.push_instruction(
//!     block,
//!     il::Instruction::BinOp { result: c, op: il::Op::Add, x: a, y: b },
//! )?;
//!
//! let mut graph = vrp::build_graph(&function)?;
//! graph.solve()?;
//! println!("c in {}", graph.range(c));
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod error;
pub mod il;

pub use crate::error::Error;

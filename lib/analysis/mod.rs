//! Analyses over the Kestrel IL.
//!
//! * **vrp** - Value range propagation: a conservative interval per
//! integer-typed SSA value, solved per strongly connected component with
//! jump-set widening and narrowing.

pub mod vrp;

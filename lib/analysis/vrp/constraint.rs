//! Constraint variants over SSA values.
//!
//! Each constraint defines exactly one sink value `y`, reads an ordered list
//! of operand values, and evaluates to the `Range` it currently implies for
//! its sink. A `FutureIntersection` additionally references SSA values as
//! symbolic bounds; those references are control dependencies, not operands.

use crate::analysis::vrp::int::{Interval, Z};
use crate::analysis::vrp::range::{Range, StringRange};
use crate::analysis::vrp::Graph;

/// A constraint node of the graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Constraint {
    /// `y = interval`, a constant interval.
    Interval { y: usize, interval: Interval },
    /// `y = convert(x)`. The width change is handled by the final type
    /// clamp, so the range passes through unclamped.
    IntConversion { y: usize, x: usize },
    /// `y = a + b`.
    Add { y: usize, a: usize, b: usize },
    /// `y = a - b`.
    Sub { y: usize, a: usize, b: usize },
    /// `y = a * b`.
    Mul { y: usize, a: usize, b: usize },
    /// `y = φ(vars...)`, the union of the operand ranges.
    Phi { y: usize, vars: Vec<usize> },
    /// `y = x[low..high]` on a string. Only non-negativity of the resulting
    /// length is modelled.
    StringSlice {
        y: usize,
        x: usize,
        low: Option<usize>,
        high: Option<usize>,
    },
    /// `y = x ∩ interval`, with the interval fixed at build time.
    Intersection {
        y: usize,
        x: usize,
        interval: Interval,
    },
    /// `y = x ∩ [lower + lower_offset, upper + upper_offset]`, where the
    /// bounds are SSA values whose ranges become available as the solver
    /// progresses.
    FutureIntersection(FutureIntersection),
}

/// The state of a `Constraint::FutureIntersection`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FutureIntersection {
    pub(super) y: usize,
    pub(super) x: usize,
    /// The SSA value bounding `x` from below, if any.
    pub(super) lower: Option<usize>,
    /// The SSA value bounding `x` from above, if any.
    pub(super) upper: Option<usize>,
    /// Added to the lower bound's lower end; `-∞` when `lower` is absent.
    pub(super) lower_offset: Z,
    /// Added to the upper bound's upper end; `+∞` when `upper` is absent.
    pub(super) upper_offset: Z,
    /// The materialised bounds; unknown until resolved.
    pub(super) interval: Interval,
    pub(super) resolved: bool,
}

impl FutureIntersection {
    pub(super) fn new(
        y: usize,
        x: usize,
        lower: Option<usize>,
        upper: Option<usize>,
        lower_offset: Z,
        upper_offset: Z,
    ) -> FutureIntersection {
        FutureIntersection {
            y,
            x,
            lower,
            upper,
            lower_offset,
            upper_offset,
            interval: Interval::unknown(),
            resolved: false,
        }
    }

    /// The materialised bounds of this future.
    pub fn interval(&self) -> &Interval {
        &self.interval
    }
}

impl Constraint {
    /// The SSA value this constraint defines.
    pub fn y(&self) -> usize {
        match *self {
            Constraint::Interval { y, .. }
            | Constraint::IntConversion { y, .. }
            | Constraint::Add { y, .. }
            | Constraint::Sub { y, .. }
            | Constraint::Mul { y, .. }
            | Constraint::Phi { y, .. }
            | Constraint::StringSlice { y, .. }
            | Constraint::Intersection { y, .. } => y,
            Constraint::FutureIntersection(ref future) => future.y,
        }
    }

    /// The SSA values this constraint consumes as ordinary operands.
    pub fn operands(&self) -> Vec<usize> {
        match *self {
            Constraint::Interval { .. } => Vec::new(),
            Constraint::IntConversion { x, .. } => vec![x],
            Constraint::Add { a, b, .. }
            | Constraint::Sub { a, b, .. }
            | Constraint::Mul { a, b, .. } => vec![a, b],
            Constraint::Phi { ref vars, .. } => vars.clone(),
            Constraint::StringSlice { x, low, high, .. } => {
                let mut operands = vec![x];
                operands.extend(low);
                operands.extend(high);
                operands
            }
            Constraint::Intersection { x, .. } => vec![x],
            Constraint::FutureIntersection(ref future) => vec![future.x],
        }
    }

    /// The SSA values this constraint consumes as symbolic bounds. These
    /// become control edges in the graph.
    pub fn futures(&self) -> Vec<usize> {
        match *self {
            Constraint::FutureIntersection(ref future) => {
                future.lower.into_iter().chain(future.upper).collect()
            }
            _ => Vec::new(),
        }
    }

    /// This constraint's current contribution, computed from the current
    /// ranges of its operands.
    pub fn eval(&self, graph: &Graph) -> Range {
        match *self {
            Constraint::Interval { ref interval, .. } => Range::Interval(interval.clone()),
            Constraint::IntConversion { x, .. } => match graph.range(x) {
                range @ Range::Interval(_) => range,
                Range::String(_) => Range::Interval(Interval::unknown()),
            },
            Constraint::Add { a, b, .. } => {
                Range::Interval(interval_of(graph, a).add(&interval_of(graph, b)))
            }
            Constraint::Sub { a, b, .. } => {
                Range::Interval(interval_of(graph, a).sub(&interval_of(graph, b)))
            }
            Constraint::Mul { a, b, .. } => {
                Range::Interval(interval_of(graph, a).mul(&interval_of(graph, b)))
            }
            Constraint::Phi { ref vars, .. } => {
                let mut range: Option<Range> = None;
                for &var in vars {
                    let operand = graph.range(var);
                    range = Some(match range {
                        Some(range) => range.union(&operand),
                        None => operand,
                    });
                }
                range.unwrap_or_else(|| Range::Interval(Interval::unknown()))
            }
            Constraint::StringSlice { .. } => {
                Range::String(StringRange::new(Interval::new(Z::zero(), Z::PosInfinity)))
            }
            Constraint::Intersection {
                x, ref interval, ..
            } => {
                let operand = interval_of(graph, x);
                if !operand.is_known() {
                    return Range::Interval(Interval::unknown());
                }
                Range::Interval(operand.intersection(interval))
            }
            Constraint::FutureIntersection(ref future) => {
                let operand = interval_of(graph, future.x);
                if !operand.is_known() || !future.interval.is_known() {
                    return Range::Interval(Interval::unknown());
                }
                Range::Interval(operand.intersection(&future.interval))
            }
        }
    }
}

fn interval_of(graph: &Graph, value: usize) -> Interval {
    match graph.range(value) {
        Range::Interval(interval) => interval,
        Range::String(_) => Interval::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::vrp::build_graph;
    use crate::il;

    // a function with two integer constants and three plain values
    fn fixture() -> il::Function {
        let mut function = il::Function::new("fixture");
        let block = function.add_block();
        function.add_constant(3.into(), il::int(64)); // value 0
        function.add_constant(5.into(), il::int(64)); // value 1
        let a = function.add_value("a", il::int(64)); // value 2
        let b = function.add_value("b", il::int(64)); // value 3
        let c = function.add_value("c", il::int(64)); // value 4
        function
            .push_instruction(
                block,
                il::Instruction::BinOp {
                    result: c,
                    op: il::Op::Add,
                    x: a,
                    y: b,
                },
            )
            .unwrap();
        function
    }

    #[test]
    fn test_eval_add_of_constants() {
        let function = fixture();
        let graph = build_graph(&function).unwrap();
        let add = Constraint::Add { y: 4, a: 0, b: 1 };
        // constants fall back to their singletons without any solving
        assert_eq!(
            add.eval(&graph),
            Range::Interval(Interval::new(Z::new(8), Z::new(8)))
        );
    }

    #[test]
    fn test_eval_phi_skips_unknown_operands() {
        let function = fixture();
        let graph = build_graph(&function).unwrap();
        let phi = Constraint::Phi {
            y: 4,
            vars: vec![0, 2],
        };
        // value 2 has no range yet; the union is the constant's singleton
        assert_eq!(
            phi.eval(&graph),
            Range::Interval(Interval::new(Z::new(3), Z::new(3)))
        );
    }

    #[test]
    fn test_eval_intersection_of_unknown_is_unknown() {
        let function = fixture();
        let graph = build_graph(&function).unwrap();
        let intersection = Constraint::Intersection {
            y: 4,
            x: 2,
            interval: Interval::new(Z::new(0), Z::new(10)),
        };
        assert!(!intersection.eval(&graph).is_known());
    }

    #[test]
    fn test_eval_unresolved_future_is_unknown() {
        let function = fixture();
        let mut graph = build_graph(&function).unwrap();
        graph.set_range(2, Range::Interval(Interval::new(Z::new(0), Z::new(10))));
        let future = Constraint::FutureIntersection(FutureIntersection::new(
            4,
            2,
            None,
            Some(3),
            Z::NegInfinity,
            Z::zero(),
        ));
        // the bound's range is not materialised yet
        assert!(!future.eval(&graph).is_known());
    }

    #[test]
    fn test_sink_and_operands() {
        let phi = Constraint::Phi {
            y: 7,
            vars: vec![1, 2, 3],
        };
        assert_eq!(phi.y(), 7);
        assert_eq!(phi.operands(), vec![1, 2, 3]);
        assert!(phi.futures().is_empty());

        let future = Constraint::FutureIntersection(FutureIntersection::new(
            4,
            2,
            Some(5),
            None,
            Z::zero(),
            Z::PosInfinity,
        ));
        assert_eq!(future.operands(), vec![2]);
        assert_eq!(future.futures(), vec![5]);
    }
}

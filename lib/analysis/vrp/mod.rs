//! Value range propagation over SSA form.
//!
//! A constraint network is built from the instructions of a function, with
//! one constraint per modelled SSA operation and σ-nodes contributing
//! refinements derived from the conditional guarding their block. The
//! bipartite graph of SSA values and constraints is partitioned into
//! strongly connected components, and each component is solved with a
//! two-phase fixpoint: widening against the function's jump-set of integer
//! literals forces termination, and a narrowing pass recovers precision
//! afterwards. A final pass projects every interval onto what its declared
//! integer type can represent.
//!
//! Comparisons against SSA values rather than literals become future
//! intersections: their bounds are materialised lazily, once the components
//! defining the bound values have been solved.

pub mod constraint;
pub mod int;
pub mod range;

pub use self::constraint::{Constraint, FutureIntersection};
pub use self::int::{Interval, JumpSet, Z};
pub use self::range::{Range, StringRange};

use crate::il;
use crate::Error;
use log::trace;
use num_bigint::BigInt;
use num_traits::One;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

const MAX_PROPAGATION_STEPS: usize = 250_000;

/// What a vertex stands for: an SSA value or a constraint, by arena index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VertexData {
    Value(usize),
    Constraint(usize),
}

/// A vertex of the constraint graph.
#[derive(Clone, Debug)]
pub struct Vertex {
    data: VertexData,
    scc: usize,
    // Tarjan scratch; an index of 0 marks an unvisited vertex.
    index: usize,
    lowlink: usize,
    on_stack: bool,
}

impl Vertex {
    fn new(data: VertexData) -> Vertex {
        Vertex {
            data,
            scc: 0,
            index: 0,
            lowlink: 0,
            on_stack: false,
        }
    }

    /// The SSA value or constraint this vertex stands for.
    pub fn data(&self) -> VertexData {
        self.data
    }

    /// The strongly connected component this vertex belongs to.
    pub fn scc(&self) -> usize {
        self.scc
    }
}

/// A directed edge of the constraint graph. Ordinary edges carry data flow;
/// control edges gate the resolution of future intersections.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    head: usize,
    tail: usize,
    control: bool,
}

impl Edge {
    /// The index of the head vertex.
    pub fn head(&self) -> usize {
        self.head
    }

    /// The index of the tail vertex.
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Returns true for control edges.
    pub fn control(&self) -> bool {
        self.control
    }
}

/// The constraint graph for one function, together with the solved ranges.
///
/// The graph borrows the function; vertices, edges and constraints live in
/// arenas addressed by index, so the cyclic constraint structure never turns
/// into cyclic ownership.
#[derive(Clone, Debug)]
pub struct Graph<'f> {
    function: &'f il::Function,
    constraints: Vec<Constraint>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    value_vertices: FxHashMap<usize, usize>,
    constraint_vertices: Vec<usize>,
    sccs: Vec<Vec<usize>>,
    scc_edges: Vec<Vec<usize>>,
    future_sinks: FxHashMap<usize, usize>,
    ranges: FxHashMap<usize, Range>,
}

/// Build the constraint graph for `function`: collect one constraint per
/// modelled instruction, connect operands, symbolic bounds and sinks, and
/// compute the strongly connected components.
pub fn build_graph(function: &il::Function) -> Result<Graph, Error> {
    let mut constraints = Vec::new();
    let mut pinned = FxHashSet::default();

    for block in function.blocks() {
        for instruction in block.instructions() {
            match *instruction {
                il::Instruction::Convert { result, x } => {
                    if function.value(result)?.typ().is_integer() {
                        constraints.push(Constraint::IntConversion { y: result, x });
                    }
                }
                il::Instruction::BinOp { result, op, x, y } => {
                    if !function.value(x)?.typ().is_integer() {
                        continue;
                    }
                    match op {
                        il::Op::Add => constraints.push(Constraint::Add { y: result, a: x, b: y }),
                        il::Op::Sub => constraints.push(Constraint::Sub { y: result, a: x, b: y }),
                        il::Op::Mul => constraints.push(Constraint::Mul { y: result, a: x, b: y }),
                        // Division, remainder and shifts are recognised but
                        // left unconstrained; their sinks get the type-wide
                        // range from the final clamp.
                        _ => {}
                    }
                }
                il::Instruction::Phi {
                    result,
                    ref incoming,
                } => {
                    if !function.value(result)?.typ().is_integer() {
                        continue;
                    }
                    // pin each constant operand to its singleton, so
                    // constants reachable only through φs exist in the
                    // solver's universe
                    for &operand in incoming {
                        if let Some(literal) = function.value(operand)?.integer_literal() {
                            if pinned.insert(operand) {
                                constraints.push(Constraint::Interval {
                                    y: operand,
                                    interval: Interval::singleton(Z::Integer(literal.clone())),
                                });
                            }
                        }
                    }
                    constraints.push(Constraint::Phi {
                        y: result,
                        vars: incoming.clone(),
                    });
                }
                il::Instruction::Sigma { result, x, branch } => {
                    if !function.value(result)?.typ().is_integer() {
                        continue;
                    }
                    if let Some(constraint) = sigma_constraint(function, block, result, x, branch)?
                    {
                        constraints.push(constraint);
                    }
                }
                il::Instruction::Slice {
                    result,
                    x,
                    low,
                    high,
                } => {
                    if function.value(x)?.typ().is_string() {
                        constraints.push(Constraint::StringSlice {
                            y: result,
                            x,
                            low,
                            high,
                        });
                    }
                }
            }
        }
    }

    let mut graph = Graph {
        function,
        constraints: Vec::new(),
        vertices: Vec::new(),
        edges: Vec::new(),
        value_vertices: FxHashMap::default(),
        constraint_vertices: Vec::new(),
        sccs: Vec::new(),
        scc_edges: Vec::new(),
        future_sinks: FxHashMap::default(),
        ranges: FxHashMap::default(),
    };

    for constraint in constraints {
        graph.insert_constraint(constraint);
    }
    graph.find_sccs();
    graph.index_scc_edges();

    Ok(graph)
}

// Derive the refinement constraint for a σ-node from the conditional
// guarding its block. Returns None whenever a precondition does not hold;
// skipping is sound because the sink then keeps its type-wide range.
fn sigma_constraint(
    function: &il::Function,
    block: &il::Block,
    result: usize,
    x: usize,
    branch: bool,
) -> Result<Option<Constraint>, Error> {
    let pred = match block.predecessors().first() {
        Some(&pred) => pred,
        None => return Ok(None),
    };
    let condition = match function.block(pred)?.terminator() {
        Some(il::Terminator::CondBranch { condition, .. }) => *condition,
        _ => return Ok(None),
    };
    let (op, a, b) = match function.definition(condition) {
        Some(&il::Instruction::BinOp { op, x: a, y: b, .. }) if op.is_comparison() => (op, a, b),
        _ => return Ok(None),
    };

    // the comparison of the false branch is the inverted one
    let mut op = if branch { op } else { op.invert()? };

    // orient the comparison so the refined value is on the left
    let other = if a == x {
        b
    } else if b == x {
        op = op.mirror();
        a
    } else {
        return Ok(None);
    };

    Ok(match function.value(other)?.integer_literal() {
        Some(literal) => {
            let interval = match op {
                il::Op::Eq => Interval::singleton(Z::Integer(literal.clone())),
                il::Op::Gt | il::Op::Ge => {
                    let off: i64 = if op.is_strict() { 1 } else { 0 };
                    Interval::new(Z::Integer(literal.clone() + off), Z::PosInfinity)
                }
                il::Op::Lt | il::Op::Le => {
                    let off: i64 = if op.is_strict() { -1 } else { 0 };
                    Interval::new(Z::NegInfinity, Z::Integer(literal.clone() + off))
                }
                // != carries no refinement
                _ => return Ok(None),
            };
            Some(Constraint::Intersection {
                y: result,
                x,
                interval,
            })
        }
        None => match op {
            il::Op::Eq => Some(Constraint::FutureIntersection(FutureIntersection::new(
                result,
                x,
                Some(other),
                Some(other),
                Z::zero(),
                Z::zero(),
            ))),
            il::Op::Gt | il::Op::Ge => {
                let off: i64 = if op.is_strict() { 1 } else { 0 };
                Some(Constraint::FutureIntersection(FutureIntersection::new(
                    result,
                    x,
                    Some(other),
                    None,
                    Z::new(off),
                    Z::PosInfinity,
                )))
            }
            il::Op::Lt | il::Op::Le => {
                let off: i64 = if op.is_strict() { -1 } else { 0 };
                Some(Constraint::FutureIntersection(FutureIntersection::new(
                    result,
                    x,
                    None,
                    Some(other),
                    Z::NegInfinity,
                    Z::new(off),
                )))
            }
            _ => None,
        },
    })
}

impl<'f> Graph<'f> {
    /// The function this graph was built for.
    pub fn function(&self) -> &'f il::Function {
        self.function
    }

    /// All vertices of the graph.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Fetch a vertex from the graph by index.
    pub fn vertex(&self, index: usize) -> Result<&Vertex, Error> {
        self.vertices.get(index).ok_or(Error::VertexNotFound(index))
    }

    /// All edges of the graph.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All constraints of the graph.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The strongly connected components in reverse topological order:
    /// component 0 has no incoming dependencies.
    pub fn sccs(&self) -> &[Vec<usize>] {
        &self.sccs
    }

    fn insert_vertex(&mut self, data: VertexData) -> usize {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new(data));
        index
    }

    fn value_vertex(&mut self, value: usize) -> usize {
        if let Some(&vertex) = self.value_vertices.get(&value) {
            return vertex;
        }
        let vertex = self.insert_vertex(VertexData::Value(value));
        self.value_vertices.insert(value, vertex);
        vertex
    }

    fn insert_constraint(&mut self, constraint: Constraint) {
        let index = self.constraints.len();
        let vertex = self.insert_vertex(VertexData::Constraint(index));
        self.constraint_vertices.push(vertex);
        if let Constraint::FutureIntersection(_) = constraint {
            self.future_sinks.insert(constraint.y(), index);
        }

        // if value V is used by constraint C, then there is an edge V -> C;
        // symbolic bounds get control edges instead
        for operand in constraint.operands() {
            let head = self.value_vertex(operand);
            self.edges.push(Edge {
                head,
                tail: vertex,
                control: false,
            });
        }
        for bound in constraint.futures() {
            let head = self.value_vertex(bound);
            self.edges.push(Edge {
                head,
                tail: vertex,
                control: true,
            });
        }
        // if constraint C defines value V, then there is an edge C -> V
        let sink = self.value_vertex(constraint.y());
        self.edges.push(Edge {
            head: vertex,
            tail: sink,
            control: false,
        });

        self.constraints.push(constraint);
    }

    // Tarjan's algorithm, with the components renumbered into reverse
    // topological order: every dependency of a component, back-edges aside,
    // lives in a component with a smaller id.
    fn find_sccs(&mut self) {
        let vertex_count = self.vertices.len();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
        for edge in &self.edges {
            successors[edge.head].push(edge.tail);
        }

        let mut index = 1;
        let mut stack: Vec<usize> = Vec::new();
        let mut scc_count = 0;

        // each frame is a vertex and the position of its next successor
        let mut frames: Vec<(usize, usize)> = Vec::new();
        for root in 0..vertex_count {
            if self.vertices[root].index != 0 {
                continue;
            }
            frames.push((root, 0));
            while let Some(&(vertex, position)) = frames.last() {
                if position == 0 {
                    if self.vertices[vertex].index != 0 {
                        // the vertex was queued twice before its first
                        // visit; treat the duplicate as a plain edge
                        frames.pop();
                        if let Some(&(parent, _)) = frames.last() {
                            if self.vertices[vertex].on_stack
                                && self.vertices[vertex].index < self.vertices[parent].lowlink
                            {
                                self.vertices[parent].lowlink = self.vertices[vertex].index;
                            }
                        }
                        continue;
                    }
                    self.vertices[vertex].index = index;
                    self.vertices[vertex].lowlink = index;
                    index += 1;
                    stack.push(vertex);
                    self.vertices[vertex].on_stack = true;
                }

                if let Some(&successor) = successors[vertex].get(position) {
                    frames.last_mut().unwrap().1 += 1;
                    if self.vertices[successor].index == 0 {
                        frames.push((successor, 0));
                    } else if self.vertices[successor].on_stack
                        && self.vertices[successor].index < self.vertices[vertex].lowlink
                    {
                        self.vertices[vertex].lowlink = self.vertices[successor].index;
                    }
                    continue;
                }

                frames.pop();
                if self.vertices[vertex].lowlink == self.vertices[vertex].index {
                    loop {
                        let member = stack.pop().unwrap();
                        self.vertices[member].on_stack = false;
                        self.vertices[member].scc = scc_count;
                        if member == vertex {
                            break;
                        }
                    }
                    scc_count += 1;
                }
                if let Some(&(parent, _)) = frames.last() {
                    if self.vertices[vertex].lowlink < self.vertices[parent].lowlink {
                        self.vertices[parent].lowlink = self.vertices[vertex].lowlink;
                    }
                }
            }
        }

        self.sccs = vec![Vec::new(); scc_count];
        for vertex in 0..vertex_count {
            let scc = scc_count - self.vertices[vertex].scc - 1;
            self.vertices[vertex].scc = scc;
            self.sccs[scc].push(vertex);
        }
    }

    fn index_scc_edges(&mut self) {
        self.scc_edges = vec![Vec::new(); self.sccs.len()];
        for (index, edge) in self.edges.iter().enumerate() {
            self.scc_edges[self.vertices[edge.head].scc].push(index);
        }
    }

    /// Solve the graph in place: seed constants, run the widening and
    /// narrowing fixpoint over each component in reverse topological order,
    /// and clamp the results by their declared types. After `solve`
    /// returns, `ranges` holds the analysis result.
    pub fn solve(&mut self) -> Result<(), Error> {
        self.seed_constants()?;
        let jump_set = self.collect_jump_set();

        trace!(
            "solving {}: {} vertices, {} sccs",
            self.function.name(),
            self.vertices.len(),
            self.sccs.len()
        );

        for scc in 0..self.sccs.len() {
            if self.sccs[scc].len() == 1 {
                self.solve_trivial(scc)?;
            } else {
                self.solve_cyclic(scc, &jump_set)?;
            }
            self.propagate(scc)?;
        }

        self.clamp_types()?;
        Ok(())
    }

    /// The solved ranges, keyed by SSA value.
    pub fn ranges(&self) -> &FxHashMap<usize, Range> {
        &self.ranges
    }

    /// The current range of `value`. Integer constants always yield their
    /// singleton; otherwise an unknown value falls back to the unknown
    /// range of its type's kind.
    pub fn range(&self, value: usize) -> Range {
        if let Ok(v) = self.function.value(value) {
            if let Some(literal) = v.integer_literal() {
                return Range::Interval(Interval::singleton(Z::Integer(literal.clone())));
            }
        }
        if let Some(range) = self.ranges.get(&value) {
            return range.clone();
        }
        match self.function.value(value).map(il::Value::typ) {
            Ok(il::Type::String) => Range::String(StringRange::unknown()),
            _ => Range::Interval(Interval::unknown()),
        }
    }

    fn set_range(&mut self, value: usize, range: Range) {
        self.ranges.insert(value, range);
    }

    fn seed_constants(&mut self) -> Result<(), Error> {
        let function = self.function;
        for vertex in 0..self.vertices.len() {
            if let VertexData::Value(value) = self.vertices[vertex].data {
                if let Some(literal) = function.value(value)?.integer_literal() {
                    let singleton = Interval::singleton(Z::Integer(literal.clone()));
                    self.set_range(value, Range::Interval(singleton));
                }
            }
        }
        Ok(())
    }

    fn collect_jump_set(&self) -> JumpSet {
        let constants = self
            .function
            .values()
            .iter()
            .filter_map(il::Value::integer_literal)
            .map(|literal| Z::Integer(literal.clone()))
            .collect();
        JumpSet::new(constants)
    }

    fn solve_trivial(&mut self, scc: usize) -> Result<(), Error> {
        self.resolve_futures(scc)?;
        let vertex = self.sccs[scc][0];
        match self.vertex(vertex)?.data() {
            VertexData::Value(value) => {
                if !self.range(value).is_known() {
                    let type_wide = self.type_wide_range(value)?;
                    self.set_range(value, type_wide);
                }
            }
            VertexData::Constraint(constraint) => {
                let y = self.constraints[constraint].y();
                let result = self.constraints[constraint].eval(self);
                self.set_range(y, result);
            }
        }
        Ok(())
    }

    fn solve_cyclic(&mut self, scc: usize, jump_set: &JumpSet) -> Result<(), Error> {
        let uses = self.uses(scc);

        let mut entries = self.entries(scc)?;
        while let Some(value) = entries.pop_front() {
            if let Some(users) = uses.get(&value) {
                for &constraint in users {
                    if self.widen(constraint, jump_set) {
                        entries.push_back(self.constraints[constraint].y());
                    }
                }
            }
        }

        self.resolve_futures(scc)?;

        // whatever widening could not reach keeps no information; promote
        // it to the type-wide range before narrowing reads it
        for position in 0..self.sccs[scc].len() {
            let vertex = self.sccs[scc][position];
            if let VertexData::Value(value) = self.vertices[vertex].data {
                if !self.range(value).is_known() {
                    let type_wide = self.type_wide_range(value)?;
                    self.set_range(value, type_wide);
                }
            }
        }

        let mut actives = self.actives(scc);
        while let Some(value) = actives.pop_front() {
            if let Some(users) = uses.get(&value) {
                for &constraint in users {
                    if self.narrow(constraint) {
                        actives.push_back(self.constraints[constraint].y());
                    }
                }
            }
        }

        Ok(())
    }

    // The SSA values of the SCC whose range is already known, seeded or
    // propagated from dependency SCCs. A future defined in the SCC is
    // evaluated once first, so refinements resolved by earlier SCCs take
    // part in the widening.
    fn entries(&mut self, scc: usize) -> Result<VecDeque<usize>, Error> {
        let mut entries = VecDeque::new();
        for position in 0..self.sccs[scc].len() {
            let vertex = self.sccs[scc][position];
            let value = match self.vertex(vertex)?.data() {
                VertexData::Value(value) => value,
                VertexData::Constraint(_) => continue,
            };
            if let Some(&constraint) = self.future_sinks.get(&value) {
                let resolved = match self.constraints[constraint] {
                    Constraint::FutureIntersection(ref future) => future.resolved,
                    _ => true,
                };
                if !resolved {
                    let result = self.constraints[constraint].eval(self);
                    self.set_range(value, result);
                    if let Constraint::FutureIntersection(ref mut future) =
                        self.constraints[constraint]
                    {
                        future.resolved = true;
                    }
                }
            }
            if self.range(value).is_known() {
                entries.push_back(value);
            }
        }
        Ok(entries)
    }

    // For each SSA value of the SCC, the constraints of the SCC consuming
    // it as an ordinary operand whose sink is also in the SCC.
    fn uses(&self, scc: usize) -> FxHashMap<usize, Vec<usize>> {
        let mut uses: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for &index in &self.scc_edges[scc] {
            let edge = &self.edges[index];
            if edge.control {
                continue;
            }
            let value = match self.vertices[edge.head].data {
                VertexData::Value(value) => value,
                VertexData::Constraint(_) => continue,
            };
            let constraint = match self.vertices[edge.tail].data {
                VertexData::Constraint(constraint) => constraint,
                VertexData::Value(_) => continue,
            };
            let sink = self.constraints[constraint].y();
            if self.vertices[self.value_vertices[&sink]].scc == scc {
                uses.entry(value).or_default().push(constraint);
            }
        }
        uses
    }

    // Every non-constant SSA value of the SCC.
    fn actives(&self, scc: usize) -> VecDeque<usize> {
        self.sccs[scc]
            .iter()
            .filter_map(|&vertex| match self.vertices[vertex].data {
                VertexData::Value(value) => {
                    let constant = self
                        .function
                        .value(value)
                        .map(il::Value::is_constant)
                        .unwrap_or(false);
                    if constant {
                        None
                    } else {
                        Some(value)
                    }
                }
                VertexData::Constraint(_) => None,
            })
            .collect()
    }

    // One widening step for `constraint`. A bound growing past its old
    // value snaps to the nearest enclosing jump-set element, so every bound
    // changes at most once per jump-set element and once for the infinity.
    fn widen(&mut self, constraint: usize, jump_set: &JumpSet) -> bool {
        let y = self.constraints[constraint].y();
        let old = match self.range(y) {
            Range::Interval(interval) => interval,
            Range::String(_) => return false,
        };
        let new = match self.constraints[constraint].eval(self) {
            Range::Interval(interval) => interval,
            Range::String(_) => return false,
        };
        if !new.is_known() {
            return false;
        }
        if !old.is_known() {
            self.set_range(y, Range::Interval(new));
            return true;
        }

        let widened = if new.lower() < old.lower() && new.upper() > old.upper() {
            Interval::new(
                jump_set.greatest_below(new.lower()),
                jump_set.least_above(new.upper()),
            )
        } else if new.lower() < old.lower() {
            Interval::new(jump_set.greatest_below(new.lower()), old.upper().clone())
        } else if new.upper() > old.upper() {
            Interval::new(old.lower().clone(), jump_set.least_above(new.upper()))
        } else {
            return false;
        };
        self.set_range(y, Range::Interval(widened));
        true
    }

    // One narrowing step for `constraint`: an infinite bound may move to
    // the evaluated finite bound, a finite lower only ever moves down and a
    // finite upper only ever moves up.
    fn narrow(&mut self, constraint: usize) -> bool {
        let y = self.constraints[constraint].y();
        let old = match self.range(y) {
            Range::Interval(interval) if interval.is_known() => interval,
            _ => return false,
        };
        let new = match self.constraints[constraint].eval(self) {
            Range::Interval(interval) if interval.is_known() => interval,
            _ => return false,
        };

        let mut changed = false;
        let mut lower = old.lower().clone();
        if lower == Z::NegInfinity && *new.lower() != Z::NegInfinity {
            lower = new.lower().clone();
            changed = true;
        } else {
            let min = lower.clone().min(new.lower().clone());
            if lower != min {
                lower = min;
                changed = true;
            }
        }

        let mut upper = old.upper().clone();
        if upper == Z::PosInfinity && *new.upper() != Z::PosInfinity {
            upper = new.upper().clone();
            changed = true;
        } else {
            let max = upper.clone().max(new.upper().clone());
            if upper != max {
                upper = max;
                changed = true;
            }
        }

        if changed {
            self.set_range(y, Range::Interval(Interval::new(lower, upper)));
        }
        changed
    }

    // Resolve every future intersection reachable over a control edge from
    // this SCC.
    fn resolve_futures(&mut self, scc: usize) -> Result<(), Error> {
        for position in 0..self.scc_edges[scc].len() {
            let edge = self.edges[self.scc_edges[scc][position]];
            if !edge.control {
                continue;
            }
            match self.vertex(edge.tail)?.data() {
                VertexData::Constraint(constraint) => self.resolve_future(constraint)?,
                VertexData::Value(_) => {
                    return Err(Error::Analysis(format!(
                        "control edge into value vertex {}",
                        edge.tail
                    )))
                }
            }
        }
        Ok(())
    }

    // Materialise the interval of a future intersection from the current
    // ranges of its symbolic bounds. A bound whose range is still unknown
    // leaves the interval unknown; the constraint is revisited once a later
    // SCC produces the bound.
    fn resolve_future(&mut self, constraint: usize) -> Result<(), Error> {
        let (lower, upper) = {
            let future = match self.constraints[constraint] {
                Constraint::FutureIntersection(ref future) => future,
                _ => {
                    return Err(Error::Analysis(format!(
                        "control edge into non-future constraint {}",
                        constraint
                    )))
                }
            };
            let lower = match future.lower {
                Some(bound) => match self.range(bound) {
                    Range::Interval(interval) if interval.is_known() => {
                        interval.lower().checked_add(&future.lower_offset)
                    }
                    _ => None,
                },
                None => Some(future.lower_offset.clone()),
            };
            let upper = match future.upper {
                Some(bound) => match self.range(bound) {
                    Range::Interval(interval) if interval.is_known() => {
                        interval.upper().checked_add(&future.upper_offset)
                    }
                    _ => None,
                },
                None => Some(future.upper_offset.clone()),
            };
            (lower, upper)
        };

        if let Constraint::FutureIntersection(ref mut future) = self.constraints[constraint] {
            future.interval = match (lower, upper) {
                (Some(lower), Some(upper)) => Interval::new(lower, upper),
                _ => Interval::unknown(),
            };
            trace!("resolved future {} to {}", constraint, future.interval);
        }
        Ok(())
    }

    // Push results along the ordinary edges leaving this SCC, re-evaluating
    // until stable. The worklists leave every sink at or above its
    // evaluation, so re-evaluation only descends and each intermediate
    // state still encloses the runtime values.
    fn propagate(&mut self, scc: usize) -> Result<(), Error> {
        let mut steps = 0;
        loop {
            let mut changed = false;
            for position in 0..self.scc_edges[scc].len() {
                let edge = self.edges[self.scc_edges[scc][position]];
                if edge.control {
                    continue;
                }
                let constraint = match self.vertex(edge.tail)?.data() {
                    VertexData::Constraint(constraint) => constraint,
                    VertexData::Value(_) => continue,
                };
                let y = self.constraints[constraint].y();
                let result = self.constraints[constraint].eval(self);
                if self.range(y) != result {
                    self.set_range(y, result);
                    changed = true;
                }
                // a future that lost its bounds again is re-resolved by a
                // later SCC
                if let Constraint::FutureIntersection(ref mut future) =
                    self.constraints[constraint]
                {
                    if !future.interval.is_known() {
                        future.resolved = false;
                    }
                }
                steps += 1;
            }
            if !changed || steps > MAX_PROPAGATION_STEPS {
                break;
            }
        }
        Ok(())
    }

    fn type_wide_range(&self, value: usize) -> Result<Range, Error> {
        let typ = self.function.value(value)?.typ();
        Ok(match *typ {
            il::Type::String => Range::String(StringRange::new(Interval::new(
                Z::zero(),
                Z::PosInfinity,
            ))),
            il::Type::Integer { signed: false, .. } => {
                Range::Interval(Interval::new(Z::zero(), Z::PosInfinity))
            }
            _ => Range::Interval(Interval::new(Z::NegInfinity, Z::PosInfinity)),
        })
    }

    fn clamp_types(&mut self) -> Result<(), Error> {
        let function = self.function;
        let values: Vec<usize> = self.ranges.keys().copied().collect();
        for value in values {
            let interval = match self.ranges.get(&value) {
                Some(Range::Interval(interval)) if interval.is_known() => interval.clone(),
                _ => continue,
            };
            let clamped = clamp_interval(interval, function.value(value)?.typ());
            self.ranges.insert(value, Range::Interval(clamped));
        }
        Ok(())
    }

    /// Render the constraint graph in the graphviz dot format: SSA values
    /// as ovals, constraints as boxes, one fill colour per SCC, control
    /// edges dashed.
    pub fn graphviz(&self) -> String {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(index, vertex)| {
                let shape = match vertex.data {
                    VertexData::Value(_) => "oval",
                    VertexData::Constraint(_) => "box",
                };
                format!(
                    "n{} [shape=\"{}\", label=\"{}\", colorscheme=spectral11, style=\"filled\", fillcolor=\"{}\"];",
                    index,
                    shape,
                    self.vertex_string(vertex),
                    (vertex.scc % 11) + 1
                )
            })
            .collect::<Vec<String>>();

        let edges = self
            .edges
            .iter()
            .map(|edge| {
                let style = if edge.control { "dashed" } else { "solid" };
                format!("n{} -> n{} [style=\"{}\"];", edge.head, edge.tail, style)
            })
            .collect::<Vec<String>>();

        format!(
            "digraph G {{\n{}\n{}\n}}",
            vertices.join("\n"),
            edges.join("\n")
        )
    }

    fn vertex_string(&self, vertex: &Vertex) -> String {
        match vertex.data {
            VertexData::Value(value) => self.value_name(value),
            VertexData::Constraint(constraint) => {
                self.constraint_string(&self.constraints[constraint])
            }
        }
    }

    fn value_name(&self, value: usize) -> String {
        self.function
            .value(value)
            .map(|v| v.name().to_string())
            .unwrap_or_else(|_| format!("v{}", value))
    }

    fn constraint_string(&self, constraint: &Constraint) -> String {
        match *constraint {
            Constraint::Interval { y, ref interval } => {
                format!("{} = {}", self.value_name(y), interval)
            }
            Constraint::IntConversion { y, x } => {
                format!("{} = convert {}", self.value_name(y), self.value_name(x))
            }
            Constraint::Add { y, a, b } => format!(
                "{} = {} + {}",
                self.value_name(y),
                self.value_name(a),
                self.value_name(b)
            ),
            Constraint::Sub { y, a, b } => format!(
                "{} = {} - {}",
                self.value_name(y),
                self.value_name(a),
                self.value_name(b)
            ),
            Constraint::Mul { y, a, b } => format!(
                "{} = {} * {}",
                self.value_name(y),
                self.value_name(a),
                self.value_name(b)
            ),
            Constraint::Phi { y, ref vars } => {
                let names = vars
                    .iter()
                    .map(|&var| self.value_name(var))
                    .collect::<Vec<String>>();
                format!("{} = φ({})", self.value_name(y), names.join(", "))
            }
            Constraint::StringSlice { y, x, low, high } => {
                let low = low.map(|low| self.value_name(low)).unwrap_or_default();
                let high = high.map(|high| self.value_name(high)).unwrap_or_default();
                format!(
                    "{} = {}[{}:{}]",
                    self.value_name(y),
                    self.value_name(x),
                    low,
                    high
                )
            }
            Constraint::Intersection {
                y, x, ref interval, ..
            } => format!(
                "{} = {} ∩ {}",
                self.value_name(y),
                self.value_name(x),
                interval
            ),
            Constraint::FutureIntersection(ref future) => {
                let lower = match future.lower {
                    Some(bound) => format!("{} + {}", self.value_name(bound), future.lower_offset),
                    None => future.lower_offset.to_string(),
                };
                let upper = match future.upper {
                    Some(bound) => format!("{} + {}", self.value_name(bound), future.upper_offset),
                    None => future.upper_offset.to_string(),
                };
                format!(
                    "{} = {} ∩ [{}, {}]",
                    self.value_name(future.y),
                    self.value_name(future.x),
                    lower,
                    upper
                )
            }
        }
    }
}

// Project an interval onto what the declared integer type can represent.
// Downstream consumers may not assume anything tighter than the type, so
// this is a pure projection.
fn clamp_interval(interval: Interval, typ: &il::Type) -> Interval {
    if typ.is_unsigned() {
        if interval.lower().sign() < 0 {
            return Interval::new(Z::zero(), Z::PosInfinity);
        }
        return interval;
    }
    if typ.is_signed() {
        if *interval.upper() == Z::PosInfinity {
            return Interval::new(Z::NegInfinity, Z::PosInfinity);
        }
        let bits = typ.bits().unwrap_or(64);
        let bound = BigInt::one() << (bits - 1);
        let upper = Z::Integer(bound.clone() - 1);
        let lower = Z::Integer(-bound);
        if *interval.upper() > upper || *interval.lower() < lower {
            return Interval::new(Z::NegInfinity, Z::PosInfinity);
        }
        return interval;
    }
    interval
}

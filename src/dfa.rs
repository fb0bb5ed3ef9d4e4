use crate::error::Error;
use crate::regex::{Expression, Kind};
use crate::utils::IntegerSet;
use std::collections::{BTreeSet, HashMap};
use std::io;

impl Expression {
    /// The Brzozowski derivative: the expression matching exactly the `w`
    /// such that `symbol · w` is in this expression's language.
    pub fn derivative(&self, symbol: u32) -> Expression {
        match self.kind() {
            Kind::Epsilon => Expression::null(),
            Kind::SymbolSet(s) => {
                if s.contains(symbol) {
                    Expression::epsilon()
                } else {
                    Expression::null()
                }
            }
            Kind::Star(e) => e.derivative(symbol).concatenate(self.clone()),
            Kind::Complement(e) => e.derivative(symbol).negate(),
            Kind::Concatenation(l, r) => l
                .derivative(symbol)
                .concatenate(r.clone())
                .unite(l.nu().concatenate(r.derivative(symbol))),
            Kind::Alternation(l, r) => l.derivative(symbol).unite(r.derivative(symbol)),
            Kind::Conjunction(l, r) => l.derivative(symbol).intersect(r.derivative(symbol)),
        }
    }

    /// Partitions the code space into classes of symbols with structurally
    /// identical derivatives. Construction walks one representative per
    /// class instead of every code point.
    pub fn derivative_classes(&self) -> BTreeSet<IntegerSet> {
        match self.kind() {
            Kind::Epsilon => {
                let mut classes = BTreeSet::new();
                classes.insert(IntegerSet::codespace());
                classes
            }
            Kind::SymbolSet(s) => {
                let mut classes = BTreeSet::new();
                let rest = IntegerSet::codespace().difference(s);
                if !s.is_empty() {
                    classes.insert(s.clone());
                }
                if !rest.is_empty() {
                    classes.insert(rest);
                }
                classes
            }
            Kind::Star(e) | Kind::Complement(e) => e.derivative_classes(),
            Kind::Concatenation(l, r) => {
                if l.nullable() {
                    product_intersections(&l.derivative_classes(), &r.derivative_classes())
                } else {
                    l.derivative_classes()
                }
            }
            Kind::Alternation(l, r) | Kind::Conjunction(l, r) => {
                product_intersections(&l.derivative_classes(), &r.derivative_classes())
            }
        }
    }
}

// All non-empty pairwise intersections. Folding this across a rule vector
// yields the n-ary Cartesian intersections of the per-rule class sets.
fn product_intersections(
    a: &BTreeSet<IntegerSet>,
    b: &BTreeSet<IntegerSet>,
) -> BTreeSet<IntegerSet> {
    let mut classes = BTreeSet::new();
    for x in a {
        for y in b {
            let i = x.intersection(y);
            if !i.is_empty() {
                classes.insert(i);
            }
        }
    }
    classes
}

/// An ordered set of named rules compiled together into one automaton.
///
/// Rule order is significant: it is the declaration order used to break
/// ties between rules accepting the same prefix. Duplicate names are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpressionVector(Vec<(String, Expression)>);

impl ExpressionVector {
    pub fn new<I, S>(rules: I) -> ExpressionVector
    where
        I: IntoIterator<Item = (S, Expression)>,
        S: Into<String>,
    {
        ExpressionVector(
            rules
                .into_iter()
                .map(|(name, expr)| (name.into(), expr))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Expression)> {
        self.0.iter()
    }

    /// The vector with every rule reduced to `∅`: the automaton's sink.
    pub fn null_value(&self) -> ExpressionVector {
        ExpressionVector(
            self.0
                .iter()
                .map(|(name, _)| (name.clone(), Expression::null()))
                .collect(),
        )
    }

    /// Names of the rules accepting the empty string, in declaration order.
    pub fn nullable(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, expr)| expr.nullable())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Pointwise derivative, preserving names and order.
    pub fn derivative(&self, symbol: u32) -> ExpressionVector {
        ExpressionVector(
            self.0
                .iter()
                .map(|(name, expr)| (name.clone(), expr.derivative(symbol)))
                .collect(),
        )
    }

    pub fn derivative_classes(&self) -> BTreeSet<IntegerSet> {
        let mut classes: Option<BTreeSet<IntegerSet>> = None;
        for (_, expr) in &self.0 {
            let next = expr.derivative_classes();
            classes = Some(match classes {
                None => next,
                Some(acc) => product_intersections(&acc, &next),
            });
        }
        classes.unwrap_or_else(|| {
            let mut all = BTreeSet::new();
            all.insert(IntegerSet::codespace());
            all
        })
    }
}

/// A table-driven DFA over code-point ranges.
///
/// `transitions[s]` holds `(first, last, next)` triples sorted by `first`,
/// with pairwise disjoint ranges. `accepts[s]` lists the rules nullable in
/// state `s`, in declaration order. `error` is the sink state: no outgoing
/// transitions, no accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    pub transitions: Vec<Vec<(u32, u32, usize)>>,
    pub accepts: Vec<Vec<String>>,
    pub error: usize,
}

/// Compiles a rule vector into a DFA by exploring its dissimilar
/// derivatives.
///
/// State 0 is the initial vector. Rejects an empty vector, and rejects any
/// rule that matches the empty string: a lexer whose longest match can have
/// length zero cannot make progress.
pub fn construct(vector: &ExpressionVector) -> Result<Automaton, Error> {
    if vector.is_empty() {
        return Err(Error::InvalidArgument(
            "empty expression vector".to_string(),
        ));
    }
    if let Some(name) = vector.nullable().first() {
        return Err(Error::InvalidArgument(format!(
            "rule {:?} matches the empty string",
            name
        )));
    }

    let null_vector = vector.null_value();

    let mut states = HashMap::new();
    let mut order = vec![vector.clone()];
    let mut transitions: Vec<Vec<(u32, u32, usize)>> = vec![Vec::new()];
    states.insert(vector.clone(), 0);

    let mut stack = vec![vector.clone()];
    while let Some(state) = stack.pop() {
        // The null vector is the sink; no transitions leave it.
        if state == null_vector {
            continue;
        }
        let number = states[&state];

        for class in state.derivative_classes() {
            // Any representative will do: the whole class derives alike.
            let symbol = class.first().unwrap();
            let next = state.derivative(symbol);

            let nextnumber = match states.get(&next) {
                Some(&n) => n,
                None => {
                    let n = states.len();
                    states.insert(next.clone(), n);
                    transitions.push(Vec::new());
                    order.push(next.clone());
                    stack.push(next);
                    n
                }
            };

            for (first, last) in class.iter() {
                transitions[number].push((first, last, nextnumber));
            }
        }

        // Classes partition the code space, so ranges cannot overlap.
        transitions[number].sort();
    }

    let mut accepts: Vec<Vec<String>> = order.iter().map(|state| state.nullable()).collect();

    // The null vector is reached from any state on input no rule can
    // extend. A vector that can extend forever (a lone `.+`, say) never
    // derives to it, in which case it becomes an explicit dead state.
    let error = match states.get(&null_vector) {
        Some(&n) => n,
        None => {
            transitions.push(Vec::new());
            accepts.push(Vec::new());
            transitions.len() - 1
        }
    };

    Ok(Automaton {
        transitions,
        accepts,
        error,
    })
}

impl Automaton {
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// Emits the automaton as a Graphviz digraph, one edge per transition
    /// triple, accepting states doubled, the error state boxed.
    pub fn write_dot<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "digraph automaton {{")?;
        for (state, edges) in self.transitions.iter().enumerate() {
            for &(first, last, next) in edges {
                writeln!(
                    out,
                    "    state{} -> state{}[label=\"({},{})\"];",
                    state, next, first, last
                )?;
            }
            if let Some(name) = self.accepts[state].first() {
                writeln!(out, "    state{}[label=\"{}\", peripheries=2];", state, name)?;
            }
        }
        writeln!(out, "    state{}[label=\"error\", shape=box];", self.error)?;
        writeln!(out, "}}")
    }
}

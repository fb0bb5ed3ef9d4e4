use crate::error::Error;
use crate::utils::IntegerSet;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// An immutable regular expression over Unicode code points.
///
/// Every construction goes through a smart constructor that rewrites the
/// term into a canonical, similar-or-smaller form, so syntactically
/// different but similar expressions compare equal. That similarity is what
/// keeps the set of derivatives of any expression finite, and with it the
/// state space of [`construct`](crate::dfa::construct).
///
/// Subterms are shared through `Rc`, so cloning is cheap and repeated
/// differentiation builds a DAG rather than a tree.
#[derive(Clone)]
pub struct Expression(Rc<Node>);

struct Node {
    kind: Kind,
    // Whether the language contains the empty string. Filled in once when
    // the node is built, from the children's flags, so `nu` never recurses.
    nullable: bool,
}

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Kind {
    Epsilon,
    /// Any single code point in the set; the empty set is the empty
    /// language, distinct from [`Kind::Epsilon`].
    SymbolSet(IntegerSet),
    Star(Expression),
    Complement(Expression),
    Concatenation(Expression, Expression),
    Alternation(Expression, Expression),
    Conjunction(Expression, Expression),
}

impl Expression {
    fn node(kind: Kind, nullable: bool) -> Expression {
        Expression(Rc::new(Node { kind, nullable }))
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.0.kind
    }

    /// The empty string.
    pub fn epsilon() -> Expression {
        Expression::node(Kind::Epsilon, true)
    }

    /// The empty language, `∅`.
    pub fn null() -> Expression {
        Expression::symbols_unchecked(IntegerSet::new())
    }

    /// Any single code point, `Σ`.
    pub fn sigma() -> Expression {
        Expression::symbols_unchecked(IntegerSet::codespace())
    }

    /// Any single code point in `chars`.
    ///
    /// Rejects sets reaching past the Unicode code space.
    pub fn symbols(chars: IntegerSet) -> Result<Expression, Error> {
        if !IntegerSet::codespace().issuperset(&chars) {
            return Err(Error::InvalidArgument(
                "code point out of range".to_string(),
            ));
        }
        Ok(Expression::symbols_unchecked(chars))
    }

    pub(crate) fn symbols_unchecked(chars: IntegerSet) -> Expression {
        Expression::node(Kind::SymbolSet(chars), false)
    }

    fn is_epsilon(&self) -> bool {
        matches!(self.0.kind, Kind::Epsilon)
    }

    fn is_null(&self) -> bool {
        matches!(&self.0.kind, Kind::SymbolSet(s) if s.is_empty())
    }

    fn is_sigma(&self) -> bool {
        matches!(&self.0.kind, Kind::SymbolSet(s) if *s == IntegerSet::codespace())
    }

    /// Kleene closure.
    pub fn kleene(self) -> Expression {
        if let Kind::Star(_) = self.0.kind {
            return self;
        }
        if self.is_epsilon() || self.is_null() {
            return Expression::epsilon();
        }
        Expression::node(Kind::Star(self), true)
    }

    /// Language complement over `Σ*`.
    pub fn negate(self) -> Expression {
        match &self.0.kind {
            Kind::Complement(e) => return e.clone(),
            Kind::SymbolSet(s) => {
                return Expression::symbols_unchecked(IntegerSet::codespace().difference(s));
            }
            _ => {}
        }
        let nullable = !self.0.nullable;
        Expression::node(Kind::Complement(self), nullable)
    }

    /// Sequential composition.
    pub fn concatenate(self, other: Expression) -> Expression {
        // Cat(Cat(a, b), c) => Cat(a, Cat(b, c))
        if let Kind::Concatenation(a, b) = &self.0.kind {
            return a.clone().concatenate(b.clone().concatenate(other));
        }
        if self.is_null() || other.is_epsilon() {
            return self;
        }
        if other.is_null() || self.is_epsilon() {
            return other;
        }
        let nullable = self.0.nullable && other.0.nullable;
        Expression::node(Kind::Concatenation(self, other), nullable)
    }

    /// Union of languages.
    pub fn unite(self, other: Expression) -> Expression {
        // Two symbol sets fuse into one.
        if let (Kind::SymbolSet(a), Kind::SymbolSet(b)) = (&self.0.kind, &other.0.kind) {
            return Expression::symbols_unchecked(a.union(b));
        }

        // Flatten nested alternations, drop ∅, absorb on Σ, deduplicate.
        let mut terms = BTreeSet::new();
        let mut stack = vec![self, other];
        while let Some(expr) = stack.pop() {
            match &expr.0.kind {
                Kind::Alternation(l, r) => {
                    stack.push(l.clone());
                    stack.push(r.clone());
                }
                _ if expr.is_null() => {}
                _ if expr.is_sigma() => return Expression::sigma(),
                _ => {
                    terms.insert(expr);
                }
            }
        }

        match repair(terms, |l, r| {
            let nullable = l.0.nullable || r.0.nullable;
            Expression::node(Kind::Alternation(l, r), nullable)
        }) {
            Some(expr) => expr,
            None => Expression::null(),
        }
    }

    /// Intersection of languages.
    pub fn intersect(self, other: Expression) -> Expression {
        // Flatten nested conjunctions, absorb on ∅, drop Σ, deduplicate.
        let mut terms = BTreeSet::new();
        let mut stack = vec![self, other];
        while let Some(expr) = stack.pop() {
            match &expr.0.kind {
                Kind::Conjunction(l, r) => {
                    stack.push(l.clone());
                    stack.push(r.clone());
                }
                _ if expr.is_null() => return Expression::null(),
                _ if expr.is_sigma() => {}
                _ => {
                    terms.insert(expr);
                }
            }
        }

        match repair(terms, |l, r| {
            let nullable = l.0.nullable && r.0.nullable;
            Expression::node(Kind::Conjunction(l, r), nullable)
        }) {
            Some(expr) => expr,
            None => Expression::sigma(),
        }
    }

    /// Whether the language contains the empty string.
    pub fn nullable(&self) -> bool {
        self.0.nullable
    }

    /// The nullability witness: `ε` if the expression accepts the empty
    /// string, `∅` otherwise.
    pub fn nu(&self) -> Expression {
        if self.0.nullable {
            Expression::epsilon()
        } else {
            Expression::null()
        }
    }

    /// Parses the regex surface syntax into an expression.
    pub fn parse(pattern: &str) -> Result<Expression, Error> {
        crate::parser::parse(pattern)
    }
}

// Re-pairs flattened, deduplicated terms into a binary tree, folding in
// descending structural order so the result is canonical no matter how the
// input tree was shaped.
fn repair<F>(terms: BTreeSet<Expression>, mut pair: F) -> Option<Expression>
where
    F: FnMut(Expression, Expression) -> Expression,
{
    let mut terms = terms.into_iter().rev();
    let first = terms.next()?;
    Some(terms.fold(first, |acc, term| pair(acc, term)))
}

impl PartialEq for Expression {
    fn eq(&self, other: &Expression) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.kind == other.0.kind
    }
}

impl Eq for Expression {}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.kind.hash(state)
    }
}

impl PartialOrd for Expression {
    fn partial_cmp(&self, other: &Expression) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expression {
    fn cmp(&self, other: &Expression) -> Ordering {
        if Rc::ptr_eq(&self.0, &other.0) {
            Ordering::Equal
        } else {
            self.0.kind.cmp(&other.0.kind)
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.kind.fmt(f)
    }
}

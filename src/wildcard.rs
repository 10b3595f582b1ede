//! Wildcards: the named holes of a [`Pattern`][crate::pattern::Pattern].
//!
//! A wildcard is built with [`wc`] and refined with builder methods:
//!
//! ```
//! use rewrite_rs::types::Tag;
//! use rewrite_rs::wildcard::{wc, Mode};
//!
//! let c = wc("c").head(Tag::Scalar);
//! let rest = wc("rest").segment();
//! assert_eq!(c.mode(), Mode::Single);
//! assert!(rest.is_segment());
//! ```
//!
//! A wildcard accepts an expression when the expression passes *any* of its
//! head tests (or there are none) and the condition (if any) holds. Segment
//! wildcards apply the same test to every operand of the run they bind.

use std::fmt;
use std::sync::Arc;

use crate::expr::Expr;
use crate::manager::Manager;
use crate::types::{AlgebraId, Head, KindId, Tag};

/// A predicate on candidate expressions.
pub type Condition = Arc<dyn Fn(&Expr) -> bool + Send + Sync>;

/// One admissible head for a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadTest {
    /// Exact head, e.g. a specific kind or the zero of an algebra.
    Head(Head),
    /// Any expression of the algebra, including zero and identity.
    Algebra(AlgebraId),
    /// Any expression with the tag.
    Tag(Tag),
}

impl From<Head> for HeadTest {
    fn from(head: Head) -> Self {
        HeadTest::Head(head)
    }
}

impl From<KindId> for HeadTest {
    fn from(kind: KindId) -> Self {
        HeadTest::Head(Head::Kind(kind))
    }
}

impl From<AlgebraId> for HeadTest {
    fn from(algebra: AlgebraId) -> Self {
        HeadTest::Algebra(algebra)
    }
}

impl From<Tag> for HeadTest {
    fn from(tag: Tag) -> Self {
        HeadTest::Tag(tag)
    }
}

impl HeadTest {
    fn accepts(self, manager: &Manager, expr: &Expr) -> bool {
        match self {
            HeadTest::Head(head) => expr.head() == head,
            HeadTest::Algebra(algebra) => manager.algebra_of(expr) == Some(algebra),
            HeadTest::Tag(tag) => expr.tag() == tag,
        }
    }
}

/// How many operands a wildcard binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Exactly one expression.
    Single,
    /// A non-empty run of operands.
    OneOrMore,
    /// A possibly empty run of operands.
    ZeroOrMore,
}

impl Mode {
    /// The shortest run the mode accepts.
    pub fn min_len(self) -> usize {
        match self {
            Mode::Single | Mode::OneOrMore => 1,
            Mode::ZeroOrMore => 0,
        }
    }
}

/// A named pattern hole.
#[derive(Clone)]
pub struct Wildcard {
    name: String,
    heads: Vec<HeadTest>,
    condition: Option<Condition>,
    mode: Mode,
}

/// Creates an unconstrained single wildcard.
pub fn wc(name: &str) -> Wildcard {
    Wildcard {
        name: name.to_string(),
        heads: Vec::new(),
        condition: None,
        mode: Mode::Single,
    }
}

impl Wildcard {
    /// Adds an admissible head. Several calls widen the constraint.
    pub fn head(mut self, test: impl Into<HeadTest>) -> Self {
        self.heads.push(test.into());
        self
    }

    pub fn condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&Expr) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(f));
        self
    }

    /// Binds a non-empty run of operands.
    pub fn segment(mut self) -> Self {
        self.mode = Mode::OneOrMore;
        self
    }

    /// Binds a possibly empty run of operands.
    pub fn optional_segment(mut self) -> Self {
        self.mode = Mode::ZeroOrMore;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn heads(&self) -> &[HeadTest] {
        &self.heads
    }

    pub fn is_segment(&self) -> bool {
        self.mode != Mode::Single
    }

    /// Whether `expr` passes the head constraint and the condition.
    pub fn accepts(&self, manager: &Manager, expr: &Expr) -> bool {
        if !self.heads.is_empty() && !self.heads.iter().any(|t| t.accepts(manager, expr)) {
            return false;
        }
        match &self.condition {
            Some(condition) => condition(expr),
            None => true,
        }
    }

    /// Two occurrences of one name must declare the same constraints.
    ///
    /// Conditions are compared by identity, so a repeated wildcard should
    /// be cloned rather than rebuilt with an equivalent closure.
    pub(crate) fn same_constraints(&self, other: &Wildcard) -> bool {
        let same_condition = match (&self.condition, &other.condition) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.name == other.name
            && self.mode == other.mode
            && self.heads == other.heads
            && same_condition
    }
}

impl fmt::Debug for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wildcard")
            .field("name", &self.name)
            .field("heads", &self.heads)
            .field("condition", &self.condition.is_some())
            .field("mode", &self.mode)
            .finish()
    }
}

impl fmt::Display for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.mode {
            Mode::Single => "_",
            Mode::OneOrMore => "__",
            Mode::ZeroOrMore => "___",
        };
        write!(f, "{}{}", self.name, suffix)
    }
}

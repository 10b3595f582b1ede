//! Type-safe identifiers for algebras, node kinds and expression heads.
//!
//! Algebras and kinds are registered in a [`Manager`][crate::manager::Manager]
//! and referred to by small copyable ids. Ids are only meaningful for the
//! manager that issued them.
use std::fmt;

/// An algebra identifier (0-indexed, in registration order).
///
/// An algebra owns its `Zero` and `Identity` singletons and groups the symbols
/// and node kinds that produce values of the same sort (operators, states,
/// circuits, ...).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AlgebraId(u32);

impl AlgebraId {
    pub(crate) fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "Too many algebras");
        AlgebraId(index as u32)
    }

    /// Returns the raw index of the algebra.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AlgebraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// A node-kind identifier (0-indexed, in registration order).
///
/// # Invariants
///
/// - A kind id always refers to a kind registered in the issuing manager
/// - The arity of a kind never changes after registration
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct KindId(u32);

impl KindId {
    pub(crate) fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "Too many kinds");
        KindId(index as u32)
    }

    /// Returns the raw index of the kind.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "K{}", self.0)
    }
}

/// The coarse variant tag of an expression.
///
/// The declaration order is the first component of the canonical sort key:
/// scalars sort before singletons, singletons before symbols, and so on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Tag {
    Scalar,
    Zero,
    Identity,
    Symbol,
    Unary,
    Binary,
    NAry,
}

impl Tag {
    /// All tags, in canonical order.
    pub const ALL: [Tag; 7] = [
        Tag::Scalar,
        Tag::Zero,
        Tag::Identity,
        Tag::Symbol,
        Tag::Unary,
        Tag::Binary,
        Tag::NAry,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Scalar => "Scalar",
            Tag::Zero => "Zero",
            Tag::Identity => "Identity",
            Tag::Symbol => "Symbol",
            Tag::Unary => "Unary",
            Tag::Binary => "Binary",
            Tag::NAry => "NAry",
        };
        f.write_str(name)
    }
}

/// The precise head of an expression: its tag, refined by kind for composite
/// nodes and by algebra for singletons and symbols.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Head {
    Scalar,
    Zero(AlgebraId),
    Identity(AlgebraId),
    Symbol(AlgebraId),
    Kind(KindId),
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Head::Scalar => write!(f, "Scalar"),
            Head::Zero(a) => write!(f, "Zero[{}]", a),
            Head::Identity(a) => write!(f, "Identity[{}]", a),
            Head::Symbol(a) => write!(f, "Symbol[{}]", a),
            Head::Kind(k) => write!(f, "{}", k),
        }
    }
}

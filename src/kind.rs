//! Node-kind descriptors.
//!
//! A kind is the "head" of a composite expression: operator sum, operator
//! product, commutator, adjoint, circuit concatenation, ... The engine knows
//! nothing about what a kind means. Everything the canonicaliser needs is
//! declared here, once, when an algebra registers its kinds.
//!
//! # Example
//!
//! ```
//! use rewrite_rs::kind::{Combine, KindSpec, Notation};
//! use rewrite_rs::manager::Manager;
//!
//! let mut mgr = Manager::new();
//! let op = mgr.register_algebra("Operator");
//! let times = mgr
//!     .register_kind(KindSpec::nary("OperatorTimes", op).combine(Combine::Multiply))
//!     .unwrap();
//! let plus = mgr
//!     .register_kind(
//!         KindSpec::nary("OperatorPlus", op)
//!             .commutative()
//!             .combine(Combine::Add { scale: times })
//!             .notation(Notation::infix(" + ")),
//!     )
//!     .unwrap();
//! assert!(mgr.kind(plus).is_commutative());
//! ```

use crate::types::{AlgebraId, KindId};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Arity {
    Unary,
    Binary,
    NAry,
}

impl Arity {
    /// The fixed operand count, if any.
    pub fn fixed(self) -> Option<usize> {
        match self {
            Arity::Unary => Some(1),
            Arity::Binary => Some(2),
            Arity::NAry => None,
        }
    }
}

/// How an n-ary kind merges scalar coefficients.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Combine {
    /// No coefficient handling.
    None,
    /// Scalar factors multiply into one leading coefficient. `Identity` is the
    /// unit and `Zero` annihilates.
    Multiply,
    /// Like terms merge by adding their coefficients, expressed through the
    /// multiplicative kind `scale`. `Zero` is the unit.
    Add { scale: KindId },
}

/// A singleton of the kind's own algebra.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Element {
    Zero,
    Identity,
}

/// Which algebras operands must belong to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Domain {
    /// Operands belong to the kind's own algebra.
    Own,
    /// Any algebra is accepted.
    Any,
    /// One algebra per operand position (unary and binary kinds only).
    Positional(Vec<AlgebraId>),
}

/// How [`Manager::render`][crate::manager::Manager::render] prints a kind.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Notation {
    /// `a <op> b <op> c`
    Infix(String),
    /// `name(a, b)`
    Function(String),
    /// `a<op>`
    Postfix(String),
    /// `[a, b]`
    Bracket,
}

impl Notation {
    pub fn infix(op: &str) -> Self {
        Notation::Infix(op.to_string())
    }
    pub fn function(name: &str) -> Self {
        Notation::Function(name.to_string())
    }
    pub fn postfix(op: &str) -> Self {
        Notation::Postfix(op.to_string())
    }
}

/// Declaration of a node kind.
#[derive(Debug, Clone)]
pub struct KindSpec {
    pub(crate) name: String,
    pub(crate) algebra: AlgebraId,
    pub(crate) arity: Arity,
    pub(crate) commutative: bool,
    pub(crate) combine: Combine,
    pub(crate) unit: Option<Element>,
    pub(crate) absorbing: Option<Element>,
    pub(crate) involutive: bool,
    pub(crate) scalars: Option<bool>,
    pub(crate) domain: Domain,
    pub(crate) notation: Notation,
}

impl KindSpec {
    fn new(name: &str, algebra: AlgebraId, arity: Arity) -> Self {
        Self {
            name: name.to_string(),
            algebra,
            arity,
            commutative: false,
            combine: Combine::None,
            unit: None,
            absorbing: None,
            involutive: false,
            scalars: None,
            domain: Domain::Own,
            notation: Notation::function(name),
        }
    }

    pub fn unary(name: &str, algebra: AlgebraId) -> Self {
        Self::new(name, algebra, Arity::Unary)
    }

    pub fn binary(name: &str, algebra: AlgebraId) -> Self {
        Self::new(name, algebra, Arity::Binary)
    }

    pub fn nary(name: &str, algebra: AlgebraId) -> Self {
        Self::new(name, algebra, Arity::NAry)
    }

    pub fn commutative(mut self) -> Self {
        self.commutative = true;
        self
    }

    pub fn combine(mut self, combine: Combine) -> Self {
        self.combine = combine;
        self
    }

    /// Sets the unit element (dropped from operand lists; result of an empty node).
    pub fn unit(mut self, element: Element) -> Self {
        self.unit = Some(element);
        self
    }

    /// Sets the absorbing element (short-circuits the whole node).
    pub fn absorbing(mut self, element: Element) -> Self {
        self.absorbing = Some(element);
        self
    }

    /// `K(K(x)) = x`.
    pub fn involutive(mut self) -> Self {
        self.involutive = true;
        self
    }

    /// Overrides whether bare scalars are legal operands.
    pub fn scalars(mut self, accept: bool) -> Self {
        self.scalars = Some(accept);
        self
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn algebra(&self) -> AlgebraId {
        self.algebra
    }
    pub fn arity(&self) -> Arity {
        self.arity
    }
    pub fn is_commutative(&self) -> bool {
        self.commutative
    }
    pub fn combine_mode(&self) -> Combine {
        self.combine
    }
    pub fn is_involutive(&self) -> bool {
        self.involutive
    }
    pub fn operand_domain(&self) -> &Domain {
        &self.domain
    }
    pub fn notation_style(&self) -> &Notation {
        &self.notation
    }

    /// The unit element, explicit or implied by the combine mode.
    pub fn unit_element(&self) -> Option<Element> {
        self.unit.or(match self.combine {
            Combine::None => None,
            Combine::Multiply => Some(Element::Identity),
            Combine::Add { .. } => Some(Element::Zero),
        })
    }

    /// The absorbing element, explicit or implied by the combine mode.
    pub fn absorbing_element(&self) -> Option<Element> {
        self.absorbing.or(match self.combine {
            Combine::Multiply => Some(Element::Zero),
            _ => None,
        })
    }

    /// Whether bare scalar operands are legal. Defaults to `true` exactly for
    /// the coefficient-merging kinds.
    pub fn accepts_scalars(&self) -> bool {
        self.scalars
            .unwrap_or(!matches!(self.combine, Combine::None))
    }

    /// The algebra required at operand position `index`, or `None` if any is accepted.
    pub fn operand_algebra(&self, index: usize) -> Option<AlgebraId> {
        match &self.domain {
            Domain::Own => Some(self.algebra),
            Domain::Any => None,
            Domain::Positional(algebras) => algebras.get(index).copied(),
        }
    }

    /// Checks the declaration for internal consistency.
    ///
    /// Cross-kind checks (the `scale` kind of [`Combine::Add`]) are done by the
    /// manager at registration time.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("kind name should not be empty".to_string());
        }
        if self.arity != Arity::NAry {
            if self.commutative {
                return Err("only n-ary kinds can be commutative".to_string());
            }
            if self.combine != Combine::None {
                return Err("only n-ary kinds can merge coefficients".to_string());
            }
            if self.unit.is_some() || self.absorbing.is_some() {
                return Err("only n-ary kinds have unit or absorbing elements".to_string());
            }
        }
        if self.involutive && self.arity != Arity::Unary {
            return Err("only unary kinds can be involutive".to_string());
        }
        if let Domain::Positional(algebras) = &self.domain {
            match self.arity.fixed() {
                Some(n) if n == algebras.len() => {}
                Some(n) => {
                    return Err(format!(
                        "positional domain lists {} algebras for {} operands",
                        algebras.len(),
                        n
                    ))
                }
                None => return Err("n-ary kinds cannot have a positional domain".to_string()),
            }
        }
        if self.unit.is_some() && self.unit == self.absorbing {
            return Err("unit and absorbing elements should differ".to_string());
        }
        Ok(())
    }
}

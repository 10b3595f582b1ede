//! The expression manager.
//!
//! # Overview
//!
//! All expressions are built through a [`Manager`]. It owns:
//!
//! - the registry of **algebras** (sorts of values: operators, states, circuits, ...),
//! - the registry of **kinds** (composite node heads, see [`KindSpec`]),
//! - the interning **cache** ([`ExprCache`]) that shares identical canonical shapes.
//!
//! Registration needs `&mut Manager` and happens once, when an algebra is set
//! up. Afterwards the manager is only used through `&Manager`: constructors,
//! matching and simplification never mutate the registries, and the cache is
//! internally synchronized, so one manager can serve several threads.
//!
//! # Construction
//!
//! Leaves are built by [`scalar`](Manager::scalar), [`symbol`](Manager::symbol),
//! [`zero`](Manager::zero) and [`identity`](Manager::identity). Composite
//! nodes are built by [`create`](Manager::create), which always runs the
//! canonicalizer (see the [`canonical`][crate::canonical] module). There is no
//! public way to build a non-canonical composite node.
//!
//! ```
//! use rewrite_rs::kind::{Combine, KindSpec};
//! use rewrite_rs::manager::Manager;
//!
//! let mut mgr = Manager::new();
//! let op = mgr.register_algebra("Operator");
//! let times = mgr
//!     .register_kind(KindSpec::nary("OperatorTimes", op).combine(Combine::Multiply))
//!     .unwrap();
//!
//! let a = mgr.symbol("A", op).unwrap();
//! let one = mgr.identity(op);
//! // A * 1 == A
//! assert_eq!(mgr.create(times, [a.clone(), one]).unwrap(), a);
//! ```

use std::collections::HashMap;

use log::debug;

use crate::cache::ExprCache;
use crate::error::{Error, Result};
use crate::expr::{Attributes, Expr, ExprData};
use crate::kind::{Arity, Combine, Domain, Element, KindSpec};
use crate::scalar::Scalar;
use crate::types::{AlgebraId, KindId};

/// Configuration options for a [`Manager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Share identical canonical shapes through the interning cache (default: true).
    pub interning: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self { interning: true }
    }
}

/// The expression manager: owns the registries and the interning cache.
pub struct Manager {
    config: ManagerConfig,
    algebras: Vec<String>,
    kinds: Vec<KindSpec>,
    cache: ExprCache,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("algebras", &self.algebras.len())
            .field("kinds", &self.kinds.len())
            .field("cache", &self.cache)
            .finish()
    }
}

impl Manager {
    // ========================================================================
    // Construction
    // ========================================================================

    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        let cache = ExprCache::new(config.interning);
        Self {
            config,
            algebras: Vec::new(),
            kinds: Vec::new(),
            cache,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn cache(&self) -> &ExprCache {
        &self.cache
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Registers a new algebra.
    pub fn register_algebra(&mut self, name: &str) -> AlgebraId {
        let id = AlgebraId::new(self.algebras.len());
        debug!("register algebra {} = {}", name, id);
        self.algebras.push(name.to_string());
        id
    }

    /// Registers a new kind after validating its declaration.
    pub fn register_kind(&mut self, spec: KindSpec) -> Result<KindId> {
        let invalid = |reason: String| Error::InvalidKind {
            name: spec.name.clone(),
            reason,
        };

        spec.check().map_err(invalid)?;
        self.try_algebra_name(spec.algebra)?;
        if let Domain::Positional(algebras) = &spec.domain {
            for &algebra in algebras {
                self.try_algebra_name(algebra)?;
            }
        }
        if self.find_kind(&spec.name).is_some() {
            return Err(invalid("a kind with this name is already registered".to_string()));
        }
        if let Combine::Add { scale } = spec.combine {
            let scale_spec = self.try_kind(scale)?;
            if scale_spec.combine != Combine::Multiply || scale_spec.arity != Arity::NAry {
                return Err(invalid(format!(
                    "scale kind '{}' does not multiply coefficients",
                    scale_spec.name
                )));
            }
            if scale_spec.algebra != spec.algebra {
                return Err(invalid(format!(
                    "scale kind '{}' belongs to another algebra",
                    scale_spec.name
                )));
            }
        }

        let id = KindId::new(self.kinds.len());
        debug!("register kind {} = {}", spec.name, id);
        self.kinds.push(spec);
        Ok(id)
    }

    pub fn num_algebras(&self) -> usize {
        self.algebras.len()
    }

    pub fn num_kinds(&self) -> usize {
        self.kinds.len()
    }

    /// The name of an algebra.
    ///
    /// # Panics
    ///
    /// Panics if `algebra` was not issued by this manager.
    pub fn algebra_name(&self, algebra: AlgebraId) -> &str {
        &self.algebras[algebra.index()]
    }

    pub fn try_algebra_name(&self, algebra: AlgebraId) -> Result<&str> {
        self.algebras
            .get(algebra.index())
            .map(String::as_str)
            .ok_or(Error::UnknownAlgebra(algebra))
    }

    /// The declaration of a kind.
    ///
    /// # Panics
    ///
    /// Panics if `kind` was not issued by this manager.
    pub fn kind(&self, kind: KindId) -> &KindSpec {
        &self.kinds[kind.index()]
    }

    pub fn try_kind(&self, kind: KindId) -> Result<&KindSpec> {
        self.kinds.get(kind.index()).ok_or(Error::UnknownKind(kind))
    }

    pub fn find_kind(&self, name: &str) -> Option<KindId> {
        self.kinds
            .iter()
            .position(|k| k.name == name)
            .map(KindId::new)
    }

    // ========================================================================
    // Leaves
    // ========================================================================

    pub(crate) fn raw(&self, data: ExprData) -> Expr {
        self.cache.get_or_create(data)
    }

    pub fn scalar(&self, value: impl Into<Scalar>) -> Expr {
        self.raw(ExprData::Scalar(value.into()))
    }

    pub fn zero(&self, algebra: AlgebraId) -> Expr {
        assert!(algebra.index() < self.algebras.len(), "Unknown algebra {}", algebra);
        self.raw(ExprData::Zero(algebra))
    }

    pub fn identity(&self, algebra: AlgebraId) -> Expr {
        assert!(algebra.index() < self.algebras.len(), "Unknown algebra {}", algebra);
        self.raw(ExprData::Identity(algebra))
    }

    /// The singleton `element` of `algebra`.
    pub fn element(&self, algebra: AlgebraId, element: Element) -> Expr {
        match element {
            Element::Zero => self.zero(algebra),
            Element::Identity => self.identity(algebra),
        }
    }

    pub(crate) fn is_element(&self, expr: &Expr, algebra: AlgebraId, element: Element) -> bool {
        match (expr.data(), element) {
            (ExprData::Zero(a), Element::Zero) => *a == algebra,
            (ExprData::Identity(a), Element::Identity) => *a == algebra,
            _ => false,
        }
    }

    pub fn symbol(&self, name: &str, algebra: AlgebraId) -> Result<Expr> {
        self.symbol_with(name, algebra, Attributes::new())
    }

    pub fn symbol_with(&self, name: &str, algebra: AlgebraId, attributes: Attributes) -> Result<Expr> {
        if name.is_empty() {
            return Err(Error::type_constraint("Symbol", "symbol name should not be empty"));
        }
        self.try_algebra_name(algebra)?;
        Ok(self.raw(ExprData::Symbol {
            name: name.into(),
            algebra,
            attributes,
        }))
    }

    // ========================================================================
    // Composite nodes
    // ========================================================================

    /// Builds the canonical node `kind(operands...)`.
    pub fn create<I>(&self, kind: KindId, operands: I) -> Result<Expr>
    where
        I: IntoIterator<Item = Expr>,
    {
        self.canonicalize(kind, operands.into_iter().collect())
    }

    pub fn unary(&self, kind: KindId, operand: Expr) -> Result<Expr> {
        self.create(kind, [operand])
    }

    pub fn binary(&self, kind: KindId, left: Expr, right: Expr) -> Result<Expr> {
        self.create(kind, [left, right])
    }

    /// `c * x` through the multiplicative kind `times`.
    pub fn scale(&self, times: KindId, c: impl Into<Scalar>, x: Expr) -> Result<Expr> {
        let c = self.scalar(c);
        self.create(times, [c, x])
    }

    /// `-x` through the multiplicative kind `times`.
    pub fn neg(&self, times: KindId, x: Expr) -> Result<Expr> {
        self.scale(times, -1, x)
    }

    /// `a - b` through the additive kind `plus`.
    pub fn sub(&self, plus: KindId, a: Expr, b: Expr) -> Result<Expr> {
        let times = match self.try_kind(plus)?.combine {
            Combine::Add { scale } => scale,
            _ => {
                return Err(Error::type_constraint(
                    &self.kind(plus).name,
                    "subtraction needs a coefficient-adding kind",
                ))
            }
        };
        let minus_b = self.neg(times, b)?;
        self.create(plus, [a, minus_b])
    }

    /// Rebuilds `expr` with new operands, reusing `expr` when nothing changed.
    pub fn rebuild(&self, expr: &Expr, operands: Vec<Expr>) -> Result<Expr> {
        let unchanged = operands.len() == expr.operands().len()
            && operands.iter().zip(expr.operands()).all(|(a, b)| a.ptr_eq(b));
        if unchanged {
            return Ok(expr.clone());
        }
        match expr.kind() {
            Some(kind) => self.create(kind, operands),
            None => Ok(expr.clone()),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The algebra an expression belongs to; `None` for scalars.
    pub fn algebra_of(&self, expr: &Expr) -> Option<AlgebraId> {
        match expr.data() {
            ExprData::Scalar(_) => None,
            ExprData::Zero(a) | ExprData::Identity(a) => Some(*a),
            ExprData::Symbol { algebra, .. } => Some(*algebra),
            ExprData::Unary { kind, .. }
            | ExprData::Binary { kind, .. }
            | ExprData::NAry { kind, .. } => Some(self.kind(*kind).algebra),
        }
    }

    /// Replaces every occurrence of a key of `map` by its value, bottom-up,
    /// re-canonicalizing every rebuilt node. Replacements are not searched again.
    pub fn substitute(&self, expr: &Expr, map: &HashMap<Expr, Expr>) -> Result<Expr> {
        // Post-order traversal with an explicit stack: (node, children done?).
        let mut stack: Vec<(&Expr, bool)> = vec![(expr, false)];
        let mut results: Vec<Expr> = Vec::new();

        while let Some((node, expanded)) = stack.pop() {
            if let Some(replacement) = map.get(node) {
                results.push(replacement.clone());
                continue;
            }
            if node.is_leaf() {
                results.push(node.clone());
                continue;
            }
            if !expanded {
                stack.push((node, true));
                for operand in node.operands().iter().rev() {
                    stack.push((operand, false));
                }
                continue;
            }
            let n = node.operands().len();
            let operands = results.split_off(results.len() - n);
            results.push(self.rebuild(node, operands)?);
        }

        assert_eq!(results.len(), 1);
        Ok(results.pop().expect("one result"))
    }
}

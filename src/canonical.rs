//! The canonicalizer.
//!
//! Every composite node is built by [`Manager::canonicalize`], which turns a
//! kind and a raw operand list into the unique canonical expression:
//!
//! 1. **Type check**: arity, operand algebras and scalar operands against the
//!    [`KindSpec`][crate::kind::KindSpec]. Violations are
//!    [`Error::TypeConstraint`], so ill-typed nodes never exist.
//! 2. **Flatten**: nested nodes of the same n-ary kind are spliced into the parent.
//! 3. **Absorb**: unit elements are dropped; an absorbing element short-circuits.
//! 4. **Merge coefficients**: multiplicative kinds fold all scalar factors
//!    into one leading coefficient; additive kinds merge like terms by adding
//!    their coefficients.
//! 5. **Sort**: operands of commutative kinds are stably sorted by the
//!    canonical order of [`Expr`].
//! 6. **Collapse**: a single remaining operand replaces the node; an empty
//!    node becomes the kind's unit.
//!
//! The result is then shared through the interning cache. The procedure is
//! idempotent: feeding the operands of a canonical node back in reproduces
//! that node.

use std::collections::HashMap;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::expr::{Expr, ExprData};
use crate::kind::{Arity, Combine, Element, KindSpec};
use crate::manager::Manager;
use crate::scalar::Scalar;
use crate::types::KindId;
use num_traits::{One, Zero};

impl Manager {
    pub(crate) fn canonicalize(&self, kind: KindId, operands: Vec<Expr>) -> Result<Expr> {
        let spec = self.try_kind(kind)?;
        trace!("canonicalize {}({} operands)", spec.name, operands.len());

        self.check_operands(spec, &operands)?;

        match spec.arity {
            Arity::Unary => {
                let [operand]: [Expr; 1] = operands.try_into().map_err(|_| {
                    Error::type_constraint(&spec.name, "unary kind needs one operand")
                })?;
                if spec.involutive && operand.kind() == Some(kind) {
                    debug!("canonicalize: {} is involutive", spec.name);
                    return Ok(operand.operands()[0].clone());
                }
                Ok(self.raw(ExprData::Unary {
                    kind,
                    operand: [operand],
                }))
            }
            Arity::Binary => {
                let operands: [Expr; 2] = operands.try_into().map_err(|_| {
                    Error::type_constraint(&spec.name, "binary kind needs two operands")
                })?;
                Ok(self.raw(ExprData::Binary { kind, operands }))
            }
            Arity::NAry => {
                let flat = flatten(kind, operands);
                match spec.combine {
                    Combine::Multiply => self.canonicalize_product(kind, spec, flat),
                    Combine::Add { scale } => self.canonicalize_sum(kind, spec, scale, flat),
                    Combine::None => self.canonicalize_plain(kind, spec, flat),
                }
            }
        }
    }

    fn check_operands(&self, spec: &KindSpec, operands: &[Expr]) -> Result<()> {
        if let Some(n) = spec.arity.fixed() {
            if operands.len() != n {
                return Err(Error::type_constraint(
                    &spec.name,
                    format!("expected {} operands, got {}", n, operands.len()),
                ));
            }
        }
        for (i, operand) in operands.iter().enumerate() {
            match self.algebra_of(operand) {
                None => {
                    if !spec.accepts_scalars() {
                        return Err(Error::type_constraint(
                            &spec.name,
                            format!("scalar operand {} is not accepted", operand),
                        ));
                    }
                }
                Some(algebra) => {
                    if let Some(expected) = spec.operand_algebra(i) {
                        if algebra != expected {
                            return Err(Error::type_constraint(
                                &spec.name,
                                format!(
                                    "operand {} belongs to '{}', expected '{}'",
                                    i,
                                    self.algebra_name(algebra),
                                    self.algebra_name(expected)
                                ),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Collapses an operand list that is otherwise final.
    fn collapse(&self, kind: KindId, spec: &KindSpec, mut operands: Vec<Expr>) -> Result<Expr> {
        if spec.commutative {
            operands.sort();
        }
        match operands.len() {
            0 => match spec.unit_element() {
                Some(unit) => Ok(self.element(spec.algebra, unit)),
                None => Err(Error::type_constraint(
                    &spec.name,
                    "empty node and the kind has no unit",
                )),
            },
            1 => Ok(operands.pop().expect("one operand")),
            _ => Ok(self.raw(ExprData::NAry { kind, operands })),
        }
    }

    fn canonicalize_plain(&self, kind: KindId, spec: &KindSpec, flat: Vec<Expr>) -> Result<Expr> {
        let mut operands = Vec::with_capacity(flat.len());
        for operand in flat {
            if let Some(absorbing) = spec.absorbing {
                if self.is_element(&operand, spec.algebra, absorbing) {
                    debug!("canonicalize: {} absorbed by {:?}", spec.name, absorbing);
                    return Ok(operand);
                }
            }
            if let Some(unit) = spec.unit {
                if self.is_element(&operand, spec.algebra, unit) {
                    continue;
                }
            }
            operands.push(operand);
        }
        self.collapse(kind, spec, operands)
    }

    fn canonicalize_product(&self, kind: KindId, spec: &KindSpec, flat: Vec<Expr>) -> Result<Expr> {
        let unit = spec.unit_element().unwrap_or(Element::Identity);
        let absorbing = spec.absorbing_element().unwrap_or(Element::Zero);

        let mut coeff = Scalar::one();
        let mut factors = Vec::with_capacity(flat.len());
        for operand in flat {
            if let Some(value) = operand.as_scalar() {
                coeff = &coeff * value;
            } else if self.is_element(&operand, spec.algebra, absorbing) {
                debug!("canonicalize: {} absorbed by {:?}", spec.name, absorbing);
                return Ok(operand);
            } else if !self.is_element(&operand, spec.algebra, unit) {
                factors.push(operand);
            }
        }

        if coeff.is_zero() {
            debug!("canonicalize: {} has zero coefficient", spec.name);
            return Ok(self.element(spec.algebra, absorbing));
        }
        if factors.is_empty() {
            if coeff.is_one() {
                return Ok(self.element(spec.algebra, unit));
            }
            // `c * 1` keeps the unit, so the product stays in its algebra.
            factors.push(self.element(spec.algebra, unit));
        }
        if spec.commutative {
            factors.sort();
        }
        if !coeff.is_one() {
            factors.insert(0, self.scalar(coeff));
        }
        match factors.len() {
            1 => Ok(factors.pop().expect("one factor")),
            _ => Ok(self.raw(ExprData::NAry {
                kind,
                operands: factors,
            })),
        }
    }

    /// Splits a term into `(coefficient, rest)` with respect to the scale kind.
    fn split_coefficient(&self, scale: KindId, term: Expr) -> Result<(Scalar, Expr)> {
        if let Some(value) = term.as_scalar() {
            let spec = self.kind(scale);
            return Ok((value.clone(), self.element(spec.algebra, Element::Identity)));
        }
        if term.kind() == Some(scale) {
            if let Some((first, rest)) = term.operands().split_first() {
                if let Some(value) = first.as_scalar() {
                    let rest = self.create(scale, rest.iter().cloned())?;
                    return Ok((value.clone(), rest));
                }
            }
        }
        Ok((Scalar::one(), term))
    }

    fn canonicalize_sum(
        &self,
        kind: KindId,
        spec: &KindSpec,
        scale: KindId,
        flat: Vec<Expr>,
    ) -> Result<Expr> {
        let unit = spec.unit_element().unwrap_or(Element::Zero);

        // Like terms, in order of first appearance.
        let mut terms: Vec<(Expr, Scalar)> = Vec::with_capacity(flat.len());
        let mut index: HashMap<Expr, usize> = HashMap::new();
        for operand in flat {
            if let Some(absorbing) = spec.absorbing {
                if self.is_element(&operand, spec.algebra, absorbing) {
                    return Ok(operand);
                }
            }
            if self.is_element(&operand, spec.algebra, unit) {
                continue;
            }
            let (coeff, rest) = self.split_coefficient(scale, operand)?;
            match index.get(&rest) {
                Some(&i) => {
                    let merged = &terms[i].1 + &coeff;
                    terms[i].1 = merged;
                }
                None => {
                    index.insert(rest.clone(), terms.len());
                    terms.push((rest, coeff));
                }
            }
        }

        let mut operands = Vec::with_capacity(terms.len());
        let mut nested = false;
        for (rest, coeff) in terms {
            if coeff.is_zero() {
                trace!("canonicalize: term {} cancels", rest);
                continue;
            }
            let term = if coeff.is_one() {
                rest
            } else {
                self.create(scale, [self.scalar(coeff), rest])?
            };
            nested |= term.kind() == Some(kind);
            operands.push(term);
        }

        if nested {
            // A merged coefficient of one exposed a nested sum.
            return self.canonicalize(kind, operands);
        }
        self.collapse(kind, spec, operands)
    }
}

/// Splices nested operands of the same kind into the operand list.
fn flatten(kind: KindId, operands: Vec<Expr>) -> Vec<Expr> {
    if operands.iter().all(|e| e.kind() != Some(kind)) {
        return operands;
    }
    let mut flat = Vec::with_capacity(operands.len());
    for operand in operands {
        if operand.kind() == Some(kind) {
            flat.extend(operand.operands().iter().cloned());
        } else {
            flat.push(operand);
        }
    }
    flat
}

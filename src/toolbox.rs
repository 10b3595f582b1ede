//! Ready-made rule sets for operator algebras.
//!
//! The engine knows nothing about commutators or distributivity; these
//! factories express them through the pattern API for any algebra that
//! registers the matching kinds:
//!
//! - a multiplicative n-ary `product` kind ([`Combine::Multiply`]),
//! - an additive n-ary `sum` kind ([`Combine::Add`] over `product`),
//! - a binary `commutator` kind.
//!
//! ```
//! use rewrite_rs::kind::{Combine, KindSpec, Notation};
//! use rewrite_rs::manager::Manager;
//! use rewrite_rs::toolbox;
//!
//! let mut mgr = Manager::new();
//! let op = mgr.register_algebra("Operator");
//! let times = mgr
//!     .register_kind(KindSpec::nary("OperatorTimes", op).combine(Combine::Multiply).notation(Notation::infix(" * ")))
//!     .unwrap();
//! let plus = mgr
//!     .register_kind(
//!         KindSpec::nary("OperatorPlus", op)
//!             .commutative()
//!             .combine(Combine::Add { scale: times })
//!             .notation(Notation::infix(" + ")),
//!     )
//!     .unwrap();
//! let comm = mgr
//!     .register_kind(KindSpec::binary("Commutator", op).notation(Notation::Bracket))
//!     .unwrap();
//!
//! let a = mgr.symbol("A", op).unwrap();
//! let b = mgr.symbol("B", op).unwrap();
//! let ab = mgr.binary(comm, a, b).unwrap();
//! let evaluated = toolbox::evaluate_commutators(&mgr, &ab, comm, times, plus).unwrap();
//! assert_eq!(mgr.render(&evaluated), "A * B - B * A");
//! ```

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::kind::Combine;
use crate::manager::Manager;
use crate::matcher::Bindings;
use crate::pattern::Pattern;
use crate::rule::Rule;
use crate::ruleset::RuleSet;
use crate::types::{KindId, Tag};
use crate::wildcard::wc;

/// Checks that `product` multiplies and `sum` adds through `product`.
fn check_ring(manager: &Manager, product: KindId, sum: KindId) -> Result<()> {
    let product_spec = manager.try_kind(product)?;
    if product_spec.combine_mode() != Combine::Multiply {
        return Err(Error::InvalidKind {
            name: product_spec.name().to_string(),
            reason: "expected a multiplicative kind".to_string(),
        });
    }
    let sum_spec = manager.try_kind(sum)?;
    if sum_spec.combine_mode() != (Combine::Add { scale: product }) {
        return Err(Error::InvalidKind {
            name: sum_spec.name().to_string(),
            reason: format!("expected an additive kind scaled by '{}'", product_spec.name()),
        });
    }
    Ok(())
}

fn bound(bindings: &Bindings, name: &str) -> Result<Expr> {
    bindings
        .expr(name)
        .cloned()
        .ok_or_else(|| Error::invalid_pattern("toolbox", format!("wildcard '{}' is not bound", name)))
}

/// Leibniz expansion of commutators with products.
///
/// In priority order:
///
/// - `[c X, Y] -> c [X, Y]` and `[X, c Y] -> c [X, Y]` for scalars `c`,
/// - `[A, B C] -> [A, B] C + B [A, C]`,
/// - `[A B, C] -> A [B, C] + [A, C] B`.
///
/// Applied to a fixed point, no commutator with a product argument remains.
pub fn leibniz_rules(manager: &Manager, commutator: KindId, product: KindId, sum: KindId) -> Result<RuleSet> {
    check_ring(manager, product, sum)?;
    let algebra = manager.try_kind(product)?.algebra();

    let scalar_left = Rule::new(
        "leibniz_scalar_left",
        Pattern::shape(
            commutator,
            [
                Pattern::shape(product, [wc("c").head(Tag::Scalar), wc("X").segment()]),
                wc("Y").into(),
            ],
        ),
        move |m, b| {
            let inner = m.binary(commutator, bound(b, "X")?, bound(b, "Y")?)?;
            m.create(product, [bound(b, "c")?, inner]).map(Some)
        },
    );

    let scalar_right = Rule::new(
        "leibniz_scalar_right",
        Pattern::shape(
            commutator,
            [
                wc("X").into(),
                Pattern::shape(product, [wc("c").head(Tag::Scalar), wc("Y").segment()]),
            ],
        ),
        move |m, b| {
            let inner = m.binary(commutator, bound(b, "X")?, bound(b, "Y")?)?;
            m.create(product, [bound(b, "c")?, inner]).map(Some)
        },
    );

    let left = Rule::new(
        "leibniz_left",
        Pattern::shape(
            commutator,
            [
                Pattern::shape(product, [wc("A").head(algebra), wc("B").segment()]),
                wc("C").into(),
            ],
        ),
        move |m, b| {
            let (a, rest, c) = (bound(b, "A")?, bound(b, "B")?, bound(b, "C")?);
            let first = m.create(product, [a.clone(), m.binary(commutator, rest.clone(), c.clone())?])?;
            let second = m.create(product, [m.binary(commutator, a, c)?, rest])?;
            m.create(sum, [first, second]).map(Some)
        },
    );

    let right = Rule::new(
        "leibniz_right",
        Pattern::shape(
            commutator,
            [
                wc("A").into(),
                Pattern::shape(product, [wc("B").head(algebra), wc("C").segment()]),
            ],
        ),
        move |m, b| {
            let (a, first_factor, rest) = (bound(b, "A")?, bound(b, "B")?, bound(b, "C")?);
            let first = m.create(product, [m.binary(commutator, a.clone(), first_factor.clone())?, rest.clone()])?;
            let second = m.create(product, [first_factor, m.binary(commutator, a, rest)?])?;
            m.create(sum, [first, second]).map(Some)
        },
    );

    RuleSet::builder("leibniz")
        .rule(scalar_left)
        .rule(scalar_right)
        .rule(right)
        .rule(left)
        .build(manager)
}

/// Explicit evaluation `[A, B] -> A B - B A`.
pub fn evaluate_commutator_rules(
    manager: &Manager,
    commutator: KindId,
    product: KindId,
    sum: KindId,
) -> Result<RuleSet> {
    check_ring(manager, product, sum)?;
    let evaluate = Rule::new(
        "commutator_evaluate",
        Pattern::shape(commutator, [wc("A"), wc("B")]),
        move |m, b| {
            let (a, bb) = (bound(b, "A")?, bound(b, "B")?);
            let ab = m.create(product, [a.clone(), bb.clone()])?;
            let ba = m.create(product, [bb, a])?;
            m.sub(sum, ab, ba).map(Some)
        },
    );
    RuleSet::builder("evaluate_commutators").rule(evaluate).build(manager)
}

/// Distributivity `X (S1 + S2 + ...) Y -> X S1 Y + X S2 Y + ...`.
pub fn distribute_rules(manager: &Manager, product: KindId, sum: KindId) -> Result<RuleSet> {
    check_ring(manager, product, sum)?;
    let distribute = Rule::new(
        "distribute",
        Pattern::shape(
            product,
            [
                wc("pre").optional_segment(),
                wc("S").head(sum),
                wc("post").optional_segment(),
            ],
        ),
        move |m, b| {
            let (Some(pre), Some(terms), Some(post)) = (b.items("pre"), b.expr("S"), b.items("post")) else {
                return Ok(None);
            };
            let mut expanded = Vec::with_capacity(terms.operands().len());
            for term in terms.operands() {
                let factors = pre.iter().chain(std::iter::once(term)).chain(post.iter()).cloned();
                expanded.push(m.create(product, factors)?);
            }
            m.create(sum, expanded).map(Some)
        },
    );
    RuleSet::builder("distribute").rule(distribute).build(manager)
}

/// Expands every commutator of products by the Leibniz rule.
///
/// With `expand`, products of sums are multiplied out as well, both in `expr`
/// and in every Leibniz result, so the outcome is a flat sum of products.
pub fn expand_commutators_leibniz(
    manager: &Manager,
    expr: &Expr,
    commutator: KindId,
    product: KindId,
    sum: KindId,
    expand: bool,
) -> Result<Expr> {
    let leibniz = leibniz_rules(manager, commutator, product, sum)?;
    if !expand {
        return manager.simplify(expr, &leibniz);
    }
    let rules = RuleSet::builder("leibniz_expand")
        .include(&leibniz)
        .include(&distribute_rules(manager, product, sum)?)
        .build(manager)?;
    manager.simplify(expr, &rules)
}

/// Replaces every commutator `[A, B]` by `A B - B A`.
pub fn evaluate_commutators(
    manager: &Manager,
    expr: &Expr,
    commutator: KindId,
    product: KindId,
    sum: KindId,
) -> Result<Expr> {
    let rules = evaluate_commutator_rules(manager, commutator, product, sum)?;
    manager.simplify(expr, &rules)
}

/// Multiplies out all products of sums.
pub fn expand(manager: &Manager, expr: &Expr, product: KindId, sum: KindId) -> Result<Expr> {
    let rules = distribute_rules(manager, product, sum)?;
    manager.simplify(expr, &rules)
}

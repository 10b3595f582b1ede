//! Patterns: expression templates with wildcard holes.
//!
//! A [`Pattern`] is one of
//!
//! - a [`Wildcard`], matching any expression it accepts,
//! - a literal [`Expr`], matching structurally equal expressions only,
//! - a shape, matching a composite node of one kind whose operands match the
//!   operand patterns.
//!
//! Shapes of n-ary kinds may contain segment wildcards, which bind runs of
//! operands. [`ShapeArity::AtLeast`] also lets the shape match nodes with
//! operands no operand pattern accounts for.
//!
//! Patterns are plain data: they are built once, validated when the rule set
//! containing them is built, and only read afterwards.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::kind::Arity;
use crate::manager::Manager;
use crate::matcher::{Binding, Bindings};
use crate::types::KindId;
use crate::wildcard::Wildcard;

/// Whether a shape must account for every operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeArity {
    Exact,
    AtLeast,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Wildcard(Wildcard),
    Literal(Expr),
    Shape {
        kind: KindId,
        operands: Vec<Pattern>,
        arity: ShapeArity,
    },
}

impl From<Wildcard> for Pattern {
    fn from(w: Wildcard) -> Self {
        Pattern::Wildcard(w)
    }
}

impl From<Expr> for Pattern {
    fn from(e: Expr) -> Self {
        Pattern::Literal(e)
    }
}

impl Pattern {
    pub fn shape<I, P>(kind: KindId, operands: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Pattern::Shape {
            kind,
            operands: operands.into_iter().map(Into::into).collect(),
            arity: ShapeArity::Exact,
        }
    }

    /// A shape that tolerates additional, unmatched operands.
    pub fn shape_at_least<I, P>(kind: KindId, operands: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Pattern::Shape {
            kind,
            operands: operands.into_iter().map(Into::into).collect(),
            arity: ShapeArity::AtLeast,
        }
    }

    pub fn literal(expr: Expr) -> Self {
        Pattern::Literal(expr)
    }

    pub fn as_wildcard(&self) -> Option<&Wildcard> {
        match self {
            Pattern::Wildcard(w) => Some(w),
            _ => None,
        }
    }

    /// The segment wildcard this pattern is, if any.
    pub(crate) fn as_segment(&self) -> Option<&Wildcard> {
        self.as_wildcard().filter(|w| w.is_segment())
    }

    /// All wildcards of the pattern, in pre-order.
    pub fn wildcards(&self) -> Vec<&Wildcard> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(p) = stack.pop() {
            match p {
                Pattern::Wildcard(w) => result.push(w),
                Pattern::Literal(_) => {}
                Pattern::Shape { operands, .. } => stack.extend(operands.iter().rev()),
            }
        }
        result
    }

    /// Checks that the pattern can be matched as declared.
    ///
    /// Errors are reported as [`Error::InvalidPattern`] on behalf of `rule`.
    pub fn validate(&self, manager: &Manager, rule: &str) -> Result<()> {
        if let Some(w) = self.as_segment() {
            return Err(Error::invalid_pattern(
                rule,
                format!("segment wildcard '{}' outside of an n-ary shape", w.name()),
            ));
        }

        let mut seen: HashMap<&str, &Wildcard> = HashMap::new();
        for w in self.wildcards() {
            match seen.get(w.name()) {
                Some(first) if !first.same_constraints(w) => {
                    return Err(Error::invalid_pattern(
                        rule,
                        format!("wildcard '{}' is repeated with different constraints", w.name()),
                    ));
                }
                Some(_) => {}
                None => {
                    seen.insert(w.name(), w);
                }
            }
        }

        let mut stack = vec![self];
        while let Some(p) = stack.pop() {
            let Pattern::Shape {
                kind,
                operands,
                arity,
            } = p
            else {
                continue;
            };
            let spec = manager
                .try_kind(*kind)
                .map_err(|e| Error::invalid_pattern(rule, e.to_string()))?;
            let segments = operands.iter().filter(|p| p.as_segment().is_some()).count();

            if let Some(n) = spec.arity.fixed() {
                if *arity == ShapeArity::AtLeast {
                    return Err(Error::invalid_pattern(
                        rule,
                        format!("'{}' has fixed arity and cannot match extra operands", spec.name),
                    ));
                }
                if segments > 0 {
                    return Err(Error::invalid_pattern(
                        rule,
                        format!("segment wildcard inside fixed-arity '{}'", spec.name),
                    ));
                }
                if operands.len() != n {
                    return Err(Error::invalid_pattern(
                        rule,
                        format!(
                            "'{}' takes {} operands, the pattern gives {}",
                            spec.name,
                            n,
                            operands.len()
                        ),
                    ));
                }
            } else if spec.arity == Arity::NAry && spec.commutative && segments > 1 {
                return Err(Error::invalid_pattern(
                    rule,
                    format!("more than one segment wildcard in commutative '{}'", spec.name),
                ));
            }
            stack.extend(operands.iter());
        }
        Ok(())
    }

    /// Substitutes `bindings` into the pattern.
    ///
    /// Segment wildcards inside a shape splice their bound run into the
    /// operand list; a segment at the top level yields its rebuilt node. All
    /// nodes are built through [`Manager::create`].
    pub fn instantiate(&self, manager: &Manager, bindings: &Bindings) -> Result<Expr> {
        match self {
            Pattern::Literal(expr) => Ok(expr.clone()),
            Pattern::Wildcard(w) => lookup(bindings, w).map(|b| b.expr().clone()),
            Pattern::Shape { kind, operands, .. } => {
                let mut items = Vec::with_capacity(operands.len());
                for p in operands {
                    match p.as_segment() {
                        Some(w) => items.extend(lookup(bindings, w)?.items().iter().cloned()),
                        None => items.push(p.instantiate(manager, bindings)?),
                    }
                }
                manager.create(*kind, items)
            }
        }
    }
}

fn lookup<'b>(bindings: &'b Bindings, w: &Wildcard) -> Result<&'b Binding> {
    bindings.get(w.name()).ok_or_else(|| {
        Error::invalid_pattern("instantiate", format!("wildcard '{}' is not bound", w.name()))
    })
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::kind::{Combine, KindSpec, Notation};
    use crate::types::Tag;
    use crate::wildcard::wc;

    fn setup() -> (Manager, KindId, KindId, KindId) {
        let mut mgr = Manager::new();
        let op = mgr.register_algebra("Operator");
        let times = mgr
            .register_kind(KindSpec::nary("OperatorTimes", op).combine(Combine::Multiply))
            .unwrap();
        let plus = mgr
            .register_kind(
                KindSpec::nary("OperatorPlus", op)
                    .commutative()
                    .combine(Combine::Add { scale: times }),
            )
            .unwrap();
        let comm = mgr
            .register_kind(KindSpec::binary("Commutator", op).notation(Notation::Bracket))
            .unwrap();
        (mgr, times, plus, comm)
    }

    fn reason(err: Error) -> String {
        match err {
            Error::InvalidPattern { reason, .. } => reason,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wildcards_preorder() {
        let (_, times, _, comm) = setup();
        let p = Pattern::shape(
            comm,
            [Pattern::shape(times, [wc("a"), wc("b").segment()]), wc("c").into()],
        );
        let names: Vec<&str> = p.wildcards().iter().map(|w| w.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_validate_ok() {
        let (mgr, times, plus, comm) = setup();
        let p = Pattern::shape(
            comm,
            [Pattern::shape(times, [wc("a"), wc("b").segment()]), wc("c").into()],
        );
        assert!(p.validate(&mgr, "leibniz").is_ok());

        let p = Pattern::shape_at_least(plus, [wc("x"), wc("x")]);
        assert!(p.validate(&mgr, "double").is_ok());
    }

    #[test]
    fn test_validate_top_level_segment() {
        let (mgr, ..) = setup();
        let err = Pattern::from(wc("s").segment()).validate(&mgr, "r").unwrap_err();
        assert!(reason(err).contains("outside of an n-ary shape"));
    }

    #[test]
    fn test_validate_inconsistent_wildcards() {
        let (mgr, times, ..) = setup();
        let p = Pattern::shape(times, [wc("x"), wc("x").head(Tag::Scalar)]);
        let err = p.validate(&mgr, "r").unwrap_err();
        assert!(reason(err).contains("different constraints"));

        let p = Pattern::shape(times, [wc("x"), wc("x").segment()]);
        assert!(p.validate(&mgr, "r").is_err());
    }

    #[test]
    fn test_validate_arity() {
        let (mgr, _, plus, comm) = setup();
        let err = Pattern::shape(comm, [wc("a")]).validate(&mgr, "r").unwrap_err();
        assert!(reason(err).contains("takes 2 operands"));

        let err = Pattern::shape_at_least(comm, [wc("a"), wc("b")])
            .validate(&mgr, "r")
            .unwrap_err();
        assert!(reason(err).contains("fixed arity"));

        let err = Pattern::shape(comm, [wc("a"), wc("b").segment()])
            .validate(&mgr, "r")
            .unwrap_err();
        assert!(reason(err).contains("fixed-arity"));

        let err = Pattern::shape(plus, [wc("a").segment(), wc("b").optional_segment()])
            .validate(&mgr, "r")
            .unwrap_err();
        assert!(reason(err).contains("commutative"));

        let err = Pattern::shape(KindId::new(77), [wc("a")])
            .validate(&mgr, "r")
            .unwrap_err();
        assert!(reason(err).contains("not registered"));
    }

    #[test]
    fn test_instantiate() {
        let (mgr, times, _, comm) = setup();
        let op = mgr.kind(times).algebra();
        let a = mgr.symbol("a", op).unwrap();
        let b = mgr.symbol("b", op).unwrap();
        let c = mgr.symbol("c", op).unwrap();
        let bc = mgr.create(times, [b.clone(), c.clone()]).unwrap();

        let mut bindings = Bindings::default();
        bindings.bind("x", Binding::Single(a.clone()));
        bindings.bind(
            "rest",
            Binding::Segment {
                kind: times,
                items: vec![b.clone(), c.clone()],
                rebuilt: bc.clone(),
            },
        );

        let p = Pattern::shape(times, [wc("x"), wc("rest").segment()]);
        let abc = mgr.create(times, [a.clone(), b.clone(), c.clone()]).unwrap();
        assert_eq!(p.instantiate(&mgr, &bindings).unwrap(), abc);

        // A segment binding used as a single wildcard yields its rebuilt node.
        let p = Pattern::shape(comm, [wc("x"), wc("rest")]);
        let expected = mgr.binary(comm, a.clone(), bc).unwrap();
        assert_eq!(p.instantiate(&mgr, &bindings).unwrap(), expected);

        let err = Pattern::from(wc("nope")).instantiate(&mgr, &bindings).unwrap_err();
        assert!(reason(err).contains("not bound"));
    }
}

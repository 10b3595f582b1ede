//! The matcher.
//!
//! [`Manager::match_pattern`] decides whether a [`Pattern`] matches an
//! expression and returns the [`Bindings`] of the first match found:
//!
//! - A wildcard matches any expression it accepts. A name that occurs more
//!   than once must bind structurally equal values everywhere.
//! - A literal matches structurally equal expressions.
//! - A shape matches nodes of its kind:
//!   - ordered kinds are matched left to right, backtracking over the split
//!     points of segment wildcards;
//!   - commutative kinds try every injective assignment of the non-segment
//!     operand patterns to operands; the (single) segment then takes the
//!     remaining operands in canonical order.
//!
//! A segment binds its run together with the canonical node rebuilt from it,
//! so a one-element run rebuilds to that element and an empty run rebuilds
//! to the kind's unit. An empty run of a kind without unit does not match.
//!
//! The search is written in continuation-passing style: every sub-match
//! hands its bindings to the rest of the match, so a failure anywhere later
//! makes earlier choices be retried. Recursion follows the pattern, whose
//! depth is fixed by the rule author, never the depth of the expression.
//!
//! Match failure is not an error; all entry points return [`Option`].

use std::collections::BTreeMap;
use std::ops::Index;

use log::trace;

use crate::expr::Expr;
use crate::kind::Arity;
use crate::manager::Manager;
use crate::pattern::{Pattern, ShapeArity};
use crate::types::KindId;
use crate::wildcard::Wildcard;

/// The value captured by one wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Single(Expr),
    Segment {
        kind: KindId,
        items: Vec<Expr>,
        rebuilt: Expr,
    },
}

impl Binding {
    /// The bound expression; for segments, the node rebuilt from the run.
    pub fn expr(&self) -> &Expr {
        match self {
            Binding::Single(expr) => expr,
            Binding::Segment { rebuilt, .. } => rebuilt,
        }
    }

    /// The bound run; a single binding is a run of one.
    pub fn items(&self) -> &[Expr] {
        match self {
            Binding::Single(expr) => std::slice::from_ref(expr),
            Binding::Segment { items, .. } => items,
        }
    }
}

/// Capture name to bound value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    map: BTreeMap<String, Binding>,
}

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.map.get(name)
    }

    pub fn expr(&self, name: &str) -> Option<&Expr> {
        self.get(name).map(Binding::expr)
    }

    pub fn items(&self, name: &str) -> Option<&[Expr]> {
        self.get(name).map(Binding::items)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> + '_ {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Binds `name`, or checks the existing binding agrees.
    ///
    /// Returns `false` on a conflict.
    pub(crate) fn bind(&mut self, name: &str, binding: Binding) -> bool {
        match self.map.get(name) {
            Some(existing) => *existing == binding,
            None => {
                self.map.insert(name.to_string(), binding);
                true
            }
        }
    }
}

impl Index<&str> for Bindings {
    type Output = Expr;

    /// # Panics
    ///
    /// Panics if `name` is not bound.
    fn index(&self, name: &str) -> &Expr {
        match self.expr(name) {
            Some(expr) => expr,
            None => panic!("wildcard '{}' is not bound", name),
        }
    }
}

/// The rest of a match, called with the bindings found so far.
type Cont<'a> = &'a mut dyn FnMut(Bindings) -> Option<Bindings>;

impl Manager {
    /// Matches `pattern` against `expr`.
    pub fn match_pattern(&self, pattern: &Pattern, expr: &Expr) -> Option<Bindings> {
        let result = self.match_node(pattern, expr, Bindings::default(), &mut |b| Some(b));
        if result.is_some() {
            trace!("match: {:?} matches {}", pattern, expr);
        }
        result
    }

    pub fn matches(&self, pattern: &Pattern, expr: &Expr) -> bool {
        self.match_pattern(pattern, expr).is_some()
    }

    /// All sub-expressions of `expr` matching `pattern`, in pre-order.
    pub fn find_all(&self, pattern: &Pattern, expr: &Expr) -> Vec<(Expr, Bindings)> {
        expr.iter()
            .filter_map(|e| self.match_pattern(pattern, e).map(|b| (e.clone(), b)))
            .collect()
    }

    fn match_node(&self, pattern: &Pattern, expr: &Expr, bindings: Bindings, k: Cont<'_>) -> Option<Bindings> {
        match pattern {
            Pattern::Literal(literal) => {
                if literal == expr {
                    k(bindings)
                } else {
                    None
                }
            }
            Pattern::Wildcard(w) => {
                if w.is_segment() || !w.accepts(self, expr) {
                    return None;
                }
                let mut bindings = bindings;
                if !bindings.bind(w.name(), Binding::Single(expr.clone())) {
                    return None;
                }
                k(bindings)
            }
            Pattern::Shape {
                kind,
                operands,
                arity,
            } => {
                if expr.kind() != Some(*kind) {
                    return None;
                }
                let spec = self.try_kind(*kind).ok()?;
                let ops = expr.operands();
                match spec.arity {
                    Arity::NAry if spec.commutative => {
                        let mut singles = Vec::with_capacity(operands.len());
                        let mut segment = None;
                        for p in operands {
                            match p.as_segment() {
                                Some(w) if segment.is_none() => segment = Some(w),
                                Some(_) => return None,
                                None => singles.push(p),
                            }
                        }
                        let mut used = vec![false; ops.len()];
                        self.match_unordered(*kind, &singles, segment, *arity, ops, &mut used, bindings, k)
                    }
                    Arity::NAry => self.match_ordered(*kind, operands, *arity, ops, bindings, k),
                    Arity::Unary | Arity::Binary => {
                        if operands.len() != ops.len() {
                            return None;
                        }
                        self.match_ordered(*kind, operands, ShapeArity::Exact, ops, bindings, k)
                    }
                }
            }
        }
    }

    /// Binds the run `items` to the segment wildcard `w`.
    fn bind_segment(&self, w: &Wildcard, kind: KindId, items: &[Expr], bindings: &Bindings) -> Option<Bindings> {
        if items.len() < w.mode().min_len() || !items.iter().all(|e| w.accepts(self, e)) {
            return None;
        }
        let rebuilt = self.create(kind, items.iter().cloned()).ok()?;
        let mut bindings = bindings.clone();
        let binding = Binding::Segment {
            kind,
            items: items.to_vec(),
            rebuilt,
        };
        if bindings.bind(w.name(), binding) {
            Some(bindings)
        } else {
            None
        }
    }

    fn match_ordered(
        &self,
        kind: KindId,
        patterns: &[Pattern],
        arity: ShapeArity,
        ops: &[Expr],
        bindings: Bindings,
        k: Cont<'_>,
    ) -> Option<Bindings> {
        let Some((first, rest)) = patterns.split_first() else {
            return if ops.is_empty() || arity == ShapeArity::AtLeast {
                k(bindings)
            } else {
                None
            };
        };

        if let Some(w) = first.as_segment() {
            // Shortest runs first.
            for len in w.mode().min_len()..=ops.len() {
                if len > 0 && !w.accepts(self, &ops[len - 1]) {
                    // Every longer run contains the rejected operand too.
                    break;
                }
                let Some(extended) = self.bind_segment(w, kind, &ops[..len], &bindings) else {
                    continue;
                };
                if let Some(result) = self.match_ordered(kind, rest, arity, &ops[len..], extended, k) {
                    return Some(result);
                }
            }
            return None;
        }

        let (op, tail) = ops.split_first()?;
        self.match_node(first, op, bindings, &mut |b| {
            self.match_ordered(kind, rest, arity, tail, b, k)
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn match_unordered(
        &self,
        kind: KindId,
        singles: &[&Pattern],
        segment: Option<&Wildcard>,
        arity: ShapeArity,
        ops: &[Expr],
        used: &mut [bool],
        bindings: Bindings,
        k: Cont<'_>,
    ) -> Option<Bindings> {
        let Some((first, rest)) = singles.split_first() else {
            let remaining: Vec<Expr> = ops
                .iter()
                .zip(used.iter())
                .filter(|(_, used)| !**used)
                .map(|(e, _)| e.clone())
                .collect();
            return match segment {
                Some(w) => {
                    let extended = self.bind_segment(w, kind, &remaining, &bindings)?;
                    k(extended)
                }
                None if remaining.is_empty() || arity == ShapeArity::AtLeast => k(bindings),
                None => None,
            };
        };

        for i in 0..ops.len() {
            if used[i] {
                continue;
            }
            // Equal operands lead to the same outcome.
            if (0..i).any(|j| !used[j] && ops[j] == ops[i]) {
                continue;
            }
            used[i] = true;
            let result = self.match_node(first, &ops[i], bindings.clone(), &mut |b| {
                self.match_unordered(kind, rest, segment, arity, ops, used, b, k)
            });
            used[i] = false;
            if result.is_some() {
                return result;
            }
        }
        None
    }
}

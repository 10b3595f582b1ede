//! Bottom-up rewriting to a fixed point.
//!
//! # Algorithm
//!
//! [`Simplifier::simplify`] walks the tree in post-order. At every node:
//!
//! 1. the operands are simplified first;
//! 2. the node is rebuilt from the simplified operands through the
//!    canonicalizer;
//! 3. the rule set is applied at the node; when a rule fires, its replacement
//!    is simplified from scratch (it may contain new redexes anywhere), and
//!    the result of that is the result for the node.
//!
//! A node is final when no rule fires at it and all its operands are final.
//! Rebuilding can create operands that were never visited (merged
//! coefficients, terms rebuilt by like-term merging); such a node is visited
//! again, so the result is a fixed point of the whole rule set and
//! `simplify(simplify(x)) == simplify(x)`.
//!
//! The walk uses an explicit task stack, so deep expressions do not
//! overflow the native stack. A per-call memo ([`HashMapCache`]) maps every
//! visited expression to its result, so shared sub-trees are simplified once.
//!
//! # Termination
//!
//! Termination is up to the rule author: a rule set that rewrites `x` to
//! `y` and `y` back to `x` loops forever. [`SimplifyConfig::step_limit`] turns
//! such loops into [`Error::StepLimitExceeded`].

use log::{debug, trace};

use crate::cache::HashMapCache;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::manager::Manager;
use crate::ruleset::RuleSet;

/// Configuration options for [`Simplifier`].
#[derive(Debug, Clone, Default)]
pub struct SimplifyConfig {
    /// Maximum number of rule applications per call (default: unbounded).
    pub step_limit: Option<usize>,
}

impl SimplifyConfig {
    pub fn with_step_limit(limit: usize) -> Self {
        Self {
            step_limit: Some(limit),
        }
    }
}

enum Task {
    /// Simplify an expression and push its result.
    Visit(Expr),
    /// The operands of `origin` are on the result stack; rebuild it.
    Rebuild(Expr),
    /// Apply the rules at `node`, the rebuilt form of `origin`.
    Settle { origin: Expr, node: Expr },
    /// The result for `origin` is on top of the result stack; memoize it.
    Finish(Expr),
}

/// One simplification run: a rule set, its configuration and the memo.
pub struct Simplifier<'a> {
    manager: &'a Manager,
    rules: &'a RuleSet,
    config: SimplifyConfig,
    memo: HashMapCache<Expr, Expr>,
    steps: usize,
}

impl<'a> Simplifier<'a> {
    pub fn new(manager: &'a Manager, rules: &'a RuleSet) -> Self {
        Self::with_config(manager, rules, SimplifyConfig::default())
    }

    pub fn with_config(manager: &'a Manager, rules: &'a RuleSet, config: SimplifyConfig) -> Self {
        Self {
            manager,
            rules,
            config,
            memo: HashMapCache::default(),
            steps: 0,
        }
    }

    /// Number of rule applications so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn memo(&self) -> &HashMapCache<Expr, Expr> {
        &self.memo
    }

    /// Whether `expr` is known to be final.
    fn is_final(&mut self, expr: &Expr) -> bool {
        matches!(self.memo.get(expr), Some(result) if result == *expr)
    }

    fn count_step(&mut self) -> Result<()> {
        self.steps += 1;
        match self.config.step_limit {
            Some(limit) if self.steps > limit => Err(Error::StepLimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    /// Rewrites `expr` until no rule of the set applies anywhere.
    pub fn simplify(&mut self, expr: &Expr) -> Result<Expr> {
        let mut tasks = vec![Task::Visit(expr.clone())];
        let mut results: Vec<Expr> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(expr) => {
                    if let Some(result) = self.memo.get(&expr) {
                        results.push(result);
                    } else if expr.is_leaf() {
                        tasks.push(Task::Settle {
                            origin: expr.clone(),
                            node: expr,
                        });
                    } else {
                        let operands: Vec<Expr> = expr.operands().to_vec();
                        tasks.push(Task::Rebuild(expr));
                        tasks.extend(operands.into_iter().rev().map(Task::Visit));
                    }
                }

                Task::Rebuild(origin) => {
                    let n = origin.operands().len();
                    let operands = results.split_off(results.len() - n);
                    let node = self.manager.rebuild(&origin, operands)?;
                    let fresh = node.operands().iter().any(|e| !self.is_final(e));
                    if fresh && node != origin {
                        trace!("simplify: {} has new operands, visiting again", node);
                        tasks.push(Task::Finish(origin));
                        tasks.push(Task::Visit(node));
                    } else {
                        tasks.push(Task::Settle { origin, node });
                    }
                }

                Task::Settle { origin, node } => {
                    if node != origin {
                        if let Some(result) = self.memo.get(&node) {
                            self.memo.insert(origin, result.clone());
                            results.push(result);
                            continue;
                        }
                    }
                    match self.rules.apply_first(self.manager, &node)? {
                        Some((name, replacement)) => {
                            debug!("{}: {} -> {}", name, self.manager.render(&node), self.manager.render(&replacement));
                            self.count_step()?;
                            tasks.push(Task::Finish(origin.clone()));
                            if node != origin {
                                tasks.push(Task::Finish(node));
                            }
                            tasks.push(Task::Visit(replacement));
                        }
                        None => {
                            self.memo.insert(origin, node.clone());
                            self.memo.insert(node.clone(), node.clone());
                            results.push(node);
                        }
                    }
                }

                Task::Finish(origin) => {
                    if let Some(result) = results.last() {
                        self.memo.insert(origin, result.clone());
                    }
                }
            }
        }

        assert_eq!(results.len(), 1);
        trace!("simplify: {} steps, {} memo entries", self.steps, self.memo.len());
        Ok(results.pop().expect("one result"))
    }
}

impl Manager {
    /// Rewrites `expr` with `rules` until nothing changes.
    pub fn simplify(&self, expr: &Expr, rules: &RuleSet) -> Result<Expr> {
        Simplifier::new(self, rules).simplify(expr)
    }

    pub fn simplify_with(&self, expr: &Expr, rules: &RuleSet, config: SimplifyConfig) -> Result<Expr> {
        Simplifier::with_config(self, rules, config).simplify(expr)
    }
}

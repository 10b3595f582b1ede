//! Ordered, named collections of rules.
//!
//! Insertion order is priority order: [`RuleSet::apply_first`] tries the
//! rules one by one and the first rewrite wins. A rule set is immutable once
//! built; [`RuleSet::builder`] validates every pattern against the manager and
//! rejects duplicate rule names, so malformed rule sets never reach the
//! simplifier.

use std::collections::HashSet;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::manager::Manager;
use crate::rule::Rule;

#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
}

/// Collects rules for a [`RuleSet`].
#[derive(Debug)]
pub struct RuleSetBuilder {
    name: String,
    rules: Vec<Rule>,
}

impl RuleSetBuilder {
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules<I: IntoIterator<Item = Rule>>(mut self, rules: I) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Appends all rules of `other`, after the rules added so far.
    pub fn include(mut self, other: &RuleSet) -> Self {
        self.rules.extend(other.rules.iter().cloned());
        self
    }

    pub fn build(self, manager: &Manager) -> Result<RuleSet> {
        let mut names = HashSet::new();
        for rule in &self.rules {
            if !names.insert(rule.name()) {
                return Err(Error::DuplicateRule {
                    ruleset: self.name.clone(),
                    rule: rule.name().to_string(),
                });
            }
            rule.pattern().validate(manager, rule.name())?;
        }
        debug!("rule set {} with {} rules", self.name, self.rules.len());
        Ok(RuleSet {
            name: self.name,
            rules: self.rules,
        })
    }
}

impl RuleSet {
    pub fn builder(name: &str) -> RuleSetBuilder {
        RuleSetBuilder {
            name: name.to_string(),
            rules: Vec::new(),
        }
    }

    /// A rule set without rules: simplification only canonicalizes.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter()
    }

    /// Rule names in priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.iter().map(Rule::name)
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// Applies the first rule that rewrites `expr`.
    ///
    /// Returns the name of that rule together with the replacement.
    pub fn apply_first(&self, manager: &Manager, expr: &Expr) -> Result<Option<(&str, Expr)>> {
        for rule in &self.rules {
            if let Some(result) = rule.apply(manager, expr)? {
                trace!("{}: rule {} fired", self.name, rule.name());
                return Ok(Some((rule.name(), result)));
            }
        }
        Ok(None)
    }
}

//! Rewrite rules.
//!
//! A [`Rule`] pairs a [`Pattern`] with a replacement behaviour. The pattern is
//! inspectable data; the behaviour is anything implementing [`Replace`],
//! usually a closure:
//!
//! ```
//! use rewrite_rs::kind::KindSpec;
//! use rewrite_rs::manager::Manager;
//! use rewrite_rs::pattern::Pattern;
//! use rewrite_rs::rule::Rule;
//! use rewrite_rs::wildcard::wc;
//!
//! let mut mgr = Manager::new();
//! let op = mgr.register_algebra("Operator");
//! let adjoint = mgr.register_kind(KindSpec::unary("Adjoint", op)).unwrap();
//!
//! // (A^H)^H -> A
//! let rule = Rule::new(
//!     "adjoint_adjoint",
//!     Pattern::shape(adjoint, [Pattern::shape(adjoint, [wc("A")])]),
//!     |_, b| Ok(Some(b["A"].clone())),
//! );
//!
//! let a = mgr.symbol("A", op).unwrap();
//! let a_dag = mgr.unary(adjoint, a.clone()).unwrap();
//! let a_dag_dag = mgr.unary(adjoint, a_dag.clone()).unwrap();
//! assert_eq!(rule.apply(&mgr, &a_dag_dag).unwrap(), Some(a));
//! assert_eq!(rule.apply(&mgr, &a_dag).unwrap(), None);
//! ```

use std::fmt;
use std::sync::Arc;

use log::trace;

use crate::error::Result;
use crate::expr::Expr;
use crate::manager::Manager;
use crate::matcher::Bindings;
use crate::pattern::Pattern;

/// Replacement behaviour of a rule.
///
/// Returning `Ok(None)` declines the rewrite even though the pattern
/// matched; the next rule of the set is tried instead.
pub trait Replace: Send + Sync {
    fn replace(&self, manager: &Manager, bindings: &Bindings) -> Result<Option<Expr>>;
}

impl<F> Replace for F
where
    F: Fn(&Manager, &Bindings) -> Result<Option<Expr>> + Send + Sync,
{
    fn replace(&self, manager: &Manager, bindings: &Bindings) -> Result<Option<Expr>> {
        self(manager, bindings)
    }
}

/// A named pattern with its replacement.
#[derive(Clone)]
pub struct Rule {
    name: String,
    pattern: Pattern,
    replacement: Arc<dyn Replace>,
}

impl Rule {
    pub fn new<P, F>(name: &str, pattern: P, replacement: F) -> Self
    where
        P: Into<Pattern>,
        F: Fn(&Manager, &Bindings) -> Result<Option<Expr>> + Send + Sync + 'static,
    {
        Self::with_replacement(name, pattern, replacement)
    }

    /// Like [`Rule::new`], for replacements that are not closures.
    pub fn with_replacement<P, R>(name: &str, pattern: P, replacement: R) -> Self
    where
        P: Into<Pattern>,
        R: Replace + 'static,
    {
        Self {
            name: name.to_string(),
            pattern: pattern.into(),
            replacement: Arc::new(replacement),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Matches the pattern and runs the replacement.
    ///
    /// Returns `Ok(None)` if the pattern does not match or the replacement
    /// declines.
    pub fn apply(&self, manager: &Manager, expr: &Expr) -> Result<Option<Expr>> {
        let Some(bindings) = manager.match_pattern(&self.pattern, expr) else {
            return Ok(None);
        };
        let result = self.replacement.replace(manager, &bindings)?;
        if result.is_none() {
            trace!("rule {}: matched {} but declined", self.name, expr);
        }
        Ok(result)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish()
    }
}

//! Expression caches.
//!
//! Two caches with different jobs live here:
//!
//! | Cache | Key | Value | Lifetime | Shared |
//! |-------|-----|-------|----------|--------|
//! | [`ExprCache`] | node payload | shared node | manager | across threads |
//! | [`HashMapCache`] | expression | rewritten expression | one `simplify` call | no |
//!
//! [`ExprCache`] is the interning table behind every constructor of the
//! [`Manager`][crate::manager::Manager]: identical canonical shapes are
//! represented by one shared node. Sharing only saves memory and speeds up
//! equality checks. Correctness never depends on it, since expression
//! equality is structural.
//!
//! [`HashMapCache`] memoizes the simplifier so that shared sub-trees are
//! rewritten once per call.
//!
//! # Example
//!
//! ```
//! use rewrite_rs::manager::Manager;
//!
//! let mut mgr = Manager::new();
//! let op = mgr.register_algebra("Operator");
//! let a1 = mgr.symbol("A", op).unwrap();
//! let a2 = mgr.symbol("A", op).unwrap();
//! assert!(a1.ptr_eq(&a2));
//! assert!(mgr.cache().hits() >= 1);
//! ```

mod hashmap;

use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;
use parking_lot::RwLock;

use crate::expr::{Expr, ExprData};
use crate::subtable::Subtable;
use crate::types::Tag;

pub use hashmap::HashMapCache;

/// The interning table: one [`Subtable`] per tag, each behind its own lock.
pub struct ExprCache {
    subtables: Vec<RwLock<Subtable>>,
    enabled: bool,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Default for ExprCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ExprCache {
    /// Creates an empty cache. A disabled cache builds a fresh node on every call.
    pub fn new(enabled: bool) -> Self {
        Self {
            subtables: Tag::ALL
                .iter()
                .map(|&tag| RwLock::new(Subtable::new(tag)))
                .collect(),
            enabled,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the shared node with payload `data`, creating it if needed.
    ///
    /// The insert path re-checks under the write lock, so two threads racing
    /// on the same shape always end up with the same node.
    pub fn get_or_create(&self, data: ExprData) -> Expr {
        if !self.enabled {
            return Expr::from_data(data);
        }

        let subtable = &self.subtables[data.tag().index()];

        if let Some(expr) = subtable.read().find(&data) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return expr;
        }

        let mut table = subtable.write();
        if let Some(expr) = table.find(&data) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return expr;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let expr = Expr::from_data(data);
        trace!("cache: new {} node {:#018x} (size {})", expr.head(), expr.fingerprint(), expr.size());
        table.insert(expr.clone());
        expr
    }

    /// Looks up a node without creating it.
    pub fn find(&self, data: &ExprData) -> Option<Expr> {
        self.subtables[data.tag().index()].read().find(data)
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }
    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Total number of shared nodes.
    pub fn len(&self) -> usize {
        self.subtables.iter().map(|t| t.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of shared nodes with the given tag.
    pub fn len_of(&self, tag: Tag) -> usize {
        self.subtables[tag.index()].read().len()
    }

    /// Drops every shared node and resets the statistics.
    ///
    /// Expressions handed out earlier stay valid; they are just no longer
    /// shared with expressions built afterwards.
    pub fn clear(&self) {
        for subtable in &self.subtables {
            subtable.write().clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for ExprCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExprCache")
            .field("enabled", &self.enabled)
            .field("len", &self.len())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}
